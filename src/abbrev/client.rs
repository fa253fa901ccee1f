use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};

/// Default endpoint of the abbreviso ISO 4 service
pub const ABBREVISO_ENDPOINT: &str = "https://abbreviso.toolforge.org/abbreviso/a";

/// Source of ISO 4 journal abbreviations.
///
/// The journal normalizer only depends on this trait so that tests can plug
/// in a deterministic table instead of the network.
pub trait JournalLookup {
    /// Return the abbreviation of a full journal name
    fn abbreviate(&self, journal: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Configuration for the abbreviso client
#[derive(Debug, Clone)]
pub struct AbbrevisoConfig {
    /// Base URL; the journal name is appended as one path segment
    pub endpoint: String,
    /// Upper bound on one lookup, connection included
    pub timeout: Duration,
}

impl Default for AbbrevisoConfig {
    fn default() -> Self {
        Self {
            endpoint: ABBREVISO_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl AbbrevisoConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// HTTP client for abbreviso.toolforge.org
pub struct AbbrevisoClient {
    client: Client,
    config: AbbrevisoConfig,
}

impl AbbrevisoClient {
    pub fn new(config: AbbrevisoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// URL for one journal name, with the name percent-encoded
    fn lookup_url(&self, journal: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint)
            .with_context(|| format!("Invalid abbreviso endpoint: {}", self.config.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Abbreviso endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(journal);
        Ok(url)
    }
}

impl JournalLookup for AbbrevisoClient {
    async fn abbreviate(&self, journal: &str) -> Result<String> {
        let url = self.lookup_url(journal)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to abbreviso")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Abbreviso error: {} - {}", status, body);
        }

        let abbreviation = response
            .text()
            .await
            .context("Failed to read abbreviso response")?;
        let abbreviation = abbreviation.trim();
        if abbreviation.is_empty() {
            anyhow::bail!("Abbreviso returned an empty abbreviation for {journal}");
        }
        Ok(abbreviation.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_encodes_journal() {
        let client = AbbrevisoClient::new(AbbrevisoConfig::default()).unwrap();
        let url = client.lookup_url("Journal of Chemical Physics").unwrap();

        assert_eq!(
            url.as_str(),
            "https://abbreviso.toolforge.org/abbreviso/a/Journal%20of%20Chemical%20Physics"
        );
    }

    #[test]
    fn test_lookup_url_with_trailing_slash() {
        let config = AbbrevisoConfig {
            endpoint: "http://localhost:8080/a/".to_string(),
            ..Default::default()
        };
        let client = AbbrevisoClient::new(config).unwrap();
        let url = client.lookup_url("Nature").unwrap();

        assert_eq!(url.as_str(), "http://localhost:8080/a/Nature");
    }

    #[test]
    fn test_config_timeout() {
        let config = AbbrevisoConfig::with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.endpoint, ABBREVISO_ENDPOINT);
    }
}
