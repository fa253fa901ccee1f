use tracing::{info, warn};

use crate::models::{ANNOTATION, Entry, FieldPolicy, PolicyTable, StageOutput, Violation};

/// Execute Stage 2: rebuild each entry from the fields its policy sanctions.
///
/// The policy is looked up by the `bibsane` annotation when an entry has one,
/// and by its entry type otherwise. Entries without a policy are dropped.
/// Fields the policy does not mention are discarded with a notice.
pub fn clean_entries(entries: Vec<Entry>, policies: &PolicyTable) -> StageOutput {
    let mut output = StageOutput::default();

    for old in entries {
        let policy_key = old.get(ANNOTATION).unwrap_or(old.entry_type());
        let Some(policy) = policies.get(policy_key) else {
            let violation = Violation::UnconfiguredEntryType {
                id: old.id().to_string(),
                entry_type: policy_key.to_string(),
            };
            warn!("{}", violation);
            output.violations.push(violation);
            continue;
        };

        let mut cleaned = Entry::new(old.entry_type(), old.id());
        if let Some(annotation) = old.get(ANNOTATION) {
            cleaned = cleaned.with_field(ANNOTATION, annotation);
        }

        for (field, field_policy) in policy {
            match (field_policy, old.get(field)) {
                (FieldPolicy::Must, None) => {
                    let violation = Violation::MissingField {
                        id: old.id().to_string(),
                        entry_type: policy_key.to_string(),
                        field: field.clone(),
                    };
                    warn!("{}", violation);
                    output.violations.push(violation);
                }
                (FieldPolicy::Must | FieldPolicy::May, Some(value)) => {
                    cleaned = cleaned.with_field(field.as_str(), value);
                }
                (FieldPolicy::May, None) => {}
            }
        }

        for (field, _) in old.fields() {
            if field != ANNOTATION && !policy.contains_key(field) {
                info!(
                    "{}: @{} discarding field {}",
                    old.id(),
                    policy_key,
                    field
                );
            }
        }

        output.entries.push(cleaned);
    }

    output
}
