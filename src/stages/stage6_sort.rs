use biblatex::{Chunk, Person, Spanned};

use crate::models::Entry;

const DEFAULT_YEAR: &str = "0000";
const DEFAULT_AUTHOR: &str = "Aaaa Aaaa";

/// Convert one BibTeX name to `von last, firsts`.
///
/// Both `First von Last` and `von Last, Jr, First` are understood; the
/// `Jr` part does not take part in the key.
pub fn last_first(name: &str) -> String {
    let name = name.trim();
    let chunks = vec![Spanned::new(Chunk::Normal(name.to_string()), 0..name.len())];
    let person = Person::parse(&chunks);
    let last = if person.prefix.is_empty() {
        person.name
    } else {
        format!("{} {}", person.prefix, person.name)
    };
    format!("{}, {}", last, person.given_name)
}

/// First author of an `and`-separated author list, as `last, firsts`
pub fn first_author(authors: &str) -> String {
    let authors = authors.replace('\n', " ");
    authors
        .split(" and ")
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(last_first)
        .unwrap_or_default()
}

/// Sort key: year followed by the lower-cased first author
pub fn sort_key(entry: &Entry) -> String {
    let year = entry.get("year").unwrap_or(DEFAULT_YEAR);
    let author = entry.get("author").unwrap_or(DEFAULT_AUTHOR);
    format!("{}{}", year, first_author(author).to_lowercase())
}

/// Execute Stage 6: stable sort by year, then first author.
///
/// Keys are computed from a read-only view; entries come out unchanged.
pub fn sort_entries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut keyed: Vec<(String, Entry)> = entries
        .into_iter()
        .map(|entry| (sort_key(&entry), entry))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_first() {
        assert_eq!(last_first("Donald E. Knuth"), "Knuth, Donald E.");
        assert_eq!(last_first("Knuth, Donald E."), "Knuth, Donald E.");
        assert_eq!(last_first("Ludwig van Beethoven"), "van Beethoven, Ludwig");
        assert_eq!(last_first("Plato"), "Plato, ");
        assert_eq!(last_first("Doe, Jr., John"), "Doe, John");
    }

    #[test]
    fn test_first_author() {
        assert_eq!(
            first_author("Doe, Jane and\nRoe, Richard"),
            "Doe, Jane"
        );
        assert_eq!(first_author(DEFAULT_AUTHOR), "Aaaa, Aaaa");
    }

    #[test]
    fn test_sort_key_defaults() {
        let entry = Entry::new("misc", "x");
        assert_eq!(sort_key(&entry), "0000aaaa, aaaa");
    }

    #[test]
    fn test_sort_by_year_first() {
        let entries = vec![
            Entry::new("article", "late")
                .with_field("year", "2001")
                .with_field("author", "Aaron, A."),
            Entry::new("article", "early")
                .with_field("year", "1999")
                .with_field("author", "Zimmer, Z."),
        ];

        let sorted = sort_entries(entries);

        let ids: Vec<&str> = sorted.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_sort_by_author_within_year() {
        let entries = vec![
            Entry::new("article", "z")
                .with_field("year", "2000")
                .with_field("author", "Zed Zulu"),
            Entry::new("article", "a")
                .with_field("year", "2000")
                .with_field("author", "alpha, Amy"),
        ];

        let sorted = sort_entries(entries);

        assert_eq!(sorted[0].id(), "a");
        assert_eq!(sorted[0].get("author"), Some("alpha, Amy"));
    }

    #[test]
    fn test_sort_is_stable() {
        let entries = vec![Entry::new("misc", "first"), Entry::new("misc", "second")];

        let sorted = sort_entries(entries);

        assert_eq!(sorted[0].id(), "first");
        assert_eq!(sorted[1].id(), "second");
    }
}
