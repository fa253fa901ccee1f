/// Reserved field holding the bibliographic category (e.g. "article")
pub const ENTRYTYPE: &str = "ENTRYTYPE";
/// Reserved field holding the citation key
pub const ID: &str = "ID";
/// Optional annotation overriding the entry type used for policy lookup
pub const ANNOTATION: &str = "bibsane";

/// One bibliographic record.
///
/// An entry behaves like an ordered mapping from field name to value in which
/// `ENTRYTYPE` and `ID` are always present and always come first. Entries are
/// values: every "modification" consumes or copies the record and returns a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    entry_type: String,
    id: String,
    /// Non-reserved fields in insertion order
    fields: Vec<(String, String)>,
}

impl Entry {
    /// Create an entry with only the reserved fields
    pub fn new(entry_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up any field, reserved ones included
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            ENTRYTYPE => Some(&self.entry_type),
            ID => Some(&self.id),
            _ => self
                .fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all fields in order, starting with `ENTRYTYPE` and `ID`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            (ENTRYTYPE, self.entry_type.as_str()),
            (ID, self.id.as_str()),
        ]
        .into_iter()
        .chain(self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Iterate over the non-reserved fields only
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields, reserved ones included
    pub fn len(&self) -> usize {
        self.fields.len() + 2
    }

    /// Always false: the reserved fields are always present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Return a copy of this entry with `name` set to `value`.
    ///
    /// An existing field keeps its position; a new field is appended.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            ENTRYTYPE => self.entry_type = value,
            ID => self.id = value,
            _ => match self.fields.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => self.fields.push((name, value)),
            },
        }
        self
    }

    /// Return a copy with every value, reserved ones included, passed through `f`
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str, &str) -> String,
    {
        Self {
            entry_type: f(ENTRYTYPE, &self.entry_type),
            id: f(ID, &self.id),
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), f(k, v)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_fields_come_first() {
        let entry = Entry::new("article", "smith2020")
            .with_field("title", "A")
            .with_field("year", "2020");

        let names: Vec<&str> = entry.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["ENTRYTYPE", "ID", "title", "year"]);
        assert_eq!(entry.get("ID"), Some("smith2020"));
        assert_eq!(entry.len(), 4);
    }

    #[test]
    fn test_with_field_replaces_in_place() {
        let entry = Entry::new("article", "a")
            .with_field("title", "Old")
            .with_field("year", "2020")
            .with_field("title", "New");

        let fields: Vec<(&str, &str)> = entry.fields().collect();
        assert_eq!(fields, vec![("title", "New"), ("year", "2020")]);
    }

    #[test]
    fn test_with_field_sets_reserved() {
        let entry = Entry::new("article", "a").with_field(ID, "b");
        assert_eq!(entry.id(), "b");
        assert_eq!(entry.fields().count(), 0);
    }

    #[test]
    fn test_map_values_leaves_original_untouched() {
        let original = Entry::new("book", "x").with_field("note", "lower");
        let upper = original.map_values(|_, v| v.to_uppercase());

        assert_eq!(original.get("note"), Some("lower"));
        assert_eq!(upper.get("note"), Some("LOWER"));
        assert_eq!(upper.id(), "X");
        assert_eq!(upper.entry_type(), "BOOK");
        assert_eq!(original.id(), "x");
    }
}
