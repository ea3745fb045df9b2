//! Ordered name/value collections for headers and query parameters.
//!
//! # Design Decisions
//! - Insertion order is preserved for enumeration
//! - Duplicates are kept; lookup returns the first match
//! - Name comparison is ASCII case-insensitive, stored case is untouched

/// An ordered list of `(name, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: Vec<(String, String)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping any existing entries with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every entry named `name` with a single pair.
    ///
    /// The new pair takes the position of the first replaced entry, or goes
    /// to the end if the name was not present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                self.entries[index] = (name, value);
                self.dedup_after(index);
            }
            None => self.entries.push((name, value)),
        }
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    fn dedup_after(&mut self, index: usize) {
        let name = self.entries[index].0.clone();
        let mut i = index + 1;
        while i < self.entries.len() {
            if self.entries[i].0.eq_ignore_ascii_case(&name) {
                self.entries.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl<N, V> FromIterator<(N, V)> for KeyValues
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for KeyValues {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = KeyValues::new();
        headers.append("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.get("accept").is_none());

        // Stored case is untouched
        assert_eq!(headers.iter().next(), Some(("Content-Type", "text/plain")));
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let headers: KeyValues = [("Accept", "a"), ("X-Other", "b"), ("accept", "c")]
            .into_iter()
            .collect();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("Accept"), Some("a"));
        assert_eq!(headers.get_all("ACCEPT").collect::<Vec<_>>(), vec!["a", "c"]);

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Accept", "X-Other", "accept"]);
    }

    #[test]
    fn test_insert_replaces_all_in_place() {
        let mut headers: KeyValues = [("A", "1"), ("B", "2"), ("a", "3"), ("C", "4")]
            .into_iter()
            .collect();

        headers.insert("a", "new");
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("a", "new"), ("B", "2"), ("C", "4")]);

        headers.insert("D", "5");
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get("d"), Some("5"));
    }
}
