//! Directive handling for notebook cells.
//!
//! Directives are comment lines at the top of a code cell that instruct
//! processors rather than being executed:
//!
//! ```text
//! #| process
//! #| echo: false
//! def addition(a, b):
//!     return a + b
//! ```
//!
//! - [`grammar`]: recognizing, normalizing and parsing one directive line
//! - [`extract`]: splitting a cell into its directive block and code

pub mod extract;
pub mod grammar;

pub use extract::{extract_directives, partition_cell, partition_source};
pub use grammar::{DirectiveGrammar, is_cell_magic};

/// Directives of a single cell, keyed by name in order of first appearance.
///
/// Inserting a name that is already present keeps its position and replaces
/// its arguments, so the last occurrence of a duplicated directive wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    entries: Vec<(String, Vec<String>)>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive, returning the arguments it replaced.
    pub fn insert(&mut self, name: impl Into<String>, args: Vec<String>) -> Option<Vec<String>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, args)),
            None => {
                self.entries.push((name, args));
                None
            }
        }
    }

    /// Arguments of a directive, if present.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, args)| args.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let position = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Directive names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, args)| (name.as_str(), args.as_slice()))
    }
}

impl FromIterator<(String, Vec<String>)> for Directives {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut directives = Self::new();
        for (name, args) in iter {
            directives.insert(name, args);
        }
        directives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut directives = Directives::new();
        assert!(directives.is_empty());

        directives.insert("process", vec![]);
        directives.insert("opt", args(&["1"]));

        assert_eq!(directives.len(), 2);
        assert_eq!(directives.get("process"), Some(&[] as &[String]));
        assert_eq!(directives.get("opt"), Some(&args(&["1"])[..]));
        assert!(!directives.contains("missing"));
    }

    #[test]
    fn test_duplicate_name_last_wins_in_first_position() {
        let directives: Directives = [
            ("a".to_string(), args(&["first"])),
            ("b".to_string(), vec![]),
            ("a".to_string(), args(&["second"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(directives.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(directives.get("a"), Some(&args(&["second"])[..]));
    }

    #[test]
    fn test_remove() {
        let mut directives = Directives::new();
        directives.insert("hide", vec![]);
        assert_eq!(directives.remove("hide"), Some(vec![]));
        assert_eq!(directives.remove("hide"), None);
        assert!(directives.is_empty());
    }
}
