//! Generic regex-based field extraction.

use regex::Regex;

/// Ordered matches of a field pattern over a body of text.
///
/// Every match has its embedded whitespace stripped; encounter order is
/// preserved. The shape is always a sequence, and callers choose the
/// cardinality they need through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matches(Vec<String>);

impl Matches {
    /// First match, if any.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The single match, if there is exactly one.
    pub fn exactly_one(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for Matches {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Run `pattern` over `text`, stripping whitespace inside every match and
/// preserving encounter order.
pub fn extract_field(pattern: &Regex, text: &str) -> Matches {
    Matches(
        pattern
            .find_iter(text)
            .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
            .collect(),
    )
}
