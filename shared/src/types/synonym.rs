//! Tracked brand/keyword terms

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// A case-normalised tracked term
///
/// Normalisation trims, lowercases and collapses internal whitespace, so
/// `"  Acme   Corp "` and `"acme corp"` are the same synonym.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Synonym(String);

/// Ordered set of synonyms; ordering keeps logs and snapshot passes stable
pub type SynonymSet = BTreeSet<Synonym>;

impl Synonym {
    pub fn new(raw: &str) -> SharedResult<Self> {
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.is_empty() {
            return Err(SharedError::InvalidSynonym {
                input: raw.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse every term, skipping the ones that normalise to nothing
    pub fn parse_all<'a, I>(terms: I) -> SynonymSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        terms.into_iter().filter_map(|t| Synonym::new(t).ok()).collect()
    }
}

impl fmt::Display for Synonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Synonym {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Synonym::new(&value)
    }
}

impl From<Synonym> for String {
    fn from(value: Synonym) -> Self {
        value.0
    }
}

impl AsRef<str> for Synonym {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalisation() {
        let synonym = Synonym::new("  Acme   Corp ").unwrap();
        assert_eq!(synonym.as_str(), "acme corp");
        assert_eq!(synonym, Synonym::new("ACME CORP").unwrap());
    }

    #[test]
    fn test_empty_synonym_rejected() {
        assert!(Synonym::new("").is_err());
        assert!(Synonym::new("   \t ").is_err());
    }

    #[test]
    fn test_parse_all_skips_blank_terms() {
        let set = Synonym::parse_all(["Google", "", "apple", "GOOGLE"]);
        let names: Vec<&str> = set.iter().map(Synonym::as_str).collect();
        assert_eq!(names, vec!["apple", "google"]);
    }

    #[test]
    fn test_serde_normalises() {
        let synonym: Synonym = serde_json::from_str("\"  Brand \"").unwrap();
        assert_eq!(synonym.as_str(), "brand");
        assert!(serde_json::from_str::<Synonym>("\"\"").is_err());
    }
}
