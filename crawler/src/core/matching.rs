//! Token matching of feed text against the tracked synonyms
//!
//! Text is reduced to lowercase alphanumeric tokens; a synonym matches when its
//! own tokens appear as an exact token (or contiguous token run, for multi-word
//! synonyms). Substrings never match: "acme" does not match "acmeville".

use std::collections::HashSet;

use shared::{Synonym, SynonymSet};

/// Split text into lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Precompiled matcher for one synonym set
#[derive(Debug, Clone, Default)]
pub struct SynonymMatcher {
    patterns: Vec<(Synonym, Vec<String>)>,
}

impl SynonymMatcher {
    pub fn new(synonyms: &SynonymSet) -> Self {
        let patterns = synonyms
            .iter()
            .map(|synonym| (synonym.clone(), tokenize(synonym.as_str())))
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every synonym whose tokens occur in `text`
    pub fn matches(&self, text: &str) -> SynonymSet {
        if self.patterns.is_empty() {
            return SynonymSet::new();
        }

        let tokens = tokenize(text);
        let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        self.patterns
            .iter()
            .filter(|(_, pattern)| match pattern.as_slice() {
                [single] => token_set.contains(single.as_str()),
                run => tokens.windows(run.len()).any(|window| window == run),
            })
            .map(|(synonym, _)| synonym.clone())
            .collect()
    }
}
