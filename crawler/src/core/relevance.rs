//! Search-result relevance filter
//!
//! Relevant results are labelled `"<company> | <domain>"`. A result is kept
//! only if the label has a separator and the text left of the first one is
//! exactly the searched term, which rejects near matches such as
//! `"Brand Adwords | ..."` for the term `"brand"`.

use shared::Synonym;

use crate::types::SearchResult;

pub const LABEL_SEPARATOR: char = '|';

/// Whether a result label belongs to `term` (case-insensitive, trimmed)
pub fn is_relevant(term: &str, label: &str) -> bool {
    match label.split_once(LABEL_SEPARATOR) {
        Some((head, _)) => head.trim().to_lowercase() == term.trim().to_lowercase(),
        None => false,
    }
}

/// Keep only the results relevant to `synonym`
pub fn filter_relevant(synonym: &Synonym, results: Vec<SearchResult>) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| is_relevant(synonym.as_str(), &result.label))
        .collect()
}
