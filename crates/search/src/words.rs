use crate::error::{Result, SearchError};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Case-insensitive set of query words, each with a precompiled matcher.
///
/// Built once per request and shared read-only by every matcher task.
#[derive(Debug, Clone, Default)]
pub struct WordSet {
    patterns: BTreeMap<String, Regex>,
}

impl WordSet {
    /// Lowercase, trim and deduplicate `words`; blank entries are skipped.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = BTreeMap::new();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            let key = word.to_lowercase();
            if patterns.contains_key(&key) {
                continue;
            }
            let regex = RegexBuilder::new(&regex::escape(&key))
                .case_insensitive(true)
                .build()
                .map_err(|source| SearchError::InvalidWord {
                    word: word.to_string(),
                    source,
                })?;
            patterns.insert(key, regex);
        }
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Lowercased words in ascending order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub(crate) fn patterns(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.patterns.iter().map(|(word, regex)| (word.as_str(), regex))
    }
}
