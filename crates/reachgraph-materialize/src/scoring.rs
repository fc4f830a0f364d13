//! Rule easiness scoring.
//!
//! Rule texts are matched against configured substrings; the longest matching
//! key wins so `"remote exploit of a server program"` beats `"exploit"`.

use std::collections::BTreeMap;

/// Substring → easiness score.
#[derive(Debug, Clone, Default)]
pub struct EasinessTable {
    entries: Vec<(String, u32)>,
}

impl EasinessTable {
    pub fn new(entries: &BTreeMap<String, u32>) -> Self {
        let mut entries: Vec<(String, u32)> = entries
            .iter()
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        // Longest key first; ties keep the map's lexicographic order.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    pub fn score(&self, rule_text: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(key, _)| rule_text.contains(key.as_str()))
            .map(|(_, score)| *score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
