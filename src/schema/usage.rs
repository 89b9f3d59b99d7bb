//
//  usage.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use super::types::TableUsage;

/// Identifier directly following a query clause keyword.
static CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:FROM|JOIN|INTO|UPDATE|TABLE|TRUNCATE|DESCRIBE)\s+[`"\[]?(\w+)"#)
        .expect("clause pattern is valid")
});

/// Counts how often known tables occur in source text.
///
/// Built once per graph build and shared by every extraction worker.
#[derive(Debug)]
pub struct TableMatcher {
    /// Lowercased name → canonical catalog name.
    names: HashMap<String, String>,
    word: Option<Regex>,
}

impl TableMatcher {
    pub fn new<'a>(tables: impl IntoIterator<Item = &'a String>) -> Self {
        let names: HashMap<String, String> = tables
            .into_iter()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();

        // longest first so "users_archive" is not shadowed by "users"
        let mut alternatives: Vec<&String> = names.keys().collect();
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let word = if alternatives.is_empty() {
            None
        } else {
            let joined = alternatives
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{joined})\b")).ok()
        };

        Self { names, word }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Table occurrences in `content`. Clause-adjacent and bare mentions of
    /// the same occurrence share a byte offset and are counted once.
    pub fn count(&self, content: &str) -> TableUsage {
        let mut positions: HashMap<&str, BTreeSet<usize>> = HashMap::new();

        for caps in CLAUSE.captures_iter(content) {
            let Some(m) = caps.get(1) else { continue };
            if let Some(canonical) = self.names.get(&m.as_str().to_lowercase()) {
                positions.entry(canonical.as_str()).or_default().insert(m.start());
            }
        }

        if let Some(word) = &self.word {
            for m in word.find_iter(content) {
                if let Some(canonical) = self.names.get(&m.as_str().to_lowercase()) {
                    positions.entry(canonical.as_str()).or_default().insert(m.start());
                }
            }
        }

        positions
            .into_iter()
            .filter(|(_, hits)| !hits.is_empty())
            .map(|(table, hits)| (table.to_string(), hits.len()))
            .collect()
    }
}
