//
//  query.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::engine::Graph;
use crate::extract::ReferenceKind;
use crate::inventory::FileKey;

/// Longest line excerpt carried in a summary.
pub const SNIPPET_LEN: usize = 120;

/// One located reference, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSite {
    pub source: FileKey,
    pub line: usize,
    pub kind: ReferenceKind,
    pub snippet: String,
}

/// Who points at a file and how.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceSummary {
    pub target: FileKey,
    pub total_references: usize,
    pub unique_sources: usize,
    pub by_kind: BTreeMap<ReferenceKind, usize>,
    pub sites: Vec<ReferenceSite>,
    /// Referenced from stored schema data.
    pub from_schema: bool,
}

/// How one table is used across the code base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableUsageSummary {
    pub files: BTreeSet<FileKey>,
    pub file_count: usize,
    pub total_references: usize,
}

/// Static assets (scripts, data, stylesheets) and which are unreferenced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetSummary {
    pub total_assets: usize,
    pub referenced: usize,
    /// Extension → unreferenced assets with that extension.
    pub orphaned: BTreeMap<String, Vec<FileKey>>,
}

const ASSET_EXTENSIONS: &[&str] = &[".js", ".ts", ".json", ".css"];

impl Graph {
    /// Every located reference to `target`, grouped for display.
    pub fn reference_summary(&self, target: &str) -> ReferenceSummary {
        let mut summary = ReferenceSummary {
            target: target.to_string(),
            ..ReferenceSummary::default()
        };
        let mut sources = BTreeSet::new();

        for reference in self.references_to(target) {
            summary.total_references += 1;
            sources.insert(reference.source.clone());
            *summary.by_kind.entry(reference.kind).or_insert(0) += 1;
            summary.sites.push(ReferenceSite {
                source: reference.source.clone(),
                line: reference.line,
                kind: reference.kind,
                snippet: reference.snippet(SNIPPET_LEN),
            });
        }

        summary.unique_sources = sources.len();
        summary.from_schema = self.schema_links.iter().any(|l| l.target == target);
        summary
    }

    /// Per catalog table: which files use it and how often. Tables that no
    /// file uses are present with empty usage.
    pub fn table_usage_summary(&self) -> BTreeMap<String, TableUsageSummary> {
        let mut summary: BTreeMap<String, TableUsageSummary> = self
            .tables
            .keys()
            .map(|name| (name.clone(), TableUsageSummary::default()))
            .collect();

        for (file, usage) in &self.usage {
            for (table, count) in usage {
                let entry = summary.entry(table.clone()).or_default();
                entry.files.insert(file.clone());
                entry.total_references += count;
            }
        }
        for entry in summary.values_mut() {
            entry.file_count = entry.files.len();
        }
        summary
    }

    /// Catalog tables no tracked file mentions.
    pub fn find_unused_tables(&self) -> Vec<String> {
        self.table_usage_summary()
            .into_iter()
            .filter(|(_, s)| s.file_count == 0)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn asset_summary(&self) -> AssetSummary {
        let mut summary = AssetSummary::default();
        for record in self.files() {
            if !ASSET_EXTENSIONS.contains(&record.extension.as_str()) {
                continue;
            }
            summary.total_assets += 1;
            if record.reference_count() > 0 {
                summary.referenced += 1;
            } else {
                summary
                    .orphaned
                    .entry(record.extension.clone())
                    .or_default()
                    .push(record.key.clone());
            }
        }
        summary
    }
}
