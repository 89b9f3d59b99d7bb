//
//  orphans.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{Result, SitegraphError};
use crate::graph::Graph;
use crate::inventory::{FileKey, FileRecord, Referrer};

/// What it takes for a file to count as orphaned. Every enabled check must
/// hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanCriteria {
    /// No navigation file may reference it.
    #[serde(default = "default_true")]
    pub require_not_in_navigation_set: bool,
    /// Nothing at all may reference it.
    #[serde(default = "default_true")]
    pub require_zero_inbound_references: bool,
    /// Orphaned only while it has fewer referrers than this. 0 disables.
    #[serde(default)]
    pub min_inbound_reference_count: usize,
    /// Keys ending with any of these are never orphaned.
    #[serde(default)]
    pub excluded_suffix_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for OrphanCriteria {
    fn default() -> Self {
        Self {
            require_not_in_navigation_set: true,
            require_zero_inbound_references: true,
            min_inbound_reference_count: 0,
            excluded_suffix_patterns: Vec::new(),
        }
    }
}

impl OrphanCriteria {
    pub fn validate(&self) -> Result<()> {
        if self.excluded_suffix_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(SitegraphError::InvalidConfig(
                "orphans.excluded_suffix_patterns must not contain blank patterns".to_string(),
            ));
        }
        Ok(())
    }

    fn is_excluded(&self, key: &str) -> bool {
        self.excluded_suffix_patterns.iter().any(|p| key.ends_with(p.as_str()))
    }

    fn holds_for(&self, record: &FileRecord, navigation: &BTreeSet<Referrer>) -> bool {
        let inbound = record.referenced_by();
        if self.require_not_in_navigation_set && inbound.iter().any(|r| navigation.contains(r)) {
            return false;
        }
        if self.require_zero_inbound_references && !inbound.is_empty() {
            return false;
        }
        if self.min_inbound_reference_count > 0
            && record.reference_count() >= self.min_inbound_reference_count
        {
            return false;
        }
        true
    }
}

/// Files that satisfy every enabled criterion. Critical and navigation
/// files are never orphaned.
pub fn classify_orphans(graph: &Graph, criteria: &OrphanCriteria) -> BTreeSet<FileKey> {
    let navigation: BTreeSet<Referrer> = graph
        .navigation_keys()
        .into_iter()
        .map(|k| Referrer::File(k.clone()))
        .collect();

    let orphans: BTreeSet<FileKey> = graph
        .files()
        .filter(|r| !r.is_critical && !r.is_navigation)
        .filter(|r| !criteria.is_excluded(&r.key))
        .filter(|r| criteria.holds_for(r, &navigation))
        .map(|r| r.key.clone())
        .collect();

    debug!(files = graph.len(), orphans = orphans.len(), "classified orphans");
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::Fixture;

    fn keys(set: &BTreeSet<FileKey>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_default_criteria() {
        let graph = Fixture::new()
            .critical("index.php")
            .navigation("header.php")
            .file("about.php")
            .file("old.php")
            .file("lib.php")
            .edge("index.php", "header.php")
            .edge("header.php", "about.php")
            .edge("about.php", "lib.php")
            .build();

        let orphans = classify_orphans(&graph, &OrphanCriteria::default());
        assert_eq!(keys(&orphans), vec!["old.php"]);
    }

    #[test]
    fn test_navigation_check_alone() {
        let graph = Fixture::new()
            .navigation("header.php")
            .file("about.php")
            .file("lib.php")
            .edge("header.php", "about.php")
            .edge("about.php", "lib.php")
            .build();
        let criteria = OrphanCriteria {
            require_zero_inbound_references: false,
            ..OrphanCriteria::default()
        };
        assert_eq!(keys(&classify_orphans(&graph, &criteria)), vec!["lib.php"]);
    }

    #[test]
    fn test_and_semantics_with_navigation_referrer() {
        let graph = Fixture::new()
            .navigation("header.php")
            .file("promo.php")
            .edge("header.php", "promo.php")
            .build();
        let criteria = OrphanCriteria {
            require_not_in_navigation_set: true,
            require_zero_inbound_references: false,
            min_inbound_reference_count: 1,
            excluded_suffix_patterns: vec![],
        };
        assert!(classify_orphans(&graph, &criteria).is_empty());
    }

    #[test]
    fn test_min_count_threshold() {
        let graph = Fixture::new()
            .file("a.php")
            .file("b.php")
            .file("once.php")
            .file("twice.php")
            .edge("a.php", "once.php")
            .edge("a.php", "twice.php")
            .edge("b.php", "twice.php")
            .build();
        let criteria = OrphanCriteria {
            require_not_in_navigation_set: false,
            require_zero_inbound_references: false,
            min_inbound_reference_count: 2,
            excluded_suffix_patterns: vec![],
        };
        assert_eq!(
            keys(&classify_orphans(&graph, &criteria)),
            vec!["a.php", "b.php", "once.php"]
        );
    }

    #[test]
    fn test_suffix_exclusion_first() {
        let graph = Fixture::new().file("cron_job.php").file("stale.php").build();
        let criteria = OrphanCriteria {
            excluded_suffix_patterns: vec!["_job.php".to_string()],
            ..OrphanCriteria::default()
        };
        assert_eq!(keys(&classify_orphans(&graph, &criteria)), vec!["stale.php"]);
    }

    #[test]
    fn test_schema_reference_keeps_file_live() {
        let graph = Fixture::new().file("landing.php").schema_ref("landing.php").build();
        assert!(classify_orphans(&graph, &OrphanCriteria::default()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let graph = Fixture::new()
            .file("a.php")
            .file("b.php")
            .edge("a.php", "b.php")
            .build();
        let criteria = OrphanCriteria::default();
        assert_eq!(classify_orphans(&graph, &criteria), classify_orphans(&graph, &criteria));
    }

    #[test]
    fn test_blank_suffix_rejected() {
        let criteria = OrphanCriteria {
            excluded_suffix_patterns: vec![" ".to_string()],
            ..OrphanCriteria::default()
        };
        assert!(matches!(criteria.validate(), Err(SitegraphError::InvalidConfig(_))));
    }
}
