//
//  impact.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::collections::BTreeSet;

use super::disk::DiskView;
use crate::graph::Graph;
use crate::inventory::{normalize_key, FileKey, Referrer};

/// Blast radius of deleting a set of files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionImpact {
    pub candidates: BTreeSet<FileKey>,
    /// Every referrer of any candidate.
    pub affected_files: BTreeSet<Referrer>,
    /// (referrer, candidate), one per edge.
    pub broken_references: Vec<(Referrer, FileKey)>,
    /// Tables that only candidates use; nothing would use them afterwards.
    pub affected_tables: BTreeSet<String>,
    /// Tables used by at least one candidate.
    pub touched_tables: BTreeSet<String>,
    /// A critical file references a candidate.
    pub critical_file_affected: bool,
    /// Candidates that are themselves critical.
    pub critical_candidates: BTreeSet<FileKey>,
    /// Candidates the graph does not know.
    pub unknown_candidates: BTreeSet<FileKey>,
}

/// Compute what deleting `candidates` would break. Reads the graph only.
/// Candidates are normalized like inventory keys first.
pub fn compute_impact<I, S>(graph: &Graph, candidates: I) -> DeletionImpact
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut impact = DeletionImpact {
        candidates: candidates.into_iter().map(|c| normalize_key(c.as_ref())).collect(),
        ..DeletionImpact::default()
    };

    for candidate in &impact.candidates {
        let Some(record) = graph.get(candidate) else {
            impact.unknown_candidates.insert(candidate.clone());
            continue;
        };
        if record.is_critical {
            impact.critical_candidates.insert(candidate.clone());
        }
        for dependent in record.referenced_by() {
            if dependent
                .file()
                .and_then(|key| graph.get(key))
                .is_some_and(|r| r.is_critical)
            {
                impact.critical_file_affected = true;
            }
            impact.affected_files.insert(dependent.clone());
            impact.broken_references.push((dependent.clone(), candidate.clone()));
        }
        if let Some(usage) = graph.table_usage(candidate) {
            impact.touched_tables.extend(usage.keys().cloned());
        }
    }

    impact.affected_tables = impact
        .touched_tables
        .iter()
        .filter(|table| {
            graph
                .usage_by_file()
                .filter(|(_, usage)| usage.contains_key(table.as_str()))
                .all(|(file, _)| impact.candidates.contains(file))
        })
        .cloned()
        .collect();

    impact
}

/// Verdict on a planned deletion.
#[derive(Debug, Clone, Serialize)]
pub struct PreDeletionCheck {
    pub impact: DeletionImpact,
    /// Problems that make the deletion unsafe.
    pub critical: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    pub safe_to_proceed: bool,
}

/// Combine the impact with candidate validation. Unknown or critical
/// candidates and critical dependents make the deletion unsafe; the rest is
/// advisory.
pub fn pre_deletion_check<I, S, D>(graph: &Graph, candidates: I, disk: &D) -> PreDeletionCheck
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    D: DiskView + ?Sized,
{
    let impact = compute_impact(graph, candidates);
    let mut critical = Vec::new();
    let mut warnings = Vec::new();
    let mut info = Vec::new();

    for key in &impact.unknown_candidates {
        critical.push(format!("file not found: {key}"));
    }
    for key in &impact.critical_candidates {
        critical.push(format!("critical file marked for deletion: {key}"));
    }
    if impact.critical_file_affected {
        critical.push("deletion would affect critical files".to_string());
    }

    if !impact.affected_files.is_empty() {
        warnings.push(format!(
            "{} files reference the files marked for deletion",
            impact.affected_files.len()
        ));
    }
    if !impact.broken_references.is_empty() {
        warnings.push(format!(
            "{} references will be broken",
            impact.broken_references.len()
        ));
    }
    let missing = impact
        .candidates
        .iter()
        .filter(|key| graph.contains(key) && !disk.exists(key))
        .count();
    if missing > 0 {
        warnings.push(format!("{missing} files already deleted or missing"));
    }

    if !impact.touched_tables.is_empty() {
        info.push(format!(
            "deletion touches {} database tables",
            impact.touched_tables.len()
        ));
    }
    if !impact.affected_tables.is_empty() {
        let tables: Vec<&str> = impact.affected_tables.iter().map(String::as_str).collect();
        info.push(format!("tables left without users: {}", tables.join(", ")));
    }

    PreDeletionCheck {
        safe_to_proceed: critical.is_empty(),
        impact,
        critical,
        warnings,
        info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::Fixture;

    fn on_disk(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_critical_propagation() {
        let graph = Fixture::new()
            .critical("index.php")
            .file("config.php")
            .edge("index.php", "config.php")
            .build();
        let impact = compute_impact(&graph, ["config.php"]);
        assert!(impact.critical_file_affected);
        assert_eq!(
            impact.broken_references,
            vec![(Referrer::from("index.php"), "config.php".to_string())]
        );
    }

    #[test]
    fn test_one_pair_per_edge() {
        let graph = Fixture::new()
            .file("a.php")
            .file("x.php")
            .file("y.php")
            .edge("a.php", "x.php")
            .edge("a.php", "y.php")
            .build();
        let impact = compute_impact(&graph, ["x.php", "y.php"]);
        assert_eq!(impact.affected_files.len(), 1);
        assert_eq!(impact.broken_references.len(), 2);
        assert!(!impact.critical_file_affected);
    }

    #[test]
    fn test_exclusive_tables() {
        let graph = Fixture::new()
            .file("login.php")
            .file("profile.php")
            .file("report.php")
            .usage("login.php", "users", 3)
            .usage("profile.php", "users", 1)
            .usage("report.php", "reports", 2)
            .build();

        let impact = compute_impact(&graph, ["report.php", "login.php"]);
        assert_eq!(impact.touched_tables.len(), 2);
        assert_eq!(impact.affected_tables.iter().collect::<Vec<_>>(), vec!["reports"]);

        let impact = compute_impact(&graph, ["login.php", "profile.php"]);
        assert!(impact.affected_tables.contains("users"));
    }

    #[test]
    fn test_schema_referrer_is_a_dependent() {
        let graph = Fixture::new().file("landing.php").schema_ref("landing.php").build();
        let impact = compute_impact(&graph, ["landing.php"]);
        assert!(impact.affected_files.contains(&Referrer::VirtualSchemaSource));
        assert!(!impact.critical_file_affected);
    }

    #[test]
    fn test_pure_and_repeatable() {
        let graph = Fixture::new()
            .file("a.php")
            .file("b.php")
            .edge("a.php", "b.php")
            .build();
        let first = compute_impact(&graph, ["b.php"]);
        let _ = compute_impact(&graph, ["a.php"]);
        assert_eq!(first, compute_impact(&graph, ["b.php"]));
        assert_eq!(graph.get("b.php").unwrap().reference_count(), 1);
    }

    #[test]
    fn test_candidates_normalized() {
        let graph = Fixture::new()
            .critical("index.php")
            .file("config.php")
            .file("admin/users.php")
            .edge("index.php", "config.php")
            .build();
        let impact = compute_impact(&graph, ["./config.php", "admin\\users.php"]);
        assert!(impact.unknown_candidates.is_empty());
        assert!(impact.candidates.contains("admin/users.php"));
        assert!(impact.critical_file_affected);

        let check = pre_deletion_check(&graph, ["/config.php"], &on_disk(&["config.php"]));
        assert!(check.critical.iter().all(|m| !m.contains("file not found")));
    }

    #[test]
    fn test_pre_deletion_unsafe() {
        let graph = Fixture::new()
            .critical("index.php")
            .file("config.php")
            .edge("index.php", "config.php")
            .build();
        let check = pre_deletion_check(&graph, ["config.php", "ghost.php", "index.php"], &on_disk(&["index.php"]));
        assert!(!check.safe_to_proceed);
        assert!(check.critical.iter().any(|m| m.contains("ghost.php")));
        assert!(check.critical.iter().any(|m| m.contains("critical file marked for deletion: index.php")));
        assert!(check.warnings.iter().any(|m| m.contains("already deleted or missing")));
    }

    #[test]
    fn test_pre_deletion_safe() {
        let graph = Fixture::new().file("old.php").usage("old.php", "legacy", 1).build();
        let check = pre_deletion_check(&graph, ["old.php"], &on_disk(&["old.php"]));
        assert!(check.safe_to_proceed);
        assert!(check.warnings.is_empty());
        assert_eq!(check.info.len(), 2);
    }
}
