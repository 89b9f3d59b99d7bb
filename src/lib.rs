//! # sitegraph
//!
//! Reference graph and integrity engine for web source trees.
//!
//! sitegraph inventories a project, extracts every cross-file reference
//! (includes, links, form actions, redirects, route tables, AJAX endpoints,
//! asset and stylesheet links), cross-references the code with database
//! schema sources, and answers questions over the resulting graph.
//!
//! ## Key Features
//!
//! - **Orphans**: files nothing reaches, under configurable criteria
//! - **Deletion impact**: what breaks if a set of files goes away
//! - **Integrity passes**: recursive chain checks for dangling references
//! - **Schema evidence**: table usage plus file paths stored in data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitegraph::{build_graph, classify_orphans, scan, OrphanCriteria, ProjectConfig};
//! use std::path::Path;
//!
//! let inventory = scan(Path::new("./site"), &ProjectConfig::default()).unwrap();
//! let graph = build_graph(&inventory, &[]);
//!
//! for key in classify_orphans(&graph, &OrphanCriteria::default()) {
//!     println!("orphan: {key}");
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod graph;
pub mod inventory;
pub mod schema;

// Re-exports for convenience
pub use analysis::{
    check_health, classify_orphans, compute_impact, pre_deletion_check, run_integrity_check,
    sanitation_check, DeletionImpact, HealthReport, IntegrityReport, OrphanCriteria,
    PreDeletionCheck,
};
pub use config::{ProjectConfig, SitegraphConfig};
pub use error::{Result, SitegraphError};
pub use extract::{extract_references, Reference, ReferenceKind};
pub use graph::{build_graph, Graph, GraphBuilder};
pub use inventory::{scan, FileKey, FileRecord, Inventory, Referrer};
pub use schema::SchemaSource;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::IssueReason;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, key: &str, contents: &str) {
        let path = root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn site(root: &Path) {
        write(
            root,
            "index.php",
            "<?php\ninclude 'lib/db.php';\nrequire 'missing.php';\n?>\n<a href=\"about.php\">About</a>\n",
        );
        write(root, "lib/db.php", "<?php\n$rows = $db->query(\"SELECT * FROM users\");\n");
        write(root, "about.php", "<p>about</p>\n");
        write(root, "header.php", "<a href=\"contact.php\">Contact</a>\n");
        write(root, "contact.php", "<form action=\"about.php\"></form>\n");
        write(root, "legacy.php", "<?php echo 'old page';\n");
        write(root, "old.php", "<?php echo 'nobody links here';\n");
        write(
            root,
            "schema.sql",
            "CREATE TABLE users (\n  id INT PRIMARY KEY,\n  name VARCHAR(50)\n);\n\
             CREATE TABLE logs (\n  id INT,\n  message TEXT\n);\n\
             INSERT INTO pages VALUES (1, 'legacy.php');\n",
        );
    }

    fn graph_for(root: &Path) -> Graph {
        let inventory = scan(root, &ProjectConfig::default()).unwrap();
        let sources = vec![SchemaSource::from_dump_file(&root.join("schema.sql")).unwrap()];
        build_graph(&inventory, &sources)
    }

    #[test]
    fn test_scan_build_and_classify() {
        let dir = tempdir().unwrap();
        site(dir.path());
        let graph = graph_for(dir.path());

        assert_eq!(graph.len(), 7);
        assert!(graph.get("index.php").unwrap().is_critical);
        assert!(graph.get("header.php").unwrap().is_navigation);

        let orphans = classify_orphans(&graph, &OrphanCriteria::default());
        assert_eq!(orphans.into_iter().collect::<Vec<_>>(), vec!["old.php"]);

        let legacy = graph.get("legacy.php").unwrap();
        assert!(legacy.referenced_by().contains(&Referrer::VirtualSchemaSource));
    }

    #[test]
    fn test_table_usage_from_dump() {
        let dir = tempdir().unwrap();
        site(dir.path());
        let graph = graph_for(dir.path());

        assert!(graph.tables().contains_key("users"));
        assert_eq!(graph.table_usage("lib/db.php").unwrap().get("users"), Some(&1));
        assert_eq!(graph.find_unused_tables(), vec!["logs".to_string()]);
    }

    #[test]
    fn test_impact_of_deleting_include() {
        let dir = tempdir().unwrap();
        site(dir.path());
        let graph = graph_for(dir.path());

        let impact = compute_impact(&graph, ["lib/db.php"]);
        assert!(impact.affected_files.contains(&Referrer::File("index.php".to_string())));
        assert!(impact
            .broken_references
            .contains(&(Referrer::File("index.php".to_string()), "lib/db.php".to_string())));
        assert!(impact.touched_tables.contains("users"));
    }

    #[test]
    fn test_integrity_finds_missing_include() {
        let dir = tempdir().unwrap();
        site(dir.path());
        let graph = graph_for(dir.path());

        let report = run_integrity_check(&graph, 1);
        assert_eq!(report.passes.len(), 1);
        assert!(!report.overall_passed);

        let issue = report.passes[0]
            .issues
            .iter()
            .find(|i| i.missing == "missing.php")
            .unwrap();
        assert_eq!(issue.origin, "index.php");
        assert_eq!(issue.reason, IssueReason::ReferenceMissing);
    }
}
