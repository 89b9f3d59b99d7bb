//
//  builder.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use rayon::prelude::*;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::engine::{Graph, SchemaLink};
use crate::extract::{extract_references, read_text, Reference};
use crate::inventory::{FileKey, Inventory, Referrer};
use crate::schema::{load_sources, match_to_inventory, SchemaSource, TableMatcher, TableUsage};

/// What one worker learned about one file.
struct FileExtraction {
    key: FileKey,
    references: Vec<Reference>,
    usage: TableUsage,
}

/// Extensions whose files are searched for table usage by default.
pub const USAGE_EXTENSIONS: [&str; 3] = [".php", ".html", ".htm"];

/// Configurable graph construction. Every build starts from empty reference
/// sets; there is no incremental update.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    mine_paths: bool,
    usage_extensions: Vec<String>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            mine_paths: true,
            usage_extensions: USAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether stored schema data is mined for file paths.
    pub fn mine_paths(mut self, enabled: bool) -> Self {
        self.mine_paths = enabled;
        self
    }

    /// Only files with one of these extensions are searched for table
    /// usage. Stylesheets and scripts stay out by default: a CSS class or JS
    /// variable named like a table is not a query.
    pub fn usage_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.usage_extensions = extensions
            .into_iter()
            .map(|e| format!(".{}", e.as_ref().trim_start_matches('.').to_lowercase()))
            .collect();
        self
    }

    pub fn build(&self, inventory: &Inventory, sources: &[SchemaSource]) -> Graph {
        let (root, mut files) = inventory.clone().into_files();
        for record in files.values_mut() {
            record.reset_references();
        }

        // Schema sources are read once, before any file is scanned.
        let schema = load_sources(sources, self.mine_paths);
        let matcher = TableMatcher::new(schema.tables.keys());

        let work: Vec<(&FileKey, &Path, bool)> = inventory
            .records()
            .map(|r| {
                let counts_usage = self.usage_extensions.contains(&r.extension);
                (&r.key, r.path.as_path(), counts_usage)
            })
            .collect();
        let extractions: Mutex<Vec<FileExtraction>> = Mutex::new(Vec::with_capacity(work.len()));

        work.par_iter().for_each(|(key, path, counts_usage)| {
            let Some(content) = read_text(path) else {
                return;
            };
            let extraction = FileExtraction {
                key: (*key).clone(),
                references: extract_references(key, &content),
                usage: if *counts_usage {
                    matcher.count(&content)
                } else {
                    TableUsage::new()
                },
            };
            if let Ok(mut exts) = extractions.lock() {
                exts.push(extraction);
            }
        });

        let mut extractions = extractions.into_inner().unwrap_or_default();
        extractions.sort_by(|a, b| a.key.cmp(&b.key));

        let mut graph = Graph::new(root, files);
        graph.tables = schema.tables;

        // Single-threaded merge, in key order.
        for extraction in extractions {
            let source = extraction.key;
            for reference in &extraction.references {
                let Some(target) = &reference.resolved else {
                    continue;
                };
                if let Some(record) = graph.files.get_mut(&source) {
                    record.outbound_references.insert(target.clone());
                }
                if let Some(record) = graph.files.get_mut(target) {
                    record.inbound_references.insert(Referrer::File(source.clone()));
                    graph.link(&source, target);
                }
            }
            debug!(file = %source, refs = extraction.references.len(), tables = extraction.usage.len(), "merged file");
            if !extraction.usage.is_empty() {
                graph.usage.insert(source.clone(), extraction.usage);
            }
            if !extraction.references.is_empty() {
                graph.references.insert(source, extraction.references);
            }
        }

        for mined in schema.mined {
            let Some(target) = match_to_inventory(&mined.literal, graph.files.keys()).cloned() else {
                continue;
            };
            if let Some(record) = graph.files.get_mut(&target) {
                record.inbound_references.insert(Referrer::VirtualSchemaSource);
            }
            graph.schema_links.push(SchemaLink {
                literal: mined.literal,
                origin: mined.origin,
                target,
            });
        }

        let stats = graph.stats();
        info!(
            files = stats.files,
            references = stats.references,
            edges = stats.edges,
            tables = stats.tables,
            schema_links = stats.schema_links,
            "graph built"
        );

        graph
    }
}

/// Build the reference graph for `inventory` with default settings.
pub fn build_graph(inventory: &Inventory, sources: &[SchemaSource]) -> Graph {
    GraphBuilder::new().build(inventory, sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryEntry;
    use std::fs;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, Inventory) {
        let dir = tempfile::tempdir().unwrap();
        let mut entries = Vec::new();
        for (key, content) in files {
            let path = dir.path().join(key);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            entries.push(InventoryEntry {
                key: key.to_string(),
                path,
                size: content.len() as u64,
                modified: None,
                critical: false,
                navigation: false,
            });
        }
        let inventory = Inventory::from_entries(dir.path(), entries);
        (dir, inventory)
    }

    #[test]
    fn test_edges_are_bidirectional() {
        let (_dir, inventory) = site(&[
            ("index.php", "<?php include 'inc/header.php'; ?><a href=\"about.php\">a</a>"),
            ("about.php", "<?php include 'inc/header.php'; ?><a href=\"gone.php\">x</a>"),
            ("inc/header.php", "<nav></nav>"),
        ]);
        let graph = build_graph(&inventory, &[]);

        let header = graph.get("inc/header.php").unwrap();
        assert_eq!(header.reference_count(), 2);
        assert!(header.referenced_by().contains(&Referrer::from("index.php")));
        assert!(header.referenced_by().contains(&Referrer::from("about.php")));

        let about = graph.get("about.php").unwrap();
        assert!(about.references().contains("gone.php"));
        assert_eq!(graph.stats().dangling_targets, 1);
    }

    #[test]
    fn test_multiple_kinds_collapse_to_one_referrer() {
        let (_dir, inventory) = site(&[
            ("index.php", "<a href=\"list.php\">l</a>\n<form action=\"list.php\"></form>\n<?php header('Location: list.php'); ?>"),
            ("list.php", ""),
        ]);
        let graph = build_graph(&inventory, &[]);
        assert_eq!(graph.get("list.php").unwrap().reference_count(), 1);
        assert_eq!(graph.references_from("index.php").len(), 3);
    }

    #[test]
    fn test_external_url_makes_no_edge() {
        let (_dir, inventory) = site(&[("page.php", "<a href=\"https://external.com/x.php\">x</a>")]);
        let graph = build_graph(&inventory, &[]);
        assert!(graph.get("page.php").unwrap().references().is_empty());
    }

    #[test]
    fn test_table_usage_aggregation() {
        let (_dir, inventory) = site(&[
            (
                "login.php",
                "$a = 'SELECT * FROM users';\n$b = 'UPDATE users SET seen = 1';\n$c = \"INSERT INTO users VALUES (1)\";",
            ),
            ("profile.php", "$q = 'SELECT name FROM users WHERE id = 1';"),
            ("about.php", "<p>About</p>"),
        ]);
        let dump = SchemaSource::dump("schema.sql", "CREATE TABLE users (id INT, name VARCHAR(50));");
        let graph = build_graph(&inventory, &[dump]);

        assert_eq!(graph.table_usage("login.php").unwrap()["users"], 3);
        assert_eq!(graph.table_usage("profile.php").unwrap()["users"], 1);
        assert!(graph.table_usage("about.php").is_none());
    }

    #[test]
    fn test_stylesheets_and_scripts_do_not_use_tables() {
        let (_dir, inventory) = site(&[
            ("css/site.css", ".content { margin: 0; }\n.content p { color: red; }"),
            ("js/app.js", "const content = document.body;"),
            ("page.php", "<p>static</p>"),
        ]);
        let dump = || SchemaSource::dump("schema.sql", "CREATE TABLE content (id INT);");
        let graph = build_graph(&inventory, &[dump()]);

        assert!(graph.table_usage("css/site.css").is_none());
        assert!(graph.table_usage("js/app.js").is_none());
        assert_eq!(graph.find_unused_tables(), vec!["content".to_string()]);

        let graph = GraphBuilder::new()
            .usage_extensions(["php", ".JS"])
            .build(&inventory, &[dump()]);
        assert_eq!(graph.table_usage("js/app.js").unwrap()["content"], 1);
        assert!(graph.table_usage("css/site.css").is_none());
    }

    #[test]
    fn test_schema_mined_path_adds_virtual_referrer() {
        let (_dir, inventory) = site(&[("promo/landing.php", "<h1>Promo</h1>")]);
        let dump = SchemaSource::dump(
            "data.sql",
            "CREATE TABLE banners (id INT, link VARCHAR(255));\nINSERT INTO banners VALUES (1, 'https://example.com/promo/landing.php');",
        );
        let graph = build_graph(&inventory, &[dump]);
        let landing = graph.get("promo/landing.php").unwrap();
        assert!(landing.referenced_by().contains(&Referrer::VirtualSchemaSource));
        assert_eq!(graph.schema_links()[0].target, "promo/landing.php");

        let graph = GraphBuilder::new()
            .mine_paths(false)
            .build(&inventory, &[SchemaSource::dump("data.sql", "'promo/landing.php'")]);
        assert_eq!(graph.get("promo/landing.php").unwrap().reference_count(), 0);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let (_dir, inventory) = site(&[
            ("a.php", "<?php include 'b.php'; ?>"),
            ("b.php", "<?php include 'a.php'; ?>"),
        ]);
        let first = build_graph(&inventory, &[]);
        let second = build_graph(&inventory, &[]);
        for (x, y) in first.files().zip(second.files()) {
            assert_eq!(x.referenced_by(), y.referenced_by());
            assert_eq!(x.references(), y.references());
        }
        assert_eq!(first.cycles(), vec![vec!["a.php".to_string(), "b.php".to_string()]]);
    }
}
