//
//  engine.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::extract::Reference;
use crate::inventory::{FileKey, FileRecord, Referrer};
use crate::schema::{SchemaCatalog, TableUsage};

/// A tracked file that is referenced from stored schema data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaLink {
    /// The literal as mined and cleaned.
    pub literal: String,
    /// Where in the schema data it was found.
    pub origin: String,
    /// The inventory key it was matched to.
    pub target: FileKey,
}

/// Counts over a built graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub references: usize,
    /// Distinct (source, target) pairs.
    pub edges: usize,
    /// Outbound targets that are not in the inventory.
    pub dangling_targets: usize,
    pub tables: usize,
    pub schema_links: usize,
    pub critical_files: usize,
    pub navigation_files: usize,
}

/// The reference graph over one inventory snapshot.
///
/// Built in full by [`GraphBuilder`](super::GraphBuilder); every accessor is
/// a read. File-to-file edges between tracked files are mirrored into a
/// petgraph `DiGraph` for structural queries.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) root: PathBuf,
    pub(crate) files: BTreeMap<FileKey, FileRecord>,
    /// Located references per source file.
    pub(crate) references: BTreeMap<FileKey, Vec<Reference>>,
    pub(crate) tables: SchemaCatalog,
    /// Per-file table usage; files with no usage are absent.
    pub(crate) usage: BTreeMap<FileKey, TableUsage>,
    pub(crate) schema_links: Vec<SchemaLink>,
    pub(crate) edges: DiGraph<FileKey, ()>,
    pub(crate) node_index: HashMap<FileKey, NodeIndex>,
}

impl Graph {
    pub(crate) fn new(root: PathBuf, files: BTreeMap<FileKey, FileRecord>) -> Self {
        Self {
            root,
            files,
            references: BTreeMap::new(),
            tables: SchemaCatalog::new(),
            usage: BTreeMap::new(),
            schema_links: Vec::new(),
            edges: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    // ─── Files ──────────────────────────────────────────────────

    /// Project root the keys are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&FileRecord> {
        self.files.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// Records in key order.
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FileKey> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn critical_keys(&self) -> BTreeSet<&FileKey> {
        self.files.values().filter(|r| r.is_critical).map(|r| &r.key).collect()
    }

    pub fn navigation_keys(&self) -> BTreeSet<&FileKey> {
        self.files.values().filter(|r| r.is_navigation).map(|r| &r.key).collect()
    }

    /// Distinct referrers of `key`; empty for unknown keys.
    pub fn referrers_of(&self, key: &str) -> impl Iterator<Item = &Referrer> {
        self.files
            .get(key)
            .into_iter()
            .flat_map(|r| r.referenced_by().iter())
    }

    // ─── References ─────────────────────────────────────────────

    /// Located references made by `key`, in line order.
    pub fn references_from(&self, key: &str) -> &[Reference] {
        self.references.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every located reference whose resolved target is `key`.
    pub fn references_to<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.references
            .values()
            .flatten()
            .filter(move |r| r.resolved.as_deref() == Some(key))
    }

    pub fn all_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values().flatten()
    }

    // ─── Schema ─────────────────────────────────────────────────

    pub fn tables(&self) -> &SchemaCatalog {
        &self.tables
    }

    pub fn table_usage(&self, key: &str) -> Option<&TableUsage> {
        self.usage.get(key)
    }

    /// (file, usage) for every file that touches at least one table.
    pub fn usage_by_file(&self) -> impl Iterator<Item = (&FileKey, &TableUsage)> {
        self.usage.iter()
    }

    pub fn schema_links(&self) -> &[SchemaLink] {
        &self.schema_links
    }

    // ─── Structure ──────────────────────────────────────────────

    pub fn stats(&self) -> GraphStats {
        let edges = self.files.values().map(|r| r.references().len()).sum();
        let dangling_targets = self
            .files
            .values()
            .flat_map(|r| r.references().iter())
            .filter(|t| !self.files.contains_key(t.as_str()))
            .collect::<BTreeSet<_>>()
            .len();
        GraphStats {
            files: self.files.len(),
            references: self.references.values().map(Vec::len).sum(),
            edges,
            dangling_targets,
            tables: self.tables.len(),
            schema_links: self.schema_links.len(),
            critical_files: self.files.values().filter(|r| r.is_critical).count(),
            navigation_files: self.files.values().filter(|r| r.is_navigation).count(),
        }
    }

    /// Groups of tracked files that reference each other in a loop, each
    /// group sorted, groups ordered by first member.
    pub fn cycles(&self) -> Vec<Vec<FileKey>> {
        let mut cycles: Vec<Vec<FileKey>> = tarjan_scc(&self.edges)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut keys: Vec<FileKey> =
                    component.into_iter().map(|idx| self.edges[idx].clone()).collect();
                keys.sort();
                keys
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Record an edge between two tracked files in the structural graph.
    pub(crate) fn link(&mut self, from: &FileKey, to: &FileKey) {
        let a = self.node(from);
        let b = self.node(to);
        if self.edges.find_edge(a, b).is_none() {
            self.edges.add_edge(a, b, ());
        }
    }

    fn node(&mut self, key: &FileKey) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(key) {
            return idx;
        }
        let idx = self.edges.add_node(key.clone());
        self.node_index.insert(key.clone(), idx);
        idx
    }
}
