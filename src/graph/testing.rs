//
//  testing.rs
//  sitegraph
//
//  Created by hak (tharun)
//

//! In-memory graphs for analysis tests, no disk involved.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::engine::Graph;
use crate::inventory::{FileKey, FileRecord, InventoryEntry, Referrer};
use crate::schema::SchemaTable;

#[derive(Default)]
pub(crate) struct Fixture {
    files: BTreeMap<FileKey, FileRecord>,
    edges: Vec<(FileKey, FileKey)>,
    usage: Vec<(FileKey, String, usize)>,
    schema_refs: Vec<FileKey>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, key: &str, critical: bool, navigation: bool) -> Self {
        let record = FileRecord::from_entry(InventoryEntry {
            key: key.to_string(),
            path: PathBuf::from("/site").join(key),
            size: 0,
            modified: None,
            critical,
            navigation,
        });
        self.files.insert(record.key.clone(), record);
        self
    }

    pub fn file(self, key: &str) -> Self {
        self.add(key, false, false)
    }

    pub fn critical(self, key: &str) -> Self {
        self.add(key, true, false)
    }

    pub fn navigation(self, key: &str) -> Self {
        self.add(key, false, true)
    }

    /// `from` references `to`; `to` need not be tracked.
    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push((from.to_string(), to.to_string()));
        self
    }

    pub fn usage(mut self, file: &str, table: &str, count: usize) -> Self {
        self.usage.push((file.to_string(), table.to_string(), count));
        self
    }

    pub fn schema_ref(mut self, key: &str) -> Self {
        self.schema_refs.push(key.to_string());
        self
    }

    pub fn build(self) -> Graph {
        let mut graph = Graph::new(PathBuf::from("/site"), self.files);
        for (from, to) in &self.edges {
            if let Some(record) = graph.files.get_mut(from) {
                record.outbound_references.insert(to.clone());
            }
            if let Some(record) = graph.files.get_mut(to) {
                record.inbound_references.insert(Referrer::File(from.clone()));
                graph.link(from, to);
            }
        }
        for (file, table, count) in self.usage {
            graph
                .tables
                .entry(table.clone())
                .or_insert_with(|| SchemaTable::new(table.as_str(), "fixture.sql"));
            graph.usage.entry(file).or_default().insert(table, count);
        }
        for key in self.schema_refs {
            if let Some(record) = graph.files.get_mut(&key) {
                record.inbound_references.insert(Referrer::VirtualSchemaSource);
            }
        }
        graph
    }
}
