//
//  types.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::live::LiveSchemaSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Upper-cased base type ("VARCHAR", "INT", ...).
    pub data_type: String,
}

impl Column {
    /// Whether the column can hold free text worth mining for paths.
    pub fn is_textual(&self) -> bool {
        let t = self.data_type.to_lowercase();
        t.contains("char") || t.contains("text")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// A table definition assembled from one or more schema sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<String>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    /// Name of the source the table was first seen in.
    pub source: String,
}

impl SchemaTable {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Fold a later declaration of the same table into this one. Nothing
    /// already known is overwritten; new columns and keys are appended.
    pub fn merge(&mut self, other: SchemaTable) {
        for column in other.columns {
            if !self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
                self.columns.push(column);
            }
        }
        for pk in other.primary_keys {
            if !self.primary_keys.contains(&pk) {
                self.primary_keys.push(pk);
            }
        }
        for fk in other.foreign_keys {
            if !self.foreign_keys.contains(&fk) {
                self.foreign_keys.push(fk);
            }
        }
        for index in other.indexes {
            if !self.indexes.contains(&index) {
                self.indexes.push(index);
            }
        }
        if self.engine.is_none() {
            self.engine = other.engine;
        }
        if self.charset.is_none() {
            self.charset = other.charset;
        }
    }
}

/// Table name → definition, merged across every source.
pub type SchemaCatalog = BTreeMap<String, SchemaTable>;

/// Per-file table usage: table → occurrence count. Zero counts are absent.
pub type TableUsage = BTreeMap<String, usize>;

/// A path-like literal found in schema data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedPath {
    /// Cleaned literal ("admin/report.php").
    pub literal: String,
    /// Where it was seen: "dump.sql:42" or "table.column#row".
    pub origin: String,
}

/// One place schema evidence comes from.
pub enum SchemaSource {
    /// Raw SQL dump text.
    Dump { name: String, text: String },
    /// A live data source.
    Live(Box<dyn LiveSchemaSource + Send + Sync>),
}

impl SchemaSource {
    pub fn dump(name: impl Into<String>, text: impl Into<String>) -> Self {
        SchemaSource::Dump {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            SchemaSource::Dump { name, .. } => name.clone(),
            SchemaSource::Live(source) => source.name(),
        }
    }
}

impl std::fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::Dump { name, text } => f
                .debug_struct("Dump")
                .field("name", name)
                .field("bytes", &text.len())
                .finish(),
            SchemaSource::Live(source) => f.debug_tuple("Live").field(&source.name()).finish(),
        }
    }
}
