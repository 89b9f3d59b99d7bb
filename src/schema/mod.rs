//! Schema cross-referencer.
//!
//! Turns schema sources (SQL dump text or a live database) into a merged
//! table catalog, counts table usage in code, and mines stored data for
//! file paths so that files only reachable through database content still
//! count as referenced.

mod dump;
mod live;
mod mining;
mod types;
mod usage;

use std::path::Path;

use tracing::{debug, warn};

pub use dump::parse_dump;
pub use live::{LiveSchemaSource, Row, SqliteSource};
pub use mining::{clean_mined, match_to_inventory, mine_text, mine_value};
pub use types::{Column, ForeignKey, MinedPath, SchemaCatalog, SchemaSource, SchemaTable, TableUsage};
pub use usage::TableMatcher;

use crate::error::Result;
use crate::extract::read_text;

/// Everything the schema sources contributed to one build.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    pub tables: SchemaCatalog,
    pub mined: Vec<MinedPath>,
}

impl SchemaIndex {
    fn add_table(&mut self, table: SchemaTable) {
        let key = self
            .tables
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&table.name))
            .cloned();
        match key {
            Some(existing) => {
                if let Some(known) = self.tables.get_mut(&existing) {
                    known.merge(table);
                }
            }
            None => {
                self.tables.insert(table.name.clone(), table);
            }
        }
    }
}

impl SchemaSource {
    /// Load a SQL dump from disk. Invalid UTF-8 is decoded lossily.
    pub fn from_dump_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("schema dump not found: {}", path.display()),
            )
            .into());
        }
        let text = read_text(path).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(SchemaSource::dump(name, text))
    }

    /// Open a SQLite database as a live source.
    pub fn sqlite(path: &Path) -> Result<Self> {
        Ok(SchemaSource::Live(Box::new(SqliteSource::open(path)?)))
    }
}

/// Read every source into one catalog. Failures inside a source skip the
/// affected table, never the whole build.
pub fn load_sources(sources: &[SchemaSource], mine_paths: bool) -> SchemaIndex {
    let mut index = SchemaIndex::default();

    for source in sources {
        match source {
            SchemaSource::Dump { name, text } => {
                let tables = parse_dump(name, text);
                debug!(source = %name, tables = tables.len(), "parsed schema dump");
                for table in tables {
                    index.add_table(table);
                }
                if mine_paths {
                    index.mined.extend(mine_text(name, text));
                }
            }
            SchemaSource::Live(live) => load_live(live.as_ref(), mine_paths, &mut index),
        }
    }

    index
}

fn load_live(source: &(dyn LiveSchemaSource + Send + Sync), mine_paths: bool, index: &mut SchemaIndex) {
    let name = source.name();
    let tables = match source.list_tables() {
        Ok(tables) => tables,
        Err(e) => {
            warn!(source = %name, error = %e, "cannot list tables, source skipped");
            return;
        }
    };

    for table_name in tables {
        let columns = match source.list_columns(&table_name) {
            Ok(columns) => columns,
            Err(e) => {
                warn!(source = %name, table = %table_name, error = %e, "cannot read columns, table skipped");
                continue;
            }
        };

        let mut table = SchemaTable::new(table_name.as_str(), name.as_str());
        table.columns = columns
            .into_iter()
            .map(|(column, declared)| Column {
                name: column,
                data_type: base_type(&declared),
            })
            .collect();

        if mine_paths {
            let textual: Vec<&str> = table
                .columns
                .iter()
                .filter(|c| c.is_textual())
                .map(|c| c.name.as_str())
                .collect();
            if !textual.is_empty() {
                match source.sample_rows(&table_name) {
                    Ok(rows) => {
                        for (row_idx, row) in rows.iter().enumerate() {
                            for (column, value) in row {
                                let Some(value) = value else { continue };
                                if !textual.contains(&column.as_str()) {
                                    continue;
                                }
                                let origin = format!("{name}#{table_name}.{column}[{row_idx}]");
                                index.mined.extend(mine_value(&origin, value));
                            }
                        }
                    }
                    Err(e) => {
                        warn!(source = %name, table = %table_name, error = %e, "cannot sample rows, mining skipped");
                    }
                }
            }
        }

        index.add_table(table);
    }
}

/// "varchar(64)" → "VARCHAR"
fn base_type(declared: &str) -> String {
    declared
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
