//
//  live.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Result, SitegraphError};

/// One sampled row: (column, text value). NULL and binary values are `None`.
pub type Row = Vec<(String, Option<String>)>;

/// A database that can be introspected for tables and sampled for data.
pub trait LiveSchemaSource {
    /// Label used in table `source` fields and mined-path origins.
    fn name(&self) -> String;

    fn list_tables(&self) -> Result<Vec<String>>;

    /// (column name, declared type) in declaration order.
    fn list_columns(&self, table: &str) -> Result<Vec<(String, String)>>;

    fn sample_rows(&self, table: &str) -> Result<Vec<Row>>;
}

/// SQLite database opened read-only.
pub struct SqliteSource {
    name: String,
    conn: Mutex<Connection>,
    row_limit: usize,
}

impl SqliteSource {
    pub const DEFAULT_ROW_LIMIT: usize = 10_000;

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(path.display().to_string(), conn))
    }

    pub fn from_connection(name: impl Into<String>, conn: Connection) -> Self {
        Self {
            name: name.into(),
            conn: Mutex::new(conn),
            row_limit: Self::DEFAULT_ROW_LIMIT,
        }
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        // connection state stays valid if another caller panicked mid-query
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&conn)
    }

    /// Tables are interpolated into PRAGMA/SELECT text, so only names the
    /// catalog itself reports are accepted.
    fn checked(&self, table: &str) -> Result<String> {
        if self.list_tables()?.iter().any(|t| t == table) {
            Ok(format!("\"{}\"", table.replace('"', "\"\"")))
        } else {
            Err(SitegraphError::UnknownTable(table.to_string()))
        }
    }
}

impl LiveSchemaSource for SqliteSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    fn list_columns(&self, table: &str) -> Result<Vec<(String, String)>> {
        let quoted = self.checked(table)?;
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({quoted})"))?;
            let columns = stmt
                .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(columns)
        })
    }

    fn sample_rows(&self, table: &str) -> Result<Vec<Row>> {
        let quoted = self.checked(table)?;
        let limit = self.row_limit;
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT * FROM {quoted} LIMIT {limit}"))?;
            let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
            let mut rows = stmt.query([])?;
            let mut sampled = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(names.len());
                for (idx, column) in names.iter().enumerate() {
                    let value = match row.get_ref(idx)? {
                        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                        ValueRef::Integer(i) => Some(i.to_string()),
                        ValueRef::Real(r) => Some(r.to_string()),
                        ValueRef::Null | ValueRef::Blob(_) => None,
                    };
                    values.push((column.clone(), value));
                }
                sampled.push(values);
            }
            Ok(sampled)
        })
    }
}
