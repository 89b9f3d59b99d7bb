//
//  error.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the configuration, inventory and schema-source layers.
///
/// The analysis core (extraction, graph, orphans, impact, integrity) never
/// returns these: evidence failures are absorbed and reported as data.
#[derive(Debug, Error)]
pub enum SitegraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("project root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("invalid ignore pattern: {0}")]
    InvalidPattern(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, SitegraphError>;
