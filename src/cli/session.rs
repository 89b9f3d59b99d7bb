//
//  session.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SitegraphConfig;
use crate::graph::{Graph, GraphBuilder};
use crate::inventory::{scan, Inventory};
use crate::schema::SchemaSource;

/// Everything one command needs: config, inventory and the built graph.
pub struct Session {
    pub config: SitegraphConfig,
    pub root: PathBuf,
    pub inventory: Inventory,
    pub graph: Graph,
}

impl Session {
    pub fn open(config_path: &Path, root_override: Option<&Path>) -> Result<Self> {
        let config = SitegraphConfig::load(config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?;
        let root = match root_override {
            Some(root) => root.to_path_buf(),
            None => config.resolve_root(config_path),
        };

        let inventory = scan(&root, &config.project)
            .with_context(|| format!("scanning {}", root.display()))?;
        let sources = schema_sources(&config, config_path);
        info!(files = inventory.len(), schema_sources = sources.len(), "inventory ready");

        let graph = GraphBuilder::new()
            .mine_paths(config.schema.mine_paths)
            .usage_extensions(&config.schema.usage_extensions)
            .build(&inventory, &sources);

        Ok(Self {
            config,
            root,
            inventory,
            graph,
        })
    }
}

/// Schema sources named in the config. A source that cannot be opened is
/// skipped; the build goes ahead without it.
fn schema_sources(config: &SitegraphConfig, config_path: &Path) -> Vec<SchemaSource> {
    let mut sources = Vec::new();

    for dump in config.resolve_dumps(config_path) {
        match SchemaSource::from_dump_file(&dump) {
            Ok(source) => sources.push(source),
            Err(e) => warn!(dump = %dump.display(), error = %e, "schema dump skipped"),
        }
    }

    if let Some(db) = config.resolve_sqlite(config_path) {
        match SchemaSource::sqlite(&db) {
            Ok(source) => sources.push(source),
            Err(e) => warn!(database = %db.display(), error = %e, "sqlite source skipped"),
        }
    }

    sources
}
