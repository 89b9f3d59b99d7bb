//! CLI module for sitegraph.
//!
//! Commands:
//! - Inventory: scan
//! - Analysis: orphans, impact, check, health
//! - Lookup: refs, tables

pub mod report;
pub mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::analysis::{classify_orphans, pre_deletion_check, sanitation_check, check_health};
use crate::config::IntegrityConfig;
use session::Session;

#[derive(Parser)]
#[command(name = "sitegraph")]
#[command(about = "sitegraph - reference graph and orphan finder for web source trees", long_about = None)]
pub struct Cli {
    /// Config file (default: ./sitegraph.toml, defaults apply if missing)
    #[arg(short, long, default_value = "sitegraph.toml")]
    pub config: PathBuf,

    /// Project root, overriding the config
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Inventory ────────────────────────────────────────────────
    /// Scan the project and show graph statistics
    Scan,

    // ─── Analysis ─────────────────────────────────────────────────
    /// List orphaned files
    Orphans,

    /// Show what deleting the given files would break
    Impact {
        /// Files, relative to the project root
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Run recursive integrity passes and a health check
    Check {
        /// Number of passes (default: from config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Run at least seven passes
        #[arg(long)]
        ultra: bool,
    },

    /// Check that critical and navigation files are present
    Health,

    // ─── Lookup ───────────────────────────────────────────────────
    /// Show every reference to a file
    Refs {
        /// File, relative to the project root
        file: String,
    },

    /// Show table usage across the code
    Tables {
        /// Only tables no file uses
        #[arg(long)]
        unused: bool,
    },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let session = Session::open(&cli.config, cli.root.as_deref())?;
    let graph = &session.graph;
    let json = cli.json;

    match cli.command {
        Commands::Scan => {
            let stats = graph.stats();
            let assets = graph.asset_summary();
            if json {
                return print_json(&serde_json::json!({ "stats": stats, "assets": assets }));
            }
            report::scan(&session.root, &stats, &assets);
        }

        Commands::Orphans => {
            let orphans = classify_orphans(graph, &session.config.orphans);
            if json {
                return print_json(&orphans);
            }
            report::orphans(graph, &orphans);
        }

        Commands::Impact { files } => {
            let check = pre_deletion_check(graph, &files, session.root.as_path());
            if json {
                return print_json(&check);
            }
            report::impact(&check);
        }

        Commands::Check { depth, ultra } => {
            let integrity = IntegrityConfig {
                max_depth: depth.unwrap_or(session.config.integrity.max_depth),
                ultra_mode: ultra || session.config.integrity.ultra_mode,
            };
            let result = sanitation_check(
                graph,
                integrity.effective_depth(),
                integrity.ultra_mode,
                session.root.as_path(),
            );
            if json {
                return print_json(&result);
            }
            report::sanitation(&result);
        }

        Commands::Health => {
            let health = check_health(graph, session.root.as_path());
            if json {
                return print_json(&health);
            }
            report::health(&health);
        }

        Commands::Refs { file } => {
            let key = crate::inventory::normalize_key(&file);
            let summary = graph.reference_summary(&key);
            if json {
                return print_json(&summary);
            }
            report::references(graph, &summary);
        }

        Commands::Tables { unused } => {
            if unused {
                let tables = graph.find_unused_tables();
                if json {
                    return print_json(&tables);
                }
                report::unused_tables(&tables);
            } else {
                let summary = graph.table_usage_summary();
                if json {
                    return print_json(&summary);
                }
                report::tables(&summary);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
