//
//  config.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::OrphanCriteria;
use crate::error::{Result, SitegraphError};
use crate::graph::USAGE_EXTENSIONS;

/// Top-level sitegraph configuration (`sitegraph.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitegraphConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub orphans: OrphanCriteria,
    #[serde(default)]
    pub integrity: IntegrityConfig,
}

/// Project-level settings: what to scan and which files are special.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Root directory to scan (relative to the config file).
    #[serde(default = "default_root")]
    pub root: String,
    /// File extensions to track.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns excluded from the scan.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_dot_directories: bool,
    #[serde(default)]
    pub respect_gitignore: bool,
    /// File names that must never be silently deleted.
    #[serde(default = "default_critical_files")]
    pub critical_files: Vec<String>,
    /// File names treated as reachability roots.
    #[serde(default = "default_navigation_files")]
    pub navigation_files: Vec<String>,
}

/// Where schema evidence comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// SQL dump files (relative to the config file).
    #[serde(default)]
    pub dumps: Vec<String>,
    /// Optional SQLite database read as a live schema source.
    #[serde(default)]
    pub sqlite: Option<String>,
    /// Mine text columns for embedded file paths.
    #[serde(default = "default_true")]
    pub mine_paths: bool,
    /// Extensions of files searched for table usage.
    #[serde(default = "default_usage_extensions")]
    pub usage_extensions: Vec<String>,
}

/// Integrity checker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Ultra mode forces at least seven passes.
    #[serde(default)]
    pub ultra_mode: bool,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    1
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_extensions() -> Vec<String> {
    strings(&[".php", ".html", ".htm", ".js", ".ts", ".json", ".css"])
}

fn default_ignore_patterns() -> Vec<String> {
    strings(&[".git", "node_modules", "__pycache__", "*.pyc", ".vscode", ".idea"])
}

fn default_usage_extensions() -> Vec<String> {
    strings(&USAGE_EXTENSIONS)
}

fn default_critical_files() -> Vec<String> {
    strings(&["index.php", "config.php", "db_connect.php"])
}

fn default_navigation_files() -> Vec<String> {
    strings(&["header.php", "footer.php", "navigation.php"])
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            ignore_dot_directories: true,
            respect_gitignore: false,
            critical_files: default_critical_files(),
            navigation_files: default_navigation_files(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dumps: Vec::new(),
            sqlite: None,
            mine_paths: true,
            usage_extensions: default_usage_extensions(),
        }
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            ultra_mode: false,
        }
    }
}

impl IntegrityConfig {
    /// Number of passes to run: at least 1, at least 7 in ultra mode.
    pub fn effective_depth(&self) -> usize {
        let depth = self.max_depth.max(1);
        if self.ultra_mode {
            depth.max(7)
        } else {
            depth
        }
    }
}

impl SitegraphConfig {
    /// Load config from a TOML file. A missing file yields defaults; a file
    /// that exists but does not parse or validate is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.extensions.is_empty() {
            return Err(SitegraphError::InvalidConfig(
                "project.extensions must not be empty".to_string(),
            ));
        }
        self.orphans.validate()
    }

    /// Resolve the project root relative to the config file's directory.
    pub fn resolve_root(&self, config_path: &Path) -> PathBuf {
        resolve_relative(config_path, &self.project.root)
    }

    /// Resolve schema dump paths relative to the config file's directory.
    pub fn resolve_dumps(&self, config_path: &Path) -> Vec<PathBuf> {
        self.schema
            .dumps
            .iter()
            .map(|d| resolve_relative(config_path, d))
            .collect()
    }

    pub fn resolve_sqlite(&self, config_path: &Path) -> Option<PathBuf> {
        self.schema
            .sqlite
            .as_deref()
            .map(|db| resolve_relative(config_path, db))
    }
}

fn resolve_relative(config_path: &Path, value: &str) -> PathBuf {
    let base = config_path.parent().unwrap_or(Path::new("."));
    base.join(value)
}
