//
//  types.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Project-root-relative, forward-slash path. The identity of a file.
pub type FileKey = String;

/// Something that points at a file: another tracked file, or data living in
/// the relational schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Referrer {
    File(FileKey),
    VirtualSchemaSource,
}

impl Referrer {
    /// The referring file, if this referrer is a file.
    pub fn file(&self) -> Option<&str> {
        match self {
            Referrer::File(key) => Some(key),
            Referrer::VirtualSchemaSource => None,
        }
    }
}

impl fmt::Display for Referrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Referrer::File(key) => write!(f, "{key}"),
            Referrer::VirtualSchemaSource => write!(f, "<schema>"),
        }
    }
}

impl From<&str> for Referrer {
    fn from(key: &str) -> Self {
        Referrer::File(key.to_string())
    }
}

/// One entry as handed over by a scanner: fixed attributes only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub key: FileKey,
    pub path: PathBuf,
    pub size: u64,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub navigation: bool,
}

/// A tracked file. Fixed attributes come from the inventory; the reference
/// sets are derived and only ever written by the graph builder.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub key: FileKey,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub is_critical: bool,
    pub is_navigation: bool,
    /// Lowercased extension including the dot (".php"), empty if none.
    pub extension: String,
    pub(crate) outbound_references: BTreeSet<FileKey>,
    pub(crate) inbound_references: BTreeSet<Referrer>,
}

impl FileRecord {
    pub fn from_entry(entry: InventoryEntry) -> Self {
        let key = normalize_key(&entry.key);
        let extension = extension_of(&key);
        Self {
            key,
            path: entry.path,
            size: entry.size,
            modified: entry.modified,
            is_critical: entry.critical,
            is_navigation: entry.navigation,
            extension,
            outbound_references: BTreeSet::new(),
            inbound_references: BTreeSet::new(),
        }
    }

    /// Targets this file points at, tracked or not.
    pub fn references(&self) -> &BTreeSet<FileKey> {
        &self.outbound_references
    }

    /// Distinct referrers of this file.
    pub fn referenced_by(&self) -> &BTreeSet<Referrer> {
        &self.inbound_references
    }

    /// Number of distinct referrers (not occurrences).
    pub fn reference_count(&self) -> usize {
        self.inbound_references.len()
    }

    /// Final path component ("header.php").
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    pub(crate) fn reset_references(&mut self) {
        self.outbound_references.clear();
        self.inbound_references.clear();
    }
}

/// Canonical, deduplicated table of known files.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    root: PathBuf,
    files: BTreeMap<FileKey, FileRecord>,
}

impl Inventory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    /// Build from scanner entries. A later duplicate key replaces the earlier one.
    pub fn from_entries(root: impl Into<PathBuf>, entries: impl IntoIterator<Item = InventoryEntry>) -> Self {
        let mut inventory = Self::new(root);
        for entry in entries {
            inventory.insert(entry);
        }
        inventory
    }

    pub fn insert(&mut self, entry: InventoryEntry) {
        let record = FileRecord::from_entry(entry);
        self.files.insert(record.key.clone(), record);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&FileRecord> {
        self.files.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Records in key order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FileKey> {
        self.files.keys()
    }

    pub(crate) fn into_files(self) -> (PathBuf, BTreeMap<FileKey, FileRecord>) {
        (self.root, self.files)
    }
}

/// Normalize a path string into a graph key: forward slashes, no leading
/// "./" or "/", no empty segments.
pub fn normalize_key(raw: &str) -> FileKey {
    raw.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn extension_of(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> InventoryEntry {
        InventoryEntry {
            key: key.to_string(),
            path: PathBuf::from(key),
            size: 0,
            modified: None,
            critical: false,
            navigation: false,
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("admin\\users.php"), "admin/users.php");
        assert_eq!(normalize_key("./inc//db.php"), "inc/db.php");
        assert_eq!(normalize_key("/index.php"), "index.php");
    }

    #[test]
    fn test_extension_lowercased() {
        let record = FileRecord::from_entry(entry("css/Site.CSS"));
        assert_eq!(record.extension, ".css");
        assert_eq!(record.file_name(), "Site.CSS");

        let dotfile = FileRecord::from_entry(entry(".htaccess"));
        assert_eq!(dotfile.extension, "");
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let inventory = Inventory::from_entries("/srv", vec![entry("a.php"), entry("./a.php")]);
        assert_eq!(inventory.len(), 1);
        assert!(inventory.contains("a.php"));
    }
}
