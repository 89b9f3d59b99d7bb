//
//  disk.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::extract;

/// Answers "is this key present on disk right now" and, for the syntax
/// audit, "what does it contain".
///
/// Key sets stand in for a tree in tests: they model presence only, and a
/// present key reads as empty. A key-to-contents map models both.
pub trait DiskView {
    fn exists(&self, key: &str) -> bool;

    /// Current contents of `key`, lossily decoded. `None` if it cannot be read.
    fn read(&self, key: &str) -> Option<String>;
}

impl DiskView for Path {
    fn exists(&self, key: &str) -> bool {
        Path::exists(&self.join(key))
    }

    fn read(&self, key: &str) -> Option<String> {
        extract::read_text(&self.join(key))
    }
}

impl DiskView for PathBuf {
    fn exists(&self, key: &str) -> bool {
        DiskView::exists(self.as_path(), key)
    }

    fn read(&self, key: &str) -> Option<String> {
        DiskView::read(self.as_path(), key)
    }
}

impl DiskView for BTreeSet<String> {
    fn exists(&self, key: &str) -> bool {
        self.contains(key)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.contains(key).then(String::new)
    }
}

impl DiskView for HashSet<String> {
    fn exists(&self, key: &str) -> bool {
        self.contains(key)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.contains(key).then(String::new)
    }
}

impl DiskView for BTreeMap<String, String> {
    fn exists(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
