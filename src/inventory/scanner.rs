//
//  scanner.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use chrono::{DateTime, Utc};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::Path;
use tracing::{debug, info};

use super::types::{normalize_key, Inventory, InventoryEntry};
use crate::config::ProjectConfig;
use crate::error::{Result, SitegraphError};

/// Walk `root` and produce the file inventory.
///
/// Only files whose extension is listed in `project.extensions` are kept.
/// Files whose name appears in `critical_files` / `navigation_files` get the
/// corresponding flag.
pub fn scan(root: &Path, project: &ProjectConfig) -> Result<Inventory> {
    if !root.is_dir() {
        return Err(SitegraphError::RootNotFound(root.to_path_buf()));
    }

    let mut overrides = OverrideBuilder::new(root);
    for pattern in &project.ignore_patterns {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(|e| SitegraphError::InvalidPattern(format!("{pattern}: {e}")))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| SitegraphError::InvalidPattern(e.to_string()))?;

    let extensions: Vec<String> = project
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    let mut inventory = Inventory::new(root);

    let walker = WalkBuilder::new(root)
        .hidden(project.ignore_dot_directories)
        .git_ignore(project.respect_gitignore)
        .git_global(project.respect_gitignore)
        .git_exclude(project.respect_gitignore)
        .parents(project.respect_gitignore)
        .overrides(overrides)
        .build();

    for entry in walker.filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)));
        if !matches_extension {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = normalize_key(&relative.to_string_lossy());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (size, modified) = match entry.metadata() {
            Ok(meta) => (
                meta.len(),
                meta.modified().ok().map(DateTime::<Utc>::from),
            ),
            Err(e) => {
                debug!(file = %key, error = %e, "metadata unavailable");
                (0, None)
            }
        };

        inventory.insert(InventoryEntry {
            critical: project.critical_files.iter().any(|c| c == &name),
            navigation: project.navigation_files.iter().any(|n| n == &name),
            key,
            path: path.to_path_buf(),
            size,
            modified,
        });
    }

    info!(root = %root.display(), files = inventory.len(), "inventory scanned");
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_scan_filters_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.php", "<?php");
        touch(dir.path(), "inc/header.php", "<nav>");
        touch(dir.path(), "css/site.css", "body{}");
        touch(dir.path(), "README.md", "# readme");
        touch(dir.path(), "node_modules/lib/x.js", "");
        touch(dir.path(), ".git/hooks/a.php", "");

        let project = ProjectConfig::default();
        let inventory = scan(dir.path(), &project).unwrap();

        let keys: Vec<_> = inventory.keys().cloned().collect();
        assert_eq!(keys, vec!["css/site.css", "inc/header.php", "index.php"]);

        assert!(inventory.get("index.php").unwrap().is_critical);
        assert!(inventory.get("inc/header.php").unwrap().is_navigation);
        assert_eq!(inventory.get("css/site.css").unwrap().size, 6);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan(&missing, &ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, SitegraphError::RootNotFound(_)));
    }
}
