//
//  audit.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::Serialize;

use super::disk::DiskView;
use crate::graph::Graph;
use crate::inventory::FileKey;

/// Delimiter pairs counted by the PHP balance check.
const PAIRS: [(char, char, &str); 3] = [('{', '}', "braces"), ('(', ')', "parentheses"), ('[', ']', "brackets")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSyntaxErrors {
    pub file: FileKey,
    pub errors: Vec<String>,
}

/// Balance check over every tracked `.php` file still present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhpValidation {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<FileSyntaxErrors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenInclude {
    pub file: FileKey,
    pub missing_reference: FileKey,
}

/// State of the tree after files were removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostDeletionReport {
    pub broken_includes: Vec<BrokenInclude>,
    pub missing_navigation: Vec<FileKey>,
    pub all_ok: bool,
}

/// Count-based delimiter check. Catches truncated or half-edited files, not
/// real syntax errors: delimiters inside strings and comments count too.
pub fn check_php_balance(content: &str) -> Vec<String> {
    PAIRS
        .iter()
        .filter_map(|&(open, close, name)| {
            let opened = content.chars().filter(|&c| c == open).count();
            let closed = content.chars().filter(|&c| c == close).count();
            (opened != closed).then(|| format!("unmatched {name}: {opened} open, {closed} close"))
        })
        .collect()
}

pub fn validate_php_files<D: DiskView + ?Sized>(graph: &Graph, disk: &D) -> PhpValidation {
    let mut report = PhpValidation::default();

    for record in graph.files().filter(|r| r.extension == ".php") {
        if !disk.exists(&record.key) {
            continue;
        }
        report.total += 1;
        let errors = match disk.read(&record.key) {
            Some(content) => check_php_balance(&content),
            None => vec!["unreadable".to_string()],
        };
        if errors.is_empty() {
            report.valid += 1;
        } else {
            report.invalid += 1;
            report.errors.push(FileSyntaxErrors {
                file: record.key.clone(),
                errors,
            });
        }
    }

    report
}

/// References from surviving `.php` files whose target is untracked or gone,
/// and navigation files no longer on disk.
pub fn post_deletion_check<D: DiskView + ?Sized>(graph: &Graph, disk: &D) -> PostDeletionReport {
    let mut broken_includes = Vec::new();

    for record in graph.files().filter(|r| r.extension == ".php") {
        if !disk.exists(&record.key) {
            continue;
        }
        for target in record.references() {
            if !graph.contains(target) || !disk.exists(target) {
                broken_includes.push(BrokenInclude {
                    file: record.key.clone(),
                    missing_reference: target.clone(),
                });
            }
        }
    }

    let missing_navigation: Vec<FileKey> = graph
        .navigation_keys()
        .into_iter()
        .filter(|key| !disk.exists(key))
        .cloned()
        .collect();

    PostDeletionReport {
        all_ok: broken_includes.is_empty() && missing_navigation.is_empty(),
        broken_includes,
        missing_navigation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::Fixture;
    use std::collections::BTreeMap;

    fn tree(files: &[(&str, &str)]) -> BTreeMap<String, String> {
        files.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_balance_counts_each_pair() {
        assert!(check_php_balance("<?php if ($a[0]) { echo 1; }").is_empty());
        let errors = check_php_balance("<?php function f() { if (($x) {");
        assert_eq!(
            errors,
            vec![
                "unmatched braces: 2 open, 0 close".to_string(),
                "unmatched parentheses: 3 open, 2 close".to_string(),
            ]
        );
    }

    #[test]
    fn test_validation_skips_absent_and_non_php() {
        let graph = Fixture::new()
            .file("ok.php")
            .file("broken.php")
            .file("gone.php")
            .file("style.css")
            .build();
        let disk = tree(&[
            ("ok.php", "<?php echo [1, 2][0];"),
            ("broken.php", "<?php if (true) {"),
            ("style.css", "a {"),
        ]);

        let report = validate_php_files(&graph, &disk);
        assert_eq!(report.total, 2);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.errors[0].file, "broken.php");
        assert_eq!(report.errors[0].errors, vec!["unmatched braces: 1 open, 0 close"]);
    }

    #[test]
    fn test_post_deletion_finds_broken_includes() {
        let graph = Fixture::new()
            .file("index.php")
            .file("lib.php")
            .navigation("header.php")
            .file("page.html")
            .edge("index.php", "lib.php")
            .edge("index.php", "untracked.php")
            .edge("page.html", "lib.php")
            .build();
        let disk = tree(&[("index.php", ""), ("page.html", "")]);

        let report = post_deletion_check(&graph, &disk);
        assert!(!report.all_ok);
        assert_eq!(
            report.broken_includes,
            vec![
                BrokenInclude {
                    file: "index.php".to_string(),
                    missing_reference: "lib.php".to_string(),
                },
                BrokenInclude {
                    file: "index.php".to_string(),
                    missing_reference: "untracked.php".to_string(),
                },
            ]
        );
        assert_eq!(report.missing_navigation, vec!["header.php"]);
    }

    #[test]
    fn test_post_deletion_clean_tree() {
        let graph = Fixture::new()
            .file("index.php")
            .navigation("header.php")
            .edge("index.php", "header.php")
            .build();
        let disk = tree(&[("index.php", ""), ("header.php", "")]);
        assert!(post_deletion_check(&graph, &disk).all_ok);
    }
}
