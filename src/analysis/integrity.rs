//
//  integrity.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::audit::{post_deletion_check, validate_php_files, PhpValidation, PostDeletionReport};
use super::disk::DiskView;
use super::health::{check_health, HealthReport};
use crate::graph::Graph;
use crate::inventory::FileKey;

/// Passes run in ultra mode, at minimum.
pub const ULTRA_PASSES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueReason {
    /// Exists on disk but is not in the inventory.
    NotTracked,
    /// In the inventory but gone from disk.
    MissingOnDisk,
    /// Neither tracked nor on disk.
    ReferenceMissing,
}

impl IssueReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueReason::NotTracked => "not-tracked",
            IssueReason::MissingOnDisk => "missing-on-disk",
            IssueReason::ReferenceMissing => "reference-missing",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference chain that ends somewhere it should not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    pub origin: FileKey,
    /// origin → ... → missing
    pub chain: Vec<FileKey>,
    pub missing: FileKey,
    pub reason: IssueReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub depth: usize,
    pub issues: Vec<IntegrityIssue>,
    pub issue_count: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub max_depth: usize,
    pub passes: Vec<PassReport>,
    pub overall_passed: bool,
    /// Groups of files that reference each other in a loop. Informational;
    /// cycles never fail a pass.
    pub cycles: Vec<Vec<FileKey>>,
}

impl IntegrityReport {
    pub fn total_issues(&self) -> usize {
        self.passes.iter().map(|p| p.issue_count).sum()
    }
}

/// One pending step of the walk. The chain is also the visited set for
/// this branch.
struct Frame {
    key: FileKey,
    chain: Vec<FileKey>,
    remaining: usize,
}

/// Run passes 1..=max(1, max_depth) against the project root on disk.
pub fn run_integrity_check(graph: &Graph, max_depth: usize) -> IntegrityReport {
    check_with(graph, max_depth, graph.root())
}

/// Like [`run_integrity_check`], with presence answered by `disk`.
pub fn check_with<D: DiskView + ?Sized>(graph: &Graph, max_depth: usize, disk: &D) -> IntegrityReport {
    let max_depth = max_depth.max(1);
    let passes: Vec<PassReport> = (1..=max_depth)
        .map(|depth| {
            let issues: Vec<IntegrityIssue> = graph
                .keys()
                .flat_map(|origin| walk(graph, disk, origin, depth))
                .collect();
            debug!(depth, issues = issues.len(), "integrity pass");
            PassReport {
                depth,
                issue_count: issues.len(),
                passed: issues.is_empty(),
                issues,
            }
        })
        .collect();

    IntegrityReport {
        max_depth,
        overall_passed: passes.iter().all(|p| p.passed),
        passes,
        cycles: graph.cycles(),
    }
}

fn classify<D: DiskView + ?Sized>(graph: &Graph, disk: &D, key: &str) -> Option<IssueReason> {
    match (graph.contains(key), disk.exists(key)) {
        (true, true) => None,
        (false, true) => Some(IssueReason::NotTracked),
        (true, false) => Some(IssueReason::MissingOnDisk),
        (false, false) => Some(IssueReason::ReferenceMissing),
    }
}

/// Walk reference chains from `origin`, `depth` levels deep.
fn walk<D: DiskView + ?Sized>(graph: &Graph, disk: &D, origin: &FileKey, depth: usize) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if !disk.exists(origin) {
        issues.push(IntegrityIssue {
            origin: origin.clone(),
            chain: vec![origin.clone()],
            missing: origin.clone(),
            reason: IssueReason::MissingOnDisk,
        });
        return issues;
    }

    let mut stack = vec![Frame {
        key: origin.clone(),
        chain: vec![origin.clone()],
        remaining: depth,
    }];

    while let Some(frame) = stack.pop() {
        let Some(record) = graph.get(&frame.key) else {
            continue;
        };
        let mut next = Vec::new();

        for target in record.references() {
            if frame.chain.contains(target) {
                continue;
            }
            let mut chain = frame.chain.clone();
            chain.push(target.clone());

            if let Some(reason) = classify(graph, disk, target) {
                issues.push(IntegrityIssue {
                    origin: origin.clone(),
                    chain,
                    missing: target.clone(),
                    reason,
                });
                continue;
            }
            if frame.remaining > 1 {
                next.push(Frame {
                    key: target.clone(),
                    chain,
                    remaining: frame.remaining - 1,
                });
            }
        }

        // reversed so targets are descended in key order
        stack.extend(next.into_iter().rev());
    }

    issues
}

/// Combined end-of-run audit: integrity passes, PHP balance, system health
/// and the post-deletion state of the tree.
#[derive(Debug, Clone, Serialize)]
pub struct SanitationReport {
    pub passes_requested: usize,
    pub integrity: IntegrityReport,
    pub php_validation: PhpValidation,
    pub health: HealthReport,
    pub post_deletion: PostDeletionReport,
}

/// Every audit at once, integrity at `passes` depth (at least
/// [`ULTRA_PASSES`] in ultra mode).
pub fn sanitation_check<D: DiskView + ?Sized>(
    graph: &Graph,
    passes: usize,
    ultra_mode: bool,
    disk: &D,
) -> SanitationReport {
    let mut passes = passes.max(1);
    if ultra_mode {
        passes = passes.max(ULTRA_PASSES);
    }
    SanitationReport {
        passes_requested: passes,
        integrity: check_with(graph, passes, disk),
        php_validation: validate_php_files(graph, disk),
        health: check_health(graph, disk),
        post_deletion: post_deletion_check(graph, disk),
    }
}
