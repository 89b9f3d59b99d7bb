//
//  health.rs
//  sitegraph
//
//  Created by hak (tharun)
//

use serde::Serialize;

use super::disk::DiskView;
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStats {
    pub total_files: usize,
    pub php_files: usize,
    pub critical_files: usize,
    pub navigation_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub issues: Vec<String>,
    pub stats: HealthStats,
}

/// Missing critical files make the site Critical; missing navigation files
/// only a Warning.
pub fn check_health<D: DiskView + ?Sized>(graph: &Graph, disk: &D) -> HealthReport {
    let mut status = HealthStatus::Healthy;
    let mut issues = Vec::new();

    for key in graph.critical_keys() {
        if !disk.exists(key) {
            issues.push(format!("critical file missing: {key}"));
            status = HealthStatus::Critical;
        }
    }
    for key in graph.navigation_keys() {
        if !disk.exists(key) {
            issues.push(format!("navigation file missing: {key}"));
            status = status.max(HealthStatus::Warning);
        }
    }

    let stats = HealthStats {
        total_files: graph.len(),
        php_files: graph.files().filter(|r| r.extension == ".php").count(),
        critical_files: graph.critical_keys().len(),
        navigation_files: graph.navigation_keys().len(),
    };

    HealthReport { status, issues, stats }
}
