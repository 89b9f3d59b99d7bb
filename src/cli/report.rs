//
//  report.rs
//  sitegraph
//
//  Created by hak (tharun)
//

//! Plain-text rendering of analysis results.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::analysis::{HealthReport, HealthStatus, PreDeletionCheck, SanitationReport};
use crate::graph::{AssetSummary, Graph, GraphStats, ReferenceSummary, TableUsageSummary};
use crate::inventory::FileKey;

pub fn scan(root: &Path, stats: &GraphStats, assets: &AssetSummary) {
    println!("Project: {}", root.display());
    println!("─────────────────");
    println!("Files:            {}", stats.files);
    println!("  critical:       {}", stats.critical_files);
    println!("  navigation:     {}", stats.navigation_files);
    println!("References:       {}", stats.references);
    println!("Edges:            {}", stats.edges);
    println!("Dangling targets: {}", stats.dangling_targets);
    println!("Tables:           {}", stats.tables);
    println!("Schema links:     {}", stats.schema_links);
    println!(
        "Assets:           {} ({} referenced)",
        assets.total_assets, assets.referenced
    );
    for (ext, files) in &assets.orphaned {
        println!("  unreferenced {}: {}", ext, files.len());
    }
}

pub fn orphans(graph: &Graph, orphans: &BTreeSet<FileKey>) {
    if orphans.is_empty() {
        println!("No orphaned files.");
        return;
    }
    println!("Orphaned files ({}):", orphans.len());
    for key in orphans {
        let size = graph.get(key).map(|r| r.size).unwrap_or(0);
        println!("  {} ({} bytes)", key, size);
    }
}

pub fn impact(check: &PreDeletionCheck) {
    let impact = &check.impact;
    println!("Candidates: {}", impact.candidates.len());
    for message in &check.critical {
        println!("✗ {}", message);
    }
    for message in &check.warnings {
        println!("! {}", message);
    }
    for message in &check.info {
        println!("· {}", message);
    }
    if !impact.broken_references.is_empty() {
        println!("Broken references:");
        for (from, to) in &impact.broken_references {
            println!("  {} -> {}", from, to);
        }
    }
    if check.safe_to_proceed {
        println!("✓ Safe to proceed");
    } else {
        println!("✗ Not safe to proceed");
    }
}

pub fn sanitation(report: &SanitationReport) {
    let integrity = &report.integrity;
    println!("Integrity ({} passes)", report.passes_requested);
    for pass in &integrity.passes {
        let mark = if pass.passed { "✓" } else { "✗" };
        println!("  {} depth {}: {} issues", mark, pass.depth, pass.issue_count);
    }
    if let Some(last) = integrity.passes.last() {
        for issue in &last.issues {
            println!("    [{}] {}", issue.reason, issue.chain.join(" -> "));
        }
    }
    if !integrity.cycles.is_empty() {
        println!("Reference cycles:");
        for cycle in &integrity.cycles {
            println!("  {}", cycle.join(", "));
        }
    }

    let php = &report.php_validation;
    println!();
    println!("PHP balance: {} files, {} invalid", php.total, php.invalid);
    for file in &php.errors {
        println!("  {}: {}", file.file, file.errors.join("; "));
    }

    println!();
    health(&report.health);

    let post = &report.post_deletion;
    println!();
    for broken in &post.broken_includes {
        println!("✗ {} -> {} (missing)", broken.file, broken.missing_reference);
    }
    for key in &post.missing_navigation {
        println!("✗ navigation file missing: {}", key);
    }
    if integrity.overall_passed && php.invalid == 0 && post.all_ok {
        println!("✓ All checks clean");
    }
}

pub fn health(report: &HealthReport) {
    let status = match report.status {
        HealthStatus::Healthy => "healthy",
        HealthStatus::Warning => "warning",
        HealthStatus::Critical => "critical",
    };
    println!("Health: {}", status);
    println!(
        "  {} files, {} php, {} critical, {} navigation",
        report.stats.total_files,
        report.stats.php_files,
        report.stats.critical_files,
        report.stats.navigation_files
    );
    for issue in &report.issues {
        println!("  - {}", issue);
    }
}

pub fn references(graph: &Graph, summary: &ReferenceSummary) {
    if !graph.contains(&summary.target) {
        println!("{} is not tracked", summary.target);
    }
    println!(
        "{}: {} references from {} files",
        summary.target, summary.total_references, summary.unique_sources
    );
    for (kind, count) in &summary.by_kind {
        println!("  {}: {}", kind, count);
    }
    if summary.from_schema {
        println!("  referenced from schema data");
    }
    for site in &summary.sites {
        println!("  {}:{} [{}] {}", site.source, site.line, site.kind, site.snippet);
    }
}

pub fn tables(summary: &BTreeMap<String, TableUsageSummary>) {
    if summary.is_empty() {
        println!("No tables known.");
        return;
    }
    for (table, usage) in summary {
        println!(
            "{} ({} files, {} references)",
            table, usage.file_count, usage.total_references
        );
        for file in &usage.files {
            println!("  {}", file);
        }
    }
}

pub fn unused_tables(tables: &[String]) {
    if tables.is_empty() {
        println!("Every table is used.");
        return;
    }
    println!("Unused tables ({}):", tables.len());
    for table in tables {
        println!("  - {}", table);
    }
}
