//! Analyses over a built graph: orphan classification, deletion impact,
//! integrity passes, system health and the post-deletion audit. All of
//! them only read the graph.

mod audit;
mod disk;
mod health;
mod impact;
mod integrity;
mod orphans;

pub use audit::{
    check_php_balance, post_deletion_check, validate_php_files, BrokenInclude, FileSyntaxErrors,
    PhpValidation, PostDeletionReport,
};
pub use disk::DiskView;
pub use health::{check_health, HealthReport, HealthStats, HealthStatus};
pub use impact::{compute_impact, pre_deletion_check, DeletionImpact, PreDeletionCheck};
pub use integrity::{
    check_with, run_integrity_check, sanitation_check, IntegrityIssue, IntegrityReport, IssueReason,
    PassReport, SanitationReport, ULTRA_PASSES,
};
pub use orphans::{classify_orphans, OrphanCriteria};
