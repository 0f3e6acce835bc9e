//! Core logging types: the [`Log`] trait, per-unit result entries, and their status.

/// Logging interface shared by the console logger and test doubles.
///
/// Unit executors take `&dyn Log` so they can be exercised without a
/// global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (file only unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a unit result for the summary.
    fn record_unit(&self, name: &str, status: UnitStatus, message: Option<&str>);
}

/// Unit execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct UnitEntry {
    /// Unit name.
    pub name: String,
    /// Final status of the unit.
    pub status: UnitStatus,
    /// Optional detail message (e.g., error description).
    pub message: Option<String>,
}

/// Status of a processed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// The unit's action changed the system.
    Ok,
    /// The system already matched the unit.
    AlreadyCorrect,
    /// Dry run; nothing was changed.
    DryRun,
    /// The unit was not run (e.g., a dependency failed).
    Skipped,
    /// The unit's action failed.
    Failed,
}
