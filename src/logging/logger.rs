//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, UnitEntry, UnitStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are also written to a persistent log file at
/// `$XDG_CACHE_HOME/carthage/<command>.log` (default
/// `~/.cache/carthage/<command>.log`) with timestamps and ANSI codes
/// stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    units: Mutex<Vec<UnitEntry>>,
    log_file: PathBuf,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Remembers where `command` logs to for the run summary. The file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            units: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Path of this command's log file (test-only).
    #[cfg(test)]
    pub(crate) fn log_path(&self) -> &std::path::Path {
        &self.log_file
    }

    /// Return a clone of all recorded unit entries (test-only).
    #[cfg(test)]
    pub(crate) fn unit_entries(&self) -> Vec<UnitEntry> {
        self.units.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a unit result for the summary.
    pub fn record_unit(&self, name: &str, status: UnitStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.units.lock() {
            guard.push(UnitEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed units.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.units.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|u| u.status == UnitStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded units.
    pub fn print_summary(&self) {
        let units = match self.units.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if units.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut already = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for unit in &units {
            let (icon, color) = match unit.status {
                UnitStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                UnitStatus::AlreadyCorrect => {
                    already += 1;
                    ("·", "\x1b[2m")
                }
                UnitStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                UnitStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                UnitStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = unit
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", unit.name));
        }

        let total = ok + already + skipped + dry_run + failed;
        self.info(&format!(
            "{total} units: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{already} unchanged\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if self.log_file.exists() {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", self.log_file.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_unit(&self, name: &str, status: UnitStatus, message: Option<&str>) {
        self.record_unit(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.unit_entries().is_empty(), "expected empty unit list");
    }

    #[test]
    fn record_unit_ok() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_unit("app-dir", UnitStatus::Ok, None);
        let units = log.unit_entries();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "app-dir");
        assert_eq!(units[0].status, UnitStatus::Ok);
    }

    #[test]
    fn record_unit_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_unit("motd", UnitStatus::Skipped, Some("dependency failed"));
        assert_eq!(
            log.unit_entries()[0].message,
            Some("dependency failed".to_string())
        );
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_unit("a", UnitStatus::Ok, None);
        log.record_unit("b", UnitStatus::Failed, Some("error 1"));
        log.record_unit("c", UnitStatus::Failed, Some("error 2"));
        log.record_unit("d", UnitStatus::Skipped, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("command:  test\n"), "run header should open the log");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(
            contents.contains(&format!("[debug] {marker}")),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn stage_and_dry_run_are_tagged_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Planning");
        log.dry_run("would create /etc/app");
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("==> Planning"));
        assert!(contents.contains("[dry run] would create /etc/app"));
    }

    #[test]
    fn summary_strips_ansi_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_unit("a", UnitStatus::Ok, None);
        log.record_unit("b", UnitStatus::Failed, Some("boom"));
        log.print_summary();
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("✓ a"));
        assert!(contents.contains("✗ b (boom)"));
        assert!(contents.contains("2 units: 1 ok, 0 unchanged, 0 skipped, 0 dry-run, 1 failed"));
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_unit("x", UnitStatus::DryRun, None);
        assert_eq!(log.unit_entries()[0].status, UnitStatus::DryRun);
    }
}
