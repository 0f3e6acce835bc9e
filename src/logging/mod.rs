//! Logging for carthage commands.
//!
//! [`Logger`] is the facade commands talk to; [`init_subscriber`] routes its
//! events to stderr and to a per-command log file. Messages emitted while a
//! unit runs carry that unit's name in both places.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{RunHeader, init_subscriber};
pub use types::{Log, UnitEntry, UnitStatus};

/// Serializes `XDG_CACHE_HOME` manipulation across parallel test threads.
#[cfg(test)]
static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// A [`Logger`] whose events reach a log file in a fresh temporary cache
/// directory, through a subscriber installed for the current thread only.
///
/// Keep the returned guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use std::path::Path;
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("create temp cache dir");
    let header = RunHeader {
        command: "test",
        config: None,
        sys_root: Path::new("/tmp/carthage"),
    };

    let (file_layer, log) = {
        let _env = TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: Guarded by TEST_ENV_MUTEX and removed before it is released.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("XDG_CACHE_HOME", tmp.path());
        }
        let layer = subscriber::FileLayer::new(&header).expect("open test log file");
        let log = Logger::new(header.command);
        // SAFETY: Guarded by TEST_ENV_MUTEX.
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("XDG_CACHE_HOME");
        }
        (layer, log)
    };

    let subscriber = tracing_subscriber::registry()
        .with(subscriber::UnitScopeLayer)
        .with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
