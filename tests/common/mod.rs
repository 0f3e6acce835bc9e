// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed configuration and system root so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use carthage::commands::build_graph;
use carthage::config::{Action, Config};
use carthage::graph::UnitGraph;
use carthage::logging::{Log, UnitStatus};

/// An isolated configuration file and system root, both backed by a
/// [`tempfile::TempDir`] that is deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `units.json` and `sysroot/`.
    pub dir: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context whose configuration holds `units_json`.
    pub fn with_units(units_json: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("units.json"), units_json).expect("write units.json");
        Self { dir }
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("units.json")
    }

    /// Directory units are applied beneath (not created up front).
    pub fn sys_root(&self) -> PathBuf {
        self.dir.path().join("sysroot")
    }

    /// Write a content source file next to the configuration.
    pub fn write_source(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).expect("write source file");
    }

    /// Path beneath the system root for the absolute `target`.
    pub fn installed(&self, target: &str) -> PathBuf {
        self.sys_root().join(target.trim_start_matches('/'))
    }

    /// Load the configuration and build its graph.
    pub fn load(&self) -> (Config, UnitGraph<Action>) {
        let config = Config::load(&self.config_path()).expect("load config");
        let graph = build_graph(&config.units).expect("build graph");
        (config, graph)
    }
}

/// A [`Log`] that records unit results in memory and discards messages.
#[derive(Debug, Default)]
pub struct RecordingLog {
    units: Mutex<Vec<(String, UnitStatus)>>,
    dry_run: Mutex<Vec<String>>,
}

impl RecordingLog {
    /// Recorded `(name, status)` pairs in order.
    pub fn units(&self) -> Vec<(String, UnitStatus)> {
        self.units.lock().expect("lock units").clone()
    }

    /// Recorded dry-run messages in order.
    pub fn dry_run_messages(&self) -> Vec<String> {
        self.dry_run.lock().expect("lock dry run").clone()
    }
}

impl Log for RecordingLog {
    fn stage(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}

    fn dry_run(&self, msg: &str) {
        self.dry_run.lock().expect("lock dry run").push(msg.to_string());
    }

    fn record_unit(&self, name: &str, status: UnitStatus, _message: Option<&str>) {
        self.units
            .lock()
            .expect("lock units")
            .push((name.to_string(), status));
    }
}
