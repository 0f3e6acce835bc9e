//! Domain-specific error types for the carthage planner.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`], [`PlanError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! CarthageError
//! ├── Config(ConfigError)   reading and decoding the unit configuration
//! ├── Graph(GraphError)     unit registration
//! ├── Plan(PlanError)       dependency cycles
//! └── FileSet(FileSetError) file registration and writing
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the carthage planner.
#[derive(Error, Debug)]
pub enum CarthageError {
    /// Configuration could not be read, decoded, or resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The unit graph rejected a registration.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// No execution plan could be built.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// The file application layer failed.
    #[error("File error: {0}")]
    FileSet(#[from] FileSetError),
}

/// Errors that arise while reading and decoding the unit configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON, or has an unknown field or tag.
    #[error("Invalid unit configuration: {0}")]
    Decode(#[from] serde_json::Error),

    /// The `spec` object of a unit does not match its action type.
    #[error("Invalid spec for unit '{unit}': {source}")]
    InvalidSpec {
        /// Name of the unit whose spec failed to decode.
        unit: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// A unit lists a dependency that no unit provides.
    #[error("Unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownDependency {
        /// Name of the unit declaring the dependency.
        unit: String,
        /// Name of the missing dependency.
        dependency: String,
    },

    /// The same unit name appears more than once.
    #[error("Duplicate unit '{0}'")]
    DuplicateUnit(String),
}

/// Errors raised by the unit registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A unit with this name is already registered.
    #[error("Unit '{0}' is already registered")]
    DuplicateUnit(String),
}

/// Errors raised while building an execution plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A unit was reached again while it was still being processed.
    ///
    /// The cycle lists the units along the dependency path, starting and
    /// ending with the revisited unit.
    #[error("Dependency cycle detected: {}", .cycle.join(" → "))]
    DependencyCycle {
        /// Unit names forming the cycle.
        cycle: Vec<String>,
    },
}

/// Errors raised by the file application layer.
#[derive(Error, Debug)]
pub enum FileSetError {
    /// The path was already registered.
    #[error("Duplicate file in file set: {}", .0.display())]
    DuplicatePath(PathBuf),

    /// The path is not absolute.
    #[error("Path is not absolute: {}", .0.display())]
    NotAbsolute(PathBuf),

    /// The path climbs out of the system root through a `..` component.
    #[error("Path escapes the system root: {}", .0.display())]
    EscapesRoot(PathBuf),

    /// The path was never registered.
    #[error("File not in file set: {}", .0.display())]
    NotRegistered(PathBuf),

    /// Writing a file beneath the system root failed.
    #[error("Failed writing file {}: {source}", .path.display())]
    Write {
        /// Destination path on disk.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/carthage.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/etc/carthage.json"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/carthage.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_unknown_dependency_display() {
        let e = ConfigError::UnknownDependency {
            unit: "app-conf".to_string(),
            dependency: "app-dir".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Unit 'app-conf' depends on unknown unit 'app-dir'"
        );
    }

    #[test]
    fn config_error_from_serde() {
        let err = serde_json::from_str::<Vec<u8>>("{").expect_err("invalid json");
        let e: ConfigError = err.into();
        assert!(e.to_string().starts_with("Invalid unit configuration"));
    }

    // -----------------------------------------------------------------------
    // PlanError
    // -----------------------------------------------------------------------

    #[test]
    fn plan_error_cycle_display() {
        let e = PlanError::DependencyCycle {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(e.to_string(), "Dependency cycle detected: a → b → a");
    }

    #[test]
    fn plan_error_self_cycle_display() {
        let e = PlanError::DependencyCycle {
            cycle: vec!["a".to_string(), "a".to_string()],
        };
        assert_eq!(e.to_string(), "Dependency cycle detected: a → a");
    }

    // -----------------------------------------------------------------------
    // FileSetError
    // -----------------------------------------------------------------------

    #[test]
    fn fileset_error_duplicate_display() {
        let e = FileSetError::DuplicatePath(PathBuf::from("/etc/motd"));
        assert_eq!(e.to_string(), "Duplicate file in file set: /etc/motd");
    }

    #[test]
    fn fileset_error_not_absolute_display() {
        let e = FileSetError::NotAbsolute(PathBuf::from("etc/motd"));
        assert_eq!(e.to_string(), "Path is not absolute: etc/motd");
    }

    #[test]
    fn fileset_error_escapes_root_display() {
        let e = FileSetError::EscapesRoot(PathBuf::from("/../etc/motd"));
        assert_eq!(e.to_string(), "Path escapes the system root: /../etc/motd");
    }

    // -----------------------------------------------------------------------
    // CarthageError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn carthage_error_from_plan_error() {
        let e: CarthageError = PlanError::DependencyCycle {
            cycle: vec!["x".to_string(), "x".to_string()],
        }
        .into();
        assert!(e.to_string().starts_with("Planning error"));
    }

    #[test]
    fn carthage_error_from_graph_error() {
        let e: CarthageError = GraphError::DuplicateUnit("root".to_string()).into();
        assert_eq!(
            e.to_string(),
            "Graph error: Unit 'root' is already registered"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<CarthageError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<GraphError>();
        assert_send_sync::<PlanError>();
        assert_send_sync::<FileSetError>();
    }

    #[test]
    fn plan_error_converts_to_anyhow() {
        let e = PlanError::DependencyCycle { cycle: vec![] };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
