//! Unit configuration: decoding the JSON unit list.
//!
//! A configuration file is an ordered JSON array of units:
//!
//! ```json
//! [
//!   { "name": "app-dir", "type": "EnsureDir",
//!     "spec": { "path": "/etc/app", "mode": "0755" } },
//!   { "name": "app-conf", "deps": ["app-dir"], "type": "EnsureFile",
//!     "spec": { "path": "/etc/app/app.conf", "contents": { "data": "x = 1\n" } } }
//! ]
//! ```
//!
//! Decoding happens in two stages: the outer unit object first, then its
//! `spec` against the variant named by `type`. Unknown fields are rejected
//! at both stages, and so is an unknown `type`.
pub mod validation;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::error::ConfigError;

/// Minimum length for octal mode strings.
const OCTAL_MODE_MIN_LEN: usize = 3;

/// Maximum length for octal mode strings.
const OCTAL_MODE_MAX_LEN: usize = 4;

/// Action type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ActionKind {
    /// Ensure a directory exists.
    EnsureDir,
    /// Ensure a file exists with given contents.
    EnsureFile,
}

/// Where the contents of an ensured file come from.
///
/// Inline `data` takes precedence over `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// File to copy contents from; relative paths resolve against the
    /// configuration file's directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Inline contents.
    #[serde(default)]
    pub data: Option<String>,
}

impl DataSource {
    /// Whether neither inline data nor a source path is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.path.is_none() && self.data.is_none()
    }

    /// Read the contents, resolving a relative source path against `base`.
    ///
    /// An empty source yields empty contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the source file cannot be read.
    pub fn load(&self, base: &Path) -> Result<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let source = base.join(path);
        std::fs::read(&source).with_context(|| format!("reading contents: {}", source.display()))
    }
}

/// Attributes of a directory that must exist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsureDirSpec {
    /// Absolute target path.
    pub path: PathBuf,
    /// Owning user; empty when unmanaged.
    #[serde(default)]
    pub user: String,
    /// Owning group; empty when unmanaged.
    #[serde(default)]
    pub group: String,
    /// Octal permission mode (e.g. `"0755"`); empty when unmanaged.
    #[serde(default)]
    pub mode: String,
}

/// Attributes and contents of a file that must exist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsureFileSpec {
    /// Absolute target path.
    pub path: PathBuf,
    /// Owning user; empty when unmanaged.
    #[serde(default)]
    pub user: String,
    /// Owning group; empty when unmanaged.
    #[serde(default)]
    pub group: String,
    /// Octal permission mode (e.g. `"0644"`); empty when unmanaged.
    #[serde(default)]
    pub mode: String,
    /// Where the file contents come from.
    #[serde(default)]
    pub contents: DataSource,
}

/// Borrowed view of the attributes shared by every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata<'a> {
    /// Absolute target path.
    pub path: &'a Path,
    /// Owning user.
    pub user: &'a str,
    /// Owning group.
    pub group: &'a str,
    /// Octal permission mode.
    pub mode: &'a str,
}

/// A decoded action, one variant per [`ActionKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ensure a directory exists.
    EnsureDir(EnsureDirSpec),
    /// Ensure a file exists.
    EnsureFile(EnsureFileSpec),
}

impl Action {
    /// The type tag of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::EnsureDir(_) => ActionKind::EnsureDir,
            Self::EnsureFile(_) => ActionKind::EnsureFile,
        }
    }

    /// Target path of the action.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.metadata().path
    }

    /// Shared file attributes.
    #[must_use]
    pub fn metadata(&self) -> FileMetadata<'_> {
        match self {
            Self::EnsureDir(spec) => FileMetadata {
                path: &spec.path,
                user: &spec.user,
                group: &spec.group,
                mode: &spec.mode,
            },
            Self::EnsureFile(spec) => FileMetadata {
                path: &spec.path,
                user: &spec.user,
                group: &spec.group,
                mode: &spec.mode,
            },
        }
    }
}

/// A fully decoded unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    /// Unique unit name.
    pub name: String,
    /// Names of units that must complete first.
    pub deps: Vec<String>,
    /// What the unit ensures.
    pub action: Action,
}

/// First decoding stage: the unit envelope with an undecoded `spec`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnitSpec {
    name: String,
    #[serde(default)]
    deps: Vec<String>,
    #[serde(rename = "type")]
    kind: ActionKind,
    spec: serde_json::Value,
}

impl RawUnitSpec {
    fn resolve(self) -> Result<UnitSpec, ConfigError> {
        let action = match self.kind {
            ActionKind::EnsureDir => serde_json::from_value(self.spec).map(Action::EnsureDir),
            ActionKind::EnsureFile => serde_json::from_value(self.spec).map(Action::EnsureFile),
        }
        .map_err(|source| ConfigError::InvalidSpec {
            unit: self.name.clone(),
            source,
        })?;
        Ok(UnitSpec {
            name: self.name,
            deps: self.deps,
            action,
        })
    }
}

/// Decode a unit list from JSON text.
///
/// # Errors
///
/// Returns [`ConfigError::Decode`] for malformed JSON, unknown fields, or an
/// unknown action type, and [`ConfigError::InvalidSpec`] when a `spec` does
/// not match its type.
pub fn parse(text: &str) -> Result<Vec<UnitSpec>, ConfigError> {
    let raw: Vec<RawUnitSpec> = serde_json::from_str(text)?;
    raw.into_iter().map(RawUnitSpec::resolve).collect()
}

/// Parse an octal mode string of 3–4 digits. Returns `None` if invalid.
#[must_use]
pub fn octal_mode(mode: &str) -> Option<u32> {
    if !(OCTAL_MODE_MIN_LEN..=OCTAL_MODE_MAX_LEN).contains(&mode.len()) {
        return None;
    }
    if !mode.chars().all(|c| ('0'..='7').contains(&c)) {
        return None;
    }
    u32::from_str_radix(mode, 8).ok()
}

/// A loaded configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path the configuration was read from.
    pub path: PathBuf,
    /// Units in file order.
    pub units: Vec<UnitSpec>,
}

impl Config {
    /// Read and decode the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            units: parse(&text)?,
        })
    }

    /// Directory relative content paths resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Run every validator and collect the warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(&self.units)
    }
}
