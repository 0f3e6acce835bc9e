//! Directories that must exist beneath the system root.
use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};

use crate::config::EnsureDirSpec;

use super::fs::{escapes_root, parse_mode, under_root};
use super::{Applicable, ResourceChange};

/// A directory that must exist, optionally with a given mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResource {
    /// On-disk path (already placed beneath the system root).
    pub target: PathBuf,
    /// Permission bits to apply, if managed.
    pub mode: Option<u32>,
}

impl DirectoryResource {
    /// Create a new directory resource.
    #[must_use]
    pub const fn new(target: PathBuf, mode: Option<u32>) -> Self {
        Self { target, mode }
    }

    /// Create from a config spec, placing the target beneath `sys_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `spec.path` contains a `..` component or
    /// `spec.mode` is set but is not valid octal.
    pub fn from_spec(spec: &EnsureDirSpec, sys_root: &Path) -> Result<Self> {
        if escapes_root(&spec.path) {
            bail!("path escapes the system root: {}", spec.path.display());
        }
        let mode = parse_mode(&spec.mode)?;
        Ok(Self::new(under_root(sys_root, &spec.path), mode))
    }

    /// Whether the directory already exists with the desired mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the target exists but is not a directory, or its
    /// metadata cannot be read.
    pub fn is_correct(&self) -> Result<bool> {
        if !self.target.exists() {
            return Ok(false);
        }
        if !self.target.is_dir() {
            bail!("target exists and is not a directory: {}", self.target.display());
        }
        #[cfg(unix)]
        {
            if let Some(mode) = self.mode {
                return Ok(super::fs::current_mode(&self.target)? == mode);
            }
        }
        Ok(true)
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        match self.mode {
            Some(mode) => format!("{} ({mode:o})", self.target.display()),
            None => self.target.display().to_string(),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.is_correct()? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        std::fs::create_dir_all(&self.target)
            .with_context(|| format!("create directory: {}", self.target.display()))?;
        if let Some(mode) = self.mode {
            super::fs::set_mode(&self.target, mode)?;
        }
        Ok(ResourceChange::Applied)
    }
}
