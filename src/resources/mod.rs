//! Filesystem side effects for planned units.
//!
//! - [`directory`]: directories that must exist
//! - [`fileset`]: files registered in memory and written beneath a system root
//! - [`fs`]: path and permission helpers
//!
//! Every target path is absolute and is written beneath a configurable
//! system root, so pointing the root at a scratch directory gives a dry
//! run against a throwaway tree.
pub mod directory;
pub mod fileset;
pub mod fs;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O
    /// failures, permission issues, or invalid attributes.
    fn apply(&self) -> Result<ResourceChange>;
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use carthage::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}
