//! File-system resource helpers.
use anyhow::{Context as _, Result, bail};
use std::path::{Component, Path, PathBuf};

use crate::config::octal_mode;

/// Map an absolute target `path` to its location beneath `root`.
///
/// `Path::join` would discard `root` for an absolute argument, so the
/// leading root component (and any prefix) is dropped first. Parent
/// components are kept as they are; check [`escapes_root`] before writing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use carthage::resources::fs::under_root;
///
/// assert_eq!(
///     under_root(Path::new("/tmp/carthage"), Path::new("/etc/motd")),
///     Path::new("/tmp/carthage/etc/motd"),
/// );
/// assert_eq!(under_root(Path::new("/"), Path::new("/etc/motd")), Path::new("/etc/motd"));
/// ```
#[must_use]
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    root.join(relative)
}

/// Whether `path` contains a `..` component.
///
/// Such a path can land outside the system root once mapped by
/// [`under_root`], so every resource refuses it.
#[must_use]
pub fn escapes_root(path: &Path) -> bool {
    path.components().any(|c| c == Component::ParentDir)
}

/// Parse an optional mode string; an empty string leaves the mode unmanaged.
///
/// # Errors
///
/// Returns an error if `mode` is set but is not 3-4 octal digits.
pub fn parse_mode(mode: &str) -> Result<Option<u32>> {
    if mode.is_empty() {
        return Ok(None);
    }
    match octal_mode(mode) {
        Some(bits) => Ok(Some(bits)),
        None => bail!("invalid octal mode: {mode}"),
    }
}

/// Current permission bits of `path` (Unix only).
///
/// # Errors
///
/// Returns an error if the metadata cannot be read.
#[cfg(unix)]
pub fn current_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    let meta =
        std::fs::metadata(path).with_context(|| format!("read metadata: {}", path.display()))?;
    Ok(meta.permissions().mode() & 0o7777)
}

/// Set the permission bits of `path` (Unix only; a no-op elsewhere).
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("set permissions: {}", path.display()))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn under_root_nests_absolute_paths() {
        assert_eq!(
            under_root(Path::new("/srv/root"), Path::new("/etc/app/app.conf")),
            PathBuf::from("/srv/root/etc/app/app.conf")
        );
    }

    #[test]
    fn under_root_keeps_relative_paths() {
        assert_eq!(
            under_root(Path::new("/srv/root"), Path::new("etc/app")),
            PathBuf::from("/srv/root/etc/app")
        );
    }

    #[test]
    fn escapes_root_detects_parent_components() {
        assert!(escapes_root(Path::new("/../x")));
        assert!(escapes_root(Path::new("/etc/../../x")));
        assert!(!escapes_root(Path::new("/etc/app/app.conf")));
        assert!(!escapes_root(Path::new("/etc/..hidden")));
    }

    #[test]
    fn parse_mode_accepts_octal_and_empty() {
        assert_eq!(parse_mode("0644").unwrap(), Some(0o644));
        assert_eq!(parse_mode("755").unwrap(), Some(0o755));
        assert_eq!(parse_mode("").unwrap(), None);
    }

    #[test]
    fn parse_mode_rejects_garbage() {
        assert!(parse_mode("rwx").is_err());
        assert!(parse_mode("0999").is_err());
        assert!(parse_mode("12").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn set_mode_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        set_mode(&file, 0o640).unwrap();
        assert_eq!(current_mode(&file).unwrap(), 0o640);
    }
}
