//! In-memory staging of file contents, written beneath a system root.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::FileSetError;

use super::fs::{escapes_root, under_root};

#[derive(Debug, Clone)]
struct StagedFile {
    contents: Vec<u8>,
    mode: Option<u32>,
}

/// A set of files to write, keyed by absolute target path.
///
/// Files are registered first and then written one at a time with
/// [`write`](Self::write) or all together with [`flush`](Self::flush).
/// Registration outlives the write, so a later duplicate is still caught.
/// Every target lands beneath `sys_root`; use `/` for a real run.
///
/// # Examples
///
/// ```
/// use carthage::resources::fileset::FileSet;
///
/// let mut files = FileSet::new("/tmp/carthage");
/// files.add_file("/etc/motd", b"hello".to_vec()).unwrap();
/// assert!(files.add_file("/etc/motd", Vec::new()).is_err());
/// assert!(files.add_file("etc/motd", Vec::new()).is_err());
/// assert!(files.add_file("/../motd", Vec::new()).is_err());
/// assert_eq!(files.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FileSet {
    files: BTreeMap<PathBuf, StagedFile>,
    sys_root: PathBuf,
}

impl FileSet {
    /// Create an empty set that writes beneath `sys_root`.
    #[must_use]
    pub fn new(sys_root: impl Into<PathBuf>) -> Self {
        Self {
            files: BTreeMap::new(),
            sys_root: sys_root.into(),
        }
    }

    /// The directory every file is written beneath.
    #[must_use]
    pub fn sys_root(&self) -> &Path {
        &self.sys_root
    }

    /// Register `contents` for the absolute `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FileSetError::DuplicatePath`] if `path` is already
    /// registered, [`FileSetError::NotAbsolute`] if it is relative, and
    /// [`FileSetError::EscapesRoot`] if it contains a `..` component.
    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        contents: Vec<u8>,
    ) -> Result<(), FileSetError> {
        self.add_file_with_mode(path, contents, None)
    }

    /// Register `contents` for `path`, applying `mode` once written.
    ///
    /// # Errors
    ///
    /// Same as [`add_file`](Self::add_file).
    pub fn add_file_with_mode(
        &mut self,
        path: impl Into<PathBuf>,
        contents: Vec<u8>,
        mode: Option<u32>,
    ) -> Result<(), FileSetError> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(FileSetError::DuplicatePath(path));
        }
        if !path.is_absolute() {
            return Err(FileSetError::NotAbsolute(path));
        }
        if escapes_root(&path) {
            return Err(FileSetError::EscapesRoot(path));
        }
        self.files.insert(path, StagedFile { contents, mode });
        Ok(())
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Registered target paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Where `path` will be written on disk.
    #[must_use]
    pub fn destination(&self, path: &Path) -> PathBuf {
        under_root(&self.sys_root, path)
    }

    /// Whether the destination of the registered `path` already holds its
    /// contents (and its mode, on Unix).
    ///
    /// Unregistered paths and unreadable destinations are never current.
    #[must_use]
    pub fn is_current(&self, path: &Path) -> bool {
        let Some(staged) = self.files.get(path) else {
            return false;
        };
        let dest = self.destination(path);
        if std::fs::read(&dest).ok().as_deref() != Some(staged.contents.as_slice()) {
            return false;
        }
        #[cfg(unix)]
        {
            if let Some(mode) = staged.mode {
                return super::fs::current_mode(&dest).is_ok_and(|m| m == mode);
            }
        }
        true
    }

    /// Write the registered `path` beneath the system root, creating parent
    /// directories as needed.
    ///
    /// Returns the on-disk destination.
    ///
    /// # Errors
    ///
    /// Returns [`FileSetError::NotRegistered`] for an unknown path and
    /// [`FileSetError::Write`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<PathBuf, FileSetError> {
        let staged = self
            .files
            .get(path)
            .ok_or_else(|| FileSetError::NotRegistered(path.to_path_buf()))?;
        self.write_staged(path, staged)
    }

    /// Write every registered file beneath the system root.
    ///
    /// Returns the on-disk destinations in write order.
    ///
    /// # Errors
    ///
    /// Returns [`FileSetError::Write`] on the first file that cannot be
    /// written; files before it stay written.
    pub fn flush(&self) -> Result<Vec<PathBuf>, FileSetError> {
        self.files
            .iter()
            .map(|(path, staged)| self.write_staged(path, staged))
            .collect()
    }

    fn write_staged(&self, path: &Path, staged: &StagedFile) -> Result<PathBuf, FileSetError> {
        let dest = self.destination(path);
        write_file(&dest, staged).map_err(|source| FileSetError::Write {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}

fn write_file(dest: &Path, staged: &StagedFile) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, &staged.contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = staged.mode {
            std::fs::set_permissions(dest, std::fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn add_file_rejects_duplicates() {
        let mut files = FileSet::new("/");
        files.add_file("/etc/a", b"1".to_vec()).unwrap();
        let err = files.add_file("/etc/a", b"2".to_vec()).unwrap_err();
        assert!(matches!(err, FileSetError::DuplicatePath(p) if p == Path::new("/etc/a")));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn add_file_rejects_relative_paths() {
        let mut files = FileSet::new("/");
        let err = files.add_file("etc/a", Vec::new()).unwrap_err();
        assert!(matches!(err, FileSetError::NotAbsolute(_)));
        assert!(files.is_empty());
    }

    #[test]
    fn add_file_rejects_parent_components() {
        let mut files = FileSet::new("/srv/root");
        let err = files.add_file("/../escaped", Vec::new()).unwrap_err();
        assert!(matches!(err, FileSetError::EscapesRoot(_)));
        assert!(files.is_empty());
    }

    #[test]
    fn paths_are_sorted() {
        let mut files = FileSet::new("/");
        files.add_file("/b", Vec::new()).unwrap();
        files.add_file("/a", Vec::new()).unwrap();
        let paths: Vec<&Path> = files.paths().collect();
        assert_eq!(paths, [Path::new("/a"), Path::new("/b")]);
    }

    #[test]
    fn flush_writes_beneath_sys_root() {
        let root = tempfile::tempdir().unwrap();
        let mut files = FileSet::new(root.path());
        files.add_file("/etc/app/app.conf", b"key = value\n".to_vec()).unwrap();
        files.add_file("/motd", b"hi".to_vec()).unwrap();

        let written = files.flush().unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read(root.path().join("etc/app/app.conf")).unwrap(),
            b"key = value\n"
        );
        assert_eq!(std::fs::read(root.path().join("motd")).unwrap(), b"hi");
    }

    #[test]
    fn flush_overwrites_existing_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("motd"), "old").unwrap();
        let mut files = FileSet::new(root.path());
        files.add_file("/motd", b"new".to_vec()).unwrap();
        files.flush().unwrap();
        assert_eq!(std::fs::read(root.path().join("motd")).unwrap(), b"new");
    }

    #[test]
    fn flush_reports_write_failure() {
        let root = tempfile::tempdir().unwrap();
        // A file where a directory is needed.
        std::fs::write(root.path().join("etc"), "not a dir").unwrap();
        let mut files = FileSet::new(root.path());
        files.add_file("/etc/motd", b"x".to_vec()).unwrap();
        let err = files.flush().unwrap_err();
        assert!(matches!(err, FileSetError::Write { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn flush_applies_mode() {
        use crate::resources::fs::current_mode;

        let root = tempfile::tempdir().unwrap();
        let mut files = FileSet::new(root.path());
        files
            .add_file_with_mode("/secret", b"s".to_vec(), Some(0o600))
            .unwrap();
        files.flush().unwrap();
        assert_eq!(current_mode(&root.path().join("secret")).unwrap(), 0o600);
    }

    #[test]
    fn write_handles_one_file_at_a_time() {
        let root = tempfile::tempdir().unwrap();
        let mut files = FileSet::new(root.path());
        files.add_file("/a", b"a".to_vec()).unwrap();
        files.add_file("/b", b"b".to_vec()).unwrap();

        let dest = files.write(Path::new("/a")).unwrap();

        assert_eq!(dest, root.path().join("a"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"a");
        assert!(!root.path().join("b").exists());
    }

    #[test]
    fn write_rejects_unregistered_path() {
        let root = tempfile::tempdir().unwrap();
        let files = FileSet::new(root.path());
        let err = files.write(Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, FileSetError::NotRegistered(_)));
    }

    #[test]
    fn is_current_compares_destination_bytes() {
        let root = tempfile::tempdir().unwrap();
        let mut files = FileSet::new(root.path());
        files.add_file("/motd", b"hello".to_vec()).unwrap();
        assert!(!files.is_current(Path::new("/motd")));

        std::fs::write(root.path().join("motd"), "other").unwrap();
        assert!(!files.is_current(Path::new("/motd")));

        files.write(Path::new("/motd")).unwrap();
        assert!(files.is_current(Path::new("/motd")));
        assert!(!files.is_current(Path::new("/unregistered")));
    }

    #[cfg(unix)]
    #[test]
    fn is_current_checks_mode() {
        use crate::resources::fs::set_mode;

        let root = tempfile::tempdir().unwrap();
        let mut files = FileSet::new(root.path());
        files
            .add_file_with_mode("/secret", b"s".to_vec(), Some(0o600))
            .unwrap();
        files.write(Path::new("/secret")).unwrap();
        assert!(files.is_current(Path::new("/secret")));

        set_mode(&root.path().join("secret"), 0o644).unwrap();
        assert!(!files.is_current(Path::new("/secret")));
    }

    #[test]
    fn empty_flush_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let files = FileSet::new(root.path().join("never-created"));
        assert!(files.flush().unwrap().is_empty());
        assert!(!root.path().join("never-created").exists());
    }
}
