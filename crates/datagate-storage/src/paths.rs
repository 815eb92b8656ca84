//! Path resolution shared by backends and the dataset handlers.
//!
//! Joins a storage root, a relative directory, and an optional sub-path or
//! filename using path-segment semantics. Segments that would escape the
//! root (`..`, absolute paths, Windows prefixes) are rejected with
//! `StorageError::InvalidPath`.

use crate::traits::{StorageError, StorageResult};
use std::path::{Component, Path, PathBuf};

/// Resolve `root/dir[/file]` into a single absolute path.
///
/// `dir` and `file` may contain multiple segments (`a/b/c`); each segment
/// is validated so the resolved path stays within `root`.
pub fn resolve(root: &Path, dir: &str, file: Option<&str>) -> StorageResult<PathBuf> {
    let mut path = root.to_path_buf();
    push_checked(&mut path, dir)?;
    if let Some(file) = file {
        push_checked(&mut path, file)?;
    }
    Ok(path)
}

fn push_checked(path: &mut PathBuf, segment: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Ok(());
    }
    for component in Path::new(segment).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(format!(
                    "path segment {:?} escapes the storage root",
                    segment
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segments_without_duplicate_separators() {
        let path = resolve(Path::new("/data"), "projects/", Some("a.txt")).unwrap();
        assert_eq!(path, PathBuf::from("/data/projects/a.txt"));
    }

    #[test]
    fn empty_segments_are_ignored() {
        let path = resolve(Path::new("/data"), "", None).unwrap();
        assert_eq!(path, PathBuf::from("/data"));

        let path = resolve(Path::new("/data"), "projects", Some("")).unwrap();
        assert_eq!(path, PathBuf::from("/data/projects"));
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        assert!(matches!(
            resolve(Path::new("/data"), "../etc", None),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve(Path::new("/data"), "projects", Some("../../etc/passwd")),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve(Path::new("/data"), "a/../../b", None),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn rejects_absolute_segments() {
        assert!(matches!(
            resolve(Path::new("/data"), "/etc", None),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve(Path::new("/data"), "projects", Some("/etc/passwd")),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn current_dir_segments_are_dropped() {
        let path = resolve(Path::new("/data"), "./projects/./sub", None).unwrap();
        assert_eq!(path, PathBuf::from("/data/projects/sub"));
    }
}
