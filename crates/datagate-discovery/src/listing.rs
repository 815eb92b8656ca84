//! Shallow listing of a dataset directory.

use crate::DiscoveryError;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::fs;
use std::io;
use std::path::Path;

/// One directory entry of a dataset, tagged as file or directory.
///
/// `path` is relative to the dataset's logical sub-path so downstream
/// links stay catalog-agnostic.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileEntry {
    pub did: String,
    pub esc_did: String,
    pub name: String,
    pub is_dir: bool,
    pub path: String,
}

/// List the immediate entries of `path`, attaching the caller-relative
/// display path built from `sub_path`.
pub fn list_dir(did: &str, path: &Path, sub_path: &str) -> Result<Vec<FileEntry>, DiscoveryError> {
    let dir = fs::read_dir(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DiscoveryError::NotFound(path.display().to_string()),
        _ => DiscoveryError::IoError(e),
    })?;

    let esc_did = utf8_percent_encode(did, NON_ALPHANUMERIC).to_string();
    let mut entries = Vec::new();

    for entry in dir {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type()?.is_dir();
        let display_path = Path::new(sub_path).join(&name);

        entries.push(FileEntry {
            did: did.to_string(),
            esc_did: esc_did.clone(),
            name,
            is_dir,
            path: display_path.to_string_lossy().into_owned(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn entries_carry_sub_path_relative_display_paths() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = list_dir("/x/y/z", dir.path(), "scan/001").unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert!(!entries[0].is_dir);
        assert_eq!(entries[0].path, "scan/001/a.txt");
        assert_eq!(entries[1].name, "sub");
        assert!(entries[1].is_dir);
        assert_eq!(entries[1].path, "scan/001/sub");
    }

    #[test]
    fn did_is_escaped_for_links() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();

        let entries = list_dir("/beam=a/sample=b", dir.path(), "").unwrap();
        assert_eq!(entries[0].did, "/beam=a/sample=b");
        assert!(!entries[0].esc_did.contains('/'));
        assert!(!entries[0].esc_did.contains('='));
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        assert!(matches!(
            list_dir("did", &missing, ""),
            Err(DiscoveryError::NotFound(_))
        ));
    }
}
