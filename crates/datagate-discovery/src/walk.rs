//! Best-effort recursive filtered walk.
//!
//! The walk accumulates matches and keeps going past per-entry failures
//! (permission denied, broken symlinks); only an inaccessible walk root is
//! terminal. Callers therefore see "complete success", "partial success
//! with warnings", and "total failure" as distinct outcomes instead of
//! relying on side-channel logs.

use crate::DiscoveryError;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sentinel pattern matching every regular file.
const MATCH_ALL: &str = "all";

/// Compiled file pattern: either the `"all"` sentinel or a regex matched
/// against the file's base name only, never the full path.
#[derive(Debug, Clone)]
pub enum FilePattern {
    All,
    Regex(Regex),
}

impl FilePattern {
    /// Compile `pattern`, failing with `InvalidPattern` before any
    /// traversal begins.
    pub fn parse(pattern: &str) -> Result<Self, DiscoveryError> {
        if pattern == MATCH_ALL {
            return Ok(FilePattern::All);
        }
        Regex::new(pattern)
            .map(FilePattern::Regex)
            .map_err(|e| DiscoveryError::InvalidPattern(e.to_string()))
    }

    fn matches(&self, file_name: &str) -> bool {
        match self {
            FilePattern::All => true,
            FilePattern::Regex(re) => re.is_match(file_name),
        }
    }
}

/// A non-fatal problem encountered during the walk.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WalkWarning {
    pub path: String,
    pub message: String,
}

/// Accumulated result of a recursive walk: matched files plus the
/// warnings for entries that could not be read.
#[derive(Debug, Default, serde::Serialize)]
pub struct WalkOutcome {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<WalkWarning>,
}

impl WalkOutcome {
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Recursively find all regular files under `root` whose base name
/// matches `pattern` (or every file for the `"all"` sentinel).
///
/// Directories never appear in the result. Per-entry read errors are
/// recorded as warnings and logged; an unreadable `root` is a terminal
/// error.
pub fn find_files(root: &Path, pattern: &str) -> Result<WalkOutcome, DiscoveryError> {
    let pattern = FilePattern::parse(pattern)?;

    // The root itself must be readable; anything deeper is best-effort
    let dir = fs::read_dir(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DiscoveryError::NotFound(root.display().to_string()),
        _ => DiscoveryError::IoError(e),
    })?;

    let mut outcome = WalkOutcome::default();
    walk_entries(dir, &pattern, &mut outcome);

    tracing::debug!(
        root = %root.display(),
        files = outcome.files.len(),
        warnings = outcome.warnings.len(),
        "recursive walk finished"
    );

    Ok(outcome)
}

fn walk_entries(dir: fs::ReadDir, pattern: &FilePattern, outcome: &mut WalkOutcome) {
    for entry in dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn(outcome, None, &e);
                continue;
            }
        };
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                warn(outcome, Some(&path), &e);
                continue;
            }
        };

        if file_type.is_dir() {
            match fs::read_dir(&path) {
                Ok(subdir) => walk_entries(subdir, pattern, outcome),
                Err(e) => warn(outcome, Some(&path), &e),
            }
        } else if file_type.is_file() {
            let name = entry.file_name();
            if pattern.matches(&name.to_string_lossy()) {
                outcome.files.push(path);
            }
        }
        // symlinks and other entry kinds are skipped
    }
}

fn warn(outcome: &mut WalkOutcome, path: Option<&Path>, error: &io::Error) {
    let path = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    tracing::warn!(path = %path, error = %error, "skipping unreadable entry during walk");
    outcome.warnings.push(WalkWarning {
        path,
        message: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    fn names(outcome: &WalkOutcome, root: &Path) -> BTreeSet<String> {
        outcome
            .files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn regex_matches_base_name_across_subtree() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("b.txt"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/c.png"));

        let outcome = find_files(dir.path(), r"\.png$").unwrap();

        assert!(!outcome.is_partial());
        assert_eq!(
            names(&outcome, dir.path()),
            BTreeSet::from(["a.png".to_string(), "sub/c.png".to_string()])
        );
    }

    #[test]
    fn all_sentinel_matches_every_file_and_skips_regex() {
        let dir = tempdir().unwrap();
        // metacharacters in names must not be interpreted
        touch(&dir.path().join("a(1).png"));
        touch(&dir.path().join("b[x].txt"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/c.png"));

        let outcome = find_files(dir.path(), "all").unwrap();

        assert_eq!(
            names(&outcome, dir.path()),
            BTreeSet::from([
                "a(1).png".to_string(),
                "b[x].txt".to_string(),
                "sub/c.png".to_string()
            ])
        );
    }

    #[test]
    fn directories_never_appear_in_results() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub.png")).unwrap();
        touch(&dir.path().join("a.png"));

        let outcome = find_files(dir.path(), r"\.png$").unwrap();
        assert_eq!(names(&outcome, dir.path()), BTreeSet::from(["a.png".to_string()]));
    }

    #[test]
    fn invalid_pattern_fails_before_traversal() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.png"));

        assert!(matches!(
            find_files(dir.path(), "("),
            Err(DiscoveryError::InvalidPattern(_))
        ));
    }

    #[test]
    fn missing_root_is_terminal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        assert!(matches!(
            find_files(&missing, "all"),
            Err(DiscoveryError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdir_yields_partial_result() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.png"));
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        touch(&locked.join("hidden.png"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits don't constrain root; nothing to assert there
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = find_files(dir.path(), r"\.png$").unwrap();

        // restore so tempdir cleanup works
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(outcome.is_partial());
        assert_eq!(names(&outcome, dir.path()), BTreeSet::from(["a.png".to_string()]));
        assert_eq!(outcome.warnings.len(), 1);
    }
}
