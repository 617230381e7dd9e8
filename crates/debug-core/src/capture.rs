use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::error::{DebugCycleError, Result};

pub const CAPTURE_PREFIX: &str = "capture-";
pub const CAPTURE_SUFFIX: &str = ".log";

/// Environment override for the capture directory. Defaults to
/// `~/.claude/debug-captures` when unset.
pub const CAPTURE_DIR_ENV: &str = "DEBUG_CYCLE_CAPTURE_DIR";

/// Append-only directory of timestamped capture files.
///
/// Filenames are `capture-<ISO8601>.log` with `:` and `.` replaced by `-`,
/// so lexicographic order is chronological order and "latest" is a plain
/// sort. The directory is created lazily on first write; captures are never
/// overwritten or deleted by this store.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the capture directory from the environment, falling back to
    /// the per-user default.
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var(CAPTURE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Self::new(dir);
            }
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".claude").join("debug-captures"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one capture document, returning its path. Same-millisecond
    /// collisions get a numeric suffix so concurrent captures never share a
    /// file.
    pub fn save(&self, text: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| DebugCycleError::FileWrite {
            path: self.dir.display().to_string(),
            source,
        })?;

        let timestamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let mut path = self.dir.join(format!("{CAPTURE_PREFIX}{timestamp}{CAPTURE_SUFFIX}"));
        let mut attempt = 1u32;
        while path.exists() {
            path = self
                .dir
                .join(format!("{CAPTURE_PREFIX}{timestamp}-{attempt}{CAPTURE_SUFFIX}"));
            attempt += 1;
        }

        fs::write(&path, text).map_err(|source| DebugCycleError::FileWrite {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("saved capture to {}", path.display());
        Ok(path)
    }

    /// Explicit path if given, otherwise the most recent capture.
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => self.latest().ok_or(DebugCycleError::NoCapture),
        }
    }

    /// Lexicographically-last capture filename in the directory, or `None`
    /// when the directory is missing, empty, or holds no captures.
    pub fn latest(&self) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.dir).ok()?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with(CAPTURE_PREFIX) && n.ends_with(CAPTURE_SUFFIX))
            .collect();
        names.sort();
        names.pop().map(|name| self.dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureStore, CAPTURE_PREFIX, CAPTURE_SUFFIX};
    use crate::error::DebugCycleError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn save_creates_dir_and_names_by_convention() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path().join("captures"));

        let path = store.save("hello").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(CAPTURE_PREFIX));
        assert!(name.ends_with(CAPTURE_SUFFIX));
        let stem = name.trim_end_matches(CAPTURE_SUFFIX);
        assert!(
            !stem.contains(':') && !stem.contains('.'),
            "unsafe chars in {stem}"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn saves_never_overwrite() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let a = store.save("a").unwrap();
        let b = store.save("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(fs::read_to_string(&a).unwrap(), "a");
        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn latest_picks_lexicographically_last_capture() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());
        fs::write(temp.path().join("capture-2024-01-01T00-00-00-000Z.log"), "old").unwrap();
        fs::write(temp.path().join("capture-2025-06-01T00-00-00-000Z.log"), "new").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let latest = store.latest().unwrap();
        assert!(latest
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("2025-06-01"));
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());
        let explicit = Path::new("/tmp/some-capture.log");
        assert_eq!(store.resolve(Some(explicit)).unwrap(), explicit);
    }

    #[test]
    fn missing_or_empty_dir_yields_no_capture() {
        let temp = tempdir().unwrap();
        let missing = CaptureStore::new(temp.path().join("nope"));
        assert!(matches!(
            missing.resolve(None),
            Err(DebugCycleError::NoCapture)
        ));

        let empty = CaptureStore::new(temp.path());
        assert!(matches!(empty.resolve(None), Err(DebugCycleError::NoCapture)));
    }
}
