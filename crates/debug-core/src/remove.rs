use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::statement::REMOVAL_MARKER;
use crate::text::{read_lines, write_lines};

/// A line the remover stripped (or would strip, under dry run).
#[derive(Debug, Clone)]
pub struct RemovedLine {
    /// 1-based line number in the file as it was before removal.
    pub line: usize,
    /// Trimmed content of the removed line.
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub file: PathBuf,
    pub dry_run: bool,
    pub removed: Vec<RemovedLine>,
}

/// Strip every line containing [`REMOVAL_MARKER`] from the file.
///
/// Under `dry_run` the file is never written; the report lists the same
/// line numbers a real run would remove. When no marker lines exist the
/// report is empty and no write happens, dry run or not.
pub fn remove_logs(path: &Path, dry_run: bool) -> Result<RemoveReport> {
    let (lines, sep) = read_lines(path)?;

    let mut removed = Vec::new();
    let mut kept = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        if line.contains(REMOVAL_MARKER) {
            removed.push(RemovedLine {
                line: index + 1,
                content: line.trim().to_string(),
            });
        } else {
            kept.push(line);
        }
    }

    if !removed.is_empty() && !dry_run {
        write_lines(path, &kept, sep)?;
        log::debug!(
            "removed {} marker-tagged line(s) from {}",
            removed.len(),
            path.display()
        );
    }

    Ok(RemoveReport {
        file: path.to_path_buf(),
        dry_run,
        removed,
    })
}
