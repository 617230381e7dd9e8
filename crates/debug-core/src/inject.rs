use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::language::Language;
use crate::statement::{render_statement, LogStyle};
use crate::text::{leading_whitespace, read_lines, write_lines};

/// One requested insertion point. `line` is 1-based in the coordinates of
/// the file as it exists before the call; the statement is inserted
/// immediately after that line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub line: usize,
    pub message: String,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InjectReport {
    pub file: PathBuf,
    pub language: Language,
    /// Echo of the accepted locations, in request order.
    pub applied: Vec<LogLocation>,
}

/// Insert one synthesized statement after each requested line, copying the
/// target line's indentation, and rewrite the file in place.
///
/// The read happens before any write, so a missing or unreadable file
/// leaves the target untouched. Locations are processed in descending line
/// order so earlier insertions never shift later targets. A target line
/// past the end of the file is accepted with empty indentation and lands at
/// the end of the file; out-of-range targets are a designed leniency, not
/// an error.
pub fn inject_logs(
    path: &Path,
    locations: &[LogLocation],
    style: Option<LogStyle>,
) -> Result<InjectReport> {
    let (mut lines, sep) = read_lines(path)?;
    let language = Language::from_path(path);

    let mut sorted: Vec<&LogLocation> = locations.iter().collect();
    sorted.sort_by(|a, b| b.line.cmp(&a.line));

    for loc in sorted {
        let statement = render_statement(language, &loc.message, &loc.variables, style);
        let indent = if loc.line == 0 {
            String::new()
        } else {
            lines
                .get(loc.line - 1)
                .map(|l| leading_whitespace(l).to_string())
                .unwrap_or_default()
        };
        let insert_at = loc.line.min(lines.len());
        lines.insert(insert_at, format!("{indent}{statement}"));
    }

    write_lines(path, &lines, sep)?;
    log::debug!(
        "injected {} log statement(s) into {} ({})",
        locations.len(),
        path.display(),
        language.as_str()
    );

    Ok(InjectReport {
        file: path.to_path_buf(),
        language,
        applied: locations.to_vec(),
    })
}
