//! Line-array file access shared by the injector and remover. Files are
//! treated as plain line arrays; no parsing, no syntax awareness.

use std::fs;
use std::path::Path;

use crate::error::{DebugCycleError, Result};

pub(crate) fn detect_separator(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Read a file into lines, remembering which separator joined them.
pub(crate) fn read_lines(path: &Path) -> Result<(Vec<String>, &'static str)> {
    let content = fs::read_to_string(path).map_err(|source| DebugCycleError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    let sep = detect_separator(&content);
    let lines = content.split(sep).map(str::to_string).collect();
    Ok((lines, sep))
}

pub(crate) fn write_lines(path: &Path, lines: &[String], sep: &str) -> Result<()> {
    fs::write(path, lines.join(sep)).map_err(|source| DebugCycleError::FileWrite {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}
