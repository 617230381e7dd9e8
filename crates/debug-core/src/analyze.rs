use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::capture::CaptureStore;
use crate::error::{DebugCycleError, Result};
use crate::statement::DEBUG_TAG;

const MAX_SEARCH_MATCHES: usize = 20;
const MAX_ERROR_LINES: usize = 20;
const MAX_DEBUG_LINES: usize = 30;

/// Heuristic error signatures: generic failure tokens plus a few
/// language-specific exception names.
static ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"error[:\s]",
        r"exception[:\s]",
        r"failed[:\s]",
        r"fatal[:\s]",
        r"TypeError",
        r"ReferenceError",
        r"SyntaxError",
        r"cannot ",
        r"undefined is not",
        r"null is not",
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("fixed error pattern")
    })
    .collect()
});

/// Which report sections to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Errors,
    Debug,
    Flow,
    #[default]
    All,
}

impl Focus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "errors" => Some(Focus::Errors),
            "debug" => Some(Focus::Debug),
            "flow" => Some(Focus::Flow),
            "all" => Some(Focus::All),
            _ => None,
        }
    }

    fn covers_errors(self) -> bool {
        matches!(self, Focus::Errors | Focus::All)
    }

    fn covers_debug(self) -> bool {
        matches!(self, Focus::Debug | Focus::All)
    }

    fn covers_flow(self) -> bool {
        matches!(self, Focus::Flow | Focus::All)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    /// Explicit capture path; defaults to the most recent capture.
    pub capture_file: Option<PathBuf>,
    pub focus: Focus,
    /// Case-insensitive regex searched over the whole capture.
    pub search_pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    FixErrors,
    ReviewDebugValues,
    AddMoreLogs,
}

impl Recommendation {
    pub fn as_text(&self) -> &'static str {
        match self {
            Recommendation::FixErrors => "Fix the errors listed above.",
            Recommendation::ReviewDebugValues => {
                "Review debug log values for unexpected data."
            }
            Recommendation::AddMoreLogs => "Add more debug logs to trace the issue.",
        }
    }
}

/// Derived, non-persisted analysis of one capture file. Error and debug
/// lines are always computed (the summary needs their counts); `focus`
/// controls which sections [`AnalysisReport::render`] emits.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub capture_path: PathBuf,
    pub focus: Focus,
    pub total_lines: usize,
    /// Matches for the optional search pattern, in document order.
    pub search: Option<SearchMatches>,
    /// Deduplicated error lines in first-seen order.
    pub error_lines: Vec<String>,
    /// Marker-tagged lines in file order, trimmed.
    pub debug_lines: Vec<String>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone)]
pub struct SearchMatches {
    pub pattern: String,
    pub matches: Vec<String>,
}

/// Analyze a capture (explicit or most recent) into a structured report.
pub fn analyze_capture(store: &CaptureStore, request: &AnalyzeRequest) -> Result<AnalysisReport> {
    let capture_path = store.resolve(request.capture_file.as_deref())?;
    let content =
        fs::read_to_string(&capture_path).map_err(|source| DebugCycleError::FileRead {
            path: capture_path.display().to_string(),
            source,
        })?;

    let search = match &request.search_pattern {
        Some(pattern) => Some(run_search(pattern, &content)?),
        None => None,
    };

    let error_lines = extract_errors(&content);
    let debug_lines = extract_debug_lines(&content);

    let recommendation = if !error_lines.is_empty() {
        Recommendation::FixErrors
    } else if !debug_lines.is_empty() {
        Recommendation::ReviewDebugValues
    } else {
        Recommendation::AddMoreLogs
    };

    Ok(AnalysisReport {
        capture_path,
        focus: request.focus,
        total_lines: content.split('\n').count(),
        search,
        error_lines,
        debug_lines,
        recommendation,
    })
}

fn run_search(pattern: &str, content: &str) -> Result<SearchMatches> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| DebugCycleError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    let matches = regex
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect();
    Ok(SearchMatches {
        pattern: pattern.to_string(),
        matches,
    })
}

fn extract_errors(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for line in content.split('\n') {
        if ERROR_PATTERNS.iter().any(|p| p.is_match(line)) {
            let trimmed = line.trim().to_string();
            if seen.insert(trimmed.clone()) {
                errors.push(trimmed);
            }
        }
    }
    errors
}

fn extract_debug_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .filter(|line| line.contains(DEBUG_TAG))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Message part of a marker-tagged line: everything after the tag.
fn flow_message(line: &str) -> &str {
    match line.find(DEBUG_TAG) {
        Some(idx) => line[idx + DEBUG_TAG.len()..].trim_start(),
        None => line,
    }
}

impl AnalysisReport {
    /// Render the multi-section markdown report.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();
        let name = self
            .capture_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.capture_path.display().to_string());
        sections.push(format!("# Debug Analysis: {name}"));
        sections.push(String::new());

        if let Some(search) = &self.search {
            sections.push(format!("## Pattern Search: {}", search.pattern));
            if search.matches.is_empty() {
                sections.push("No matches found.".to_string());
            } else {
                sections.push(format!("Found {} matches:", search.matches.len()));
                for m in search.matches.iter().take(MAX_SEARCH_MATCHES) {
                    sections.push(format!("  - {m}"));
                }
                if search.matches.len() > MAX_SEARCH_MATCHES {
                    sections.push(format!(
                        "  ... and {} more",
                        search.matches.len() - MAX_SEARCH_MATCHES
                    ));
                }
            }
            sections.push(String::new());
        }

        if self.focus.covers_errors() {
            sections.push("## Errors Found".to_string());
            if self.error_lines.is_empty() {
                sections.push("No obvious errors detected.".to_string());
            } else {
                for line in self.error_lines.iter().take(MAX_ERROR_LINES) {
                    sections.push(format!("- {line}"));
                }
                if self.error_lines.len() > MAX_ERROR_LINES {
                    sections.push(format!(
                        "... and {} more",
                        self.error_lines.len() - MAX_ERROR_LINES
                    ));
                }
            }
            sections.push(String::new());
        }

        if self.focus.covers_debug() {
            sections.push("## Debug Logs".to_string());
            if self.debug_lines.is_empty() {
                sections.push(format!("No {DEBUG_TAG} logs found."));
            } else {
                sections.push(format!(
                    "Found {} debug log entries:",
                    self.debug_lines.len()
                ));
                for line in self.debug_lines.iter().take(MAX_DEBUG_LINES) {
                    sections.push(format!("  {line}"));
                }
                if self.debug_lines.len() > MAX_DEBUG_LINES {
                    sections.push(format!(
                        "  ... and {} more",
                        self.debug_lines.len() - MAX_DEBUG_LINES
                    ));
                }
            }
            sections.push(String::new());
        }

        if self.focus.covers_flow() {
            sections.push("## Execution Flow".to_string());
            if self.debug_lines.is_empty() {
                sections.push("No debug logs found to analyze flow.".to_string());
            } else {
                sections.push(format!(
                    "Execution flow ({} debug points):",
                    self.debug_lines.len()
                ));
                sections.push(String::new());
                for (i, line) in self.debug_lines.iter().enumerate() {
                    sections.push(format!("{}. {}", i + 1, flow_message(line)));
                }
            }
            sections.push(String::new());
        }

        sections.push("## Summary".to_string());
        sections.push(format!("- Total lines: {}", self.total_lines));
        sections.push(format!("- Errors detected: {}", self.error_lines.len()));
        sections.push(format!("- Debug log entries: {}", self.debug_lines.len()));
        sections.push(format!(
            "\n**Recommendation:** {}",
            self.recommendation.as_text()
        ));

        sections.join("\n")
    }
}
