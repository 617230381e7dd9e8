//! # Debug Cycle Core
//!
//! Engine for the instrument / run / analyze / clean-up debugging loop.
//!
//! ## Pipeline
//!
//! ```text
//! Source file
//!     │
//!     ├──> Injector (language-aware statements, marker-tagged)
//!     │      └─> Instrumented file
//!     │
//!     ├──> Runner (no-shell subprocess, bounded buffers, timeout)
//!     │      └─> Capture Store (timestamped files on disk)
//!     │
//!     ├──> Analyzer (errors, debug lines, execution flow, search)
//!     │      └─> Markdown report
//!     │
//!     └──> Remover (strips marker-tagged lines)
//! ```
//!
//! Every operation is stateless: the marker convention embedded in source
//! text and the capture files on disk are the only state shared between
//! calls.

mod analyze;
mod capture;
mod error;
mod inject;
mod language;
mod remove;
mod runner;
mod statement;
mod text;

pub use analyze::{
    analyze_capture, AnalysisReport, AnalyzeRequest, Focus, Recommendation, SearchMatches,
};
pub use capture::{CaptureStore, CAPTURE_DIR_ENV, CAPTURE_PREFIX, CAPTURE_SUFFIX};
pub use error::{DebugCycleError, Result};
pub use inject::{inject_logs, InjectReport, LogLocation};
pub use language::Language;
pub use remove::{remove_logs, RemoveReport, RemovedLine};
pub use runner::{
    capture_output, CaptureReport, CaptureRequest, ExitOutcome, DEFAULT_TIMEOUT_MS,
    MAX_CAPTURE_BYTES, MAX_DISPLAY_CHARS,
};
pub use statement::{render_statement, LogStyle, DEBUG_TAG, REMOVAL_MARKER};
