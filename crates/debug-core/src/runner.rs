use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::capture::CaptureStore;
use crate::error::{DebugCycleError, Result};
use crate::statement::DEBUG_TAG;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Cap on each of stdout/stderr; bytes past the cap are drained and dropped.
pub const MAX_CAPTURE_BYTES: usize = 10 * 1024 * 1024;

/// Display ceiling for the text returned to the caller. The persisted
/// capture file always holds the full document.
pub const MAX_DISPLAY_CHARS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout_ms: u64,
    /// Restrict the displayed text to marker-tagged lines.
    pub filter_debug: bool,
}

impl CaptureRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            filter_debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failed(Option<i32>),
    TimedOut(u64),
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// Exit-code text used in the failure header.
    pub fn code_label(&self) -> String {
        match self {
            ExitOutcome::Success => "0".to_string(),
            ExitOutcome::Failed(Some(code)) => code.to_string(),
            ExitOutcome::Failed(None) => "unknown".to_string(),
            ExitOutcome::TimedOut(ms) => format!("unknown (timed out after {ms} ms)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub capture_path: PathBuf,
    pub outcome: ExitOutcome,
    /// Command plus arguments as invoked, for the caller-facing header.
    pub command_line: String,
    /// Filtered/truncated text to show the caller.
    pub display: String,
}

/// Run a command without shell interpretation and persist its combined
/// output as one capture file, regardless of how the command exits.
///
/// Non-zero exit and timeout are not errors of this function; the capture
/// is still written and reported. Only a spawn failure (command not found,
/// permission denied) surfaces as an error, since it produces no output at
/// all.
pub async fn capture_output(
    store: &CaptureStore,
    request: &CaptureRequest,
) -> Result<CaptureReport> {
    let mut cmd = Command::new(&request.command);
    cmd.args(&request.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &request.cwd {
        cmd.current_dir(cwd);
    }

    let mut child = cmd.spawn().map_err(|source| DebugCycleError::Spawn {
        command: request.command.clone(),
        source,
    })?;

    // Read both pipes into shared buffers off-task, so a full pipe never
    // deadlocks the child and partial output survives a timeout kill even
    // when an orphaned grandchild keeps the pipe open.
    let stdout_buf = Arc::new(Mutex::new(Vec::new()));
    let stderr_buf = Arc::new(Mutex::new(Vec::new()));
    let stdout_task = spawn_reader(child.stdout.take(), Arc::clone(&stdout_buf));
    let stderr_task = spawn_reader(child.stderr.take(), Arc::clone(&stderr_buf));

    let timeout = Duration::from_millis(request.timeout_ms.max(1));
    let outcome = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) if status.success() => ExitOutcome::Success,
        Ok(Ok(status)) => ExitOutcome::Failed(status.code()),
        Ok(Err(source)) => {
            return Err(DebugCycleError::Spawn {
                command: request.command.clone(),
                source,
            })
        }
        Err(_) => {
            if let Err(e) = child.kill().await {
                log::warn!("failed to kill timed-out child: {e}");
            }
            ExitOutcome::TimedOut(request.timeout_ms)
        }
    };

    if matches!(outcome, ExitOutcome::TimedOut(_)) {
        // Grandchildren of a killed shell may hold the pipes open; take
        // whatever arrived within a short grace window instead of waiting
        // for an EOF that may never come.
        let grace = Duration::from_millis(500);
        let _ = tokio::time::timeout(grace, async {
            let _ = stdout_task.await;
            let _ = stderr_task.await;
        })
        .await;
    } else {
        let _ = stdout_task.await;
        let _ = stderr_task.await;
    }

    let stdout = String::from_utf8_lossy(&snapshot(&stdout_buf)).into_owned();
    let stderr = String::from_utf8_lossy(&snapshot(&stderr_buf)).into_owned();

    let document = match &outcome {
        ExitOutcome::Success => {
            let mut doc = String::new();
            if !stdout.is_empty() {
                doc.push_str(&format!("=== STDOUT ===\n{stdout}\n"));
            }
            if !stderr.is_empty() {
                doc.push_str(&format!("=== STDERR ===\n{stderr}\n"));
            }
            doc
        }
        outcome => {
            let mut doc = format!(
                "=== COMMAND FAILED ===\nExit code: {}\n",
                outcome.code_label()
            );
            if !stdout.is_empty() {
                doc.push_str(&format!("\n=== STDOUT ===\n{stdout}\n"));
            }
            if !stderr.is_empty() {
                doc.push_str(&format!("\n=== STDERR ===\n{stderr}\n"));
            }
            doc
        }
    };

    // Persist the full document before any display shaping.
    let capture_path = store.save(&document)?;

    let mut display = if request.filter_debug {
        let debug_lines: Vec<&str> = document
            .lines()
            .filter(|line| line.contains(DEBUG_TAG))
            .collect();
        if debug_lines.is_empty() {
            format!("(No {DEBUG_TAG} lines found in output)")
        } else if outcome.is_success() {
            debug_lines.join("\n")
        } else {
            format!(
                "Exit code: {}\n\n{DEBUG_TAG} lines:\n{}",
                outcome.code_label(),
                debug_lines.join("\n")
            )
        }
    } else {
        document
    };

    if display.chars().count() > MAX_DISPLAY_CHARS {
        display = format!(
            "{}\n\n... (truncated, full output in {})",
            truncate_to_chars(&display, MAX_DISPLAY_CHARS),
            capture_path.display()
        );
    }

    let command_line = if request.args.is_empty() {
        request.command.clone()
    } else {
        format!("{} {}", request.command, request.args.join(" "))
    };

    log::info!(
        "captured '{}' ({}) to {}",
        command_line,
        outcome.code_label(),
        capture_path.display()
    );

    Ok(CaptureReport {
        capture_path,
        outcome,
        command_line,
        display,
    })
}

fn spawn_reader<R>(pipe: Option<R>, buf: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut pipe) = pipe else {
            return;
        };
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let mut out = buf.lock().unwrap_or_else(PoisonError::into_inner);
                    let room = MAX_CAPTURE_BYTES.saturating_sub(out.len());
                    if room > 0 {
                        out.extend_from_slice(&chunk[..n.min(room)]);
                    }
                    // past the cap: keep draining, drop the bytes
                }
            }
        }
    })
}

fn snapshot(buf: &Arc<Mutex<Vec<u8>>>) -> Vec<u8> {
    buf.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn truncate_to_chars(input: &str, max_chars: usize) -> &str {
    let mut cut = input.len();
    for (seen, (idx, _)) in input.char_indices().enumerate() {
        if seen == max_chars {
            cut = idx;
            break;
        }
    }
    &input[..cut]
}

#[cfg(test)]
mod tests {
    use super::{capture_output, CaptureRequest, ExitOutcome};
    use crate::capture::CaptureStore;
    use crate::error::DebugCycleError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn sh(script: &str) -> CaptureRequest {
        let mut request = CaptureRequest::new("sh");
        request.args = vec!["-c".to_string(), script.to_string()];
        request
    }

    #[tokio::test]
    async fn success_writes_labeled_sections() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let report = capture_output(&store, &sh("echo out; echo err >&2"))
            .await
            .unwrap();

        assert_eq!(report.outcome, ExitOutcome::Success);
        let saved = fs::read_to_string(&report.capture_path).unwrap();
        assert!(saved.contains("=== STDOUT ===\nout\n"));
        assert!(saved.contains("=== STDERR ===\nerr\n"));
        assert_eq!(report.display, saved);
    }

    #[tokio::test]
    async fn failing_command_still_persists_with_exit_code() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let report = capture_output(&store, &sh("echo partial; exit 3"))
            .await
            .unwrap();

        assert_eq!(report.outcome, ExitOutcome::Failed(Some(3)));
        let saved = fs::read_to_string(&report.capture_path).unwrap();
        assert!(saved.starts_with("=== COMMAND FAILED ===\nExit code: 3\n"));
        assert!(saved.contains("=== STDOUT ===\npartial\n"));

        let captures: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(captures.len(), 1);
    }

    #[tokio::test]
    async fn filter_with_no_debug_lines_reports_fallback_even_on_failure() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let mut request = sh("echo plain; exit 1");
        request.filter_debug = true;
        let report = capture_output(&store, &request).await.unwrap();

        assert_eq!(report.display, "(No [DEBUG] lines found in output)");
        // The full failure output is still on disk.
        let saved = fs::read_to_string(&report.capture_path).unwrap();
        assert!(saved.contains("plain"));
        assert!(saved.contains("Exit code: 1"));
    }

    #[tokio::test]
    async fn filter_keeps_debug_lines_and_failure_exit_code() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let mut request = sh("echo '[DEBUG] hit'; echo plain; exit 2");
        request.filter_debug = true;
        let report = capture_output(&store, &request).await.unwrap();

        assert_eq!(
            report.display,
            "Exit code: 2\n\n[DEBUG] lines:\n[DEBUG] hit"
        );
    }

    #[tokio::test]
    async fn long_output_is_truncated_for_display_only() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let report = capture_output(
            &store,
            &sh("i=0; while [ $i -lt 2000 ]; do echo 0123456789; i=$((i+1)); done"),
        )
        .await
        .unwrap();

        assert!(report.display.contains("... (truncated, full output in "));
        assert!(report.display.chars().count() < 10_200);
        let saved = fs::read_to_string(&report.capture_path).unwrap();
        assert!(saved.len() > 20_000);
        assert!(!saved.contains("truncated"));
    }

    #[tokio::test]
    async fn timeout_kills_the_child_and_takes_the_failure_path() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let mut request = sh("echo early; sleep 30");
        request.timeout_ms = 200;
        let report = capture_output(&store, &request).await.unwrap();

        assert_eq!(report.outcome, ExitOutcome::TimedOut(200));
        let saved = fs::read_to_string(&report.capture_path).unwrap();
        assert!(saved.starts_with("=== COMMAND FAILED ==="));
        assert!(saved.contains("timed out after 200 ms"));
        assert!(saved.contains("early"));
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error_and_names_the_command() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path());

        let err = capture_output(&store, &CaptureRequest::new("no-such-binary-for-sure"))
            .await
            .unwrap_err();
        assert!(matches!(err, DebugCycleError::Spawn { .. }));
        assert!(err.to_string().contains("no-such-binary-for-sure"));
    }

    #[tokio::test]
    async fn respects_working_directory() {
        let temp = tempdir().unwrap();
        let store = CaptureStore::new(temp.path().join("captures"));
        fs::write(temp.path().join("needle.txt"), "x").unwrap();

        let mut request = CaptureRequest::new("ls");
        request.cwd = Some(temp.path().to_path_buf());
        let report = capture_output(&store, &request).await.unwrap();

        assert!(report.display.contains("needle.txt"));
    }
}
