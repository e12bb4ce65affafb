//! External tool abstraction.
//!
//! The extraction engines (layout detection, OCR, image enhancement) are
//! opaque external collaborators, typically platform-specific binaries.
//! This module isolates them behind the [`ExternalTool`] trait so the
//! controller never branches on platform or binary details inline;
//! concrete tools are selected once, at construction.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::model::RawDocument;

/// Default ceiling on a single tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Poll interval while waiting on a child process.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from an external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool exceeded its timeout and was killed.
    #[error("tool '{tool}' timed out after {timeout:?}")]
    Timeout {
        /// Tool name
        tool: String,
        /// The timeout that was exceeded
        timeout: Duration,
    },

    /// The tool process could not be launched.
    #[error("failed to launch tool '{tool}': {source}")]
    Launch {
        /// Tool name
        tool: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("tool '{tool}' failed (exit code {code:?}): {stderr}")]
    Failed {
        /// Tool name
        tool: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The tool produced output the caller could not interpret.
    #[error("tool '{tool}' produced unusable output: {reason}")]
    BadOutput {
        /// Tool name
        tool: String,
        /// What went wrong
        reason: String,
    },
}

/// What an external tool returned.
#[derive(Debug, Clone)]
pub enum ToolOutput {
    /// A structured extraction document (primary extraction tool)
    Structured(RawDocument),
    /// Plain text (OCR tools)
    Text(String),
    /// A file produced on disk (page renderer, image enhancer)
    File(PathBuf),
}

impl ToolOutput {
    /// The textual content of this output, if it has one.
    pub fn text(&self) -> Option<String> {
        match self {
            ToolOutput::Structured(doc) => Some(doc.plain_text()),
            ToolOutput::Text(text) => Some(text.clone()),
            ToolOutput::File(_) => None,
        }
    }

    /// The produced file path, if this output is one.
    pub fn file(&self) -> Option<&Path> {
        match self {
            ToolOutput::File(path) => Some(path),
            _ => None,
        }
    }
}

/// An opaque external tool: takes an input path, produces an output.
///
/// Implementations must be safe to share across threads; the controller
/// holds them behind shared references for the lifetime of a run.
pub trait ExternalTool: Send + Sync {
    /// Human-readable tool name, used in logs and errors.
    fn name(&self) -> &str;

    /// Invoke the tool on the given input.
    fn invoke(&self, input: &Path) -> Result<ToolOutput, ToolError>;
}

/// How to interpret a command-line tool's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutKind {
    /// Stdout is plain extracted text
    Text,
    /// Stdout is a JSON [`RawDocument`]
    Structured,
    /// Stdout is the path of a file the tool wrote
    FilePath,
}

/// An [`ExternalTool`] backed by an external binary.
///
/// The input path is appended as the final argument. The invocation is
/// bounded by a timeout; on expiry the process is killed outright rather
/// than waited on.
pub struct CommandTool {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    stdout_kind: StdoutKind,
}

impl CommandTool {
    /// Create a tool invoking `program`, reading stdout as `stdout_kind`.
    pub fn new(
        name: impl Into<String>,
        program: impl Into<PathBuf>,
        stdout_kind: StdoutKind,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
            stdout_kind,
        }
    }

    /// Append a fixed argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn interpret_stdout(&self, stdout: Vec<u8>) -> Result<ToolOutput, ToolError> {
        let text = String::from_utf8_lossy(&stdout).into_owned();
        match self.stdout_kind {
            StdoutKind::Text => Ok(ToolOutput::Text(text)),
            StdoutKind::Structured => {
                let doc = RawDocument::from_json(&text).map_err(|e| ToolError::BadOutput {
                    tool: self.name.clone(),
                    reason: e.to_string(),
                })?;
                Ok(ToolOutput::Structured(doc))
            }
            StdoutKind::FilePath => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(ToolError::BadOutput {
                        tool: self.name.clone(),
                        reason: "expected an output file path on stdout".to_string(),
                    });
                }
                Ok(ToolOutput::File(PathBuf::from(trimmed)))
            }
        }
    }
}

impl ExternalTool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, input: &Path) -> Result<ToolOutput, ToolError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Launch {
                tool: self.name.clone(),
                source,
            })?;

        // Drain the pipes on background threads so a chatty tool cannot
        // deadlock against a full pipe buffer while we poll.
        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());

        let status = match wait_with_deadline(&mut child, self.timeout) {
            Some(status) => status,
            None => {
                log::warn!(
                    "tool '{}' exceeded {:?}, killing process",
                    self.name,
                    self.timeout
                );
                // Hard cancellation: kill, then reap to avoid a zombie.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Timeout {
                    tool: self.name.clone(),
                    timeout: self.timeout,
                });
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(ToolError::Failed {
                tool: self.name.clone(),
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }

        self.interpret_stdout(stdout)
    }
}

/// Poll a child until it exits or the deadline passes.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(_) => return None,
        }
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
