use crate::error::ClipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between the simulated copy and the clipboard read.
pub const DEFAULT_COPY_SETTLE: Duration = Duration::from_millis(300);

/// How the current selection is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum CaptureMode {
    /// Read whatever is already on the clipboard.
    #[default]
    #[serde(rename = "clipboard")]
    Clipboard,
    /// Send ⌘C to the frontmost app first, then read the clipboard.
    #[serde(rename = "copy")]
    SimulatedCopy,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Clipboard => f.write_str("clipboard"),
            CaptureMode::SimulatedCopy => f.write_str("copy"),
        }
    }
}

/// External program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CaptureCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pbpaste() -> Self {
        Self::new("pbpaste", Vec::<String>::new())
    }

    pub fn osascript_copy() -> Self {
        Self::new(
            "osascript",
            [
                "-e",
                r#"tell application "System Events" to keystroke "c" using command down"#,
            ],
        )
    }

    /// Run to completion within `timeout`; stdout decoded lossily.
    async fn run(&self, timeout: Duration) -> Result<String, ClipError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                warn!(program = %self.program, ?timeout, "capture command timed out");
                ClipError::CaptureTimeout(timeout)
            })?
            .map_err(|e| ClipError::Capture(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipError::Capture(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Obtains the user's current selection through platform commands.
#[derive(Debug, Clone)]
pub struct SelectionCapture {
    copy: Option<CaptureCommand>,
    read: CaptureCommand,
    settle: Duration,
    timeout: Duration,
}

impl SelectionCapture {
    pub fn new(read: CaptureCommand) -> Self {
        Self {
            copy: None,
            read,
            settle: DEFAULT_COPY_SETTLE,
            timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// macOS commands for `mode`.
    pub fn for_mode(mode: CaptureMode) -> Self {
        let capture = Self::new(CaptureCommand::pbpaste());
        match mode {
            CaptureMode::Clipboard => capture,
            CaptureMode::SimulatedCopy => capture.with_copy(CaptureCommand::osascript_copy()),
        }
    }

    pub fn with_copy(mut self, copy: CaptureCommand) -> Self {
        self.copy = Some(copy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Current selection text. Blank text is an error.
    pub async fn capture(&self) -> Result<String, ClipError> {
        if let Some(copy) = &self.copy {
            copy.run(self.timeout).await?;
            tokio::time::sleep(self.settle).await;
        }
        let text = self.read.run(self.timeout).await?;
        if text.trim().is_empty() {
            return Err(ClipError::EmptySelection);
        }
        debug!(chars = text.chars().count(), "captured selection");
        Ok(text)
    }
}
