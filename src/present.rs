//! Hosts for the post-generation actions that leave the process: printing
//! and sharing.
//!
//! Both are traits so a desktop shell, a test, or a headless server can plug
//! in its own dialogs. The library ships [`CommandPrintHost`] (hands the file
//! to a spooler command such as `lp`) and [`UnsupportedShareHost`] (reports
//! that sharing is unavailable, so the caller falls back to download).

use std::future::Future;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Why a print request did not go through.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The host refused to open a viewer (popup blocker, missing spooler).
    #[error("{0}")]
    Blocked(String),

    /// The viewer opened but printing failed.
    #[error("{0}")]
    Failed(String),
}

/// Something that can open a PDF and print it.
///
/// The returned future resolves once printing has completed; the caller
/// releases the temporary reference at that point.
pub trait PrintHost {
    fn print(&self, pdf: &Path) -> impl Future<Output = Result<(), PrintError>> + Send;
}

/// Prints by running an external command with the PDF path as last argument.
#[derive(Debug, Clone)]
pub struct CommandPrintHost {
    program: String,
    args: Vec<String>,
}

impl CommandPrintHost {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for CommandPrintHost {
    fn default() -> Self {
        Self::new("lp")
    }
}

impl PrintHost for CommandPrintHost {
    async fn print(&self, pdf: &Path) -> Result<(), PrintError> {
        debug!("Printing {} via {}", pdf.display(), self.program);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(pdf)
            .output()
            .await
            .map_err(|e| PrintError::Blocked(format!("cannot launch '{}': {e}", self.program)))?;

        if !output.status.success() {
            return Err(PrintError::Failed(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        info!("Sent {} to '{}'", pdf.display(), self.program);
        Ok(())
    }
}

/// A file offered to a share target.
#[derive(Debug, Clone)]
pub struct SharedFile<'a> {
    pub name: &'a str,
    pub mime: &'a str,
    pub title: &'a str,
    pub text: &'a str,
    pub bytes: &'a [u8],
}

/// Why a share did not complete.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The user dismissed the share sheet. Not an error for the caller.
    #[error("share cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

/// Something that can hand a file to the platform share flow.
pub trait ShareHost {
    /// Whether `file` can be shared at all.
    fn can_share(&self, file: &SharedFile<'_>) -> bool;

    fn share(&self, file: &SharedFile<'_>) -> Result<(), ShareError>;
}

/// Share host for environments without a share flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedShareHost;

impl ShareHost for UnsupportedShareHost {
    fn can_share(&self, _file: &SharedFile<'_>) -> bool {
        false
    }

    fn share(&self, _file: &SharedFile<'_>) -> Result<(), ShareError> {
        Err(ShareError::Failed("sharing is not available".into()))
    }
}
