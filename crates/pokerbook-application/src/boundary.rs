//! Background jobs that talk to remote services.
//!
//! A boundary job runs on its own tokio task with a deadline and reports its
//! outcome as a [`Notice`] over a channel. It never holds the ledger; callers
//! move a snapshot into the job instead.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deadline for a whole job, which may make several requests.
pub const BOUNDARY_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => f.write_str("info"),
            NoticeLevel::Warning => f.write_str("warning"),
            NoticeLevel::Error => f.write_str("error"),
        }
    }
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Spawns `job` and sends exactly one notice when it finishes, fails or
/// times out.
pub fn spawn_boundary_job<F>(
    title: impl Into<String>,
    timeout: Duration,
    notices: mpsc::UnboundedSender<Notice>,
    job: F,
) -> JoinHandle<()>
where
    F: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    let title = title.into();
    tokio::spawn(async move {
        let notice = match tokio::time::timeout(timeout, job).await {
            Ok(Ok(message)) => Notice::info(&title, message),
            Ok(Err(e)) => {
                tracing::warn!("[Boundary] {} failed: {:#}", title, e);
                Notice::error(&title, format!("{e:#}"))
            }
            Err(_) => {
                tracing::warn!("[Boundary] {} timed out after {:?}", title, timeout);
                Notice::warning(&title, format!("timed out after {timeout:?}"))
            }
        };
        if notices.send(notice).is_err() {
            tracing::debug!("[Boundary] Notice for '{}' dropped; receiver closed", title);
        }
    })
}
