//! Per-task outcomes and the aggregate report of a dispatch.

use std::fmt;

/// How a single task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Exited with status zero
    Success,
    /// Exited non-zero, or was killed by a signal (`code` is `None`)
    Failed { code: Option<i32> },
    /// The command could not be started (missing program, bad argv, ...)
    SpawnError { message: String },
    /// Killed after exceeding the per-task timeout
    TimedOut,
    /// Dry run: the command was displayed, not executed
    DryRun,
    /// Interrupted while running, or never launched because of an interrupt
    Cancelled,
}

impl TaskStatus {
    /// Dry runs count as success; everything else but `Success` is a failure.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::DryRun)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "ok"),
            Self::Failed { code: Some(code) } => write!(f, "exit code {code}"),
            Self::Failed { code: None } => write!(f, "killed by signal"),
            Self::SpawnError { message } => write!(f, "failed to start: {message}"),
            Self::TimedOut => write!(f, "timed out"),
            Self::DryRun => write!(f, "dry run"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub rank: usize,
    /// Display name of the node
    pub node: String,
    /// The rendered command line; `None` if the task was never built
    pub command: Option<String>,
    pub status: TaskStatus,
    /// Captured, untagged output; `None` when nothing ran
    pub output: Option<Vec<u8>>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the command actually ran.
    pub fn ran(&self) -> bool {
        self.output.is_some()
    }
}

/// Every [`DispatchResult`] of one dispatch, in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub results: Vec<DispatchResult>,
    /// Set when an interrupt stopped the dispatch early
    pub interrupted: bool,
}

impl DispatchReport {
    /// True only if every task succeeded and nothing was interrupted.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.results.iter().all(DispatchResult::is_success)
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Results that failed, excluding cancelled ones.
    pub fn failures(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results
            .iter()
            .filter(|r| !r.is_success() && r.status != TaskStatus::Cancelled)
    }

    pub fn cancelled(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TaskStatus::Cancelled)
            .count()
    }

    /// Process exit code for this report: 0 on full success, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }
}
