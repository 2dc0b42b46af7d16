//! Tasks and the coordinating role: turning a target into a command line.

use crate::error::{Error, Result};
use nodeset::Target;

/// One unit of work: a command to run for one ranked target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Index of the target in the resolved node set
    pub rank: usize,
    /// Display name used to tag output
    pub node: String,
    /// Program followed by its arguments
    pub argv: Vec<String>,
}

impl Task {
    pub fn new(rank: usize, node: impl Into<String>, argv: Vec<String>) -> Self {
        Self {
            rank,
            node: node.into(),
            argv,
        }
    }
}

/// Render a task as a replayable shell command line.
pub fn format_command(task: &Task) -> String {
    shell_words::join(&task.argv)
}

/// The remote-invocation wrapper, e.g. `ssh -o ConnectTimeout=10 -x -q`.
///
/// Knows which node is the local one; commands for that node run
/// directly under `sh -c` instead of looping back through the remote
/// shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteShell {
    command: Vec<String>,
    local_node: Option<String>,
}

impl RemoteShell {
    /// Parse a remote-shell template with shell quoting rules.
    pub fn from_template(template: &str) -> Result<Self> {
        let command = shell_words::split(template).map_err(|e| Error::InvalidRemoteShell {
            template: template.to_string(),
            reason: e.to_string(),
        })?;
        if command.is_empty() {
            return Err(Error::InvalidRemoteShell {
                template: template.to_string(),
                reason: "command is empty".to_string(),
            });
        }
        Ok(Self {
            command,
            local_node: None,
        })
    }

    /// Append extra options, given as one shell-quoted string.
    pub fn with_options(mut self, options: &str) -> Result<Self> {
        let extra = shell_words::split(options).map_err(|e| Error::InvalidRemoteShell {
            template: options.to_string(),
            reason: e.to_string(),
        })?;
        self.command.extend(extra);
        Ok(self)
    }

    /// Name the node the dispatcher runs on.
    pub fn with_local_node(mut self, node: Option<String>) -> Self {
        self.local_node = node;
        self
    }

    /// Program name of the wrapper, for log messages.
    pub fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    /// The wrapper's full argv.
    pub fn argv(&self) -> &[String] {
        &self.command
    }

    pub fn is_local(&self, target: &Target) -> bool {
        self.local_node.as_deref() == Some(target.node.as_str())
    }

    /// Build the task for `remote` on `target`.
    ///
    /// Like a remote shell, the local path hands the joined command to a
    /// shell, so quoting behaves the same on every node.
    pub fn task(&self, rank: usize, target: &Target, remote: &[String]) -> Task {
        let argv = if self.is_local(target) {
            vec!["sh".to_string(), "-c".to_string(), remote.join(" ")]
        } else {
            let mut argv = self.command.clone();
            argv.push(target.interface.clone());
            argv.extend(remote.iter().cloned());
            argv
        };
        Task::new(rank, target.node.clone(), argv)
    }
}
