//! The executing role: run a task's command, tag and capture its output.

use crate::cancel::CancelToken;
use crate::result::TaskStatus;
use crate::sink::OutputSink;
use crate::task::Task;
use std::io::{self, BufRead, BufReader, PipeReader, PipeWriter, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Everything the executing role may touch besides the task itself.
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'a> {
    pub sink: &'a OutputSink,
    pub cancel: &'a CancelToken,
    /// Prefix streamed lines with the node name
    pub tag: bool,
    /// Stream lines to the sink as they arrive (otherwise only capture)
    pub stream: bool,
    pub timeout: Option<Duration>,
}

impl ExecContext<'_> {
    fn emit(&self, task: &Task, line: &[u8]) {
        if self.stream {
            let tag = self.tag.then_some(task.node.as_str());
            self.sink.line(tag, line);
        }
    }
}

/// What the executing role produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub status: TaskStatus,
    /// Combined stdout and stderr, untagged
    pub output: Vec<u8>,
}

impl Execution {
    pub fn new(status: TaskStatus, output: Vec<u8>) -> Self {
        Self { status, output }
    }
}

/// Runs one task. Implementations must be safe to call from many
/// worker threads at once.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: &Task, ctx: &ExecContext<'_>) -> Execution;
}

/// Executes tasks as child processes.
///
/// stdout and stderr share one pipe, so the captured bytes keep the order
/// the command wrote them in. Each line is captured and, when streaming,
/// written to the sink tagged with the node name. On Unix the child leads
/// its own process group, and a timeout or cancel kills the whole group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl TaskExecutor for ProcessExecutor {
    fn execute(&self, task: &Task, ctx: &ExecContext<'_>) -> Execution {
        let Some((program, args)) = task.argv.split_first() else {
            return Execution::new(
                TaskStatus::SpawnError {
                    message: "empty command".to_string(),
                },
                Vec::new(),
            );
        };

        let spawned = merged_pipe().and_then(|(reader, out, err)| {
            let mut command = Command::new(program);
            command.args(args).stdin(Stdio::null()).stdout(out).stderr(err);
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                command.process_group(0);
            }
            let child = command.spawn();
            // The command still owns both write ends; the reader only sees
            // EOF once they are closed.
            drop(command);
            child.map(|child| (child, reader))
        });

        let (mut child, reader) = match spawned {
            Ok(spawned) => spawned,
            Err(e) => {
                let message = format!("{program}: {e}");
                ctx.emit(task, message.as_bytes());
                return Execution::new(TaskStatus::SpawnError { message }, Vec::new());
            }
        };

        let (status, output) = thread::scope(|s| {
            let reading = s.spawn(move || pump(reader, task, ctx));
            let status = wait_for(&mut child, ctx);
            (status, reading.join().unwrap_or_default())
        });
        Execution::new(status, output)
    }
}

/// One pipe, with a write end each for stdout and stderr.
fn merged_pipe() -> io::Result<(PipeReader, PipeWriter, PipeWriter)> {
    let (reader, out) = io::pipe()?;
    let err = out.try_clone()?;
    Ok((reader, out, err))
}

fn pump(reader: impl Read, task: &Task, ctx: &ExecContext<'_>) -> Vec<u8> {
    let mut reader = BufReader::new(reader);
    let mut captured = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if !line.ends_with(b"\n") {
                    line.push(b'\n');
                }
                ctx.emit(task, &line);
                captured.extend_from_slice(&line);
            }
            Err(e) => {
                log::debug!("{}: read error: {}", task.node, e);
                break;
            }
        }
    }
    captured
}

fn wait_for(child: &mut Child, ctx: &ExecContext<'_>) -> TaskStatus {
    let deadline = ctx.timeout.map(|t| Instant::now() + t);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return exit_status(status),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return TaskStatus::SpawnError {
                    message: e.to_string(),
                };
            }
        }
        if ctx.cancel.is_cancelled() {
            kill(child);
            return TaskStatus::Cancelled;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            kill(child);
            return TaskStatus::TimedOut;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    #[cfg(unix)]
    kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

/// SIGKILL the process group the child leads, grandchildren included.
#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_group(pid: u32) {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid names the group
    // created for this child at spawn.
    if unsafe { libc::kill(-pid, libc::SIGKILL) } != 0 {
        log::debug!("kill process group {pid}: {}", io::Error::last_os_error());
    }
}

fn exit_status(status: ExitStatus) -> TaskStatus {
    match status.code() {
        Some(0) => TaskStatus::Success,
        code => TaskStatus::Failed { code },
    }
}
