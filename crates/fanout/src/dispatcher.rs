//! The scheduler: bounded fan-out of one task per target.
//!
//! A fixed pool of `slots` worker threads is created per dispatch. Each
//! worker repeatedly claims the next rank from a shared counter, so tasks
//! launch in rank order and never more than `slots` run at once. For each
//! claimed rank the worker plays the coordinating role (build and format
//! the command) and then, unless this is a dry run, the executing role.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::executor::{ExecContext, ProcessExecutor, TaskExecutor};
use crate::result::{DispatchReport, DispatchResult, TaskStatus};
use crate::sink::OutputSink;
use crate::task::{Task, format_command};
use nodeset::{ResolvedTargets, Target};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Options for one dispatch, threaded explicitly instead of global flags.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Ceiling on concurrently running tasks; `None` means one per target
    pub max_concurrency: Option<usize>,
    /// Display commands without executing them
    pub dry_run: bool,
    /// Prefix output lines with the node name
    pub tag_output: bool,
    /// Stream output while tasks run; off for aggregate mode
    pub stream_output: bool,
    /// Echo every command as a replayable shell line before it runs
    pub transcript: bool,
    /// Kill tasks running longer than this
    pub timeout: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            dry_run: false,
            tag_output: true,
            stream_output: true,
            transcript: false,
            timeout: None,
        }
    }
}

impl DispatchOptions {
    /// Number of worker slots for `targets` targets.
    pub fn slots(&self, targets: usize) -> Result<usize> {
        match self.max_concurrency {
            Some(0) => Err(Error::InvalidConcurrency(0)),
            Some(ceiling) => Ok(ceiling.min(targets).max(1)),
            None => Ok(targets.max(1)),
        }
    }
}

/// Progress hooks, called from worker threads.
pub trait DispatchProgress: Send + Sync {
    /// Called right before a task's command is run (or displayed).
    fn on_launch(&self, _task: &Task) {}

    /// Called when a task has a result.
    fn on_complete(&self, _result: &DispatchResult) {}
}

/// No-op progress hooks.
pub struct NoProgress;

impl DispatchProgress for NoProgress {}

/// Runs one task per target with bounded concurrency.
pub struct Dispatcher<E = ProcessExecutor> {
    executor: E,
    options: DispatchOptions,
    sink: OutputSink,
    cancel: CancelToken,
    progress: Box<dyn DispatchProgress>,
}

impl Dispatcher<ProcessExecutor> {
    /// Dispatcher running real processes and writing to stdout.
    pub fn new(options: DispatchOptions) -> Self {
        Self::with_executor(ProcessExecutor, options)
    }
}

impl<E: TaskExecutor> Dispatcher<E> {
    pub fn with_executor(executor: E, options: DispatchOptions) -> Self {
        Self {
            executor,
            options,
            sink: OutputSink::stdout(),
            cancel: CancelToken::new(),
            progress: Box::new(NoProgress),
        }
    }

    /// Write output somewhere other than stdout.
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    /// Share a cancellation token, typically with an interrupt handler.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: impl DispatchProgress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Dispatch one task per target.
    ///
    /// Workers claim ranks in ascending order and call `build` once per
    /// claimed rank to get the task for that target. With more than one
    /// slot, `build` calls for neighbouring ranks may overlap. Per-task failures never abort
    /// the dispatch; they are recorded in the report. On interrupt, ranks
    /// that were never launched are reported as [`TaskStatus::Cancelled`]
    /// so the report always holds one result per target.
    pub fn run<F>(&self, targets: &ResolvedTargets, build: F) -> Result<DispatchReport>
    where
        F: Fn(usize, &Target) -> Task + Sync,
    {
        if targets.is_empty() {
            return Err(Error::NoTargets);
        }
        let slots = self.options.slots(targets.len())?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(slots)
            .thread_name(|i| format!("fanout-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        log::debug!(
            "dispatching to {} node(s) with {} slot(s)",
            targets.len(),
            slots
        );

        let next_rank = AtomicUsize::new(0);
        let results: Mutex<Vec<DispatchResult>> = Mutex::new(Vec::with_capacity(targets.len()));

        pool.broadcast(|_| {
            loop {
                if self.cancel.is_cancelled() {
                    break;
                }
                let rank = next_rank.fetch_add(1, Ordering::SeqCst);
                if rank >= targets.len() {
                    break;
                }
                let task = build(rank, &targets[rank]);
                let result = self.run_task(&task);
                self.progress.on_complete(&result);
                push_result(&results, result);
            }
        });

        let mut results = match results.into_inner() {
            Ok(results) => results,
            Err(poisoned) => poisoned.into_inner(),
        };

        let interrupted = self.cancel.is_cancelled();
        if results.len() < targets.len() {
            let mut launched = vec![false; targets.len()];
            for result in &results {
                launched[result.rank] = true;
            }
            for (rank, target) in targets.iter().enumerate() {
                if !launched[rank] {
                    results.push(DispatchResult {
                        rank,
                        node: target.node.clone(),
                        command: None,
                        status: TaskStatus::Cancelled,
                        output: None,
                    });
                }
            }
        }
        results.sort_by_key(|r| r.rank);

        Ok(DispatchReport {
            results,
            interrupted,
        })
    }

    /// Coordinating role, then executing role unless dry-running.
    fn run_task(&self, task: &Task) -> DispatchResult {
        let command = format_command(task);
        log::info!("running on {}: {}", task.node, command);
        self.progress.on_launch(task);

        if self.options.transcript || self.options.dry_run {
            self.sink.text(&command);
        }

        if self.options.dry_run {
            return DispatchResult {
                rank: task.rank,
                node: task.node.clone(),
                command: Some(command),
                status: TaskStatus::DryRun,
                output: None,
            };
        }

        let ctx = ExecContext {
            sink: &self.sink,
            cancel: &self.cancel,
            tag: self.options.tag_output,
            stream: self.options.stream_output,
            timeout: self.options.timeout,
        };
        let execution = self.executor.execute(task, &ctx);
        if !execution.status.is_success() {
            log::debug!("{}: {}", task.node, execution.status);
        }

        DispatchResult {
            rank: task.rank,
            node: task.node.clone(),
            command: Some(command),
            status: execution.status,
            output: Some(execution.output),
        }
    }
}

fn push_result(results: &Mutex<Vec<DispatchResult>>, result: DispatchResult) {
    match results.lock() {
        Ok(mut locked) => locked.push(result),
        Err(poisoned) => poisoned.into_inner().push(result),
    }
}
