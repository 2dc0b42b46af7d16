use anyhow::{Context, Result};
use pkgkit::{CommandRunner, Invocation};
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Runs package-manager commands on this machine with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    /// Echo each command as a shell line before running it
    transcript: bool,
}

impl ProcessRunner {
    pub fn new(transcript: bool) -> Self {
        Self { transcript }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> pkgkit::Result<()> {
        if self.transcript {
            let _ = writeln!(io::stdout(), "{}", invocation.display());
        }

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(pkgkit::Error::CommandFailed {
                command: invocation.display(),
                status: status.to_string(),
            })
        }
    }
}

/// Run a command and capture output
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed: {}", stderr.trim())
    }
}

/// This machine's network node name
pub fn hostname() -> Result<String> {
    run_capture("uname", &["-n"])
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        assert!(ProcessRunner::new(false).run(&Invocation::new("true", Vec::<String>::new())).is_ok());
    }

    #[test]
    fn test_failure_reports_command() {
        let err = ProcessRunner::new(false)
            .run(&Invocation::new("sh", ["-c", "exit 3"]))
            .unwrap_err();
        match err {
            pkgkit::Error::CommandFailed { command, status } => {
                assert_eq!(command, "sh -c 'exit 3'");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_environment_is_passed() {
        let inv = Invocation::new("sh", ["-c", "test \"$HERD_RUNNER_TEST\" = yes"])
            .env("HERD_RUNNER_TEST", "yes");
        assert!(ProcessRunner::new(false).run(&inv).is_ok());
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let err = ProcessRunner::new(false)
            .run(&Invocation::new("herd-no-such-program", Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(err, pkgkit::Error::Io(_)));
    }

    #[test]
    fn test_run_capture() {
        assert_eq!(run_capture("echo", &["hello"]).unwrap(), "hello");
        assert!(run_capture("sh", &["-c", "exit 1"]).is_err());
    }

    #[test]
    fn test_hostname() {
        assert!(!hostname().unwrap().is_empty());
    }
}
