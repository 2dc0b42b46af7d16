use crate::Context;
use crate::cli::SshArgs;
use crate::config::Config;
use anyhow::Result;
use fanout::RemoteShell;

/// Build the remote shell from config and command-line options.
pub fn remote_shell(config: &Config, options: Option<&str>) -> Result<RemoteShell> {
    let mut shell = RemoteShell::from_template(&config.ssh_cmd)?;
    if let Some(extra) = &config.ssh_options {
        shell = shell.with_options(extra)?;
    }
    if let Some(extra) = options {
        shell = shell.with_options(extra)?;
    }
    Ok(shell)
}

pub fn run(ctx: &Context, args: SshArgs) -> Result<u8> {
    let config = Config::load(ctx.config.as_deref())?;
    let (directory, targets) = super::resolve(&config, &args.selectors)?;

    let shell = remote_shell(&config, args.options.as_deref())?
        .with_local_node(super::local_node(&config, &directory));
    let options = super::dispatch_options(&config, &args.dispatch, args.dry_run);

    let report = super::dispatch(ctx, &targets, options, |rank, target| {
        shell.task(rank, target, &args.command)
    })?;
    Ok(report.exit_code())
}
