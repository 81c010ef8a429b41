//! One invocation, from parsed arguments to exit status.

use crate::cli::{Cli, VERSION};
use crate::instances;
use crate::lifecycle::{Coordinator, ExitStatus};
use crate::logging;
use crate::signals;
use anyhow::{Context, Result};
use awake_common::{AwakeError, Config, PolicyError, RunPolicy};
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run everything except `--version`, which never reaches here.
pub fn run(cli: Cli) -> Result<ExitStatus> {
    let config = Config::resolve(cli.config.as_deref(), |key| std::env::var(key).ok())
        .map_err(AwakeError::from)?;
    logging::init(&config.log_level);
    info!("awake v{} starting (backend {})", VERSION, config.backend);

    if cli.kill {
        let stopped = instances::stop_others()?;
        if !cli.quiet {
            eprintln!("stopped {} awake process(es)", stopped);
        }
        return Ok(ExitStatus::Success);
    }

    if cli.replace || config.replace_running {
        instances::stop_others()?;
    }

    let now = Local::now().naive_local();
    let policy = RunPolicy::from_target(cli.target, cli.daemon || cli.detached, now);
    if policy.is_immediate() {
        info!("Deadline already passed, nothing to do");
        return Ok(ExitStatus::Success);
    }

    if cli.daemon {
        return daemonize(&cli, now);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let _listener = signals::spawn_listener(cancel.clone(), !cli.detached)
            .context("failed to install signal handlers")?;

        let power = awake_common::select(config.backend);
        let mut coordinator = Coordinator::new(power, config.reason.clone()).quiet(cli.quiet);
        let status = coordinator.run(policy, &cancel).await?;

        // stops the listener task
        cancel.cancel();
        Ok::<_, anyhow::Error>(status)
    })
}

fn daemonize(cli: &Cli, now: chrono::NaiveDateTime) -> Result<ExitStatus> {
    let deadline = match cli.target {
        Some(target) => Some(target.absolute(now).ok_or_else(|| {
            AwakeError::Usage(PolicyError::InvalidDuration("duration too long".to_string()))
        })?),
        None => None,
    };

    let args = instances::detached_args(deadline, cli.config.as_deref());
    let pid = instances::spawn_detached(&args)?;
    if !cli.quiet {
        eprintln!("awake running in background (pid {})", pid);
    }
    Ok(ExitStatus::Success)
}

/// Map a failed run to its exit status.
pub fn status_for(err: &anyhow::Error) -> ExitStatus {
    match err.downcast_ref::<AwakeError>() {
        Some(awake_err) => ExitStatus::for_error(awake_err),
        None => ExitStatus::Failed,
    }
}
