//! Termination signals cancel the wait; they never exit the process directly.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
#[cfg(unix)]
use tracing::debug;
use tracing::info;

/// Register handlers and spawn a task that cancels `cancel` on the first signal.
///
/// Handlers are installed before this returns, so a signal that arrives
/// while the assertion is being acquired is not lost. SIGHUP is always
/// handled: it cancels in the foreground and is ignored when
/// `cancel_on_hangup` is false, since a detached run outlives its terminal.
#[cfg(unix)]
pub fn spawn_listener(
    cancel: CancellationToken,
    cancel_on_hangup: bool,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        let name = loop {
            tokio::select! {
                _ = interrupt.recv() => break "SIGINT",
                _ = terminate.recv() => break "SIGTERM",
                _ = hangup.recv() => {
                    if cancel_on_hangup {
                        break "SIGHUP";
                    }
                    debug!("Ignoring SIGHUP in detached run");
                }
                _ = cancel.cancelled() => return,
            }
        };
        info!("Received {}, releasing", name);
        cancel.cancel();
    }))
}

#[cfg(not(unix))]
pub fn spawn_listener(
    cancel: CancellationToken,
    _cancel_on_hangup: bool,
) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if res.is_ok() {
                    info!("Received Ctrl-C, releasing");
                    cancel.cancel();
                }
            }
            _ = cancel.cancelled() => {}
        }
    }))
}
