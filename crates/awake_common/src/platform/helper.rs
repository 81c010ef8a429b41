//! Helper-process backends.
//!
//! The inhibition is held by a long-lived helper (`systemd-inhibit` on
//! Linux, `caffeinate` on macOS). Releasing means terminating the helper's
//! process group. Both helpers are told to exit on their own once this
//! process is gone, so a crash never leaves the machine pinned awake.

use super::{AssertionHandle, HandleKind, PowerInterface};
use crate::error::PlatformError;
use std::collections::HashSet;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long a freshly spawned helper must survive to count as holding the assertion
pub const SETTLE_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    /// `systemd-inhibit --what=idle:sleep`, held open by `tail --pid`
    Systemd,
    /// `caffeinate -d -i -m -s -w <pid>`
    Caffeinate,
}

impl HelperKind {
    pub fn program(&self) -> &'static str {
        match self {
            HelperKind::Systemd => "systemd-inhibit",
            HelperKind::Caffeinate => "caffeinate",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HelperKind::Systemd => "systemd",
            HelperKind::Caffeinate => "caffeinate",
        }
    }

    /// Arguments for holding an assertion on behalf of `owner_pid`.
    pub fn args(&self, reason: &str, owner_pid: u32) -> Vec<String> {
        match self {
            HelperKind::Systemd => vec![
                "--what=idle:sleep".to_string(),
                "--who=awake".to_string(),
                format!("--why={reason}"),
                "--mode=block".to_string(),
                "tail".to_string(),
                format!("--pid={owner_pid}"),
                "-f".to_string(),
                "/dev/null".to_string(),
            ],
            // caffeinate has no reason field; the process name is what pmset shows
            HelperKind::Caffeinate => vec![
                "-d".to_string(),
                "-i".to_string(),
                "-m".to_string(),
                "-s".to_string(),
                "-w".to_string(),
                owner_pid.to_string(),
            ],
        }
    }
}

/// Backend that holds each assertion in a helper process.
#[derive(Debug)]
pub struct HelperInhibitor {
    kind: HelperKind,
    program: String,
    args: Option<Vec<String>>,
    settle: Duration,
    next_id: u64,
    held: HashSet<u64>,
}

impl HelperInhibitor {
    pub fn new(kind: HelperKind) -> Self {
        Self {
            kind,
            program: kind.program().to_string(),
            args: None,
            settle: SETTLE_WINDOW,
            next_id: 1,
            held: HashSet::new(),
        }
    }

    /// Run a different executable with the same arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Replace the helper arguments entirely.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    fn spawn(&self, reason: &str) -> Result<Child, PlatformError> {
        let args = match &self.args {
            Some(args) => args.clone(),
            None => self.kind.args(reason, std::process::id()),
        };

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // own process group: terminal SIGINT reaches us, never the helper
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                PlatformError::Unsupported(format!("{} not found", self.program))
            }
            ErrorKind::PermissionDenied => {
                PlatformError::PermissionDenied(format!("cannot execute {}", self.program))
            }
            _ => PlatformError::Io(e),
        })
    }
}

impl PowerInterface for HelperInhibitor {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn acquire(&mut self, reason: &str) -> Result<AssertionHandle, PlatformError> {
        if reason.trim().is_empty() {
            return Err(PlatformError::InvalidReason);
        }

        let mut child = self.spawn(reason)?;
        std::thread::sleep(self.settle);

        let exited = match child.try_wait() {
            Ok(exited) => exited,
            Err(e) => {
                reap(&mut child);
                return Err(PlatformError::Io(e));
            }
        };
        if let Some(status) = exited {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let stderr = stderr.trim();
            let detail = if stderr.is_empty() {
                format!("{} exited with {}", self.program, status)
            } else {
                format!("{} exited with {}: {}", self.program, status, stderr)
            };
            return Err(PlatformError::PermissionDenied(detail));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.held.insert(id);
        info!("Acquired {} assertion #{} (pid {})", self.name(), id, child.id());

        Ok(AssertionHandle::helper(id, child))
    }

    fn release(&mut self, handle: AssertionHandle) -> Result<(), PlatformError> {
        let id = handle.id();
        let mut child = match handle.into_kind() {
            HandleKind::Helper(child) => child,
            HandleKind::Token => return Err(PlatformError::InvalidHandle),
        };

        // the handle is consumed either way, so its helper must not outlive it
        if !self.held.remove(&id) {
            reap(&mut child);
            return Err(PlatformError::InvalidHandle);
        }

        // already gone counts as released
        if let Some(status) = child.try_wait()? {
            debug!("Helper for assertion #{} already exited ({})", id, status);
            return Ok(());
        }

        terminate(&mut child)?;
        let status = child.wait()?;
        info!("Released {} assertion #{} ({})", self.kind.name(), id, status);
        Ok(())
    }
}

/// Best-effort terminate and wait, for helpers that are being discarded.
fn reap(child: &mut Child) {
    if let Err(e) = terminate(child) {
        warn!("Failed to terminate helper pid {}: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        warn!("Failed to wait for helper pid {}: {}", child.id(), e);
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> Result<(), PlatformError> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    match killpg(pgid, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(PlatformError::Io(std::io::Error::from(e))),
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> Result<(), PlatformError> {
    match child.kill() {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::InvalidInput => Ok(()),
        Err(e) => Err(PlatformError::Io(e)),
    }
}
