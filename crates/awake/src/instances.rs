//! Other awake processes: finding, stopping, and spawning them.

use awake_common::policy::DATETIME_FORMAT;
use awake_common::AwakeError;
use chrono::NaiveDateTime;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Process name matched by `pgrep -x`
pub const PROCESS_NAME: &str = "awake";

/// Parse `pgrep` output, dropping our own pid.
pub fn parse_pids(stdout: &str, own_pid: u32) -> Vec<u32> {
    stdout
        .split_whitespace()
        .filter_map(|pid| pid.parse::<u32>().ok())
        .filter(|pid| *pid != own_pid)
        .collect()
}

/// List every other running awake process.
pub fn find_others() -> Result<Vec<u32>, AwakeError> {
    let output = Command::new("pgrep")
        .args(["-x", PROCESS_NAME])
        .output()
        .map_err(|e| AwakeError::Runtime(format!("failed to list processes: {}", e)))?;

    // pgrep exits 1 when nothing matched
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_pids(&stdout, std::process::id()))
}

/// Send SIGTERM to every other awake process. Returns how many were signalled.
///
/// The targets release their own assertions on the way out.
#[cfg(unix)]
pub fn stop_others() -> Result<usize, AwakeError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let mut stopped = 0;
    for pid in find_others()? {
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                info!("Sent SIGTERM to awake process {}", pid);
                stopped += 1;
            }
            Err(e) => warn!("Failed to signal awake process {}: {}", pid, e),
        }
    }
    Ok(stopped)
}

#[cfg(not(unix))]
pub fn stop_others() -> Result<usize, AwakeError> {
    Err(AwakeError::Runtime(
        "stopping other instances is not supported on this platform".to_string(),
    ))
}

/// Arguments for the detached copy of this invocation.
///
/// A relative duration has already been turned into `deadline` by the caller.
pub fn detached_args(deadline: Option<NaiveDateTime>, config: Option<&Path>) -> Vec<String> {
    let mut args = vec!["--detached".to_string(), "--quiet".to_string()];
    if let Some(path) = config {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    if let Some(deadline) = deadline {
        args.push(deadline.format(DATETIME_FORMAT).to_string());
    }
    args
}

/// Re-spawn the current executable in its own process group with null stdio.
pub fn spawn_detached(args: &[String]) -> Result<u32, AwakeError> {
    let exe = std::env::current_exe()
        .map_err(|e| AwakeError::Runtime(format!("failed to locate executable: {}", e)))?;
    debug!("Spawning detached {} {:?}", exe.display(), args);

    let mut command = Command::new(exe);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command
        .spawn()
        .map_err(|e| AwakeError::Runtime(format!("failed to start background process: {}", e)))?;
    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use awake_common::policy::parse_datetime;

    #[test]
    fn test_parse_pids_skips_self_and_junk() {
        let pids = parse_pids("101\n202\nnot-a-pid\n303\n", 202);
        assert_eq!(pids, vec![101, 303]);
        assert!(parse_pids("", 1).is_empty());
    }

    #[test]
    fn test_detached_args_carry_absolute_deadline() {
        let deadline = parse_datetime("2030-01-01T13:30:00").unwrap();
        let args = detached_args(Some(deadline), Some(Path::new("/tmp/awake.toml")));
        assert_eq!(
            args,
            vec![
                "--detached",
                "--quiet",
                "--config",
                "/tmp/awake.toml",
                "2030-01-01T13:30:00"
            ]
        );
    }

    #[test]
    fn test_detached_args_without_deadline() {
        assert_eq!(detached_args(None, None), vec!["--detached", "--quiet"]);
    }
}
