//! Command-line surface.

use awake_common::Target;
use clap::Parser;
use std::path::PathBuf;

// Version is embedded at build time
pub const VERSION: &str = env!("AWAKE_VERSION");

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "awake")]
#[command(about = "Keep the machine awake, optionally for a duration or until a datetime")]
#[command(
    override_usage = "awake [OPTIONS] [<duration> | <datetime>]",
    disable_version_flag = true,
    after_help = concat!(
        "Examples:\n",
        "  awake                       stay awake until Ctrl-C\n",
        "  awake 12h30m                stay awake for 12 hours 30 minutes\n",
        "  awake 2030-01-01T00:00:00   stay awake until the given local time\n",
        "  awake -d 1h                 stay awake for an hour in the background",
    )
)]
pub struct Cli {
    /// Duration (e.g. 90, 45s, 12h30m, 1d) or local datetime (e.g. 2030-01-01T00:00:00)
    #[arg(value_name = "DURATION|DATETIME", value_parser = parse_target)]
    pub target: Option<Target>,

    /// Run in the background
    #[arg(short, long, conflicts_with = "kill")]
    pub daemon: bool,

    /// Stop any other running awake processes and exit
    #[arg(short, long)]
    pub kill: bool,

    /// Stop any other running awake processes before starting
    #[arg(long)]
    pub replace: bool,

    /// Do not print status
    #[arg(short, long)]
    pub quiet: bool,

    /// Read settings from a TOML file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Set on the re-spawned background process
    #[arg(long, hide = true)]
    pub detached: bool,
}

fn parse_target(raw: &str) -> Result<Target, String> {
    raw.parse::<Target>().map_err(|e| e.to_string())
}

pub fn version_line() -> String {
    format!("awake {}", VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("awake").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.target, None);
        assert!(!cli.daemon && !cli.kill && !cli.version);
    }

    #[test]
    fn test_duration_and_flags() {
        let cli = parse(&["-d", "-q", "12h30m"]).unwrap();
        assert_eq!(cli.target, Some(Target::After(45_000)));
        assert!(cli.daemon);
        assert!(cli.quiet);
    }

    #[test]
    fn test_version_flag() {
        assert!(parse(&["-v"]).unwrap().version);
        assert!(parse(&["--version"]).unwrap().version);
        assert!(version_line().starts_with("awake "));
    }

    #[test]
    fn test_negative_duration_is_usage_error() {
        let err = parse(&["-1"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_malformed_duration_is_usage_error() {
        let err = parse(&["5m1h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("invalid duration"));
    }

    #[test]
    fn test_daemon_conflicts_with_kill() {
        let err = parse(&["-d", "-k"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
