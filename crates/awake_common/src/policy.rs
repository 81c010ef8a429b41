//! Run policy: how long an invocation keeps the machine awake.
//!
//! Accepted forms for the positional argument:
//! - bare seconds: `90`
//! - unit groups in decreasing order: `1d`, `12h30m`, `45s`
//! - local datetime: `2030-01-01T00:00:00`

use crate::error::PolicyError;
use chrono::{Duration, NaiveDateTime};
use std::str::FromStr;

/// Datetime format accepted as a deadline
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Longest accepted duration: one hundred 365-day years.
/// Every window up to this has a wall-clock deadline on all platforms.
pub const MAX_DURATION_SECS: u64 = 100 * 365 * SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPolicy {
    /// Foreground run with no duration
    Indefinite,
    /// Run for this many seconds
    FixedDuration(u64),
    /// Detached run with no duration, ended by a signal
    UntilCancelled,
}

/// A parsed positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Relative window in seconds
    After(u64),
    /// Local wall-clock deadline
    At(NaiveDateTime),
}

impl FromStr for Target {
    type Err = PolicyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if looks_like_datetime(raw) {
            parse_datetime(raw).map(Target::At)
        } else {
            parse_duration(raw).map(Target::After)
        }
    }
}

impl Target {
    /// Convert to an absolute deadline so a re-spawned process does not drift.
    pub fn absolute(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Target::At(at) => Some(at),
            Target::After(secs) => RunPolicy::FixedDuration(secs).deadline_from(now),
        }
    }
}

impl RunPolicy {
    /// Build a policy from the positional argument.
    ///
    /// `now` is only consulted for datetime targets; a datetime in the past
    /// yields `FixedDuration(0)`.
    pub fn from_target(target: Option<Target>, detached: bool, now: NaiveDateTime) -> Self {
        match target {
            None if detached => RunPolicy::UntilCancelled,
            None => RunPolicy::Indefinite,
            Some(Target::After(secs)) => RunPolicy::FixedDuration(secs),
            Some(Target::At(at)) => {
                let remaining = at.signed_duration_since(now).num_seconds().max(0);
                RunPolicy::FixedDuration(remaining as u64)
            }
        }
    }

    /// Parse and build in one step.
    pub fn from_request(
        arg: Option<&str>,
        detached: bool,
        now: NaiveDateTime,
    ) -> Result<Self, PolicyError> {
        let target = arg.map(str::parse::<Target>).transpose()?;
        Ok(Self::from_target(target, detached, now))
    }

    pub fn seconds(&self) -> Option<u64> {
        match self {
            RunPolicy::FixedDuration(secs) => Some(*secs),
            RunPolicy::Indefinite | RunPolicy::UntilCancelled => None,
        }
    }

    /// A zero-length window needs no inhibition at all.
    pub fn is_immediate(&self) -> bool {
        matches!(self, RunPolicy::FixedDuration(0))
    }

    /// Wall-clock deadline relative to `now`, if the policy has one.
    pub fn deadline_from(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let secs = i64::try_from(self.seconds()?).ok()?;
        now.checked_add_signed(Duration::try_seconds(secs)?)
    }
}

fn looks_like_datetime(raw: &str) -> bool {
    raw.len() == 19 && raw.chars().nth(4) == Some('-')
}

pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, PolicyError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| PolicyError::InvalidDatetime(format!("{raw} ({e})")))
}

/// Parse a duration in seconds.
///
/// Units must appear at most once and in decreasing order (`d`, `h`, `m`, `s`).
/// Numbers may not carry leading zeros. The total may not exceed
/// [`MAX_DURATION_SECS`].
pub fn parse_duration(raw: &str) -> Result<u64, PolicyError> {
    let total = parse_seconds(raw)?;
    if total > MAX_DURATION_SECS {
        return Err(PolicyError::InvalidDuration(format!("{raw} (longer than 100 years)")));
    }
    Ok(total)
}

fn parse_seconds(raw: &str) -> Result<u64, PolicyError> {
    let invalid = || PolicyError::InvalidDuration(raw.to_string());

    if raw.is_empty() {
        return Err(invalid());
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        return parse_number(raw).ok_or_else(invalid);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    let mut last_factor = u64::MAX;

    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let factor = match c {
            'd' => SECONDS_PER_DAY,
            'h' => SECONDS_PER_HOUR,
            'm' => SECONDS_PER_MINUTE,
            's' => 1,
            _ => return Err(invalid()),
        };
        if factor >= last_factor {
            return Err(invalid());
        }
        last_factor = factor;

        let number = parse_number(&digits).ok_or_else(invalid)?;
        total = number
            .checked_mul(factor)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
        digits.clear();
    }

    // trailing digits without a unit
    if !digits.is_empty() {
        return Err(invalid());
    }

    Ok(total)
}

fn parse_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    digits.parse().ok()
}
