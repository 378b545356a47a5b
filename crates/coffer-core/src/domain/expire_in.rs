//! Human-readable expiration durations (`"2 hours"`, `"1 day"`, `"never"`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpireInError {
    #[error("expire_in is empty")]
    Empty,

    #[error("invalid expire_in: {0}")]
    Invalid(String),

    #[error("expire_in is out of range: {0}")]
    OutOfRange(String),
}

/// Parsed `expire_in` value.
///
/// Accepted forms:
/// - `never`: keep the artifacts forever
/// - a bare integer: seconds
/// - one or more `<number> <unit>` pairs: `2 hours`, `1 day 2 hours`, `3d 4h`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireIn {
    Never,
    After(TimeDelta),
}

impl ExpireIn {
    pub fn parse(input: &str) -> Result<Self, ExpireInError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ExpireInError::Empty);
        }
        if normalized == "never" {
            return Ok(ExpireIn::Never);
        }
        if let Ok(secs) = normalized.parse::<u64>() {
            return to_delta(std::time::Duration::from_secs(secs), input).map(ExpireIn::After);
        }

        let mut total = std::time::Duration::ZERO;
        let pairs =
            tokenize(&normalized).ok_or_else(|| ExpireInError::Invalid(input.to_string()))?;
        for (amount, unit) in pairs {
            let part = humantime::parse_duration(&format!("{amount}{}", canonical_unit(&unit)))
                .map_err(|_| ExpireInError::Invalid(input.to_string()))?;
            total = total
                .checked_add(part)
                .ok_or_else(|| ExpireInError::OutOfRange(input.to_string()))?;
        }
        to_delta(total, input).map(ExpireIn::After)
    }

    /// Deadline relative to `now`, or `None` for [`ExpireIn::Never`].
    ///
    /// Fails with [`ExpireInError::OutOfRange`] when the deadline lies beyond
    /// the representable date range.
    pub fn deadline_from(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ExpireInError> {
        match self {
            ExpireIn::Never => Ok(None),
            ExpireIn::After(delta) => now
                .checked_add_signed(*delta)
                .map(Some)
                .ok_or_else(|| ExpireInError::OutOfRange(self.to_string())),
        }
    }
}

impl FromStr for ExpireIn {
    type Err = ExpireInError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ExpireIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpireIn::Never => f.write_str("never"),
            ExpireIn::After(delta) => match delta.to_std() {
                Ok(d) => write!(f, "{}", humantime::format_duration(d)),
                Err(_) => write!(f, "{}s", delta.num_seconds()),
            },
        }
    }
}

fn to_delta(duration: std::time::Duration, input: &str) -> Result<TimeDelta, ExpireInError> {
    TimeDelta::from_std(duration).map_err(|_| ExpireInError::OutOfRange(input.to_string()))
}

/// Splits `"1 day, 2 hours and 3m"` into `[("1","day"), ("2","hours"), ("3","m")]`.
fn tokenize(input: &str) -> Option<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut amount = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
            amount.push(c);
            chars.next();
        }
        if amount.is_empty() {
            // "and" between pairs
            let word: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_alphabetic())).collect();
            if word == "and" && !pairs.is_empty() {
                continue;
            }
            return None;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let unit: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_alphabetic())).collect();
        if unit.is_empty() {
            return None;
        }
        pairs.push((amount, unit));
    }

    if pairs.is_empty() { None } else { Some(pairs) }
}

fn canonical_unit(unit: &str) -> &str {
    match unit {
        "secs" => "sec",
        "mins" | "mn" => "min",
        "hrs" => "hours",
        "wk" | "wks" => "week",
        "mo" | "mos" => "month",
        "yr" | "yrs" => "year",
        other => other,
    }
}
