//! Budget reset period ("1d", "30m", "1 day", "2 weeks", "1mo").
//!
//! The configured text is kept verbatim so the session layer persists exactly what
//! the operator wrote; the parsed form is only used to compute reset instants.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetPeriodError {
    #[error("budget period is empty")]
    Empty,
    #[error("budget period must start with a positive integer: {0}")]
    InvalidAmount(String),
    #[error("unknown budget period unit: {0}")]
    UnknownUnit(String),
    #[error("budget period is too large: {0}")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    // 30 days
    Months,
}

impl PeriodUnit {
    fn parse(unit: &str) -> Option<Self> {
        let unit = unit.to_ascii_lowercase();
        let parsed = match unit.as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Self::Seconds,
            "m" | "min" | "mins" | "minute" | "minutes" => Self::Minutes,
            "h" | "hr" | "hrs" | "hour" | "hours" => Self::Hours,
            "d" | "day" | "days" => Self::Days,
            "w" | "week" | "weeks" => Self::Weeks,
            "mo" | "month" | "months" => Self::Months,
            _ => return None,
        };
        Some(parsed)
    }

    fn seconds(&self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
            Self::Weeks => 7 * 86_400,
            Self::Months => 30 * 86_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BudgetPeriod {
    raw: String,
    unit: PeriodUnit,
    // amount * unit, range-checked when parsed
    delta: TimeDelta,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        self.delta
    }

    /// Instant at which a budget started at `from` resets. `None` past the calendar's range.
    pub fn next_reset(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        from.checked_add_signed(self.as_time_delta())
    }
}

/// One day, written `1d`.
impl Default for BudgetPeriod {
    fn default() -> Self {
        Self {
            raw: "1d".to_string(),
            unit: PeriodUnit::Days,
            delta: TimeDelta::days(1),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = BudgetPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(BudgetPeriodError::Empty);
        }

        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (digits, unit) = raw.split_at(split);

        if digits.is_empty() {
            return Err(BudgetPeriodError::InvalidAmount(raw.to_string()));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|_| BudgetPeriodError::Overflow(raw.to_string()))?;
        if amount == 0 {
            return Err(BudgetPeriodError::InvalidAmount(raw.to_string()));
        }

        let unit = PeriodUnit::parse(unit.trim())
            .ok_or_else(|| BudgetPeriodError::UnknownUnit(unit.trim().to_string()))?;

        let delta = i64::from(amount)
            .checked_mul(unit.seconds())
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| BudgetPeriodError::Overflow(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            unit,
            delta,
        })
    }
}

impl TryFrom<String> for BudgetPeriod {
    type Error = BudgetPeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BudgetPeriod> for String {
    fn from(value: BudgetPeriod) -> Self {
        value.raw
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
