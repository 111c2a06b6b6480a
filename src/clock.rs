//! Minute-of-day arithmetic on an extended two-day scale.
//!
//! A [`Minute`] counts minutes from 00:00 of a record's calendar date.
//! `[0, 1440)` is the date itself and `[1440, 2880)` is the following day, so a
//! window that runs past midnight is an explicit, checkable condition instead
//! of a silent rollover.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

pub const MINUTES_PER_DAY: i32 = 1440;

/// Largest offset a configured setting may contribute: the whole extended scale.
pub const MAX_SPAN: i32 = 2 * MINUTES_PER_DAY;

/// Input format for clock text in the anchor table (e.g. `04:31 AM`).
const TWELVE_HOUR_FORMAT: &str = "%I:%M %p";

/// Minutes since 00:00 of the planning date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Minute(i32);

impl Minute {
    pub const MIDNIGHT: Minute = Minute(0);

    /// Wrap a raw value on the extended scale.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Build a minute that must lie within a single day, `[0, 1440)`.
    pub fn of_day(value: i32) -> Result<Self, ClockError> {
        if (0..MINUTES_PER_DAY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ClockError::OutOfRange(value))
        }
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Which calendar day this minute falls on, relative to the planning date.
    pub fn day_offset(self) -> i32 {
        self.0.div_euclid(MINUTES_PER_DAY)
    }

    /// The wall-clock minute of day, `[0, 1440)`.
    pub fn clock_minutes(self) -> i32 {
        self.0.rem_euclid(MINUTES_PER_DAY)
    }

    pub fn crosses_midnight(self) -> bool {
        self.day_offset() != 0
    }

    /// The midnight that opens this minute's own calendar day.
    pub fn midnight(self) -> Minute {
        Self(self.day_offset() * MINUTES_PER_DAY)
    }

    /// First occurrence of this minute's clock time at or after `reference`.
    pub fn after(self, reference: Minute) -> Minute {
        let candidate = reference.midnight().0 + self.clock_minutes();
        if candidate >= reference.0 {
            Self(candidate)
        } else {
            Self(candidate + MINUTES_PER_DAY)
        }
    }

    /// Shift to the same clock time on the following day.
    pub fn next_day(self) -> Minute {
        Self(self.0 + MINUTES_PER_DAY)
    }

    pub fn to_time(self) -> NaiveTime {
        NaiveTime::default() + TimeDelta::minutes(i64::from(self.clock_minutes()))
    }
}

impl Add<i32> for Minute {
    type Output = Minute;

    fn add(self, minutes: i32) -> Minute {
        Minute(self.0 + minutes)
    }
}

impl Sub<i32> for Minute {
    type Output = Minute;

    fn sub(self, minutes: i32) -> Minute {
        Minute(self.0 - minutes)
    }
}

impl Sub<Minute> for Minute {
    type Output = i32;

    fn sub(self, other: Minute) -> i32 {
        self.0 - other.0
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day_offset() {
            0 => write!(f, "{}", format_24h(*self)),
            offset => write!(f, "{}{:+}d", format_24h(*self), offset),
        }
    }
}

/// Convert a configured minute count to an offset on the extended scale,
/// saturating at [`MAX_SPAN`] so oversized settings cannot wrap negative.
pub fn span(minutes: u32) -> i32 {
    i32::try_from(minutes).map_or(MAX_SPAN, |value| value.min(MAX_SPAN))
}

pub fn to_minutes(time: NaiveTime) -> Minute {
    Minute((time.hour() * 60 + time.minute()) as i32)
}

/// Parse 12-hour clock text such as `04:31 AM` or ` 1:05 pm`.
pub fn parse_12h(text: &str) -> Result<Minute, ClockError> {
    let normalized = text.trim().to_ascii_uppercase();
    NaiveTime::parse_from_str(&normalized, TWELVE_HOUR_FORMAT)
        .map(to_minutes)
        .map_err(|source| ClockError::Unparseable {
            input: text.to_string(),
            source,
        })
}

/// Render as 24-hour `HH:MM` wall-clock text.
pub fn format_24h(minute: Minute) -> String {
    minute.to_time().format("%H:%M").to_string()
}

/// Render as 12-hour `hh:MM AM` wall-clock text.
pub fn format_12h(minute: Minute) -> String {
    minute.to_time().format(TWELVE_HOUR_FORMAT).to_string()
}
