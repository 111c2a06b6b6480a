use thiserror::Error;

use crate::clock::Minute;

/// Clock text that could not be turned into a minute of day.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("unparseable clock time {input:?}: {source}")]
    Unparseable {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("minute value {0} is outside 0..1440")]
    OutOfRange(i32),
}

/// Why a single day was kept out of the planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayError {
    #[error("{later} ({later_at}) is earlier than {earlier} ({earlier_at})")]
    AnchorsOutOfOrder {
        earlier: &'static str,
        earlier_at: Minute,
        later: &'static str,
        later_at: Minute,
    },
    #[error("inverted {window} range: {start} is not before {end}")]
    InvertedRange {
        window: &'static str,
        start: Minute,
        end: Minute,
    },
    #[error("{anchor} anchor {value} is outside a single day")]
    AnchorOutOfRange { anchor: &'static str, value: Minute },
}

/// Failure of the cross-day consensus step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("no day has a usable pre-sunrise range, consensus is undefined")]
    EmptyHistogram,
}

/// A row of the anchor table that could not become a [`DayRecord`](crate::anchors::DayRecord).
#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("unparseable date {input:?}: {source}")]
    Date {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("{column}: {source}")]
    Time {
        column: &'static str,
        #[source]
        source: ClockError,
    },
    #[error("duplicate date {0}")]
    DuplicateDate(chrono::NaiveDate),
}
