//! Schedule planning over an anchor table.
//!
//! Sleep, nap and prayer blocks are planned per day with no cross-day state.
//! The Fajr consensus then runs once over every planned day.

pub mod blocks;
pub mod consensus;
pub mod nap;
pub mod sleep;

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::anchors::{AnchorTable, DayRecord, Prayer};
use crate::clock::Minute;
use crate::config::AppConfig;
use crate::error::{ConsensusError, DayError};

pub use blocks::{BlockRules, PrayerBlocks};
pub use consensus::{Alignment, Assignment, ConsensusOutcome, FajrHistogram, FajrRules, FajrSlot};
pub use nap::NapRules;
pub use sleep::SleepRules;

/// A derived interval on the extended minute scale, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: Minute,
    pub end: Minute,
}

impl Window {
    pub fn new(start: Minute, end: Minute) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }

    /// True when the occupied minutes span two calendar days.
    pub fn crosses_midnight(&self) -> bool {
        self.duration() > 0 && self.start.day_offset() != (self.end - 1).day_offset()
    }

    pub fn contains(&self, minute: Minute) -> bool {
        self.start <= minute && minute < self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Everything derived for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub record: DayRecord,
    pub sleep: Window,
    pub nap: Window,
    pub blocks: PrayerBlocks,
    /// How the Fajr block was reconciled; `None` when consensus did not run.
    pub fajr_alignment: Option<Alignment>,
}

impl DayPlan {
    pub fn date(&self) -> NaiveDate {
        self.record.date
    }
}

/// A day kept out of the plan, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDay {
    pub date: NaiveDate,
    pub error: DayError,
}

/// What happened to the cross-day Fajr step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusStatus {
    Disabled,
    Selected {
        minute: Minute,
        votes: u32,
        excluded_days: usize,
    },
    Failed(ConsensusError),
}

impl ConsensusStatus {
    pub fn minute(&self) -> Option<Minute> {
        match self {
            ConsensusStatus::Selected { minute, .. } => Some(*minute),
            _ => None,
        }
    }
}

/// Result of planning a whole anchor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Planned days in ascending date order.
    pub days: Vec<DayPlan>,
    pub rejected: Vec<RejectedDay>,
    pub consensus: ConsensusStatus,
}

/// Counters describing a planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub days_planned: usize,
    pub days_rejected: usize,
    pub consensus_minute: Option<Minute>,
    pub days_on_consensus: usize,
    pub days_on_fallback: usize,
    pub days_excluded_from_vote: usize,
    pub sleep_truncated: usize,
    pub naps_truncated: usize,
    pub jummah_overrides: usize,
}

impl Schedule {
    pub fn summary(&self, planner: &SchedulePlanner) -> PlanSummary {
        let count_alignment = |alignment: Alignment| {
            self.days
                .iter()
                .filter(|day| day.fajr_alignment == Some(alignment))
                .count()
        };

        PlanSummary {
            days_planned: self.days.len(),
            days_rejected: self.rejected.len(),
            consensus_minute: self.consensus.minute(),
            days_on_consensus: count_alignment(Alignment::Consensus),
            days_on_fallback: count_alignment(Alignment::Fallback),
            days_excluded_from_vote: match self.consensus {
                ConsensusStatus::Selected { excluded_days, .. } => excluded_days,
                _ => 0,
            },
            sleep_truncated: self
                .days
                .iter()
                .filter(|day| day.sleep.duration() < planner.sleep.duration)
                .count(),
            naps_truncated: self
                .days
                .iter()
                .filter(|day| day.nap.duration() < planner.nap.duration)
                .count(),
            jummah_overrides: self
                .days
                .iter()
                .filter(|day| day.blocks.jummah().is_some())
                .count(),
        }
    }
}

/// Plans every day of an anchor table with a fixed set of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePlanner {
    pub sleep: SleepRules,
    pub nap: NapRules,
    pub blocks: BlockRules,
    pub fajr: FajrRules,
    pub consensus_enabled: bool,
}

impl SchedulePlanner {
    pub fn new(config: &AppConfig) -> Self {
        let blocks = BlockRules::new(&config.blocks);
        Self {
            sleep: SleepRules::new(&config.sleep),
            nap: NapRules::new(&config.nap),
            fajr: FajrRules::new(&config.fajr, blocks.prayer_duration),
            blocks,
            consensus_enabled: config.fajr.consensus_enabled,
        }
    }

    /// Plan every day of the table, then align the Fajr blocks.
    pub fn plan(&self, table: &AnchorTable) -> Schedule {
        let mut days = Vec::with_capacity(table.len());
        let mut rejected = Vec::new();

        for record in table.days() {
            match self.plan_day(record) {
                Ok(day) => {
                    tracing::debug!(
                        date = %day.date(),
                        sleep = %day.sleep,
                        nap = %day.nap,
                        "Planned day"
                    );
                    days.push(day);
                }
                Err(error) => {
                    tracing::warn!(date = %record.date, %error, "Rejecting day");
                    rejected.push(RejectedDay {
                        date: record.date,
                        error,
                    });
                }
            }
        }

        let consensus = if self.consensus_enabled {
            self.align_fajr(&mut days)
        } else {
            ConsensusStatus::Disabled
        };

        Schedule {
            days,
            rejected,
            consensus,
        }
    }

    /// Plan a single day without the cross-day Fajr step.
    pub fn plan_day(&self, record: &DayRecord) -> Result<DayPlan, DayError> {
        record.validate()?;

        let evening = record.night_isha();
        let morning = record.next_fajr();
        ensure_ordered("sleep", evening, morning)?;

        let midday_start = record.anchors[Prayer::Dhuhr];
        let midday_end = record.anchors[Prayer::Asr];
        ensure_ordered("nap", midday_start, midday_end)?;

        Ok(DayPlan {
            record: record.clone(),
            sleep: self.sleep.plan(evening, morning),
            nap: self.nap.plan(midday_start, midday_end),
            blocks: self.blocks.allocate(record),
            fajr_alignment: None,
        })
    }

    fn align_fajr(&self, days: &mut [DayPlan]) -> ConsensusStatus {
        let slots: Vec<FajrSlot> = days
            .iter()
            .map(|day| FajrSlot {
                block_start: day.blocks.get(Prayer::Fajr).start,
                sunrise: day.record.sunrise,
            })
            .collect();

        match consensus::reconcile(&self.fajr, &slots) {
            Ok(outcome) => {
                for (day, assignment) in days.iter_mut().zip(&outcome.assignments) {
                    day.blocks.set(Prayer::Fajr, assignment.block);
                    day.fajr_alignment = Some(assignment.alignment);
                }
                tracing::info!(
                    minute = %outcome.minute,
                    votes = outcome.votes,
                    excluded_days = outcome.excluded_days,
                    "Selected Fajr consensus"
                );
                ConsensusStatus::Selected {
                    minute: outcome.minute,
                    votes: outcome.votes,
                    excluded_days: outcome.excluded_days,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Fajr consensus skipped, keeping per-day blocks");
                ConsensusStatus::Failed(error)
            }
        }
    }
}

impl Default for SchedulePlanner {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

fn ensure_ordered(window: &'static str, start: Minute, end: Minute) -> Result<(), DayError> {
    if start < end {
        Ok(())
    } else {
        Err(DayError::InvertedRange { window, start, end })
    }
}
