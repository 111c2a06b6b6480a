//! Cross-day selection of one recurring Fajr time.
//!
//! Runs in two phases:
//! 1. [`FajrHistogram::build`] folds every day's permissible range into an
//!    immutable count of how many days could start the block at each minute.
//! 2. [`FajrRules::assign`] reconciles each day against the winning minute.
//!
//! Phase 2 only starts once the histogram is complete, since the winning
//! minute depends on every day.

use std::collections::BTreeMap;

use crate::clock::{Minute, span};
use crate::config::FajrConfig;
use crate::error::ConsensusError;

use super::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FajrRules {
    /// Length of the Fajr block.
    pub block_duration: i32,
    /// Minimum gap between the end of the permissible range and sunrise.
    pub pre_sunrise_delay: i32,
}

impl FajrRules {
    pub fn new(config: &FajrConfig, block_duration: i32) -> Self {
        Self {
            block_duration,
            pre_sunrise_delay: span(config.pre_sunrise_delay_minutes),
        }
    }

    /// Latest minute the block may occupy on a day with this sunrise.
    pub fn upper_bound(&self, sunrise: Minute) -> Minute {
        sunrise - self.pre_sunrise_delay - self.block_duration
    }

    /// The day's permissible range, or `None` when sunrise leaves no room.
    pub fn permissible(&self, slot: FajrSlot) -> Option<Window> {
        let upper = self.upper_bound(slot.sunrise);
        (slot.block_start <= upper).then(|| Window::new(slot.block_start, upper))
    }

    /// Start minutes a day votes for: the permissible range minus a final
    /// block-wide margin. Empty when the range is too narrow.
    fn votes(&self, slot: FajrSlot) -> std::ops::RangeInclusive<i32> {
        let last = self.upper_bound(slot.sunrise) - self.block_duration;
        slot.block_start.value()..=last.value()
    }

    /// Phase 2: adopt the consensus minute when the whole block fits the
    /// day's range, otherwise fall back to whichever of the day's own start
    /// and the consensus minute is earlier.
    pub fn assign(&self, slot: FajrSlot, consensus: Minute) -> Assignment {
        let fits = self.permissible(slot).is_some_and(|range| {
            range.contains(consensus) && consensus + self.block_duration <= range.end
        });

        let (start, alignment) = if fits {
            (consensus, Alignment::Consensus)
        } else {
            (slot.block_start.min(consensus), Alignment::Fallback)
        };

        Assignment {
            block: Window::new(start, start + self.block_duration),
            alignment,
        }
    }
}

impl Default for FajrRules {
    fn default() -> Self {
        Self::new(&FajrConfig::default(), 5)
    }
}

/// One day's input to the consensus: its unmodified block start and sunrise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FajrSlot {
    pub block_start: Minute,
    pub sunrise: Minute,
}

/// Whether a day took the shared minute or kept a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Consensus,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub block: Window,
    pub alignment: Alignment,
}

/// Per-minute vote counts over the whole day set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FajrHistogram {
    counts: BTreeMap<Minute, u32>,
    excluded_days: usize,
}

impl FajrHistogram {
    /// Phase 1: fold every day's voting range into a frequency map.
    pub fn build<I>(rules: &FajrRules, slots: I) -> Self
    where
        I: IntoIterator<Item = FajrSlot>,
    {
        slots
            .into_iter()
            .fold(FajrHistogram::default(), |mut histogram, slot| {
                let votes = rules.votes(slot);
                if votes.is_empty() {
                    histogram.excluded_days += 1;
                }
                for minute in votes {
                    *histogram.counts.entry(Minute::new(minute)).or_insert(0) += 1;
                }
                histogram
            })
    }

    pub fn count(&self, minute: Minute) -> u32 {
        self.counts.get(&minute).copied().unwrap_or(0)
    }

    /// Days whose range was too narrow to vote.
    pub fn excluded_days(&self) -> usize {
        self.excluded_days
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most voted minute; ties go to the earliest minute.
    pub fn mode(&self) -> Result<(Minute, u32), ConsensusError> {
        self.counts
            .iter()
            .fold(None, |best: Option<(Minute, u32)>, (&minute, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((minute, count)),
            })
            .ok_or(ConsensusError::EmptyHistogram)
    }
}

/// Result of both consensus phases over a day set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusOutcome {
    pub minute: Minute,
    /// Number of days that voted for `minute`.
    pub votes: u32,
    pub excluded_days: usize,
    /// One assignment per input slot, in input order.
    pub assignments: Vec<Assignment>,
}

/// Select the consensus minute over `slots` and reconcile every day with it.
pub fn reconcile(rules: &FajrRules, slots: &[FajrSlot]) -> Result<ConsensusOutcome, ConsensusError> {
    let histogram = FajrHistogram::build(rules, slots.iter().copied());
    let (minute, votes) = histogram.mode()?;

    let assignments = slots.iter().map(|&slot| rules.assign(slot, minute)).collect();

    Ok(ConsensusOutcome {
        minute,
        votes,
        excluded_days: histogram.excluded_days(),
        assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FajrRules {
        FajrRules::default()
    }

    /// A day whose permissible range is `[start, upper]`.
    fn slot(start: i32, upper: i32) -> FajrSlot {
        FajrSlot {
            block_start: Minute::new(start),
            sunrise: Minute::new(upper + 30 + 5),
        }
    }

    // ==================== Range Tests ====================

    #[test]
    fn test_upper_bound_subtracts_delay_and_block() {
        assert_eq!(rules().upper_bound(Minute::new(365)), Minute::new(330));
    }

    #[test]
    fn test_permissible_range() {
        assert_eq!(
            rules().permissible(slot(300, 330)),
            Some(Window::new(Minute::new(300), Minute::new(330)))
        );
        assert_eq!(rules().permissible(slot(300, 290)), None);
    }

    #[test]
    fn test_oversized_delay_leaves_no_range() {
        let config = FajrConfig {
            pre_sunrise_delay_minutes: u32::MAX,
            ..FajrConfig::default()
        };
        let rules = FajrRules::new(&config, 5);
        let slot = FajrSlot {
            block_start: Minute::new(200),
            sunrise: Minute::new(270),
        };
        assert!(rules.upper_bound(slot.sunrise) < slot.block_start);
        assert_eq!(rules.permissible(slot), None);
        assert!(FajrHistogram::build(&rules, [slot]).is_empty());
    }

    #[test]
    fn test_votes_exclude_final_margin() {
        let votes = rules().votes(slot(300, 330));
        assert_eq!(votes, 300..=325);
    }

    // ==================== Histogram Tests ====================

    #[test]
    fn test_histogram_counts_overlaps() {
        let histogram = FajrHistogram::build(&rules(), [slot(300, 330), slot(310, 340)]);
        assert_eq!(histogram.count(Minute::new(305)), 1);
        assert_eq!(histogram.count(Minute::new(310)), 2);
        assert_eq!(histogram.count(Minute::new(325)), 2);
        assert_eq!(histogram.count(Minute::new(330)), 1);
        assert_eq!(histogram.count(Minute::new(336)), 0);
    }

    #[test]
    fn test_narrow_range_is_excluded_from_vote() {
        // Range exists but is narrower than the margin.
        let histogram = FajrHistogram::build(&rules(), [slot(300, 303), slot(300, 330)]);
        assert_eq!(histogram.excluded_days(), 1);
        assert_eq!(histogram.count(Minute::new(300)), 1);
    }

    #[test]
    fn test_mode_prefers_lowest_minute_on_ties() {
        let histogram = FajrHistogram::build(&rules(), [slot(300, 330), slot(350, 380)]);
        assert_eq!(histogram.mode().unwrap(), (Minute::new(300), 1));
    }

    #[test]
    fn test_empty_histogram_is_an_error() {
        let histogram = FajrHistogram::build(&rules(), [slot(300, 290)]);
        assert!(histogram.is_empty());
        assert_eq!(histogram.mode(), Err(ConsensusError::EmptyHistogram));
        assert_eq!(
            reconcile(&rules(), &[slot(300, 290)]),
            Err(ConsensusError::EmptyHistogram)
        );
    }

    #[test]
    fn test_no_days_is_an_error() {
        assert_eq!(reconcile(&rules(), &[]), Err(ConsensusError::EmptyHistogram));
    }

    // ==================== Assignment Tests ====================

    #[test]
    fn test_five_day_example() {
        let slots = [
            slot(300, 330),
            slot(305, 335),
            slot(300, 330),
            slot(310, 340),
            slot(300, 330),
        ];
        let outcome = reconcile(&rules(), &slots).unwrap();
        assert_eq!(outcome.minute, Minute::new(310));
        assert_eq!(outcome.votes, 5);
        assert_eq!(outcome.excluded_days, 0);
        for assignment in &outcome.assignments {
            assert_eq!(assignment.alignment, Alignment::Consensus);
            assert_eq!(assignment.block, Window::new(Minute::new(310), Minute::new(315)));
        }
    }

    #[test]
    fn test_day_starting_after_consensus_keeps_consensus_as_fallback() {
        let assignment = rules().assign(slot(320, 360), Minute::new(310));
        assert_eq!(assignment.alignment, Alignment::Fallback);
        assert_eq!(assignment.block.start, Minute::new(310));
    }

    #[test]
    fn test_day_ending_before_consensus_keeps_own_start() {
        let assignment = rules().assign(slot(280, 300), Minute::new(310));
        assert_eq!(assignment.alignment, Alignment::Fallback);
        assert_eq!(assignment.block, Window::new(Minute::new(280), Minute::new(285)));
    }

    #[test]
    fn test_consensus_block_must_fit_before_upper_bound() {
        // 310 is inside [300, 312] but 310 + 5 overruns it.
        let assignment = rules().assign(slot(300, 312), Minute::new(310));
        assert_eq!(assignment.alignment, Alignment::Fallback);
        assert_eq!(assignment.block.start, Minute::new(300));
    }

    #[test]
    fn test_reconcile_is_repeatable() {
        let slots = [slot(290, 320), slot(300, 330), slot(330, 360)];
        assert_eq!(reconcile(&rules(), &slots), reconcile(&rules(), &slots));
    }

    // ==================== Property-Based Tests ====================

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn slots_strategy() -> impl Strategy<Value = Vec<FajrSlot>> {
            prop::collection::vec((180i32..400, 0i32..90), 1..40).prop_map(|ranges| {
                ranges
                    .into_iter()
                    .map(|(start, width)| slot(start, start + width))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn consensus_is_the_histogram_mode(slots in slots_strategy()) {
                let histogram = FajrHistogram::build(&rules(), slots.iter().copied());
                if let Ok(outcome) = reconcile(&rules(), &slots) {
                    let best = histogram.count(outcome.minute);
                    prop_assert_eq!(best, outcome.votes);
                    for minute in 0..1440 {
                        let count = histogram.count(Minute::new(minute));
                        prop_assert!(count <= best);
                        if count == best {
                            prop_assert!(Minute::new(minute) >= outcome.minute);
                        }
                    }
                }
            }

            #[test]
            fn assignment_follows_fit_rule(slots in slots_strategy()) {
                if let Ok(outcome) = reconcile(&rules(), &slots) {
                    for (slot, assignment) in slots.iter().zip(&outcome.assignments) {
                        let upper = rules().upper_bound(slot.sunrise);
                        let fits = outcome.minute >= slot.block_start
                            && outcome.minute + 5 <= upper;
                        if fits {
                            prop_assert_eq!(assignment.block.start, outcome.minute);
                        } else {
                            prop_assert_eq!(assignment.block.start, slot.block_start.min(outcome.minute));
                        }
                        prop_assert!(assignment.block.start <= slot.block_start.max(outcome.minute));
                        prop_assert_eq!(assignment.block.duration(), 5);
                    }
                }
            }
        }
    }
}
