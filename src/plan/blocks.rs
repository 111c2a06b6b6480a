//! Fixed-length prayer blocks, with the weekly Jummah override.

use chrono::{Datelike, Weekday};

use crate::anchors::{DayRecord, Prayer};
use crate::clock::span;
use crate::config::BlocksConfig;

use super::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRules {
    /// Length of every regular prayer block.
    pub prayer_duration: i32,
    /// Total length of the weekly override, split evenly around its anchor.
    pub jummah_duration: i32,
    pub jummah_weekday: Weekday,
    pub jummah_prayer: Prayer,
}

impl BlockRules {
    pub fn new(config: &BlocksConfig) -> Self {
        Self {
            prayer_duration: span(config.prayer_duration_minutes),
            jummah_duration: span(config.jummah_duration_minutes),
            jummah_weekday: config.jummah_weekday,
            jummah_prayer: config.jummah_prayer,
        }
    }

    /// Build the five blocks for a day. Isha uses its night placement so a
    /// post-midnight Isha keeps its block after Maghrib.
    pub fn allocate(&self, record: &DayRecord) -> PrayerBlocks {
        let anchor_of = |prayer: Prayer| match prayer {
            Prayer::Isha => record.night_isha(),
            other => record.anchors[other],
        };

        let windows = Prayer::ALL.map(|prayer| {
            let start = anchor_of(prayer);
            Window::new(start, start + self.prayer_duration)
        });
        let mut blocks = PrayerBlocks {
            windows,
            jummah: None,
        };

        if record.date.weekday() == self.jummah_weekday {
            let anchor = anchor_of(self.jummah_prayer);
            let half = self.jummah_duration / 2;
            let window = Window::new(anchor - half, anchor + half);
            blocks.set(self.jummah_prayer, window);
            blocks.jummah = Some(self.jummah_prayer);
        }

        blocks
    }
}

impl Default for BlockRules {
    fn default() -> Self {
        Self::new(&BlocksConfig::default())
    }
}

/// The occupied interval for each prayer on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerBlocks {
    windows: [Window; 5],
    jummah: Option<Prayer>,
}

impl PrayerBlocks {
    pub fn get(&self, prayer: Prayer) -> Window {
        self.windows[prayer as usize]
    }

    pub(crate) fn set(&mut self, prayer: Prayer, window: Window) {
        self.windows[prayer as usize] = window;
    }

    /// Blocks paired with their prayer, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, Window)> + '_ {
        Prayer::ALL.iter().map(|&prayer| (prayer, self.get(prayer)))
    }

    /// The override interval, present only on the weekly congregation day.
    pub fn jummah(&self) -> Option<Window> {
        self.jummah.map(|prayer| self.get(prayer))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::anchors::Anchors;
    use crate::clock::Minute;

    fn record(year: i32, month: u32, day: u32) -> DayRecord {
        DayRecord::new(
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            Anchors::new(
                Minute::new(200),
                Minute::new(765),
                Minute::new(1005),
                Minute::new(1250),
                Minute::new(1370),
            ),
            Minute::new(300),
        )
    }

    #[test]
    fn test_regular_day_blocks() {
        // 2023-06-14 is a Wednesday.
        let blocks = BlockRules::default().allocate(&record(2023, 6, 14));
        assert_eq!(blocks.get(Prayer::Fajr), Window::new(Minute::new(200), Minute::new(205)));
        assert_eq!(blocks.get(Prayer::Dhuhr), Window::new(Minute::new(765), Minute::new(770)));
        assert_eq!(blocks.get(Prayer::Isha), Window::new(Minute::new(1370), Minute::new(1375)));
        assert!(blocks.jummah().is_none());
        assert!(blocks.iter().all(|(_, w)| w.duration() == 5));
    }

    #[test]
    fn test_friday_overrides_dhuhr_symmetrically() {
        // 2023-06-16 is a Friday.
        let blocks = BlockRules::default().allocate(&record(2023, 6, 16));
        let jummah = blocks.jummah().unwrap();
        assert_eq!(jummah, Window::new(Minute::new(705), Minute::new(825)));
        assert_eq!(blocks.get(Prayer::Dhuhr), jummah);
        assert_eq!(jummah.duration(), 120);
        assert_eq!(Minute::new(765) - jummah.start, jummah.end - Minute::new(765));
    }

    #[test]
    fn test_friday_leaves_other_blocks_untouched() {
        let rules = BlockRules::default();
        let wednesday = rules.allocate(&record(2023, 6, 14));
        let friday = rules.allocate(&record(2023, 6, 16));
        for prayer in [Prayer::Fajr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha] {
            assert_eq!(wednesday.get(prayer), friday.get(prayer));
        }
    }

    #[test]
    fn test_configured_override_day_and_prayer() {
        let config = BlocksConfig {
            jummah_weekday: Weekday::Wed,
            jummah_prayer: Prayer::Asr,
            jummah_duration_minutes: 60,
            ..BlocksConfig::default()
        };
        let blocks = BlockRules::new(&config).allocate(&record(2023, 6, 14));
        assert_eq!(blocks.get(Prayer::Asr), Window::new(Minute::new(975), Minute::new(1035)));
        assert_eq!(blocks.get(Prayer::Dhuhr).duration(), 5);
    }

    #[test]
    fn test_isha_after_midnight_block_on_next_day() {
        let mut day = record(2023, 6, 14);
        day.anchors = Anchors::new(
            Minute::new(130),
            Minute::new(780),
            Minute::new(1060),
            Minute::new(1300),
            Minute::new(15),
        );
        let blocks = BlockRules::default().allocate(&day);
        assert_eq!(blocks.get(Prayer::Isha), Window::new(Minute::new(1455), Minute::new(1460)));
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn override_is_symmetric_with_total_length(day in 0u32..28, dhuhr in 700i32..800) {
                let mut day_record = record(2023, 2, day + 1);
                day_record.anchors = Anchors::new(
                    Minute::new(300),
                    Minute::new(dhuhr),
                    Minute::new(900),
                    Minute::new(1100),
                    Minute::new(1200),
                );
                let blocks = BlockRules::default().allocate(&day_record);
                match blocks.jummah() {
                    Some(window) => {
                        prop_assert_eq!(day_record.date.weekday(), Weekday::Fri);
                        prop_assert_eq!(window.duration(), 120);
                        prop_assert_eq!(window.start + 60, Minute::new(dhuhr));
                    }
                    None => {
                        prop_assert_ne!(day_record.date.weekday(), Weekday::Fri);
                        prop_assert_eq!(blocks.get(Prayer::Dhuhr).duration(), 5);
                    }
                }
            }
        }
    }
}
