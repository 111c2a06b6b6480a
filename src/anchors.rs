//! Per-day anchor records: the five prayer times and sunrise.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{MINUTES_PER_DAY, Minute};
use crate::error::DayError;

/// The five daily prayers, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minute-of-day values for the five prayers of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors([Minute; 5]);

impl Anchors {
    pub fn new(fajr: Minute, dhuhr: Minute, asr: Minute, maghrib: Minute, isha: Minute) -> Self {
        Self([fajr, dhuhr, asr, maghrib, isha])
    }

    pub fn get(&self, prayer: Prayer) -> Minute {
        self.0[prayer.index()]
    }

    /// Anchors paired with their prayer, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, Minute)> + '_ {
        Prayer::ALL.iter().map(|&prayer| (prayer, self.get(prayer)))
    }
}

impl Index<Prayer> for Anchors {
    type Output = Minute;

    fn index(&self, prayer: Prayer) -> &Minute {
        &self.0[prayer.index()]
    }
}

/// One calendar date of externally supplied anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub anchors: Anchors,
    pub sunrise: Minute,
}

impl DayRecord {
    pub fn new(date: NaiveDate, anchors: Anchors, sunrise: Minute) -> Self {
        Self {
            date,
            anchors,
            sunrise,
        }
    }

    /// Check that every anchor lies within the day and that the daytime
    /// anchors follow canonical order. Isha is exempt from the ordering check
    /// because it may fall after midnight.
    pub fn validate(&self) -> Result<(), DayError> {
        let named = self
            .anchors
            .iter()
            .map(|(prayer, minute)| (prayer.name(), minute))
            .chain(std::iter::once(("Sunrise", self.sunrise)));
        for (anchor, value) in named {
            if !(0..MINUTES_PER_DAY).contains(&value.value()) {
                return Err(DayError::AnchorOutOfRange { anchor, value });
            }
        }

        let ordered = [
            ("Fajr", self.anchors[Prayer::Fajr]),
            ("Sunrise", self.sunrise),
            ("Dhuhr", self.anchors[Prayer::Dhuhr]),
            ("Asr", self.anchors[Prayer::Asr]),
            ("Maghrib", self.anchors[Prayer::Maghrib]),
        ];
        for pair in ordered.windows(2) {
            let (earlier, earlier_at) = pair[0];
            let (later, later_at) = pair[1];
            if later_at < earlier_at {
                return Err(DayError::AnchorsOutOfOrder {
                    earlier,
                    earlier_at,
                    later,
                    later_at,
                });
            }
        }

        Ok(())
    }

    /// Isha on the extended scale, lifted past midnight when its clock value
    /// is earlier than Maghrib's.
    pub fn night_isha(&self) -> Minute {
        self.anchors[Prayer::Isha].after(self.anchors[Prayer::Maghrib])
    }

    /// Fajr of the following morning on the extended scale.
    pub fn next_fajr(&self) -> Minute {
        self.anchors[Prayer::Fajr].next_day()
    }
}

/// All loaded days, keyed and ordered by date.
#[derive(Debug, Clone, Default)]
pub struct AnchorTable {
    days: BTreeMap<NaiveDate, DayRecord>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` and keeps the existing row when the date
    /// is already present.
    pub fn insert(&mut self, record: DayRecord) -> bool {
        if self.days.contains_key(&record.date) {
            return false;
        }
        self.days.insert(record.date, record);
        true
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    /// Records in ascending date order.
    pub fn days(&self) -> impl Iterator<Item = &DayRecord> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<DayRecord> for AnchorTable {
    fn from_iter<I: IntoIterator<Item = DayRecord>>(iter: I) -> Self {
        let mut table = AnchorTable::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}
