//! Tabular rendering of a planned schedule.
//!
//! Times are written as 12-hour clock text, except sunrise which keeps the
//! 24-hour form. Windows that run past midnight are written by their clock
//! time on the following day.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::anchors::Prayer;
use crate::clock::{format_12h, format_24h};
use crate::plan::{DayPlan, Schedule};

/// Column order of the exported sheet.
pub const HEADER: [&str; 21] = [
    "Date",
    "Fajr",
    "Sunrise",
    "Dhuhr",
    "Asr",
    "Maghrib",
    "Isha",
    "Fajr_start",
    "Fajr_end",
    "Dhuhr_start",
    "Dhuhr_end",
    "Asr_start",
    "Asr_end",
    "Maghrib_start",
    "Maghrib_end",
    "Isha_start",
    "Isha_end",
    "SleepStart",
    "SleepEnd",
    "NapStart",
    "NapEnd",
];

/// One exported line; field order matches [`HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
    #[serde(rename = "Fajr_start")]
    pub fajr_start: String,
    #[serde(rename = "Fajr_end")]
    pub fajr_end: String,
    #[serde(rename = "Dhuhr_start")]
    pub dhuhr_start: String,
    #[serde(rename = "Dhuhr_end")]
    pub dhuhr_end: String,
    #[serde(rename = "Asr_start")]
    pub asr_start: String,
    #[serde(rename = "Asr_end")]
    pub asr_end: String,
    #[serde(rename = "Maghrib_start")]
    pub maghrib_start: String,
    #[serde(rename = "Maghrib_end")]
    pub maghrib_end: String,
    #[serde(rename = "Isha_start")]
    pub isha_start: String,
    #[serde(rename = "Isha_end")]
    pub isha_end: String,
    #[serde(rename = "SleepStart")]
    pub sleep_start: String,
    #[serde(rename = "SleepEnd")]
    pub sleep_end: String,
    #[serde(rename = "NapStart")]
    pub nap_start: String,
    #[serde(rename = "NapEnd")]
    pub nap_end: String,
}

impl PlanRow {
    pub fn from_day(day: &DayPlan) -> Self {
        let anchor = |prayer: Prayer| format_12h(day.record.anchors[prayer]);
        let start = |prayer: Prayer| format_12h(day.blocks.get(prayer).start);
        let end = |prayer: Prayer| format_12h(day.blocks.get(prayer).end);

        Self {
            date: day.date().format("%Y-%m-%d").to_string(),
            fajr: anchor(Prayer::Fajr),
            sunrise: format_24h(day.record.sunrise),
            dhuhr: anchor(Prayer::Dhuhr),
            asr: anchor(Prayer::Asr),
            maghrib: anchor(Prayer::Maghrib),
            isha: anchor(Prayer::Isha),
            fajr_start: start(Prayer::Fajr),
            fajr_end: end(Prayer::Fajr),
            dhuhr_start: start(Prayer::Dhuhr),
            dhuhr_end: end(Prayer::Dhuhr),
            asr_start: start(Prayer::Asr),
            asr_end: end(Prayer::Asr),
            maghrib_start: start(Prayer::Maghrib),
            maghrib_end: end(Prayer::Maghrib),
            isha_start: start(Prayer::Isha),
            isha_end: end(Prayer::Isha),
            sleep_start: format_12h(day.sleep.start),
            sleep_end: format_12h(day.sleep.end),
            nap_start: format_12h(day.nap.start),
            nap_end: format_12h(day.nap.end),
        }
    }

    /// Values in [`HEADER`] order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.fajr.clone(),
            self.sunrise.clone(),
            self.dhuhr.clone(),
            self.asr.clone(),
            self.maghrib.clone(),
            self.isha.clone(),
            self.fajr_start.clone(),
            self.fajr_end.clone(),
            self.dhuhr_start.clone(),
            self.dhuhr_end.clone(),
            self.asr_start.clone(),
            self.asr_end.clone(),
            self.maghrib_start.clone(),
            self.maghrib_end.clone(),
            self.isha_start.clone(),
            self.isha_end.clone(),
            self.sleep_start.clone(),
            self.sleep_end.clone(),
            self.nap_start.clone(),
            self.nap_end.clone(),
        ]
    }
}

pub fn plan_rows(schedule: &Schedule) -> Vec<PlanRow> {
    schedule.days.iter().map(PlanRow::from_day).collect()
}

/// Write the schedule as CSV to `path`, replacing any existing file.
pub fn write_csv(schedule: &Schedule, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create plan file {}", path.display()))?;
    write_csv_to(schedule, file)?;
    tracing::info!(path = %path.display(), days = schedule.days.len(), "Wrote plan");
    Ok(())
}

/// Like [`write_csv`] but writes to any `Write` sink.
pub fn write_csv_to<W: Write>(schedule: &Schedule, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if schedule.days.is_empty() {
        wtr.write_record(HEADER).context("Failed to write CSV header")?;
    }
    for row in plan_rows(schedule) {
        wtr.serialize(row).context("Failed to serialize plan row")?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
