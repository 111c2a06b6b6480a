//! CSV anchor-table loader.
//!
//! # CSV format
//!
//! One row per date, prayer times and sunrise in 12-hour clock text:
//!
//! ```csv
//! Date,Fajr,Sunrise,Dhuhr,Asr,Maghrib,Isha
//! 2023-06-12,02:20 AM,04:35 AM,01:00 PM,05:45 PM,09:30 PM,11:40 PM
//! ```
//!
//! Rows that cannot be parsed are rejected one by one and reported alongside
//! the table, unless the loader is strict.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::anchors::{AnchorTable, Anchors, DayRecord};
use crate::clock::{self, Minute};
use crate::config::InputConfig;
use crate::error::RowError;

#[derive(Debug, Deserialize)]
struct AnchorRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Fajr")]
    fajr: String,
    #[serde(rename = "Sunrise")]
    sunrise: String,
    #[serde(rename = "Dhuhr")]
    dhuhr: String,
    #[serde(rename = "Asr")]
    asr: String,
    #[serde(rename = "Maghrib")]
    maghrib: String,
    #[serde(rename = "Isha")]
    isha: String,
}

/// A skipped input row.
#[derive(Debug)]
pub struct RowRejection {
    /// 1-based line number in the file, the header being line 1.
    pub line: u64,
    pub error: RowError,
}

/// Outcome of loading an anchor file.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub table: AnchorTable,
    pub rejected: Vec<RowRejection>,
}

#[derive(Debug, Clone)]
pub struct AnchorLoader {
    date_format: String,
    strict: bool,
}

impl AnchorLoader {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            strict: config.strict,
        }
    }

    pub fn load_path(&self, path: &Path) -> Result<LoadReport> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open anchor table {}", path.display()))?;
        self.load_reader(file)
            .with_context(|| format!("Failed to load anchor table {}", path.display()))
    }

    /// Like [`AnchorLoader::load_path`] but accepts any `Read` source.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadReport> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV header")?
            .clone();

        let mut report = LoadReport::default();

        for (index, record) in csv_reader.records().enumerate() {
            let line = index as u64 + 2;
            let parsed = record
                .and_then(|record| record.deserialize::<AnchorRow>(Some(&headers)))
                .map_err(RowError::from)
                .and_then(|row| self.parse_row(&row))
                .and_then(|day| {
                    let date = day.date;
                    if report.table.insert(day) {
                        Ok(())
                    } else {
                        Err(RowError::DuplicateDate(date))
                    }
                });

            if let Err(error) = parsed {
                if self.strict {
                    return Err(anyhow::Error::new(error).context(format!("Rejected line {line}")));
                }
                tracing::warn!(line, %error, "Skipping anchor row");
                report.rejected.push(RowRejection { line, error });
            }
        }

        tracing::info!(
            days = report.table.len(),
            rejected = report.rejected.len(),
            "Loaded anchor table"
        );
        Ok(report)
    }

    fn parse_row(&self, row: &AnchorRow) -> Result<DayRecord, RowError> {
        let date = NaiveDate::parse_from_str(&row.date, &self.date_format).map_err(|source| {
            RowError::Date {
                input: row.date.clone(),
                source,
            }
        })?;

        let anchors = Anchors::new(
            parse_time("Fajr", &row.fajr)?,
            parse_time("Dhuhr", &row.dhuhr)?,
            parse_time("Asr", &row.asr)?,
            parse_time("Maghrib", &row.maghrib)?,
            parse_time("Isha", &row.isha)?,
        );
        let sunrise = parse_time("Sunrise", &row.sunrise)?;

        Ok(DayRecord::new(date, anchors, sunrise))
    }
}

impl Default for AnchorLoader {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

fn parse_time(column: &'static str, text: &str) -> Result<Minute, RowError> {
    clock::parse_12h(text).map_err(|source| RowError::Time { column, source })
}
