use std::path::PathBuf;

use anyhow::{Result, ensure};
use chrono::Weekday;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::anchors::Prayer;
use crate::clock::MINUTES_PER_DAY;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub sleep: SleepConfig,
    pub nap: NapConfig,
    pub blocks: BlocksConfig,
    pub fajr: FajrConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub publish: PublishConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SleepConfig {
    pub duration_minutes: u32,
    pub buffer_minutes: u32,
    /// Preferred bedtime as a minute of day; small-hours values mean the
    /// night after the planned date.
    pub preferred_start_minute: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 240,
            buffer_minutes: 30,
            preferred_start_minute: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NapConfig {
    pub duration_minutes: u32,
    pub buffer_minutes: u32,
    pub preferred_start_minute: u32,
    pub preferred_end_minute: u32,
}

impl Default for NapConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            buffer_minutes: 30,
            preferred_start_minute: 13 * 60,
            preferred_end_minute: 14 * 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlocksConfig {
    pub prayer_duration_minutes: u32,
    pub jummah_duration_minutes: u32,
    pub jummah_weekday: Weekday,
    pub jummah_prayer: Prayer,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            prayer_duration_minutes: 5,
            jummah_duration_minutes: 120,
            jummah_weekday: Weekday::Fri,
            jummah_prayer: Prayer::Dhuhr,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FajrConfig {
    pub consensus_enabled: bool,
    pub pre_sunrise_delay_minutes: u32,
}

impl Default for FajrConfig {
    fn default() -> Self {
        Self {
            consensus_enabled: true,
            pre_sunrise_delay_minutes: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
    /// chrono format string for the `Date` column.
    pub date_format: String,
    /// Abort the load on the first bad row instead of skipping it.
    pub strict: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.csv"),
            date_format: "%Y-%m-%d".to_string(),
            strict: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plan.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublishConfig {
    pub enabled: bool,
    /// Endpoint that accepts the sheet document (e.g. a spreadsheet web app).
    pub url: Option<String>,
    pub title: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            title: "Bot: Timetable".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load layered configuration. Call [`AppConfig::validate`] after
    /// applying any command-line overrides.
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prayer-planner");

        let builder = Config::builder()
            // 1. Load default values
            // Sleep
            .set_default("sleep.duration_minutes", 240)?
            .set_default("sleep.buffer_minutes", 30)?
            .set_default("sleep.preferred_start_minute", 0)?
            // Nap
            .set_default("nap.duration_minutes", 60)?
            .set_default("nap.buffer_minutes", 30)?
            .set_default("nap.preferred_start_minute", 780)?
            .set_default("nap.preferred_end_minute", 840)?
            // Blocks
            .set_default("blocks.prayer_duration_minutes", 5)?
            .set_default("blocks.jummah_duration_minutes", 120)?
            .set_default("blocks.jummah_weekday", "Fri")?
            .set_default("blocks.jummah_prayer", "dhuhr")?
            // Fajr
            .set_default("fajr.consensus_enabled", true)?
            .set_default("fajr.pre_sunrise_delay_minutes", 30)?
            // Input / output
            .set_default("input.path", "data.csv")?
            .set_default("input.date_format", "%Y-%m-%d")?
            .set_default("input.strict", false)?
            .set_default("output.path", "plan.csv")?
            // Publish
            .set_default("publish.enabled", false)?
            .set_default("publish.url", None::<String>)?
            .set_default("publish.title", "Bot: Timetable")?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (PLANNER__SLEEP__DURATION_MINUTES=...)
            .add_source(Environment::with_prefix("PLANNER").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }

    /// Reject settings the planners cannot honour.
    pub fn validate(&self) -> Result<()> {
        let day = MINUTES_PER_DAY as u32;

        ensure!(self.sleep.duration_minutes > 0, "sleep.duration_minutes must be positive");
        ensure!(
            self.sleep.duration_minutes <= day,
            "sleep.duration_minutes must not exceed {day}"
        );
        ensure!(
            self.sleep.buffer_minutes < day,
            "sleep.buffer_minutes must be below {day}"
        );
        ensure!(
            self.sleep.preferred_start_minute < day,
            "sleep.preferred_start_minute must be below {day}"
        );

        ensure!(self.nap.duration_minutes > 0, "nap.duration_minutes must be positive");
        ensure!(
            self.nap.duration_minutes <= day,
            "nap.duration_minutes must not exceed {day}"
        );
        ensure!(
            self.nap.buffer_minutes < day,
            "nap.buffer_minutes must be below {day}"
        );
        ensure!(
            self.nap.preferred_start_minute < self.nap.preferred_end_minute,
            "nap preferred window must end after it starts"
        );
        ensure!(
            self.nap.preferred_end_minute <= day,
            "nap.preferred_end_minute must not exceed {day}"
        );
        ensure!(
            self.nap.preferred_end_minute - self.nap.preferred_start_minute
                <= self.nap.duration_minutes,
            "nap preferred window is longer than nap.duration_minutes"
        );

        ensure!(
            self.blocks.prayer_duration_minutes > 0 && self.blocks.prayer_duration_minutes < day,
            "blocks.prayer_duration_minutes must be positive and below {day}"
        );
        ensure!(
            self.blocks.jummah_duration_minutes > 0
                && self.blocks.jummah_duration_minutes % 2 == 0,
            "blocks.jummah_duration_minutes must be a positive even number"
        );
        ensure!(
            self.blocks.jummah_duration_minutes < day,
            "blocks.jummah_duration_minutes must be below {day}"
        );

        ensure!(
            self.fajr.pre_sunrise_delay_minutes < day,
            "fajr.pre_sunrise_delay_minutes must be below {day}"
        );

        ensure!(
            !self.publish.enabled || self.publish.url.is_some(),
            "publishing is enabled but publish.url is not set"
        );
        ensure!(
            self.network.request_timeout_secs > 0 && self.network.connect_timeout_secs > 0,
            "network timeouts must be positive"
        );

        Ok(())
    }
}
