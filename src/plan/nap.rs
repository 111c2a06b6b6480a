//! Midday rest window between Dhuhr and Asr.

use crate::clock::{Minute, span};
use crate::config::NapConfig;

use super::Window;

/// Rules for placing the midday nap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NapRules {
    pub duration: i32,
    /// Gap kept after Dhuhr and before Asr.
    pub buffer: i32,
    /// Fixed window used whenever it fits between the buffered anchors.
    pub preferred: Window,
}

impl NapRules {
    pub fn new(config: &NapConfig) -> Self {
        Self {
            duration: span(config.duration_minutes),
            buffer: span(config.buffer_minutes),
            preferred: Window::new(
                Minute::new(span(config.preferred_start_minute)),
                Minute::new(span(config.preferred_end_minute)),
            ),
        }
    }

    /// Place the nap between `midday_start` (Dhuhr) and `midday_end` (Asr).
    ///
    /// When the preferred window does not fit, the nap starts right after the
    /// Dhuhr buffer and is cut short (never shifted) by the Asr buffer. A gap
    /// too small for both buffers yields an empty window at the earliest start.
    pub fn plan(&self, midday_start: Minute, midday_end: Minute) -> Window {
        let earliest = midday_start + self.buffer;
        let latest = midday_end - self.buffer;

        if self.preferred.start >= earliest && self.preferred.end <= latest {
            return self.preferred;
        }

        let end = (earliest + self.duration).min(latest).max(earliest);
        Window::new(earliest, end)
    }
}

impl Default for NapRules {
    fn default() -> Self {
        Self::new(&NapConfig::default())
    }
}
