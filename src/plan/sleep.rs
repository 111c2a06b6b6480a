//! Overnight rest window between Isha and the next morning's Fajr.

use crate::clock::{MINUTES_PER_DAY, Minute, span};
use crate::config::SleepConfig;

use super::Window;

/// Rules for placing the overnight sleep window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRules {
    /// Preferred length of the window in minutes.
    pub duration: i32,
    /// Gap kept after the evening anchor, and tolerance past the preferred start.
    pub buffer: i32,
    /// Preferred bedtime on the extended scale of the planning date.
    pub preferred_start: Minute,
}

impl SleepRules {
    pub fn new(config: &SleepConfig) -> Self {
        Self {
            duration: span(config.duration_minutes),
            buffer: span(config.buffer_minutes),
            preferred_start: night_of(span(config.preferred_start_minute)),
        }
    }

    /// Place the sleep window between `evening` (Isha) and `morning` (next
    /// Fajr). Callers must ensure `evening < morning`.
    ///
    /// A start too far past the preferred bedtime resets to that bedtime, but
    /// never to a minute before `evening` itself.
    pub fn plan(&self, evening: Minute, morning: Minute) -> Window {
        // Isha plus the buffer never lands before the midnight opening Isha's
        // own day, so the buffer rule decides the candidate start.
        let start = evening + self.buffer;
        let window = self.clamp(Window::new(start, start + self.duration), evening, morning);

        if window.start > self.preferred_start + self.buffer {
            let start = self.preferred_start.max(evening);
            return self.clamp(Window::new(start, start + self.duration), evening, morning);
        }

        window
    }

    /// Keep the window clear of the morning anchor: shift it earlier first,
    /// and only shorten it when the whole gap after `evening` is too small.
    fn clamp(&self, window: Window, evening: Minute, morning: Minute) -> Window {
        if window.end < morning {
            return window;
        }
        Window::new((morning - self.duration).max(evening), morning)
    }
}

impl Default for SleepRules {
    fn default() -> Self {
        Self::new(&SleepConfig::default())
    }
}

/// Place a configured clock minute on the night that follows the planning
/// date: evening values stay on the date, small-hours values move to the next
/// day.
fn night_of(clock_minute: i32) -> Minute {
    Minute::new(clock_minute).after(Minute::new(MINUTES_PER_DAY / 2))
}
