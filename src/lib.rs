//! Prayer Planner Library
//!
//! This module exposes the planning pipeline of the Prayer Planner
//! application for testing and potential reuse.

pub mod anchors;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod plan;
pub mod publish;

// Re-export commonly used types
pub use anchors::{AnchorTable, Anchors, DayRecord, Prayer};
pub use clock::{MINUTES_PER_DAY, Minute, format_12h, format_24h, parse_12h};
pub use config::AppConfig;
pub use error::{ClockError, ConsensusError, DayError, RowError};
pub use export::{HEADER, PlanRow, plan_rows, write_csv, write_csv_to};
pub use loader::{AnchorLoader, LoadReport, RowRejection};
pub use plan::{
    Alignment, ConsensusStatus, DayPlan, PlanSummary, RejectedDay, Schedule, SchedulePlanner,
    Window,
};
pub use publish::{PublishReceipt, SheetDocument, SheetPublisher};
