//! Live timing and event-tagging engine.
//!
//! Tracks elapsed match time across start/pause/resume/period cycles, turns
//! that time into frame-accurate clip windows for each tagged event, and keeps
//! an undo log over tagging actions.

use thiserror::Error;

pub mod catalog;
pub mod clock;
pub mod engine;
pub mod event_log;
pub mod history;
pub mod period;
pub mod report;
pub mod session;
pub mod store;
pub mod tag;

pub use catalog::{preset, Sport, SportPreset};
pub use clock::{format_clock, Clock, ClockEngine, ClockState, ManualClock, SystemClock};
pub use engine::LiveTagger;
pub use event_log::EventLog;
pub use history::{HistoryConfig, HistoryEntry, UndoHistory};
pub use period::{period_name, MatchStatus, PeriodAction, PeriodState};
pub use report::{ExportEntry, MatchExport, MatchInfo};
pub use session::{Session, SessionSettings};
pub use store::{MemoryStore, SessionStore};
pub use tag::{ClipWindow, EventCategory, EventDefinition, TagContext, TagFactory, TagRecord, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot {action} while the match is {from}")]
    InvalidTransition { from: MatchStatus, action: &'static str },

    #[error("{}", .0.tagging_notice())]
    TaggingNotAllowed(MatchStatus),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("invalid session settings: {0}")]
    InvalidConfig(String),
}

pub type Frame = i64; // whole frames, only produced at the export boundary

/// Round a fractional frame position to the nearest whole frame.
pub fn round_frame(frame: f64) -> Frame { frame.round() as Frame }
