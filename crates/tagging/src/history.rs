//! Undo log over tagging actions.
//!
//! Entries are a sum type with one inverse per variant; no session snapshots
//! are taken. Undo pops one entry per call and there is no redo.

use uuid::Uuid;

use crate::clock::ClockState;
use crate::event_log::EventLog;
use crate::period::{MatchStatus, PeriodState};
use crate::tag::TagRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    TagAdded { tag_id: Uuid },
    TagDeleted { tag: TagRecord, original_index: usize },
    StatusChanged {
        previous_status: MatchStatus,
        previous_period: u32,
        previous_clock: ClockState,
        /// System tag created by the same transition.
        correlated_tag_id: Option<Uuid>,
    },
}

/// Status/clock to reinstate after reverting a `StatusChanged` entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRestore {
    pub period: PeriodState,
    pub clock: ClockState,
}

impl HistoryEntry {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryEntry::TagAdded { .. } => "tag added",
            HistoryEntry::TagDeleted { .. } => "tag deleted",
            HistoryEntry::StatusChanged { .. } => "status changed",
        }
    }

    /// Applies the inverse to the Event Log. Returns the status to restore, if any.
    pub fn revert(self, log: &mut EventLog) -> Option<StatusRestore> {
        match self {
            HistoryEntry::TagAdded { tag_id } => {
                log.remove(tag_id);
                None
            }
            HistoryEntry::TagDeleted { tag, original_index } => {
                log.insert_at(original_index, tag);
                None
            }
            HistoryEntry::StatusChanged { previous_status, previous_period, previous_clock, correlated_tag_id } => {
                if let Some(id) = correlated_tag_id {
                    log.remove(id);
                }
                Some(StatusRestore {
                    period: PeriodState { status: previous_status, period: previous_period },
                    clock: previous_clock,
                })
            }
        }
    }

    /// Whether reverting touches the Event Log.
    pub fn touches_log(&self) -> bool {
        match self {
            HistoryEntry::StatusChanged { correlated_tag_id, .. } => correlated_tag_id.is_some(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self { Self { max_entries: 500 } }
}

#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    entries: Vec<HistoryEntry>,
    config: HistoryConfig,
}

impl UndoHistory {
    pub fn new(config: HistoryConfig) -> Self { Self { entries: Vec::new(), config } }

    pub fn push(&mut self, entry: HistoryEntry) {
        tracing::debug!(action = entry.label(), depth = self.entries.len() + 1, "history entry pushed");
        self.entries.push(entry);
        if self.entries.len() > self.config.max_entries {
            let excess = self.entries.len() - self.config.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> { self.entries.pop() }

    pub fn can_undo(&self) -> bool { !self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_are_evicted() {
        let mut history = UndoHistory::new(HistoryConfig { max_entries: 2 });
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            history.push(HistoryEntry::TagAdded { tag_id: *id });
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(HistoryEntry::TagAdded { tag_id: ids[2] }));
        assert_eq!(history.pop(), Some(HistoryEntry::TagAdded { tag_id: ids[1] }));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn status_revert_reports_previous_state() {
        let mut log = EventLog::default();
        let clock = ClockState { elapsed_seconds: 42, ..Default::default() };
        let entry = HistoryEntry::StatusChanged {
            previous_status: MatchStatus::Paused,
            previous_period: 1,
            previous_clock: clock,
            correlated_tag_id: None,
        };
        assert!(!entry.touches_log());
        let restore = entry.revert(&mut log).unwrap();
        assert_eq!(restore.period, PeriodState { status: MatchStatus::Paused, period: 1 });
        assert_eq!(restore.clock.elapsed_seconds, 42);
    }

    #[test]
    fn tag_added_revert_on_missing_tag_is_harmless() {
        let mut log = EventLog::default();
        assert!(HistoryEntry::TagAdded { tag_id: Uuid::new_v4() }.revert(&mut log).is_none());
        assert!(log.is_empty());
    }
}
