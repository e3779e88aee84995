//! The live-tagging session: clock, period machine, Event Log and undo
//! history driven together by operator actions and the one-second tick.

use chrono::{SecondsFormat, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::clock::{Clock, ClockEngine, ClockState};
use crate::event_log::EventLog;
use crate::history::{HistoryConfig, HistoryEntry, UndoHistory};
use crate::period::{MatchStatus, PeriodAction, PeriodState};
use crate::session::Session;
use crate::store::SessionStore;
use crate::tag::{EventDefinition, TagContext, TagFactory, TagRecord, TeamSide};
use crate::EngineError;

pub struct LiveTagger {
    session: Session,
    clock: ClockEngine,
    period: PeriodState,
    history: UndoHistory,
    store: Box<dyn SessionStore>,
    dirty: bool,
}

impl LiveTagger {
    pub fn new(session: Session, source: Arc<dyn Clock>, store: Box<dyn SessionStore>) -> Self {
        Self::with_history(session, source, store, HistoryConfig::default())
    }

    /// Reopening a session continues in the period of its most recent tag.
    pub fn with_history(
        session: Session,
        source: Arc<dyn Clock>,
        store: Box<dyn SessionStore>,
        config: HistoryConfig,
    ) -> Self {
        let period = session.tags.latest().map(|t| t.period_index).unwrap_or(1);
        Self {
            session,
            clock: ClockEngine::new(source),
            period: PeriodState::new(period),
            history: UndoHistory::new(config),
            store,
            dirty: false,
        }
    }

    pub fn session(&self) -> &Session { &self.session }

    pub fn into_session(self) -> Session { self.session }

    pub fn tags(&self) -> &EventLog { &self.session.tags }

    pub fn status(&self) -> MatchStatus { self.period.status }

    pub fn period_index(&self) -> u32 { self.period.period }

    pub fn period_label(&self) -> String { self.period.name(self.session.settings.periods) }

    pub fn formatted_clock(&self) -> String { self.clock.formatted() }

    pub fn display_seconds(&self) -> u32 { self.clock.current_display_seconds() }

    pub fn absolute_elapsed_ms(&self) -> i64 { self.clock.current_absolute_elapsed_ms() }

    pub fn clock_state(&self) -> ClockState { self.clock.state() }

    pub fn can_undo(&self) -> bool { self.history.can_undo() }

    pub fn can_tag(&self) -> bool { self.period.status.can_tag() }

    pub fn can_end_period(&self) -> bool { self.period.apply(PeriodAction::EndPeriod).is_ok() }

    /// True when the last save failed and the log has unsaved changes.
    pub fn is_dirty(&self) -> bool { self.dirty }

    pub fn start(&mut self) -> Result<(), EngineError> {
        let prev = self.period;
        let prev_clock = self.clock.state();
        let next = self.transition(PeriodAction::Start)?;
        self.clock.start();
        self.history.push(HistoryEntry::StatusChanged {
            previous_status: prev.status,
            previous_period: prev.period,
            previous_clock: prev_clock,
            correlated_tag_id: None,
        });
        self.period = next;
        debug!(period = next.period, "match started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        let next = self.transition(PeriodAction::Pause)?;
        self.clock.pause();
        self.period = next;
        debug!(absolute_ms = self.absolute_elapsed_ms(), "clock paused");
        Ok(())
    }

    /// From halftime this also opens the next period with the display clock at zero.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        let prev = self.period;
        let prev_clock = self.clock.state();
        let next = self.transition(PeriodAction::Resume)?;
        self.clock.resume();
        if prev.status == MatchStatus::Halftime {
            self.clock.reset_display();
            self.history.push(HistoryEntry::StatusChanged {
                previous_status: prev.status,
                previous_period: prev.period,
                previous_clock: prev_clock,
                correlated_tag_id: None,
            });
        }
        self.period = next;
        debug!(period = next.period, "clock resumed");
        Ok(())
    }

    /// Play/pause control.
    pub fn toggle(&mut self) -> Result<MatchStatus, EngineError> {
        match self.period.toggle_action() {
            Some(PeriodAction::Start) => self.start()?,
            Some(PeriodAction::Pause) => self.pause()?,
            Some(_) => self.resume()?,
            None => {
                return Err(self.reject(EngineError::InvalidTransition { from: self.period.status, action: "toggle" }));
            }
        }
        Ok(self.period.status)
    }

    /// Per-second display tick; ignored unless live.
    pub fn tick(&mut self) {
        if self.period.status == MatchStatus::Live {
            self.clock.tick();
        }
    }

    /// Manual correction of the display clock. Absolute time is untouched.
    pub fn adjust_clock(&mut self, delta_seconds: i64) { self.clock.adjust(delta_seconds); }

    /// Closes the current period with a neutral "End of ..." marker and enters halftime.
    pub fn end_period(&mut self) -> Result<TagRecord, EngineError> {
        let prev = self.period;
        let prev_clock = self.clock.state();
        let next = self.transition(PeriodAction::EndPeriod)?;
        let ctx = self.context();
        let tag = TagFactory::new(&self.session.settings).period_end(&ctx);
        self.session.tags.prepend(tag.clone());
        if prev.status == MatchStatus::Live {
            self.clock.pause();
        }
        self.history.push(HistoryEntry::StatusChanged {
            previous_status: prev.status,
            previous_period: prev.period,
            previous_clock: prev_clock,
            correlated_tag_id: Some(tag.event_id),
        });
        self.period = next;
        debug!(period = prev.period, tag_id = %tag.event_id, "period ended");
        self.persist();
        Ok(tag)
    }

    pub fn finish(&mut self) -> Result<(), EngineError> {
        let prev = self.period;
        let prev_clock = self.clock.state();
        let next = self.transition(PeriodAction::Finish)?;
        self.clock.pause();
        self.history.push(HistoryEntry::StatusChanged {
            previous_status: prev.status,
            previous_period: prev.period,
            previous_clock: prev_clock,
            correlated_tag_id: None,
        });
        self.period = next;
        debug!(tags = self.session.tags.len(), "match finished");
        Ok(())
    }

    pub fn create_tag(
        &mut self,
        event: &EventDefinition,
        team: TeamSide,
        notes: Option<&str>,
    ) -> Result<TagRecord, EngineError> {
        let status = self.period.status;
        if !status.can_tag() {
            return Err(self.reject(EngineError::TaggingNotAllowed(status)));
        }
        let ctx = self.context();
        let tag = TagFactory::new(&self.session.settings).build(&ctx, &event.label, team, notes);
        self.session.tags.prepend(tag.clone());
        self.history.push(HistoryEntry::TagAdded { tag_id: tag.event_id });
        debug!(
            tag_id = %tag.event_id,
            label = %tag.event_label,
            absolute_ms = tag.absolute_timestamp_ms,
            "tag created"
        );
        self.persist();
        Ok(tag)
    }

    /// Tags the n-th (1-based) event button.
    pub fn tag_shortcut(&mut self, n: usize, team: TeamSide, notes: Option<&str>) -> Result<TagRecord, EngineError> {
        let event = self.session.settings.event_for_shortcut(n).cloned();
        match event {
            Some(event) => self.create_tag(&event, team, notes),
            None => Err(self.reject(EngineError::UnknownEvent(n.to_string()))),
        }
    }

    /// Tags an event by id or label.
    pub fn tag_event(&mut self, key: &str, team: TeamSide, notes: Option<&str>) -> Result<TagRecord, EngineError> {
        let event = self.session.settings.find_event(key).cloned();
        match event {
            Some(event) => self.create_tag(&event, team, notes),
            None => Err(self.reject(EngineError::UnknownEvent(key.to_string()))),
        }
    }

    /// Removes a tag immediately; undo puts it back at the same index.
    pub fn delete_tag(&mut self, id: Uuid) -> Option<TagRecord> {
        let Some((index, tag)) = self.session.tags.remove(id) else {
            debug!(tag_id = %id, "delete ignored, no such tag");
            return None;
        };
        self.history.push(HistoryEntry::TagDeleted { tag: tag.clone(), original_index: index });
        debug!(tag_id = %id, index, "tag deleted");
        self.persist();
        Some(tag)
    }

    /// Reverts the most recent action. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            debug!("nothing to undo");
            return false;
        };
        let action = entry.label();
        let touches_log = entry.touches_log();
        if let Some(restore) = entry.revert(&mut self.session.tags) {
            self.period = restore.period;
            self.clock.restore(restore.clock);
        }
        debug!(action, status = %self.period.status, period = self.period.period, "undo");
        if touches_log {
            self.persist();
        }
        true
    }

    /// Saves unconditionally, surfacing the store error.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.store.save_session(&self.session)?;
        self.dirty = false;
        Ok(())
    }

    fn persist(&mut self) {
        match self.store.save_session(&self.session) {
            Ok(()) => self.dirty = false,
            Err(err) => {
                error!(session_id = %self.session.id, error = %err, "failed to save session");
                self.dirty = true;
            }
        }
    }

    fn transition(&self, action: PeriodAction) -> Result<PeriodState, EngineError> {
        self.period.apply(action).map_err(|e| self.reject(e))
    }

    fn reject(&self, err: EngineError) -> EngineError {
        warn!(status = %self.period.status, "{}", err);
        err
    }

    fn context(&self) -> TagContext {
        let now = self.clock.now_ms();
        let created_at = Utc
            .timestamp_millis_opt(now)
            .single()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        TagContext {
            absolute_ms: self.clock.state().absolute_elapsed_ms(now),
            period_index: self.period.period,
            period_name: self.period_label(),
            game_clock: self.clock.formatted(),
            created_at,
        }
    }
}
