//! Export-ready view of a session: chronological, team names resolved,
//! frames rounded. Renderers only format what is computed here.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::session::Session;
use crate::{round_frame, Frame};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    pub title: String,
    pub sport: String,
    pub competition: String,
    pub created_at: DateTime<Utc>,
    pub camera_id: String,
    pub fps: f64,
    pub team_a: String,
    pub team_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    pub event_id: Uuid,
    pub label: String,
    pub team: String,
    pub period_index: u32,
    pub period_name: String,
    pub game_clock: String,
    pub absolute_seconds: f64,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub start_frame: Frame,
    pub end_frame: Frame,
    pub notes: Option<String>,
    pub is_system: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchExport {
    pub info: MatchInfo,
    /// Oldest first.
    pub entries: Vec<ExportEntry>,
}

impl MatchExport {
    pub fn from_session(session: &Session) -> Self {
        let s = &session.settings;
        let created_at = Utc.timestamp_millis_opt(session.created_at).single().unwrap_or_default();
        let info = MatchInfo {
            title: s.match_title.clone(),
            sport: s.sport.to_string(),
            competition: s.competition.clone(),
            created_at,
            camera_id: s.camera_id.clone(),
            fps: s.fps,
            team_a: s.team_a.clone(),
            team_b: s.team_b.clone(),
        };
        let entries = session
            .tags
            .chronological()
            .into_iter()
            .map(|tag| ExportEntry {
                event_id: tag.event_id,
                label: tag.event_label.clone(),
                team: tag.team_tagged.resolve(&s.team_a, &s.team_b).to_string(),
                period_index: tag.period_index,
                period_name: tag.period_name.clone(),
                game_clock: tag.game_clock_display.clone(),
                absolute_seconds: tag.absolute_timestamp_ms as f64 / 1000.0,
                start_seconds: tag.clip_start_seconds,
                end_seconds: tag.clip_end_seconds,
                start_frame: round_frame(tag.start_frame),
                end_frame: round_frame(tag.end_frame),
                notes: tag.notes.clone().filter(|n| !n.is_empty()),
                is_system: tag.is_system(),
            })
            .collect();
        Self { info, entries }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Sport;
    use crate::event_log::EventLog;
    use crate::session::SessionSettings;
    use crate::tag::{TagContext, TagFactory, TeamSide};

    fn session_with(tags: &[(&str, i64, TeamSide)]) -> Session {
        let mut settings = SessionSettings::for_sport(Sport::Soccer);
        settings.team_a = "Reds".into();
        settings.team_b = "Blues".into();
        settings.fps = 29.97;
        settings.pre_roll = 0.0;
        settings.post_roll = 0.0;
        let mut session = Session::new(settings, 1_714_564_800_000);
        let mut log = EventLog::default();
        for (label, ms, team) in tags {
            let ctx = TagContext {
                absolute_ms: *ms,
                period_index: 1,
                period_name: "1st Half".into(),
                game_clock: "00:00".into(),
                created_at: String::new(),
            };
            log.prepend(TagFactory::new(&session.settings).build(&ctx, label, *team, None));
        }
        session.tags = log;
        session
    }

    #[test]
    fn entries_are_chronological_with_resolved_teams() {
        let session = session_with(&[
            ("Goal", 9_000, TeamSide::TeamA),
            ("Foul", 3_000, TeamSide::TeamB),
            ("End of 1st Half", 12_000, TeamSide::Neutral),
        ]);
        let export = MatchExport::from_session(&session);
        let labels: Vec<_> = export.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Foul", "Goal", "End of 1st Half"]);
        assert_eq!(export.entries[0].team, "Blues");
        assert_eq!(export.entries[1].team, "Reds");
        assert_eq!(export.entries[2].team, "Neutral");
        assert!(export.entries[2].is_system);
        assert_eq!(export.info.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn frames_are_rounded_only_here() {
        let session = session_with(&[("Goal", 1_234, TeamSide::TeamA)]);
        assert!(session.tags.latest().unwrap().start_frame.fract() != 0.0);
        let export = MatchExport::from_session(&session);
        assert_eq!(export.entries[0].start_frame, 37);
        assert_eq!(export.entries[0].absolute_seconds, 1.234);
    }
}
