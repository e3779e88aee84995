use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    #[serde(rename = "Team A")]
    TeamA,
    #[serde(rename = "Team B")]
    TeamB,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl TeamSide {
    pub fn resolve<'a>(self, team_a: &'a str, team_b: &'a str) -> &'a str {
        match self {
            TeamSide::TeamA => team_a,
            TeamSide::TeamB => team_b,
            TeamSide::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Score,
    Foul,
    #[default]
    General,
}

impl EventCategory {
    pub fn default_color(self) -> &'static str {
        match self {
            EventCategory::Score => "bg-emerald-600",
            EventCategory::Foul => "bg-red-600",
            EventCategory::General => "bg-blue-600",
        }
    }
}

/// A tagging button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub category: EventCategory,
    #[serde(default, rename = "color", skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<String>,
}

impl EventDefinition {
    /// Catalog entry: the id is the label lower-cased with whitespace as `_`.
    pub fn preset(label: &str, category: EventCategory, color: &str) -> Self {
        let id = label
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        Self { id, label: label.to_string(), category, color_hint: Some(color.to_string()) }
    }

    /// Operator-defined button with a random suffix so repeated labels stay distinct.
    pub fn custom(label: &str, category: EventCategory) -> Self {
        let slug: String = label
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let suffix = Uuid::new_v4().as_u128() % 10_000;
        Self {
            id: format!("{}_{}", slug, suffix),
            label: label.to_string(),
            category,
            color_hint: Some(category.default_color().to_string()),
        }
    }
}

/// Clip in/out points around an event instant. Frames stay fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub start_frame: f64,
    pub end_frame: f64,
}

impl ClipWindow {
    pub fn around(absolute_ms: i64, pre_roll: f64, post_roll: f64, fps: f64) -> Self {
        let at = absolute_ms as f64 / 1000.0;
        let start_seconds = (at - pre_roll).max(0.0);
        let end_seconds = at + post_roll;
        Self { start_seconds, end_seconds, start_frame: start_seconds * fps, end_frame: end_seconds * fps }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub event_id: Uuid,
    pub sport: String,
    pub match_title: String,
    pub competition: String,
    pub date_time: String,
    pub team_a: String,
    pub team_b: String,
    pub team_tagged: TeamSide,
    #[serde(rename = "eventType")]
    pub event_label: String,
    pub period_index: u32,
    pub period_name: String,
    #[serde(rename = "gameClockTime")]
    pub game_clock_display: String,
    #[serde(rename = "absoluteTimestamp")]
    pub absolute_timestamp_ms: i64,
    pub fps: f64,
    #[serde(rename = "startTimeSeconds")]
    pub clip_start_seconds: f64,
    #[serde(rename = "endTimeSeconds")]
    pub clip_end_seconds: f64,
    pub start_frame: f64,
    pub end_frame: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub camera_id: String,
}

impl TagRecord {
    /// Engine-generated markers such as "End of 1st Half".
    pub fn is_system(&self) -> bool {
        self.event_label.starts_with("End of") || self.event_label.starts_with("Start of")
    }

    pub fn team_name(&self) -> &str { self.team_tagged.resolve(&self.team_a, &self.team_b) }
}

/// Clock and period readings captured at the moment of tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct TagContext {
    pub absolute_ms: i64,
    pub period_index: u32,
    pub period_name: String,
    pub game_clock: String,
    /// Wall-clock creation instant, RFC 3339.
    pub created_at: String,
}

/// Builds tag records from session settings; match context is copied, not referenced.
pub struct TagFactory<'a> {
    settings: &'a SessionSettings,
}

impl<'a> TagFactory<'a> {
    pub fn new(settings: &'a SessionSettings) -> Self { Self { settings } }

    pub fn build(&self, ctx: &TagContext, label: &str, team: TeamSide, notes: Option<&str>) -> TagRecord {
        let s = self.settings;
        let clip = ClipWindow::around(ctx.absolute_ms, s.pre_roll, s.post_roll, s.fps);
        let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        TagRecord {
            event_id: Uuid::new_v4(),
            sport: s.sport.to_string(),
            match_title: s.match_title.clone(),
            competition: s.competition.clone(),
            date_time: ctx.created_at.clone(),
            team_a: s.team_a.clone(),
            team_b: s.team_b.clone(),
            team_tagged: team,
            event_label: label.to_string(),
            period_index: ctx.period_index,
            period_name: ctx.period_name.clone(),
            game_clock_display: ctx.game_clock.clone(),
            absolute_timestamp_ms: ctx.absolute_ms,
            fps: s.fps,
            clip_start_seconds: clip.start_seconds,
            clip_end_seconds: clip.end_seconds,
            start_frame: clip.start_frame,
            end_frame: clip.end_frame,
            player_number: None,
            notes,
            camera_id: s.camera_id.clone(),
        }
    }

    pub fn period_end(&self, ctx: &TagContext) -> TagRecord {
        let label = format!("End of {}", ctx.period_name);
        self.build(ctx, &label, TeamSide::Neutral, Some("Period ended"))
    }
}
