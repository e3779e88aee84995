use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{preset, Sport};
use crate::event_log::EventLog;
use crate::tag::EventDefinition;
use crate::EngineError;

fn default_camera() -> String { "Cam 1".to_string() }
fn default_fps() -> f64 { 25.0 }
fn default_pre_roll() -> f64 { 5.0 }
fn default_post_roll() -> f64 { 10.0 }

/// Match setup chosen before going live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub match_title: String,
    #[serde(default)]
    pub competition: String,
    pub sport: Sport,
    pub team_a: String,
    pub team_b: String,
    pub periods: u32,
    pub period_duration_minutes: u32,
    #[serde(default = "default_camera")]
    pub camera_id: String,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Seconds kept before each event.
    #[serde(default = "default_pre_roll")]
    pub pre_roll: f64,
    /// Seconds kept after each event.
    #[serde(default = "default_post_roll")]
    pub post_roll: f64,
    #[serde(default, rename = "customEvents")]
    pub events: Vec<EventDefinition>,
}

impl SessionSettings {
    pub fn for_sport(sport: Sport) -> Self {
        let p = preset(sport);
        Self {
            match_title: String::new(),
            competition: String::new(),
            sport,
            team_a: "Team A".to_string(),
            team_b: "Team B".to_string(),
            periods: p.periods,
            period_duration_minutes: p.period_duration_minutes,
            camera_id: default_camera(),
            fps: default_fps(),
            pre_roll: default_pre_roll(),
            post_roll: default_post_roll(),
            events: p.events,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(EngineError::InvalidConfig(format!("fps must be positive, got {}", self.fps)));
        }
        if self.periods == 0 {
            return Err(EngineError::InvalidConfig("at least one period is required".into()));
        }
        if !(self.pre_roll >= 0.0 && self.post_roll >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "pre/post roll must not be negative, got {}/{}",
                self.pre_roll, self.post_roll
            )));
        }
        Ok(())
    }

    /// 1-based shortcut, as bound to the number keys.
    pub fn event_for_shortcut(&self, n: usize) -> Option<&EventDefinition> {
        n.checked_sub(1).and_then(|i| self.events.get(i))
    }

    pub fn find_event(&self, key: &str) -> Option<&EventDefinition> {
        self.events
            .iter()
            .find(|e| e.id == key)
            .or_else(|| self.events.iter().find(|e| e.label.eq_ignore_ascii_case(key)))
    }
}

/// The persisted aggregate: setup plus the Event Log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Unix milliseconds.
    pub created_at: i64,
    #[serde(flatten)]
    pub settings: SessionSettings,
    #[serde(default)]
    pub tags: EventLog,
}

impl Session {
    pub fn new(settings: SessionSettings, created_at: i64) -> Self {
        Self { id: Uuid::new_v4().to_string(), created_at, settings, tags: EventLog::default() }
    }

    /// Same setup under a fresh id, with an empty log.
    pub fn duplicate(&self, created_at: i64) -> Self { Self::new(self.settings.clone(), created_at) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_setup_form() {
        let s = SessionSettings::for_sport(Sport::Basketball);
        assert_eq!(s.fps, 25.0);
        assert_eq!(s.pre_roll, 5.0);
        assert_eq!(s.post_roll, 10.0);
        assert_eq!(s.camera_id, "Cam 1");
        assert_eq!(s.periods, 4);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut s = SessionSettings::for_sport(Sport::Soccer);
        s.fps = 0.0;
        assert!(matches!(s.validate(), Err(EngineError::InvalidConfig(_))));
        s.fps = 30.0;
        s.periods = 0;
        assert!(s.validate().is_err());
        s.periods = 2;
        s.pre_roll = -1.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn shortcuts_are_one_based() {
        let s = SessionSettings::for_sport(Sport::Soccer);
        assert_eq!(s.event_for_shortcut(1).map(|e| e.label.as_str()), Some("Goal"));
        assert!(s.event_for_shortcut(0).is_none());
        assert!(s.event_for_shortcut(13).is_none());
        assert_eq!(s.find_event("yellow card").map(|e| e.id.as_str()), Some("yellow_card"));
    }

    #[test]
    fn flattened_json_omits_missing_defaults() {
        let json = r#"{
            "id": "abc", "createdAt": 1700000000000,
            "matchTitle": "Final", "sport": "Rugby", "teamA": "A", "teamB": "B",
            "periods": 2, "periodDurationMinutes": 40
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.settings.sport, Sport::Rugby);
        assert_eq!(s.settings.fps, 25.0);
        assert!(s.tags.is_empty());
    }

    #[test]
    fn duplicate_gets_new_id_and_empty_log() {
        let original = Session::new(SessionSettings::for_sport(Sport::Netball), 1);
        let copy = original.duplicate(2);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.settings, original.settings);
        assert_eq!(copy.created_at, 2);
    }
}
