use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    NotStarted,
    Live,
    Paused,
    Halftime,
    Finished,
}

impl MatchStatus {
    /// Tags are accepted only while the clock exists and a period is in play.
    pub fn can_tag(self) -> bool { matches!(self, MatchStatus::Live | MatchStatus::Paused) }

    pub fn label(self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "NOT STARTED",
            MatchStatus::Live => "LIVE",
            MatchStatus::Paused => "PAUSED",
            MatchStatus::Halftime => "HALFTIME",
            MatchStatus::Finished => "FINISHED",
        }
    }

    pub(crate) fn tagging_notice(self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "Please start the match timer first.",
            MatchStatus::Halftime => "Match is in halftime. Resume to start the next period.",
            MatchStatus::Finished => "Match is finished.",
            MatchStatus::Live | MatchStatus::Paused => "Tagging is available.",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::NotStarted => "not started",
            MatchStatus::Live => "live",
            MatchStatus::Paused => "paused",
            MatchStatus::Halftime => "at halftime",
            MatchStatus::Finished => "finished",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAction {
    Start,
    Pause,
    Resume,
    EndPeriod,
    Finish,
}

impl PeriodAction {
    pub fn name(self) -> &'static str {
        match self {
            PeriodAction::Start => "start",
            PeriodAction::Pause => "pause",
            PeriodAction::Resume => "resume",
            PeriodAction::EndPeriod => "end the period",
            PeriodAction::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodState {
    pub status: MatchStatus,
    /// 1-based.
    pub period: u32,
}

impl Default for PeriodState {
    fn default() -> Self { Self { status: MatchStatus::NotStarted, period: 1 } }
}

impl PeriodState {
    pub fn new(period: u32) -> Self { Self { period: period.max(1), ..Self::default() } }

    /// Pure transition. Resuming from halftime is the only way to advance the
    /// period.
    pub fn apply(self, action: PeriodAction) -> Result<PeriodState, EngineError> {
        use MatchStatus::*;
        let next = match (self.status, action) {
            (NotStarted, PeriodAction::Start) => Live,
            (Live, PeriodAction::Pause) => Paused,
            (Paused, PeriodAction::Resume) => Live,
            (Halftime, PeriodAction::Resume) => {
                return Ok(PeriodState { status: Live, period: self.period + 1 });
            }
            (Live | Paused, PeriodAction::EndPeriod) => Halftime,
            (NotStarted | Live | Paused | Halftime, PeriodAction::Finish) => Finished,
            (from, action) => {
                return Err(EngineError::InvalidTransition { from, action: action.name() });
            }
        };
        Ok(PeriodState { status: next, ..self })
    }

    /// The play/pause control: start, pause or resume depending on status.
    pub fn toggle_action(self) -> Option<PeriodAction> {
        match self.status {
            MatchStatus::NotStarted => Some(PeriodAction::Start),
            MatchStatus::Live => Some(PeriodAction::Pause),
            MatchStatus::Paused | MatchStatus::Halftime => Some(PeriodAction::Resume),
            MatchStatus::Finished => None,
        }
    }

    pub fn name(&self, configured_periods: u32) -> String { period_name(self.period, configured_periods) }
}

pub fn period_name(period: u32, configured_periods: u32) -> String {
    if period > configured_periods {
        return "Overtime".to_string();
    }
    if configured_periods == 2 {
        return if period == 1 { "1st Half".to_string() } else { "2nd Half".to_string() };
    }
    format!("Q{}", period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_halves_quarters_and_overtime() {
        assert_eq!(period_name(1, 2), "1st Half");
        assert_eq!(period_name(2, 2), "2nd Half");
        assert_eq!(period_name(3, 2), "Overtime");
        assert_eq!(period_name(2, 4), "Q2");
        assert_eq!(period_name(5, 4), "Overtime");
    }

    #[test]
    fn halftime_resume_advances_period() {
        let live = PeriodState::default().apply(PeriodAction::Start).unwrap();
        let half = live.apply(PeriodAction::EndPeriod).unwrap();
        assert_eq!(half, PeriodState { status: MatchStatus::Halftime, period: 1 });
        let second = half.apply(PeriodAction::Resume).unwrap();
        assert_eq!(second, PeriodState { status: MatchStatus::Live, period: 2 });
    }

    #[test]
    fn paused_resume_keeps_period() {
        let paused = PeriodState { status: MatchStatus::Paused, period: 3 };
        assert_eq!(paused.apply(PeriodAction::Resume).unwrap().period, 3);
    }

    #[test]
    fn rejects_invalid_transitions() {
        let half = PeriodState { status: MatchStatus::Halftime, period: 1 };
        assert_eq!(
            half.apply(PeriodAction::EndPeriod),
            Err(EngineError::InvalidTransition { from: MatchStatus::Halftime, action: "end the period" })
        );
        let live = PeriodState { status: MatchStatus::Live, period: 1 };
        assert!(live.apply(PeriodAction::Resume).is_err());
        assert!(live.apply(PeriodAction::Start).is_err());
        assert!(PeriodState::default().apply(PeriodAction::EndPeriod).is_err());
        let done = PeriodState { status: MatchStatus::Finished, period: 2 };
        assert!(done.apply(PeriodAction::Finish).is_err());
    }

    #[test]
    fn tagging_eligibility() {
        assert!(!MatchStatus::NotStarted.can_tag());
        assert!(MatchStatus::Live.can_tag());
        assert!(MatchStatus::Paused.can_tag());
        assert!(!MatchStatus::Halftime.can_tag());
        assert!(!MatchStatus::Finished.can_tag());
    }
}
