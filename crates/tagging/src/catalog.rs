//! Built-in sport presets: period layout and default event buttons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tag::{EventCategory, EventDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sport {
    #[default]
    Soccer,
    Basketball,
    Rugby,
    #[serde(rename = "AFL")]
    Afl,
    Netball,
    #[serde(rename = "American Football")]
    AmericanFootball,
    Custom,
}

impl Sport {
    pub const ALL: [Sport; 7] = [
        Sport::Soccer,
        Sport::Basketball,
        Sport::Rugby,
        Sport::Afl,
        Sport::Netball,
        Sport::AmericanFootball,
        Sport::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sport::Soccer => "Soccer",
            Sport::Basketball => "Basketball",
            Sport::Rugby => "Rugby",
            Sport::Afl => "AFL",
            Sport::Netball => "Netball",
            Sport::AmericanFootball => "American Football",
            Sport::Custom => "Custom",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        Sport::ALL
            .into_iter()
            .find(|sport| sport.name().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown sport '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportPreset {
    pub name: String,
    pub periods: u32,
    pub period_duration_minutes: u32,
    pub events: Vec<EventDefinition>,
}

pub fn preset(sport: Sport) -> SportPreset {
    use EventCategory::{Foul, General, Score};
    let e = EventDefinition::preset;
    let (periods, minutes, events) = match sport {
        Sport::Soccer => (2, 45, vec![
            e("Goal", Score, "bg-emerald-600"),
            e("Shot on Target", General, "bg-blue-600"),
            e("Shot Off Target", General, "bg-slate-600"),
            e("Foul", Foul, "bg-orange-600"),
            e("Yellow Card", Foul, "bg-yellow-600 text-black"),
            e("Red Card", Foul, "bg-red-600"),
            e("Corner", General, "bg-indigo-600"),
            e("Free Kick", General, "bg-indigo-500"),
            e("Penalty", Score, "bg-purple-600"),
            e("Offside", Foul, "bg-slate-500"),
            e("Substitution", General, "bg-slate-500"),
            e("Big Chance", General, "bg-pink-600"),
        ]),
        Sport::Basketball => (4, 10, vec![
            e("2PT Made", Score, "bg-emerald-600"),
            e("3PT Made", Score, "bg-emerald-500"),
            e("Free Throw", Score, "bg-emerald-700"),
            e("Rebound", General, "bg-blue-600"),
            e("Assist", General, "bg-indigo-600"),
            e("Steal", General, "bg-orange-500"),
            e("Block", General, "bg-red-500"),
            e("Turnover", Foul, "bg-slate-500"),
            e("Foul", Foul, "bg-red-600"),
            e("Timeout", General, "bg-yellow-600 text-black"),
        ]),
        Sport::Rugby => (2, 40, vec![
            e("Try", Score, "bg-emerald-600"),
            e("Conversion", Score, "bg-emerald-500"),
            e("Penalty Goal", Score, "bg-emerald-700"),
            e("Missed Kick", General, "bg-red-400"),
            e("Scrum", General, "bg-slate-600"),
            e("Lineout", General, "bg-slate-500"),
            e("Tackle", General, "bg-blue-600"),
            e("Knock-on", Foul, "bg-orange-600"),
            e("Yellow Card", Foul, "bg-yellow-600 text-black"),
            e("Red Card", Foul, "bg-red-600"),
        ]),
        Sport::Afl => (4, 20, vec![
            e("Goal", Score, "bg-emerald-600"),
            e("Behind", Score, "bg-emerald-800"),
            e("Mark", General, "bg-blue-600"),
            e("Tackle", General, "bg-orange-600"),
            e("Clearance", General, "bg-indigo-600"),
            e("Inside 50", General, "bg-purple-600"),
            e("Free Kick", Foul, "bg-yellow-600 text-black"),
            e("Turnover", Foul, "bg-red-600"),
            e("Interception", General, "bg-cyan-600"),
        ]),
        Sport::Netball => (4, 15, vec![
            e("Goal", Score, "bg-emerald-600"),
            e("Missed Shot", General, "bg-red-400"),
            e("Intercept", General, "bg-blue-600"),
            e("Turnover", Foul, "bg-orange-600"),
            e("Contact", Foul, "bg-red-600"),
            e("Obstruction", Foul, "bg-yellow-600 text-black"),
        ]),
        Sport::AmericanFootball => (4, 15, vec![
            e("Touchdown", Score, "bg-emerald-600"),
            e("Field Goal", Score, "bg-emerald-500"),
            e("First Down", General, "bg-blue-600"),
            e("Interception", General, "bg-red-500"),
            e("Fumble", Foul, "bg-orange-600"),
            e("Sack", General, "bg-purple-600"),
            e("Penalty", Foul, "bg-yellow-500 text-black"),
            e("Timeout", General, "bg-slate-500"),
        ]),
        Sport::Custom => (2, 30, vec![
            e("Highlight", General, "bg-emerald-600"),
            e("Error", Foul, "bg-red-600"),
        ]),
    };
    SportPreset { name: sport.name().to_string(), periods, period_duration_minutes: minutes, events }
}
