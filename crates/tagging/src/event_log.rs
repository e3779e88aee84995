use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tag::TagRecord;

/// Tagged records for a session, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    tags: Vec<TagRecord>,
}

impl EventLog {
    pub fn new(tags: Vec<TagRecord>) -> Self { Self { tags } }

    pub fn len(&self) -> usize { self.tags.len() }

    pub fn is_empty(&self) -> bool { self.tags.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, TagRecord> { self.tags.iter() }

    pub fn as_slice(&self) -> &[TagRecord] { &self.tags }

    pub fn latest(&self) -> Option<&TagRecord> { self.tags.first() }

    pub fn get(&self, id: Uuid) -> Option<&TagRecord> { self.tags.iter().find(|t| t.event_id == id) }

    pub fn position(&self, id: Uuid) -> Option<usize> { self.tags.iter().position(|t| t.event_id == id) }

    pub fn prepend(&mut self, tag: TagRecord) { self.tags.insert(0, tag); }

    /// Removes a record, returning it with the index it occupied.
    pub fn remove(&mut self, id: Uuid) -> Option<(usize, TagRecord)> {
        let index = self.position(id)?;
        Some((index, self.tags.remove(index)))
    }

    /// Inserts at `index`, or at the end if the log has since shrunk.
    pub fn insert_at(&mut self, index: usize, tag: TagRecord) {
        let index = index.min(self.tags.len());
        self.tags.insert(index, tag);
    }

    /// Oldest first by absolute timestamp; ties keep their log order.
    pub fn chronological(&self) -> Vec<&TagRecord> {
        let mut out: Vec<&TagRecord> = self.tags.iter().collect();
        out.sort_by_key(|t| t.absolute_timestamp_ms);
        out
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a TagRecord;
    type IntoIter = std::slice::Iter<'a, TagRecord>;

    fn into_iter(self) -> Self::IntoIter { self.tags.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;
    use crate::tag::{TagContext, TagFactory, TeamSide};
    use crate::Sport;

    fn tag(label: &str, absolute_ms: i64) -> TagRecord {
        let settings = SessionSettings::for_sport(Sport::Soccer);
        let ctx = TagContext {
            absolute_ms,
            period_index: 1,
            period_name: "1st Half".into(),
            game_clock: "00:00".into(),
            created_at: String::new(),
        };
        TagFactory::new(&settings).build(&ctx, label, TeamSide::TeamA, None)
    }

    #[test]
    fn prepend_keeps_most_recent_first() {
        let mut log = EventLog::default();
        log.prepend(tag("a", 1_000));
        log.prepend(tag("b", 2_000));
        assert_eq!(log.latest().map(|t| t.event_label.as_str()), Some("b"));
    }

    #[test]
    fn remove_then_insert_restores_position() {
        let mut log = EventLog::default();
        for (i, label) in ["a", "b", "c"].iter().enumerate() {
            log.prepend(tag(label, i as i64 * 1_000));
        }
        let before = log.clone();
        let id = log.as_slice()[1].event_id;
        let (index, removed) = log.remove(id).unwrap();
        assert_eq!(index, 1);
        assert_eq!(log.len(), 2);
        log.insert_at(index, removed);
        assert_eq!(log, before);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut log = EventLog::default();
        log.prepend(tag("a", 0));
        assert!(log.remove(Uuid::new_v4()).is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn chronological_sorts_oldest_first() {
        let mut log = EventLog::default();
        log.prepend(tag("late", 9_000));
        log.prepend(tag("early", 1_000));
        log.prepend(tag("middle", 5_000));
        let labels: Vec<_> = log.chronological().iter().map(|t| t.event_label.clone()).collect();
        assert_eq!(labels, ["early", "middle", "late"]);
    }
}
