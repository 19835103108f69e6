use std::collections::BTreeMap;
use std::fmt;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::history::ChangeLog;
use super::model::{Filters, Lesson, Objective, WeekApproval};
use super::{StoreConfig, TimetableStore};

pub const SNAPSHOT_NAME: &str = "timetable";
pub const SNAPSHOT_VERSION: i64 = 1;

/// Persisted form of the store. Configuration is not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub selected_lessons: Vec<String>,
    #[serde(default)]
    pub objectives_history: ChangeLog<Vec<Objective>>,
    #[serde(default)]
    pub theme_history: ChangeLog<Option<String>>,
    #[serde(default)]
    pub week_approvals: BTreeMap<String, WeekApproval>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub next_batch_id: u64,
}

#[derive(Debug)]
pub enum SnapshotLoad {
    Loaded(StoreSnapshot),
    /// Version 0 data has no upgrade path and is dropped.
    Discarded { from_version: i64 },
}

#[derive(Debug)]
pub enum SnapshotError {
    UnsupportedVersion(i64),
    /// The version is known but the payload does not decode.
    Corrupt(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion(v) => write!(f, "unsupported snapshot version: {}", v),
            Self::Corrupt(e) => write!(f, "snapshot payload is corrupt: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corrupt(e) => Some(e),
            Self::UnsupportedVersion(_) => None,
        }
    }
}

pub fn decode_snapshot(version: i64, payload: &str) -> Result<SnapshotLoad, SnapshotError> {
    match version {
        0 => Ok(SnapshotLoad::Discarded { from_version: 0 }),
        SNAPSHOT_VERSION => serde_json::from_str(payload)
            .map(SnapshotLoad::Loaded)
            .map_err(SnapshotError::Corrupt),
        other => Err(SnapshotError::UnsupportedVersion(other)),
    }
}

pub fn encode_snapshot(snapshot: &StoreSnapshot) -> anyhow::Result<String> {
    serde_json::to_string(snapshot).context("failed to serialize snapshot")
}

impl TimetableStore {
    pub fn from_snapshot(snapshot: StoreSnapshot, config: StoreConfig) -> Self {
        let StoreSnapshot {
            lessons,
            mut selected_lessons,
            objectives_history,
            theme_history,
            week_approvals,
            filters,
            next_batch_id,
        } = snapshot;
        selected_lessons.retain(|id| lessons.iter().any(|l| &l.id == id));
        let logged_max = objectives_history
            .max_batch_id()
            .into_iter()
            .chain(theme_history.max_batch_id())
            .max()
            .unwrap_or(0);
        Self {
            lessons,
            selected: selected_lessons,
            objectives_history,
            theme_history,
            week_approvals,
            filters,
            next_batch_id: next_batch_id.max(logged_max + 1).max(1),
            config,
        }
    }

    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            lessons: self.lessons.clone(),
            selected_lessons: self.selected.clone(),
            objectives_history: self.objectives_history.clone(),
            theme_history: self.theme_history.clone(),
            week_approvals: self.week_approvals.clone(),
            filters: self.filters.clone(),
            next_batch_id: self.next_batch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::model::Weekday;
    use crate::timetable::test_fixtures::{draft, objective, store};

    #[test]
    fn version_zero_is_discarded() {
        let load = decode_snapshot(0, "{\"anything\": true}").expect("decode");
        assert!(matches!(load, SnapshotLoad::Discarded { from_version: 0 }));
    }

    #[test]
    fn unknown_versions_are_rejected() {
        assert!(matches!(
            decode_snapshot(7, "{}"),
            Err(SnapshotError::UnsupportedVersion(7))
        ));
        assert!(matches!(
            decode_snapshot(SNAPSHOT_VERSION, "not json"),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn restored_store_keeps_batch_counter_ahead_of_history() {
        let mut s = store();
        let id = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_objectives(&id, vec![objective("o1")]);
        s.toggle_lesson_selection(&id).expect("select");

        let mut snap = s.to_snapshot();
        snap.next_batch_id = 0;
        snap.selected_lessons.push("gone".to_string());
        let payload = encode_snapshot(&snap).expect("encode");
        let SnapshotLoad::Loaded(decoded) =
            decode_snapshot(SNAPSHOT_VERSION, &payload).expect("decode")
        else {
            panic!("expected loaded snapshot");
        };

        let mut restored = TimetableStore::from_snapshot(decoded, StoreConfig::default());
        assert_eq!(restored.selected_ids(), &[id.clone()]);
        restored.update_lesson_objectives(&id, vec![]);
        assert_eq!(restored.undo_auto_objectives(), 1);
        assert_eq!(
            restored.lesson(&id).map(|l| l.objectives.clone()),
            Some(vec![objective("o1")])
        );
    }
}
