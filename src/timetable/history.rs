use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// Wholesale replacement of one lesson's objectives.
    Update,
    /// Objective appended across the selection.
    BulkAdd,
    /// Objectives cleared by criteria.
    Reset,
    /// Theme overwritten alongside an activities edit.
    Activities,
    /// Theme overwritten by a whole-lesson replace.
    Replace,
    /// Theme set from the curriculum theme table.
    Assign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<T> {
    pub batch_id: u64,
    pub kind: ChangeKind,
    pub lesson_id: String,
    pub prior: T,
}

/// Append-only log of prior values, grouped into batches so one undo reverts
/// exactly one mutation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog<T> {
    entries: Vec<HistoryEntry<T>>,
}

impl<T> Default for ChangeLog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ChangeLog<T> {
    pub fn record(&mut self, batch_id: u64, kind: ChangeKind, priors: Vec<(String, T)>) {
        self.entries
            .extend(priors.into_iter().map(|(lesson_id, prior)| HistoryEntry {
                batch_id,
                kind,
                lesson_id,
                prior,
            }));
    }

    /// Removes and returns the most recent batch, oldest entry first.
    pub fn pop_batch(&mut self) -> Vec<HistoryEntry<T>> {
        let Some(last) = self.entries.last().map(|e| e.batch_id) else {
            return Vec::new();
        };
        let split = self
            .entries
            .iter()
            .rposition(|e| e.batch_id != last)
            .map_or(0, |i| i + 1);
        self.entries.split_off(split)
    }

    pub fn drain_all(&mut self) -> Vec<HistoryEntry<T>> {
        std::mem::take(&mut self.entries)
    }

    pub fn prune_lessons(&mut self, removed: &HashSet<String>) {
        self.entries.retain(|e| !removed.contains(&e.lesson_id));
    }

    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_batch_id(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.batch_id).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_batch_returns_only_latest_batch() {
        let mut log: ChangeLog<u32> = ChangeLog::default();
        log.record(1, ChangeKind::Update, vec![("a".into(), 1)]);
        log.record(
            2,
            ChangeKind::BulkAdd,
            vec![("a".into(), 2), ("b".into(), 3)],
        );

        let batch = log.pop_batch();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| e.batch_id == 2));
        assert_eq!(batch[0].lesson_id, "a");
        assert_eq!(log.len(), 1);

        let batch = log.pop_batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].prior, 1);
        assert!(log.pop_batch().is_empty());
    }

    #[test]
    fn prune_drops_entries_for_removed_lessons() {
        let mut log: ChangeLog<u32> = ChangeLog::default();
        log.record(
            1,
            ChangeKind::Reset,
            vec![("a".into(), 1), ("b".into(), 2)],
        );
        let removed: HashSet<String> = ["a".to_string()].into_iter().collect();
        log.prune_lessons(&removed);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].lesson_id, "b");
    }
}
