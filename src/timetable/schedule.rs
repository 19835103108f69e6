use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use super::model::{week_key, Lesson};
use super::TimetableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSummary {
    pub removed: usize,
    pub created: usize,
}

impl TimetableStore {
    /// Rebuilds weeks `2..=total_weeks` of a term from its week 1 lessons.
    ///
    /// Irreversible: every lesson of the term outside week 1 is deleted first,
    /// together with its selection entries, history and week approvals. Each
    /// week 1 lesson is then cloned into every later week with a fresh id.
    pub fn duplicate_lessons_across_weeks(&mut self, term_id: &str, total_weeks: u32) -> DuplicateSummary {
        let stale: HashSet<String> = self
            .lessons
            .iter()
            .filter(|l| l.term_id == term_id && l.week != 1)
            .map(|l| l.id.clone())
            .collect();
        let removed = self.remove_lessons(&stale);
        let keep = week_key(term_id, 1);
        let prefix = format!("{}-", term_id);
        self.week_approvals.retain(|key, _| {
            *key == keep
                || !key
                    .strip_prefix(&prefix)
                    .is_some_and(|w| w.parse::<u32>().is_ok())
        });

        let template: Vec<Lesson> = self
            .lessons
            .iter()
            .filter(|l| l.in_week(term_id, 1))
            .cloned()
            .collect();
        let mut created = 0;
        for week in 2..=total_weeks {
            for source in &template {
                let mut copy = source.clone();
                copy.id = Uuid::new_v4().to_string();
                copy.week = week;
                self.lessons.push(copy);
                created += 1;
            }
        }
        tracing::info!(term_id, total_weeks, removed, created, "regenerated weeks from week 1");
        DuplicateSummary { removed, created }
    }
}
