use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use super::history::ChangeKind;
use super::model::{week_key, Activities, Lesson, LessonDraft};
use super::{SelectionError, TimetableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected,
    Deselected,
    /// Unknown lesson id; nothing changed.
    Ignored,
}

impl SelectionChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Deselected => "deselected",
            Self::Ignored => "ignored",
        }
    }
}

impl TimetableStore {
    /// Appends a lesson and returns its generated id. Slot conflicts are the
    /// caller's concern; see `is_time_slot_available`.
    pub fn add_lesson(&mut self, draft: LessonDraft) -> String {
        let id = Uuid::new_v4().to_string();
        self.lessons.push(draft.into_lesson(id.clone()));
        id
    }

    /// Replaces the lesson sharing `lesson.id`. Unknown ids are a no-op
    /// (returns false). A changed theme is logged for undo, and a changed
    /// theme or activity set revokes the week's approval. Moving a selected
    /// lesson to another term or week drops it from the selection.
    pub fn update_lesson(&mut self, lesson: Lesson) -> bool {
        let Some(idx) = self.lessons.iter().position(|l| l.id == lesson.id) else {
            return false;
        };
        let prior = &self.lessons[idx];
        let prior_theme = prior.theme.clone();
        let prior_week = (prior.term_id.clone(), prior.week);
        let theme_changed = prior.theme != lesson.theme;
        let content_changed = theme_changed || prior.activities != lesson.activities;
        let moved = !lesson.in_week(&prior_week.0, prior_week.1);

        if theme_changed {
            let batch = self.next_batch();
            self.theme_history.record(
                batch,
                ChangeKind::Replace,
                vec![(lesson.id.clone(), prior_theme)],
            );
        }
        if content_changed {
            self.invalidate_week_approval(&prior_week.0, prior_week.1);
            self.invalidate_week_approval(&lesson.term_id, lesson.week);
        }
        if moved {
            self.selected.retain(|id| *id != lesson.id);
        }
        self.lessons[idx] = lesson;
        true
    }

    pub fn delete_lesson(&mut self, id: &str) -> bool {
        let ids: HashSet<String> = [id.to_string()].into_iter().collect();
        self.remove_lessons(&ids) > 0
    }

    pub fn delete_selected_lessons(&mut self) -> usize {
        let ids: HashSet<String> = self.selected.iter().cloned().collect();
        self.remove_lessons(&ids)
    }

    /// Removes lessons and everything that points at them. A term/week left
    /// with no lessons loses its approval; other weeks are untouched.
    pub(super) fn remove_lessons(&mut self, ids: &HashSet<String>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.lessons.len();
        let mut touched: BTreeSet<(String, u32)> = BTreeSet::new();
        self.lessons.retain(|l| {
            if ids.contains(&l.id) {
                touched.insert((l.term_id.clone(), l.week));
                false
            } else {
                true
            }
        });
        let removed = before - self.lessons.len();
        if removed == 0 {
            return 0;
        }

        self.selected.retain(|id| !ids.contains(id));
        self.objectives_history.prune_lessons(ids);
        self.theme_history.prune_lessons(ids);
        for (term_id, week) in touched {
            if !self.lessons.iter().any(|l| l.in_week(&term_id, week)) {
                self.week_approvals.remove(&week_key(&term_id, week));
            }
        }
        removed
    }

    /// Adds or removes a lesson from the selection. Every selected lesson must
    /// share the term and week of the first one selected.
    pub fn toggle_lesson_selection(&mut self, id: &str) -> Result<SelectionChange, SelectionError> {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            return Ok(SelectionChange::Deselected);
        }
        let Some(lesson) = self.lesson(id) else {
            return Ok(SelectionChange::Ignored);
        };
        if let Some(anchor) = self.selected.first().and_then(|first| self.lesson(first)) {
            if !lesson.in_week(&anchor.term_id, anchor.week) {
                return Err(SelectionError::OutsideScope {
                    lesson_id: id.to_string(),
                    expected_term_id: anchor.term_id.clone(),
                    expected_week: anchor.week,
                });
            }
        }
        self.selected.push(id.to_string());
        Ok(SelectionChange::Selected)
    }

    /// Empties the selection. Undo history is kept.
    pub fn clear_lesson_selection(&mut self) {
        self.selected.clear();
    }

    /// Sets a lesson's activities and, when `theme` is non-blank, its theme.
    /// Always revokes the approval of the lesson's week.
    pub fn update_lesson_activities(
        &mut self,
        id: &str,
        activities: Activities,
        theme: Option<String>,
    ) -> bool {
        let Some(idx) = self.lessons.iter().position(|l| l.id == id) else {
            return false;
        };
        let prior_theme = self.lessons[idx].theme.clone();
        let next_theme = theme
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| prior_theme.clone());

        if next_theme != prior_theme {
            let batch = self.next_batch();
            self.theme_history
                .record(batch, ChangeKind::Activities, vec![(id.to_string(), prior_theme)]);
        }

        let lesson = &mut self.lessons[idx];
        lesson.activities = Some(activities);
        lesson.theme = next_theme;
        let (term_id, week) = (lesson.term_id.clone(), lesson.week);
        self.invalidate_week_approval(&term_id, week);
        true
    }
}
