use super::history::ChangeKind;
use super::model::{LessonCriteria, Objective};
use super::TimetableStore;

impl TimetableStore {
    /// Replaces a lesson's objectives wholesale, without de-duplication.
    pub fn update_lesson_objectives(&mut self, id: &str, objectives: Vec<Objective>) -> bool {
        let Some(idx) = self.lessons.iter().position(|l| l.id == id) else {
            return false;
        };
        let prior = std::mem::replace(&mut self.lessons[idx].objectives, objectives);
        let batch = self.next_batch();
        self.objectives_history
            .record(batch, ChangeKind::Update, vec![(id.to_string(), prior)]);
        true
    }

    /// Appends `objective` to every selected lesson that lacks its id. Every
    /// selected lesson is snapshotted, changed or not. Returns the number of
    /// lessons that received the objective.
    pub fn add_objective_to_lessons(&mut self, objective: Objective) -> usize {
        let selected = self.selected.clone();
        let mut priors = Vec::with_capacity(selected.len());
        let mut added = 0;
        for id in &selected {
            let Some(lesson) = self.lesson_mut(id) else {
                continue;
            };
            priors.push((id.clone(), lesson.objectives.clone()));
            if !lesson.objectives.iter().any(|o| o.id == objective.id) {
                lesson.objectives.push(objective.clone());
                added += 1;
            }
        }
        if !priors.is_empty() {
            let batch = self.next_batch();
            self.objectives_history.record(batch, ChangeKind::BulkAdd, priors);
        }
        added
    }

    /// Strips an objective id from every selected lesson. Not logged for undo.
    pub fn remove_objective_from_lessons(&mut self, objective_id: &str) -> usize {
        let selected = self.selected.clone();
        let mut changed = 0;
        for id in &selected {
            if let Some(lesson) = self.lesson_mut(id) {
                let before = lesson.objectives.len();
                lesson.objectives.retain(|o| o.id != objective_id);
                if lesson.objectives.len() != before {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Reverts the most recent objectives batch, independent of the current
    /// selection. Returns the number of lessons restored.
    pub fn undo_auto_objectives(&mut self) -> usize {
        let batch = self.objectives_history.pop_batch();
        let mut restored = 0;
        for entry in batch.into_iter().rev() {
            if let Some(lesson) = self.lesson_mut(&entry.lesson_id) {
                lesson.objectives = entry.prior;
                restored += 1;
            }
        }
        restored
    }

    /// Clears objectives on every lesson matching `criteria`, logging one
    /// batch so the reset can be undone. Lessons already empty are skipped.
    pub fn reset_all_objectives(&mut self, criteria: &LessonCriteria) -> usize {
        let mut priors = Vec::new();
        for lesson in self.lessons.iter_mut().filter(|l| criteria.matches(l)) {
            if lesson.objectives.is_empty() {
                continue;
            }
            priors.push((lesson.id.clone(), std::mem::take(&mut lesson.objectives)));
        }
        let cleared = priors.len();
        if cleared > 0 {
            let batch = self.next_batch();
            self.objectives_history.record(batch, ChangeKind::Reset, priors);
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::super::model::{LessonCriteria, Weekday};
    use super::super::test_fixtures::{draft, objective, store};

    #[test]
    fn bulk_add_dedupes_per_lesson_and_snapshots_everyone() {
        let mut s = store();
        let a = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        let b = s.add_lesson(draft(Weekday::Tuesday, "09:00", 60, 1, "Autumn 1"));
        s.toggle_lesson_selection(&a).expect("select a");
        s.toggle_lesson_selection(&b).expect("select b");

        assert_eq!(s.add_objective_to_lessons(objective("o1")), 2);
        assert_eq!(s.add_objective_to_lessons(objective("o1")), 0);
        for id in [&a, &b] {
            assert_eq!(s.lesson(id).map(|l| l.objectives.len()), Some(1));
        }
        assert_eq!(s.objectives_history().len(), 4);
    }

    #[test]
    fn replace_does_not_dedupe() {
        let mut s = store();
        let a = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        assert!(s.update_lesson_objectives(&a, vec![objective("o1"), objective("o1")]));
        assert_eq!(s.lesson(&a).map(|l| l.objectives.len()), Some(2));
        assert!(!s.update_lesson_objectives("missing", vec![]));
        assert_eq!(s.objectives_history().len(), 1);
    }

    #[test]
    fn undo_reverts_latest_batch_even_after_selection_changes() {
        let mut s = store();
        let a = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        let b = s.add_lesson(draft(Weekday::Tuesday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_objectives(&a, vec![objective("base")]);
        s.toggle_lesson_selection(&a).expect("select a");
        s.toggle_lesson_selection(&b).expect("select b");
        s.add_objective_to_lessons(objective("o1"));
        s.clear_lesson_selection();

        assert_eq!(s.undo_auto_objectives(), 2);
        assert_eq!(
            s.lesson(&a).map(|l| l.objectives.clone()),
            Some(vec![objective("base")])
        );
        assert_eq!(s.lesson(&b).map(|l| l.objectives.len()), Some(0));

        assert_eq!(s.undo_auto_objectives(), 1);
        assert_eq!(s.lesson(&a).map(|l| l.objectives.len()), Some(0));
        assert_eq!(s.undo_auto_objectives(), 0);
    }

    #[test]
    fn remove_from_selected_is_not_logged() {
        let mut s = store();
        let a = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_objectives(&a, vec![objective("o1"), objective("o2")]);
        s.toggle_lesson_selection(&a).expect("select");
        assert_eq!(s.remove_objective_from_lessons("o1"), 1);
        assert_eq!(s.lesson(&a).map(|l| l.objectives.clone()), Some(vec![objective("o2")]));
        assert_eq!(s.objectives_history().len(), 1);
    }

    #[test]
    fn reset_by_subject_leaves_other_subjects_and_is_undoable() {
        let mut s = store();
        let eng = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        let mut maths = draft(Weekday::Monday, "10:00", 60, 1, "Autumn 1");
        maths.subject = "Maths".to_string();
        let maths = s.add_lesson(maths);
        s.update_lesson_objectives(&eng, vec![objective("e1"), objective("e2")]);
        s.update_lesson_objectives(&maths, vec![objective("m1")]);

        let criteria = LessonCriteria {
            subject: Some("English".to_string()),
            ..LessonCriteria::default()
        };
        assert_eq!(s.reset_all_objectives(&criteria), 1);
        assert!(s.lesson(&eng).is_some_and(|l| l.objectives.is_empty()));
        assert_eq!(s.lesson(&maths).map(|l| l.objectives.len()), Some(1));

        assert_eq!(s.undo_auto_objectives(), 1);
        assert_eq!(
            s.lesson(&eng).map(|l| l.objectives.clone()),
            Some(vec![objective("e1"), objective("e2")])
        );
    }
}
