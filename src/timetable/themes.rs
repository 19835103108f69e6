use std::collections::{BTreeSet, HashSet};

use super::history::{ChangeKind, HistoryEntry};
use super::model::LessonCriteria;
use super::TimetableStore;

/// Spreads an ordered theme list evenly over a term: week `w` of `total_weeks`
/// gets theme `(w - 1) * n / total_weeks`. Weeks past the end keep the last theme.
pub fn theme_for_week(themes: &[String], week: u32, total_weeks: u32) -> Option<&str> {
    if themes.is_empty() || week == 0 {
        return None;
    }
    let total = total_weeks.max(1) as usize;
    let idx = ((week as usize - 1) * themes.len() / total).min(themes.len() - 1);
    themes.get(idx).map(String::as_str)
}

impl TimetableStore {
    /// Reverts the most recent theme batch. Returns the number of lessons restored.
    pub fn undo_theme_changes(&mut self) -> usize {
        let batch = self.theme_history.pop_batch();
        self.restore_themes(batch)
    }

    /// Replays the whole theme log newest-first, leaving each lesson on its
    /// oldest recorded theme, and empties the log.
    pub fn undo_all_theme_changes(&mut self) -> usize {
        let entries = self.theme_history.drain_all();
        self.restore_themes(entries)
    }

    fn restore_themes(&mut self, entries: Vec<HistoryEntry<Option<String>>>) -> usize {
        let mut restored: HashSet<String> = HashSet::new();
        let mut weeks: BTreeSet<(String, u32)> = BTreeSet::new();
        for entry in entries.into_iter().rev() {
            if let Some(lesson) = self.lesson_mut(&entry.lesson_id) {
                lesson.theme = entry.prior;
                weeks.insert((lesson.term_id.clone(), lesson.week));
                restored.insert(entry.lesson_id);
            }
        }
        for (term_id, week) in weeks {
            self.invalidate_week_approval(&term_id, week);
        }
        restored.len()
    }

    /// Sets themes from an ordered list on every lesson of `term_id` matching
    /// `criteria`, one theme per slice of the term's weeks. Logged as a single
    /// batch; approvals of touched weeks are revoked.
    pub fn assign_themes(
        &mut self,
        term_id: &str,
        total_weeks: u32,
        criteria: &LessonCriteria,
        themes: &[String],
    ) -> usize {
        let mut priors = Vec::new();
        let mut weeks: BTreeSet<u32> = BTreeSet::new();
        for lesson in self
            .lessons
            .iter_mut()
            .filter(|l| l.term_id == term_id && criteria.matches(l))
        {
            let Some(theme) = theme_for_week(themes, lesson.week, total_weeks) else {
                continue;
            };
            if lesson.theme.as_deref() == Some(theme) {
                continue;
            }
            priors.push((lesson.id.clone(), lesson.theme.replace(theme.to_string())));
            weeks.insert(lesson.week);
        }
        let changed = priors.len();
        if changed > 0 {
            let batch = self.next_batch();
            self.theme_history.record(batch, ChangeKind::Assign, priors);
        }
        for week in weeks {
            self.invalidate_week_approval(term_id, week);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::super::model::{ApprovalStatus, LessonCriteria, Weekday};
    use super::super::test_fixtures::{draft, full_activities, store};
    use super::theme_for_week;
    use chrono::Utc;

    fn themes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn themes_spread_evenly_over_weeks() {
        let t = themes(&["Myths", "Poetry", "Drama"]);
        assert_eq!(theme_for_week(&t, 1, 6), Some("Myths"));
        assert_eq!(theme_for_week(&t, 2, 6), Some("Myths"));
        assert_eq!(theme_for_week(&t, 3, 6), Some("Poetry"));
        assert_eq!(theme_for_week(&t, 6, 6), Some("Drama"));
        assert_eq!(theme_for_week(&t, 9, 6), Some("Drama"));
        assert_eq!(theme_for_week(&t, 0, 6), None);
        assert_eq!(theme_for_week(&[], 1, 6), None);
    }

    #[test]
    fn assign_then_undo_restores_prior_themes() {
        let mut s = store();
        let w1 = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        let w4 = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 4, "Autumn 1"));
        let mut maths = draft(Weekday::Monday, "10:00", 60, 1, "Autumn 1");
        maths.subject = "Maths".to_string();
        let maths = s.add_lesson(maths);
        s.approve_week("Autumn 1", 4, "Head", Utc::now());

        let criteria = LessonCriteria {
            subject: Some("English".to_string()),
            year_group: Some("Year 7".to_string()),
            ..LessonCriteria::default()
        };
        let changed = s.assign_themes("Autumn 1", 6, &criteria, &themes(&["Myths", "Poetry"]));
        assert_eq!(changed, 2);
        assert_eq!(s.lesson(&w1).and_then(|l| l.theme.as_deref()), Some("Myths"));
        assert_eq!(s.lesson(&w4).and_then(|l| l.theme.as_deref()), Some("Poetry"));
        assert_eq!(s.lesson(&maths).and_then(|l| l.theme.clone()), None);
        assert_ne!(s.week_approval_status("Autumn 1", 4), ApprovalStatus::Approved);

        assert_eq!(s.undo_theme_changes(), 2);
        assert!(s.lessons().iter().all(|l| l.theme.is_none()));
        assert!(s.theme_history().is_empty());
    }

    #[test]
    fn undo_pops_one_batch_while_undo_all_replays_everything() {
        let mut s = store();
        let id = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_activities(&id, full_activities(), Some("One".to_string()));
        s.update_lesson_activities(&id, full_activities(), Some("Two".to_string()));
        s.update_lesson_activities(&id, full_activities(), Some("Three".to_string()));

        assert_eq!(s.undo_theme_changes(), 1);
        assert_eq!(s.lesson(&id).and_then(|l| l.theme.as_deref()), Some("Two"));

        assert_eq!(s.undo_all_theme_changes(), 1);
        assert_eq!(s.lesson(&id).and_then(|l| l.theme.clone()), None);
        assert!(s.theme_history().is_empty());
    }
}
