use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::model::{week_key, ApprovalStatus, WeekApproval};
use super::TimetableStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub week: u32,
    pub status: ApprovalStatus,
    pub lesson_count: usize,
    pub fully_planned_count: usize,
    pub approval: Option<WeekApproval>,
}

impl TimetableStore {
    /// Records an approval without re-checking readiness.
    pub fn approve_week(
        &mut self,
        term_id: &str,
        week: u32,
        approved_by: &str,
        approved_at: DateTime<Utc>,
    ) -> WeekApproval {
        let record = WeekApproval {
            approved: true,
            approved_at: approved_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            approved_by: approved_by.to_string(),
        };
        self.week_approvals
            .insert(week_key(term_id, week), record.clone());
        record
    }

    pub fn week_approval(&self, term_id: &str, week: u32) -> Option<&WeekApproval> {
        self.week_approvals.get(&week_key(term_id, week))
    }

    /// `Approved` when an approval record stands, `Pending` when every lesson
    /// in the week is fully planned and has objectives, else `NeedsReview`.
    /// A week with no lessons counts as `Pending`.
    pub fn week_approval_status(&self, term_id: &str, week: u32) -> ApprovalStatus {
        if self.week_approval(term_id, week).is_some_and(|a| a.approved) {
            return ApprovalStatus::Approved;
        }
        let ready = self
            .lessons
            .iter()
            .filter(|l| l.in_week(term_id, week))
            .all(|l| l.is_ready_for_approval());
        if ready {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::NeedsReview
        }
    }

    pub fn week_overview(&self, term_id: &str, total_weeks: u32) -> Vec<WeekSummary> {
        (1..=total_weeks)
            .map(|week| {
                let lessons = self.lessons_in_week(term_id, week);
                WeekSummary {
                    week,
                    status: self.week_approval_status(term_id, week),
                    lesson_count: lessons.len(),
                    fully_planned_count: lessons.iter().filter(|l| l.is_fully_planned()).count(),
                    approval: self.week_approval(term_id, week).cloned(),
                }
            })
            .collect()
    }

    pub(super) fn invalidate_week_approval(&mut self, term_id: &str, week: u32) -> bool {
        self.week_approvals.remove(&week_key(term_id, week)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::model::{ApprovalStatus, Weekday};
    use super::super::test_fixtures::{draft, full_activities, objective, store};
    use chrono::{TimeZone, Utc};

    #[test]
    fn status_moves_from_needs_review_to_pending_to_approved() {
        let mut s = store();
        let id = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        assert_eq!(s.week_approval_status("Autumn 1", 1), ApprovalStatus::NeedsReview);

        s.update_lesson_activities(&id, full_activities(), None);
        assert_eq!(s.week_approval_status("Autumn 1", 1), ApprovalStatus::NeedsReview);

        s.update_lesson_objectives(&id, vec![objective("o1")]);
        assert_eq!(s.week_approval_status("Autumn 1", 1), ApprovalStatus::Pending);

        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let record = s.approve_week("Autumn 1", 1, "X", at);
        assert_eq!(record.approved_at, "2026-10-19T08:00:00Z");
        assert_eq!(s.week_approval_status("Autumn 1", 1), ApprovalStatus::Approved);
    }

    #[test]
    fn activity_edit_revokes_approval() {
        let mut s = store();
        let id = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_activities(&id, full_activities(), None);
        s.update_lesson_objectives(&id, vec![objective("o1")]);
        s.approve_week("Autumn 1", 1, "X", Utc::now());

        s.update_lesson_activities(&id, full_activities(), None);
        assert_eq!(s.week_approval_status("Autumn 1", 1), ApprovalStatus::Pending);
        assert!(s.week_approval("Autumn 1", 1).is_none());
    }

    #[test]
    fn approve_trusts_the_caller() {
        let mut s = store();
        s.add_lesson(draft(Weekday::Monday, "09:00", 60, 2, "Autumn 1"));
        s.approve_week("Autumn 1", 2, "X", Utc::now());
        assert_eq!(s.week_approval_status("Autumn 1", 2), ApprovalStatus::Approved);
    }

    #[test]
    fn overview_covers_every_week_of_the_term() {
        let mut s = store();
        let id = s.add_lesson(draft(Weekday::Monday, "09:00", 60, 1, "Autumn 1"));
        s.add_lesson(draft(Weekday::Tuesday, "09:00", 60, 1, "Autumn 1"));
        s.update_lesson_activities(&id, full_activities(), None);

        let overview = s.week_overview("Autumn 1", 3);
        assert_eq!(overview.len(), 3);
        assert_eq!(overview[0].lesson_count, 2);
        assert_eq!(overview[0].fully_planned_count, 1);
        assert_eq!(overview[0].status, ApprovalStatus::NeedsReview);
        assert_eq!(overview[2].lesson_count, 0);
        assert_eq!(overview[2].status, ApprovalStatus::Pending);
    }
}
