use chrono::{Datelike, NaiveDateTime, Timelike};

use super::model::{Lesson, SlotTime, Weekday};
use super::TimetableStore;

impl TimetableStore {
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn lessons_by_term(&self, term_id: &str) -> Vec<&Lesson> {
        self.lessons.iter().filter(|l| l.term_id == term_id).collect()
    }

    pub fn lessons_by_subject_and_week(
        &self,
        subject: &str,
        week: u32,
        term_id: &str,
    ) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.subject == subject && l.in_week(term_id, week))
            .collect()
    }

    pub fn lessons_in_week(&self, term_id: &str, week: u32) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.in_week(term_id, week))
            .collect()
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    /// Selected lessons in selection order.
    pub fn selected_lessons(&self) -> Vec<&Lesson> {
        self.selected
            .iter()
            .filter_map(|id| self.lesson(id))
            .collect()
    }

    /// True when `[start, start + duration)` overlaps no other lesson on the
    /// same day, week and term. Back-to-back lessons do not overlap.
    pub fn is_time_slot_available(
        &self,
        day: Weekday,
        start: SlotTime,
        duration_minutes: u32,
        week: u32,
        term_id: &str,
        exclude_lesson_id: Option<&str>,
    ) -> bool {
        let req_start = start.minutes();
        let req_end = req_start.saturating_add(duration_minutes);
        !self.lessons.iter().any(|l| {
            if exclude_lesson_id == Some(l.id.as_str()) {
                return false;
            }
            if l.day != day || !l.in_week(term_id, week) {
                return false;
            }
            let ex_start = l.start_time.minutes();
            let ex_end = l.end_minutes();
            !(req_end <= ex_start || req_start >= ex_end)
        })
    }

    /// Next fully planned lesson after `now`, cycling Monday..Friday with no
    /// awareness of dates or terms. `scope` narrows the candidates to one
    /// term/week.
    pub fn next_lesson(&self, now: NaiveDateTime, scope: Option<(&str, u32)>) -> Option<&Lesson> {
        let candidates: Vec<&Lesson> = self
            .lessons
            .iter()
            .filter(|l| l.is_fully_planned())
            .filter(|l| scope.map_or(true, |(term, week)| l.in_week(term, week)))
            .collect();

        if let Some(today) = Weekday::from_chrono(now.weekday()) {
            let now_min = minutes_of_day(now);
            let later_today = earliest(
                candidates
                    .iter()
                    .copied()
                    .filter(|l| l.day == today && l.start_time.minutes() > now_min),
            );
            if later_today.is_some() {
                return later_today;
            }
            let later_this_week = earliest(candidates.iter().copied().filter(|l| l.day > today));
            if later_this_week.is_some() {
                return later_this_week;
            }
        }
        earliest(candidates.into_iter())
    }

    /// Lessons still to start today, capped. Always zero after the configured
    /// day cutoff and at weekends.
    pub fn remaining_lessons_today(&self, now: NaiveDateTime, scope: Option<(&str, u32)>) -> usize {
        let Some(today) = Weekday::from_chrono(now.weekday()) else {
            return 0;
        };
        let now_min = minutes_of_day(now);
        if now_min >= self.config.day_cutoff.minutes() {
            return 0;
        }
        self.lessons
            .iter()
            .filter(|l| scope.map_or(true, |(term, week)| l.in_week(term, week)))
            .filter(|l| l.day == today && l.start_time.minutes() > now_min)
            .count()
            .min(self.config.remaining_lessons_cap)
    }
}

fn earliest<'a>(lessons: impl Iterator<Item = &'a Lesson>) -> Option<&'a Lesson> {
    lessons.min_by_key(|l| (l.day, l.start_time))
}

fn minutes_of_day(now: NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}
