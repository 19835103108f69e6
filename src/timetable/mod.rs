//! In-process owner of lesson records and the state derived from them:
//! selection, week approvals and the objective/theme undo logs.
//!
//! One `TimetableStore` is built per workspace session and handed to the IPC
//! layer; nothing here touches global state or the filesystem.

mod actions;
mod approvals;
pub mod duration;
pub mod history;
pub mod model;
mod objectives;
mod queries;
mod schedule;
pub mod snapshot;
mod themes;

use std::collections::BTreeMap;
use std::fmt;

use history::ChangeLog;
use model::{Filters, Lesson, Objective, SlotTime, WeekApproval};

pub use actions::SelectionChange;
pub use approvals::WeekSummary;
pub use schedule::DuplicateSummary;
pub use themes::theme_for_week;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub default_duration_minutes: u32,
    pub slot_alignment_minutes: u32,
    /// No lessons count as remaining once the clock passes this time.
    pub day_cutoff: SlotTime,
    pub remaining_lessons_cap: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: duration::DEFAULT_DURATION_MINUTES,
            slot_alignment_minutes: 30,
            day_cutoff: SlotTime::from_minutes(15 * 60).unwrap_or(SlotTime::MIDNIGHT),
            remaining_lessons_cap: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The lesson sits in a different term/week than the current selection.
    OutsideScope {
        lesson_id: String,
        expected_term_id: String,
        expected_week: u32,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideScope {
                lesson_id,
                expected_term_id,
                expected_week,
            } => write!(
                f,
                "lesson {} is outside the selected week ({} week {})",
                lesson_id, expected_term_id, expected_week
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

#[derive(Debug, Clone, Default)]
pub struct TimetableStore {
    lessons: Vec<Lesson>,
    selected: Vec<String>,
    objectives_history: ChangeLog<Vec<Objective>>,
    theme_history: ChangeLog<Option<String>>,
    week_approvals: BTreeMap<String, WeekApproval>,
    filters: Filters,
    next_batch_id: u64,
    config: StoreConfig,
}

impl TimetableStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            next_batch_id: 1,
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StoreConfig) {
        self.config = config;
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
    }

    pub fn objectives_history(&self) -> &ChangeLog<Vec<Objective>> {
        &self.objectives_history
    }

    pub fn theme_history(&self) -> &ChangeLog<Option<String>> {
        &self.theme_history
    }

    fn next_batch(&mut self) -> u64 {
        let id = self.next_batch_id.max(1);
        self.next_batch_id = id + 1;
        id
    }

    fn lesson_mut(&mut self, id: &str) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|l| l.id == id)
    }
}
