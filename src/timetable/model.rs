use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCHOOL_DAYS: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        SCHOOL_DAYS.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(s))
    }

    /// Weekends have no school day.
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start time of a lesson, in minutes since midnight. Serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u32);

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime(0);

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < 24 * 60).then_some(Self(minutes))
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        let h: u32 = h.parse().ok()?;
        let m: u32 = m.parse().ok()?;
        if h > 23 || m > 59 {
            return None;
        }
        Some(Self(h * 60 + m))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn is_aligned_to(self, step: u32) -> bool {
        step == 0 || self.0 % step == 0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SlotTime::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time: {}", raw)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LessonStatus {
    #[default]
    Planned,
    Taught,
}

impl LessonStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Some(Self::Planned),
            "taught" => Some(Self::Taught),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activities {
    #[serde(default)]
    pub starter: Option<Activity>,
    #[serde(default)]
    pub main: Option<Activity>,
    #[serde(default)]
    pub plenary: Option<Activity>,
}

impl Activities {
    pub fn is_complete(&self) -> bool {
        self.starter.is_some() && self.main.is_some() && self.plenary.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub day: Weekday,
    pub start_time: SlotTime,
    pub duration_minutes: u32,
    pub week: u32,
    pub term_id: String,
    pub subject: String,
    pub year_group: String,
    pub class: String,
    #[serde(default)]
    pub status: LessonStatus,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub activities: Option<Activities>,
}

impl Lesson {
    /// All three activity slots are filled.
    pub fn is_fully_planned(&self) -> bool {
        self.activities.as_ref().is_some_and(Activities::is_complete)
    }

    /// Fully planned and carrying at least one objective.
    pub fn is_ready_for_approval(&self) -> bool {
        self.is_fully_planned() && !self.objectives.is_empty()
    }

    pub fn end_minutes(&self) -> u32 {
        self.start_time.minutes().saturating_add(self.duration_minutes)
    }

    pub fn in_week(&self, term_id: &str, week: u32) -> bool {
        self.term_id == term_id && self.week == week
    }
}

/// Caller-supplied fields for a new lesson; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub day: Weekday,
    pub start_time: SlotTime,
    pub duration_minutes: u32,
    pub week: u32,
    pub term_id: String,
    pub subject: String,
    pub year_group: String,
    pub class: String,
    pub status: LessonStatus,
    pub theme: Option<String>,
    pub notes: Option<String>,
    pub objectives: Vec<Objective>,
    pub activities: Option<Activities>,
}

impl LessonDraft {
    pub fn into_lesson(self, id: String) -> Lesson {
        Lesson {
            id,
            day: self.day,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            week: self.week,
            term_id: self.term_id,
            subject: self.subject,
            year_group: self.year_group,
            class: self.class,
            status: self.status,
            theme: self.theme,
            notes: self.notes,
            objectives: self.objectives,
            activities: self.activities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekApproval {
    pub approved: bool,
    pub approved_at: String,
    pub approved_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStatus {
    Approved,
    /// Every lesson is ready; waiting on an explicit approval.
    Pending,
    NeedsReview,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::NeedsReview => "needs-review",
        }
    }
}

pub fn week_key(term_id: &str, week: u32) -> String {
    format!("{}-{}", term_id, week)
}

/// UI-side list filters; persisted with the store but never applied by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub year_group: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub term_id: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
}

/// Optional match criteria; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonCriteria {
    pub subject: Option<String>,
    pub year_group: Option<String>,
    pub class: Option<String>,
    pub term_id: Option<String>,
}

impl LessonCriteria {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        fn field_matches(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        field_matches(&self.subject, &lesson.subject)
            && field_matches(&self.year_group, &lesson.year_group)
            && field_matches(&self.class, &lesson.class)
            && field_matches(&self.term_id, &lesson.term_id)
    }
}
