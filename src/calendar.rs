use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub key: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: u32,
}

impl Term {
    pub fn new(key: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            key: key.to_string(),
            name: key.to_string(),
            start_date,
            end_date,
            weeks: monday_aligned_weeks(start_date, end_date),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    UnknownTerm(String),
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTerm(key) => write!(f, "term not found: {}", key),
            Self::InvertedRange { start, end } => {
                write!(f, "term end {} is before its start {}", end, start)
            }
        }
    }
}

impl std::error::Error for CalendarError {}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Number of Monday-starting weeks touched by `[start, end]`.
pub fn monday_aligned_weeks(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let days = (monday_of(end) - monday_of(start)).num_days();
    (days / 7 + 1) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermCalendar {
    pub terms: Vec<Term>,
}

impl Default for TermCalendar {
    fn default() -> Self {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap_or_default();
        Self {
            terms: vec![
                Term::new("Autumn 1", d(2026, 9, 2), d(2026, 10, 23)),
                Term::new("Autumn 2", d(2026, 11, 2), d(2026, 12, 18)),
                Term::new("Spring 1", d(2027, 1, 5), d(2027, 2, 12)),
                Term::new("Spring 2", d(2027, 2, 22), d(2027, 3, 26)),
                Term::new("Summer 1", d(2027, 4, 12), d(2027, 5, 28)),
                Term::new("Summer 2", d(2027, 6, 7), d(2027, 7, 21)),
            ],
        }
    }
}

impl TermCalendar {
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.key == key)
    }

    /// Recomputes every stored week count from its dates. Returns the keys
    /// whose stored count disagreed.
    pub fn reconcile(&mut self) -> Vec<String> {
        let mut repaired = Vec::new();
        for term in &mut self.terms {
            let derived = monday_aligned_weeks(term.start_date, term.end_date);
            if term.weeks != derived {
                term.weeks = derived;
                repaired.push(term.key.clone());
            }
        }
        repaired
    }

    pub fn update_dates(
        &mut self,
        key: &str,
        start: NaiveDate,
        end: NaiveDate,
        name: Option<String>,
    ) -> Result<&Term, CalendarError> {
        if end < start {
            return Err(CalendarError::InvertedRange { start, end });
        }
        let term = self
            .terms
            .iter_mut()
            .find(|t| t.key == key)
            .ok_or_else(|| CalendarError::UnknownTerm(key.to_string()))?;
        term.start_date = start;
        term.end_date = end;
        term.weeks = monday_aligned_weeks(start, end);
        if let Some(name) = name {
            term.name = name;
        }
        Ok(term)
    }

    /// Term key and 1-based week number containing `date`.
    pub fn locate(&self, date: NaiveDate) -> Option<(&Term, u32)> {
        let term = self.terms.iter().find(|t| t.contains(date))?;
        let week = monday_aligned_weeks(term.start_date, date);
        Some((term, week))
    }

    /// Monday of `week` within the term.
    pub fn week_start(&self, key: &str, week: u32) -> Option<NaiveDate> {
        let term = self.get(key)?;
        if week == 0 || week > term.weeks {
            return None;
        }
        Some(monday_of(term.start_date) + Duration::weeks(week as i64 - 1))
    }
}
