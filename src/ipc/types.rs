use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::calendar::TermCalendar;
use crate::curriculum::{ObjectiveCatalog, ThemeTable};
use crate::timetable::{StoreConfig, TimetableStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub store: TimetableStore,
    pub calendar: TermCalendar,
    pub objectives: ObjectiveCatalog,
    pub themes: ThemeTable,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            store: TimetableStore::new(StoreConfig::default()),
            calendar: TermCalendar::default(),
            objectives: ObjectiveCatalog::default(),
            themes: ThemeTable::default(),
        }
    }
}
