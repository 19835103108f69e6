use crate::calendar::TermCalendar;
use crate::curriculum::{ObjectiveCatalog, ThemeTable};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup::load_store_config;
use crate::ipc::types::{AppState, Request};
use crate::timetable::snapshot::{decode_snapshot, SnapshotError, SnapshotLoad, SNAPSHOT_NAME};
use crate::timetable::{StoreConfig, TimetableStore};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::PathBuf;

pub const CALENDAR_KEY: &str = "calendar.terms";
pub const OBJECTIVES_KEY: &str = "curriculum.objectives";
pub const THEMES_KEY: &str = "curriculum.themes";

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "lessonCount": state.store.lessons().len()
        }),
    )
}

/// Saved override for `key`, or the built-in default when absent or malformed.
fn load_override<T: DeserializeOwned + Default>(
    conn: &rusqlite::Connection,
    key: &str,
) -> anyhow::Result<T> {
    let Some(saved) = db::settings_get_json(conn, key)? else {
        return Ok(T::default());
    };
    match serde_json::from_value(saved) {
        Ok(v) => Ok(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed settings override");
            Ok(T::default())
        }
    }
}

fn load_calendar(conn: &rusqlite::Connection) -> anyhow::Result<TermCalendar> {
    let mut calendar: TermCalendar = load_override(conn, CALENDAR_KEY)?;
    let repaired = calendar.reconcile();
    if !repaired.is_empty() {
        tracing::warn!(terms = ?repaired, "stored term week counts disagreed with dates; repaired");
        db::settings_set_json(conn, CALENDAR_KEY, &serde_json::to_value(&calendar)?)?;
    }
    Ok(calendar)
}

fn load_store(
    conn: &rusqlite::Connection,
    config: StoreConfig,
) -> anyhow::Result<TimetableStore> {
    let Some((version, payload)) = db::snapshot_load(conn, SNAPSHOT_NAME)? else {
        return Ok(TimetableStore::new(config));
    };
    match decode_snapshot(version, &payload)? {
        SnapshotLoad::Loaded(snapshot) => Ok(TimetableStore::from_snapshot(snapshot, config)),
        SnapshotLoad::Discarded { from_version } => {
            tracing::info!(from_version, "discarding snapshot with no upgrade path");
            Ok(TimetableStore::new(config))
        }
    }
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };
    let config = match load_store_config(&conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let calendar = match load_calendar(&conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let objectives: ObjectiveCatalog = match load_override(&conn, OBJECTIVES_KEY) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let themes: ThemeTable = match load_override(&conn, THEMES_KEY) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let store = match load_store(&conn, config) {
        Ok(v) => v,
        Err(e) => {
            let code = match e.downcast_ref::<SnapshotError>() {
                Some(SnapshotError::UnsupportedVersion(_)) => "snapshot_unsupported",
                _ => "db_query_failed",
            };
            return err(&req.id, code, e.to_string(), None);
        }
    };

    tracing::info!(
        workspace = %path.to_string_lossy(),
        lessons = store.lessons().len(),
        "workspace opened"
    );
    let lesson_count = store.lessons().len();
    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.store = store;
    state.calendar = calendar;
    state.objectives = objectives;
    state.themes = themes;
    ok(
        &req.id,
        json!({ "workspacePath": path.to_string_lossy(), "lessonCount": lesson_count }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
