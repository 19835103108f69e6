use crate::calendar::CalendarError;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::core::CALENDAR_KEY;
use crate::ipc::helpers::{parse_opt_string, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use serde_json::json;

fn parse_date(req: &Request, key: &str) -> Result<NaiveDate, serde_json::Value> {
    let raw = required_str(req, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| err(&req.id, "bad_params", format!("{} must be YYYY-MM-DD", key), None))
}

fn handle_terms_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "terms": state.calendar.terms }))
}

fn handle_terms_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let key = match required_str(req, "key") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let start = match parse_date(req, "startDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let end = match parse_date(req, "endDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match parse_opt_string(req.params.get("name")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("name {}", m), None),
    };

    let mut calendar = state.calendar.clone();
    let term = match calendar.update_dates(&key, start, end, name) {
        Ok(t) => t.clone(),
        Err(e @ CalendarError::UnknownTerm(_)) => {
            return err(&req.id, "not_found", e.to_string(), None)
        }
        Err(e @ CalendarError::InvertedRange { .. }) => {
            return err(&req.id, "bad_params", e.to_string(), None)
        }
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let saved = serde_json::to_value(&calendar)
        .map_err(anyhow::Error::from)
        .and_then(|v| db::settings_set_json(conn, CALENDAR_KEY, &v));
    if let Err(e) = saved {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    state.calendar = calendar;
    ok(&req.id, json!({ "term": term }))
}

fn handle_terms_locate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match parse_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let located = state
        .calendar
        .locate(date)
        .map(|(term, week)| {
            json!({
                "termId": term.key,
                "week": week,
                "weekStart": state.calendar.week_start(&term.key, week)
            })
        });
    ok(&req.id, json!({ "location": located }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "terms.list" => Some(handle_terms_list(state, req)),
        "terms.update" => Some(handle_terms_update(state, req)),
        "terms.locate" => Some(handle_terms_locate(state, req)),
        _ => None,
    }
}
