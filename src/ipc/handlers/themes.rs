use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_string, persist, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::timetable::model::LessonCriteria;
use crate::timetable::theme_for_week;
use serde_json::json;

fn handle_themes_undo(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let restored = state.store.undo_theme_changes();
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(
        &req.id,
        json!({
            "restored": restored,
            "remainingHistory": state.store.theme_history().len()
        }),
    )
}

fn handle_themes_undo_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let restored = state.store.undo_all_theme_changes();
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "restored": restored }))
}

fn handle_themes_assign(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let year_group = match required_str(req, "yearGroup") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let class = match parse_opt_string(req.params.get("class")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("class {}", m), None),
    };
    let Some(total_weeks) = state.calendar.get(&term_id).map(|t| t.weeks) else {
        return err(&req.id, "not_found", "term not found", None);
    };
    let themes = state.themes.themes_for(&subject, &year_group).to_vec();
    let criteria = LessonCriteria {
        subject: Some(subject),
        year_group: Some(year_group),
        class,
        term_id: None,
    };
    let changed = state
        .store
        .assign_themes(&term_id, total_weeks, &criteria, &themes);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(
        &req.id,
        json!({ "changed": changed, "themeCount": themes.len(), "totalWeeks": total_weeks }),
    )
}

fn handle_themes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let year_group = match required_str(req, "yearGroup") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let term_id = match parse_opt_string(req.params.get("termId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("termId {}", m), None),
    };
    let themes = state.themes.themes_for(&subject, &year_group);
    let by_week = match term_id {
        None => serde_json::Value::Null,
        Some(term_id) => {
            let Some(term) = state.calendar.get(&term_id) else {
                return err(&req.id, "not_found", "term not found", None);
            };
            (1..=term.weeks)
                .map(|week| json!({ "week": week, "theme": theme_for_week(themes, week, term.weeks) }))
                .collect()
        }
    };
    ok(&req.id, json!({ "themes": themes, "byWeek": by_week }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "themes.undo" => Some(handle_themes_undo(state, req)),
        "themes.undoAll" => Some(handle_themes_undo_all(state, req)),
        "themes.assign" => Some(handle_themes_assign(state, req)),
        "themes.list" => Some(handle_themes_list(state, req)),
        _ => None,
    }
}
