use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{lessons_json, persist, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::timetable::SelectionError;
use serde_json::json;

fn handle_selection_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let change = match state.store.toggle_lesson_selection(&lesson_id) {
        Ok(v) => v,
        Err(e) => {
            let details = match &e {
                SelectionError::OutsideScope {
                    expected_term_id,
                    expected_week,
                    ..
                } => json!({ "termId": expected_term_id, "week": expected_week }),
            };
            return err(&req.id, "selection_scope", e.to_string(), Some(details));
        }
    };
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(
        &req.id,
        json!({
            "change": change.as_str(),
            "selected": state.store.selected_ids()
        }),
    )
}

fn handle_selection_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    state.store.clear_lesson_selection();
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_selection_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "selected": state.store.selected_ids(),
            "lessons": lessons_json(state.store.selected_lessons())
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "selection.toggle" => Some(handle_selection_toggle(state, req)),
        "selection.clear" => Some(handle_selection_clear(state, req)),
        "selection.list" => Some(handle_selection_list(state, req)),
        _ => None,
    }
}
