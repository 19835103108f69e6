use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{persist, require_workspace, required_str, required_week};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use serde_json::json;

fn handle_weeks_approve(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let week = match required_week(req, "week") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let approved_by = match required_str(req, "approvedBy") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let record = state
        .store
        .approve_week(&term_id, week, &approved_by, Utc::now());
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "approval": record }))
}

fn handle_weeks_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let week = match required_week(req, "week") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "status": state.store.week_approval_status(&term_id, week).as_str(),
            "approval": state.store.week_approval(&term_id, week)
        }),
    )
}

fn handle_weeks_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(term) = state.calendar.get(&term_id) else {
        return err(&req.id, "not_found", "term not found", None);
    };
    let weeks = state.store.week_overview(&term_id, term.weeks);
    ok(&req.id, json!({ "termId": term_id, "weeks": weeks }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "weeks.approve" => Some(handle_weeks_approve(state, req)),
        "weeks.status" => Some(handle_weeks_status(state, req)),
        "weeks.overview" => Some(handle_weeks_overview(state, req)),
        _ => None,
    }
}
