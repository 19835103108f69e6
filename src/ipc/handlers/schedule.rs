use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    lesson_json, parse_bool, parse_now, parse_opt_week, parse_scope, persist, require_workspace,
    required_str,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Upper bound on regenerated weeks for a term the calendar does not know.
const MAX_TERM_WEEKS: u32 = 52;

fn handle_duplicate_across_weeks(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match parse_bool(req.params.get("confirm"), false) {
        Ok(true) => {}
        Ok(false) => {
            return err(
                &req.id,
                "bad_params",
                "confirm must be true: weeks after week 1 are deleted and rebuilt",
                None,
            )
        }
        Err(m) => return err(&req.id, "bad_params", format!("confirm {}", m), None),
    }
    let term_weeks = state.calendar.get(&term_id).map(|t| t.weeks);
    let total_weeks = match (parse_opt_week(req.params.get("totalWeeks")), term_weeks) {
        (Ok(Some(v)), limit) => {
            let limit = limit.unwrap_or(MAX_TERM_WEEKS);
            if v > limit {
                return err(
                    &req.id,
                    "bad_params",
                    format!("totalWeeks must be at most {}", limit),
                    Some(json!({ "termId": term_id, "maxWeeks": limit })),
                );
            }
            v
        }
        (Ok(None), Some(weeks)) => weeks,
        (Ok(None), None) => return err(&req.id, "not_found", "term not found", None),
        (Err(m), _) => return err(&req.id, "bad_params", format!("totalWeeks {}", m), None),
    };
    let summary = state
        .store
        .duplicate_lessons_across_weeks(&term_id, total_weeks);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(
        &req.id,
        json!({
            "termId": term_id,
            "totalWeeks": total_weeks,
            "removed": summary.removed,
            "created": summary.created
        }),
    )
}

fn handle_next_lesson(state: &mut AppState, req: &Request) -> serde_json::Value {
    let now = match parse_now(req.params.get("now")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("now {}", m), None),
    };
    let scope = match parse_scope(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let next = state
        .store
        .next_lesson(now, scope.as_ref().map(|(t, w)| (t.as_str(), *w)));
    ok(&req.id, json!({ "lesson": next.map(lesson_json) }))
}

fn handle_remaining_today(state: &mut AppState, req: &Request) -> serde_json::Value {
    let now = match parse_now(req.params.get("now")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("now {}", m), None),
    };
    let scope = match parse_scope(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let remaining = state
        .store
        .remaining_lessons_today(now, scope.as_ref().map(|(t, w)| (t.as_str(), *w)));
    ok(&req.id, json!({ "remaining": remaining }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.duplicateAcrossWeeks" => Some(handle_duplicate_across_weeks(state, req)),
        "schedule.nextLesson" => Some(handle_next_lesson(state, req)),
        "schedule.remainingToday" => Some(handle_remaining_today(state, req)),
        _ => None,
    }
}
