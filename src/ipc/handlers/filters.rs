use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_string, parse_opt_week, persist, require_workspace};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_filters_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "filters": state.store.filters() }))
}

/// Patch semantics: absent keys keep their value, `null` clears.
fn handle_filters_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    let mut filters = state.store.filters().clone();
    for (k, v) in patch {
        let slot = match k.as_str() {
            "subject" => &mut filters.subject,
            "yearGroup" => &mut filters.year_group,
            "class" => &mut filters.class,
            "termId" => &mut filters.term_id,
            "week" => {
                match parse_opt_week(Some(v)) {
                    Ok(w) => filters.week = w,
                    Err(m) => return err(&req.id, "bad_params", format!("patch.week {}", m), None),
                }
                continue;
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        };
        match parse_opt_string(Some(v)) {
            Ok(s) => *slot = s,
            Err(m) => return err(&req.id, "bad_params", format!("patch.{} {}", k, m), None),
        }
    }
    state.store.set_filters(filters);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "filters": state.store.filters() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "filters.get" => Some(handle_filters_get(state, req)),
        "filters.set" => Some(handle_filters_set(state, req)),
        _ => None,
    }
}
