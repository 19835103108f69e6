use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    parse_objective, parse_objectives, parse_opt_string, persist, require_workspace, required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::timetable::model::LessonCriteria;
use serde_json::json;

fn handle_objectives_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if req.params.get("objectives").is_none() {
        return err(&req.id, "bad_params", "missing objectives", None);
    }
    let objectives = match parse_objectives(req.params.get("objectives")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("objectives {}", m), None),
    };
    let changed = state.store.update_lesson_objectives(&lesson_id, objectives);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "changed": changed }))
}

fn handle_objectives_add_to_selected(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    // Either a full objective or a catalog id.
    let objective = if let Some(raw) = req.params.get("objective") {
        match parse_objective(raw) {
            Ok(v) => v,
            Err(m) => return err(&req.id, "bad_params", m, None),
        }
    } else {
        let objective_id = match required_str(req, "objectiveId") {
            Ok(v) => v,
            Err(e) => return e,
        };
        match state.objectives.find(&objective_id) {
            Some(o) => o.clone(),
            None => return err(&req.id, "not_found", "objective not found in curriculum", None),
        }
    };
    let selected = state.store.selected_ids().len();
    let added = state.store.add_objective_to_lessons(objective);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "added": added, "selected": selected }))
}

fn handle_objectives_remove_from_selected(
    state: &mut AppState,
    req: &Request,
) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let objective_id = match required_str(req, "objectiveId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let changed = state.store.remove_objective_from_lessons(&objective_id);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "changed": changed }))
}

fn handle_objectives_undo(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let restored = state.store.undo_auto_objectives();
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(
        &req.id,
        json!({
            "restored": restored,
            "remainingHistory": state.store.objectives_history().len()
        }),
    )
}

fn handle_objectives_reset_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let mut criteria = LessonCriteria::default();
    for (key, slot) in [
        ("subject", &mut criteria.subject),
        ("yearGroup", &mut criteria.year_group),
        ("class", &mut criteria.class),
        ("termId", &mut criteria.term_id),
    ] {
        match parse_opt_string(req.params.get(key)) {
            Ok(v) => *slot = v,
            Err(m) => return err(&req.id, "bad_params", format!("{} {}", key, m), None),
        }
    }
    let cleared = state.store.reset_all_objectives(&criteria);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "cleared": cleared }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "objectives.update" => Some(handle_objectives_update(state, req)),
        "objectives.addToSelected" => Some(handle_objectives_add_to_selected(state, req)),
        "objectives.removeFromSelected" => {
            Some(handle_objectives_remove_from_selected(state, req))
        }
        "objectives.undo" => Some(handle_objectives_undo(state, req)),
        "objectives.resetAll" => Some(handle_objectives_reset_all(state, req)),
        _ => None,
    }
}
