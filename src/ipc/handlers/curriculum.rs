use crate::ipc::error::{err, ok};
use crate::ipc::helpers::parse_opt_string;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_curriculum_objectives(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject = match parse_opt_string(req.params.get("subject")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("subject {}", m), None),
    };
    match subject {
        None => ok(&req.id, json!({ "subjects": state.objectives })),
        Some(subject) => match state.objectives.for_subject(&subject) {
            Some(categories) => ok(
                &req.id,
                json!({ "subject": subject, "categories": categories }),
            ),
            None => err(&req.id, "not_found", "no objectives for subject", None),
        },
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "curriculum.objectives" => Some(handle_curriculum_objectives(state, req)),
        _ => None,
    }
}
