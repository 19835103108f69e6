use chrono::{Local, NaiveDateTime};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use crate::db;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::timetable::duration::{parse_duration_minutes, MAX_DURATION_MINUTES};
use crate::timetable::model::{Activities, Activity, Lesson, Objective, SlotTime, Weekday};
use crate::timetable::snapshot::{encode_snapshot, SNAPSHOT_NAME, SNAPSHOT_VERSION};

pub fn require_workspace(state: &AppState, req: &Request) -> Result<(), JsonValue> {
    if state.db.is_some() {
        Ok(())
    } else {
        Err(err(&req.id, "no_workspace", "select a workspace first", None))
    }
}

/// Writes the store snapshot after a mutation.
pub fn persist(state: &AppState, req: &Request) -> Result<(), JsonValue> {
    let Some(conn) = state.db.as_ref() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let payload = encode_snapshot(&state.store.to_snapshot())
        .map_err(|e| err(&req.id, "db_update_failed", e.to_string(), None))?;
    db::snapshot_save(conn, SNAPSHOT_NAME, SNAPSHOT_VERSION, &payload)
        .map_err(|e| err(&req.id, "db_update_failed", e.to_string(), None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_week(req: &Request, key: &str) -> Result<u32, JsonValue> {
    match parse_opt_week(req.params.get(key)) {
        Ok(Some(w)) => Ok(w),
        Ok(None) => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
        Err(m) => Err(err(&req.id, "bad_params", format!("{} {}", key, m), None)),
    }
}

pub fn parse_bool(v: Option<&JsonValue>, default: bool) -> Result<bool, &'static str> {
    match v {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => v.as_bool().ok_or("must be boolean"),
    }
}

pub fn parse_opt_string(v: Option<&JsonValue>) -> Result<Option<String>, &'static str> {
    match v {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let s = v.as_str().ok_or("must be string or null")?.trim().to_string();
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(Some(s))
            }
        }
    }
}

/// Week numbers start at 1.
pub fn parse_opt_week(v: Option<&JsonValue>) -> Result<Option<u32>, &'static str> {
    match v {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) if (1..=u32::MAX as u64).contains(&n) => Ok(Some(n as u32)),
            _ => Err("must be a positive integer"),
        },
    }
}

pub fn parse_weekday(v: Option<&JsonValue>) -> Result<Weekday, &'static str> {
    v.and_then(|v| v.as_str())
        .and_then(Weekday::parse)
        .ok_or("must be one of: Monday, Tuesday, Wednesday, Thursday, Friday")
}

pub fn parse_slot_time(v: Option<&JsonValue>, alignment: u32) -> Result<SlotTime, String> {
    let t = v
        .and_then(|v| v.as_str())
        .and_then(SlotTime::parse)
        .ok_or_else(|| "must be a time in HH:MM".to_string())?;
    if !t.is_aligned_to(alignment) {
        return Err(format!("must be aligned to {} minutes", alignment));
    }
    Ok(t)
}

/// Accepts integer minutes or free text such as "60 mins".
pub fn parse_duration(v: Option<&JsonValue>, default: u32) -> Result<u32, &'static str> {
    match v {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(JsonValue::String(s)) => Ok(parse_duration_minutes(Some(s.as_str()), default)),
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 && n <= u64::from(MAX_DURATION_MINUTES) => Ok(n as u32),
            _ => Err("must be positive minutes or a duration string"),
        },
    }
}

pub fn parse_objective(v: &JsonValue) -> Result<Objective, String> {
    let obj = v
        .as_object()
        .ok_or_else(|| "objective must be an object".to_string())?;
    let id = obj
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "objective.id is required".to_string())?;
    let code = obj
        .get("code")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string();
    let description = obj
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(Objective {
        id,
        code,
        description,
    })
}

pub fn parse_objectives(v: Option<&JsonValue>) -> Result<Vec<Objective>, String> {
    match v {
        None => Ok(Vec::new()),
        Some(v) if v.is_null() => Ok(Vec::new()),
        Some(v) => v
            .as_array()
            .ok_or_else(|| "must be an array of objectives".to_string())?
            .iter()
            .map(parse_objective)
            .collect(),
    }
}

fn parse_activity(
    slot: &str,
    v: Option<&JsonValue>,
    default_minutes: u32,
) -> Result<Option<Activity>, String> {
    let Some(v) = v.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let obj = v
        .as_object()
        .ok_or_else(|| format!("{} must be an object or null", slot))?;
    let title = obj
        .get("title")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("{}.title is required", slot))?;
    let id = parse_opt_string(obj.get("id"))
        .map_err(|m| format!("{}.id {}", slot, m))?
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let duration_minutes = parse_duration(obj.get("duration"), default_minutes)
        .map_err(|m| format!("{}.duration {}", slot, m))?;
    Ok(Some(Activity {
        id,
        title,
        description: obj
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        duration_minutes,
        kind: obj
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string(),
    }))
}

pub fn parse_activities(v: Option<&JsonValue>, default_minutes: u32) -> Result<Activities, String> {
    let empty = Map::new();
    let obj = match v {
        None => &empty,
        Some(v) if v.is_null() => &empty,
        Some(v) => v
            .as_object()
            .ok_or_else(|| "activities must be an object".to_string())?,
    };
    Ok(Activities {
        starter: parse_activity("starter", obj.get("starter"), default_minutes)?,
        main: parse_activity("main", obj.get("main"), default_minutes)?,
        plenary: parse_activity("plenary", obj.get("plenary"), default_minutes)?,
    })
}

/// Local wall clock unless the caller pins `now` (`YYYY-MM-DDTHH:MM[:SS]`).
pub fn parse_now(v: Option<&JsonValue>) -> Result<NaiveDateTime, &'static str> {
    match v {
        None => Ok(Local::now().naive_local()),
        Some(v) if v.is_null() => Ok(Local::now().naive_local()),
        Some(v) => {
            let raw = v.as_str().ok_or("must be a local date-time string")?.trim();
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
                .map_err(|_| "must be YYYY-MM-DDTHH:MM[:SS]")
        }
    }
}

/// Optional `termId` + `week` pair narrowing a query; both or neither.
pub fn parse_scope(req: &Request) -> Result<Option<(String, u32)>, JsonValue> {
    let term_id = parse_opt_string(req.params.get("termId"))
        .map_err(|m| err(&req.id, "bad_params", format!("termId {}", m), None))?;
    let week = parse_opt_week(req.params.get("week"))
        .map_err(|m| err(&req.id, "bad_params", format!("week {}", m), None))?;
    match (term_id, week) {
        (Some(t), Some(w)) => Ok(Some((t, w))),
        (None, None) => Ok(None),
        _ => Err(err(
            &req.id,
            "bad_params",
            "termId and week must be given together",
            None,
        )),
    }
}

pub fn lesson_json(lesson: &Lesson) -> JsonValue {
    let mut v = serde_json::to_value(lesson).unwrap_or_else(|_| json!({ "id": lesson.id }));
    v["fullyPlanned"] = JsonValue::Bool(lesson.is_fully_planned());
    v
}

pub fn lessons_json<'a>(lessons: impl IntoIterator<Item = &'a Lesson>) -> JsonValue {
    JsonValue::Array(lessons.into_iter().map(lesson_json).collect())
}
