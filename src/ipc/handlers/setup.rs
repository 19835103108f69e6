use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::timetable::model::SlotTime;
use crate::timetable::StoreConfig;
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
enum SetupSection {
    Timetable,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "timetable" => Some(Self::Timetable),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Timetable => "setup.timetable",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Timetable => json!({
            "defaultDurationMinutes": 60,
            "slotAlignmentMinutes": 30,
            "dayCutoff": "15:00",
            "remainingLessonsCap": 6
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_time(v: &Value, key: &str) -> Result<SlotTime, String> {
    v.as_str()
        .and_then(SlotTime::parse)
        .ok_or_else(|| format!("{} must be a time in HH:MM", key))
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Timetable => match k.as_str() {
                "defaultDurationMinutes" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 5, 240)?));
                }
                "slotAlignmentMinutes" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 5, 60)?));
                }
                "dayCutoff" => {
                    obj.insert(k.clone(), Value::String(parse_time(v, k)?.to_string()));
                }
                "remainingLessonsCap" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, 20)?));
                }
                _ => return Err(format!("unknown timetable field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &rusqlite::Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort: a bad stored field falls back to its default.
            for (k, v) in saved_obj {
                let mut one = Map::new();
                one.insert(k.clone(), v.clone());
                let _ = merge_section_patch(section, &mut current, &one);
            }
        }
    }
    Ok(current)
}

fn store_config_from(section: &Value) -> StoreConfig {
    let defaults = StoreConfig::default();
    let int = |key: &str| section.get(key).and_then(|v| v.as_u64());
    StoreConfig {
        default_duration_minutes: int("defaultDurationMinutes")
            .map(|n| n as u32)
            .unwrap_or(defaults.default_duration_minutes),
        slot_alignment_minutes: int("slotAlignmentMinutes")
            .map(|n| n as u32)
            .unwrap_or(defaults.slot_alignment_minutes),
        day_cutoff: section
            .get("dayCutoff")
            .and_then(|v| v.as_str())
            .and_then(SlotTime::parse)
            .unwrap_or(defaults.day_cutoff),
        remaining_lessons_cap: int("remainingLessonsCap")
            .map(|n| n as usize)
            .unwrap_or(defaults.remaining_lessons_cap),
    }
}

/// Effective store configuration for a workspace.
pub fn load_store_config(conn: &rusqlite::Connection) -> anyhow::Result<StoreConfig> {
    let section = load_section(conn, SetupSection::Timetable)?;
    Ok(store_config_from(&section))
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let timetable = match load_section(conn, SetupSection::Timetable) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    ok(&req.id, json!({ "timetable": timetable }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    match section {
        SetupSection::Timetable => state.store.set_config(store_config_from(&current)),
    }
    ok(&req.id, json!({ "ok": true, "section": current }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
