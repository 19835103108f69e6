use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    lesson_json, lessons_json, parse_activities, parse_bool, parse_duration, parse_objectives,
    parse_opt_string, parse_opt_week, parse_slot_time, parse_weekday, persist, require_workspace,
    required_str, required_week,
};
use crate::ipc::types::{AppState, Request};
use crate::timetable::model::{Lesson, LessonDraft, LessonStatus, Weekday};
use crate::timetable::StoreConfig;
use serde_json::{json, Map, Value};

fn required_field(input: &Map<String, Value>, key: &str) -> Result<String, String> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("input.{} is required", key))
}

fn parse_status(v: Option<&Value>) -> Result<LessonStatus, String> {
    match v {
        None => Ok(LessonStatus::default()),
        Some(v) if v.is_null() => Ok(LessonStatus::default()),
        Some(v) => v
            .as_str()
            .and_then(LessonStatus::parse)
            .ok_or_else(|| "status must be one of: planned, taught".to_string()),
    }
}

fn parse_draft(input: &Map<String, Value>, config: &StoreConfig) -> Result<LessonDraft, String> {
    let day = parse_weekday(input.get("day")).map_err(|m| format!("input.day {}", m))?;
    let start_time = parse_slot_time(input.get("startTime"), config.slot_alignment_minutes)
        .map_err(|m| format!("input.startTime {}", m))?;
    let duration_minutes = parse_duration(input.get("duration"), config.default_duration_minutes)
        .map_err(|m| format!("input.duration {}", m))?;
    let week = match parse_opt_week(input.get("week")) {
        Ok(Some(w)) => w,
        Ok(None) => return Err("input.week is required".into()),
        Err(m) => return Err(format!("input.week {}", m)),
    };
    let activities = match input.get("activities") {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => Some(parse_activities(Some(v), config.default_duration_minutes)?),
    };
    Ok(LessonDraft {
        day,
        start_time,
        duration_minutes,
        week,
        term_id: required_field(input, "termId")?,
        subject: required_field(input, "subject")?,
        year_group: required_field(input, "yearGroup")?,
        class: required_field(input, "class")?,
        status: parse_status(input.get("status"))?,
        theme: parse_opt_string(input.get("theme")).map_err(|m| format!("input.theme {}", m))?,
        notes: parse_opt_string(input.get("notes")).map_err(|m| format!("input.notes {}", m))?,
        objectives: parse_objectives(input.get("objectives"))
            .map_err(|m| format!("input.objectives {}", m))?,
        activities,
    })
}

fn apply_patch(
    lesson: &mut Lesson,
    patch: &Map<String, Value>,
    config: &StoreConfig,
) -> Result<(), String> {
    for (k, v) in patch {
        match k.as_str() {
            "day" => {
                lesson.day = parse_weekday(Some(v)).map_err(|m| format!("patch.day {}", m))?;
            }
            "startTime" => {
                lesson.start_time = parse_slot_time(Some(v), config.slot_alignment_minutes)
                    .map_err(|m| format!("patch.startTime {}", m))?;
            }
            "duration" => {
                lesson.duration_minutes = parse_duration(Some(v), config.default_duration_minutes)
                    .map_err(|m| format!("patch.duration {}", m))?;
            }
            "week" => match parse_opt_week(Some(v)) {
                Ok(Some(w)) => lesson.week = w,
                Ok(None) => return Err("patch.week must not be null".into()),
                Err(m) => return Err(format!("patch.week {}", m)),
            },
            "termId" | "subject" | "yearGroup" | "class" => {
                let s = v
                    .as_str()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| format!("patch.{} must be a non-empty string", k))?;
                match k.as_str() {
                    "termId" => lesson.term_id = s,
                    "subject" => lesson.subject = s,
                    "yearGroup" => lesson.year_group = s,
                    _ => lesson.class = s,
                }
            }
            "status" => {
                lesson.status = parse_status(Some(v)).map_err(|m| format!("patch.{}", m))?;
            }
            "theme" => {
                lesson.theme =
                    parse_opt_string(Some(v)).map_err(|m| format!("patch.theme {}", m))?;
            }
            "notes" => {
                lesson.notes =
                    parse_opt_string(Some(v)).map_err(|m| format!("patch.notes {}", m))?;
            }
            "objectives" => {
                lesson.objectives =
                    parse_objectives(Some(v)).map_err(|m| format!("patch.objectives {}", m))?;
            }
            "activities" => {
                lesson.activities = if v.is_null() {
                    None
                } else {
                    Some(parse_activities(Some(v), config.default_duration_minutes)?)
                };
            }
            _ => return Err(format!("unknown patch field: {}", k)),
        }
    }
    Ok(())
}

fn conflict_error(req: &Request, day: Weekday, week: u32, term_id: &str) -> Value {
    err(
        &req.id,
        "slot_conflict",
        "time slot overlaps another lesson",
        Some(json!({ "day": day.as_str(), "week": week, "termId": term_id })),
    )
}

fn handle_lessons_add(state: &mut AppState, req: &Request) -> Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let Some(input) = req.params.get("input").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing input", None);
    };
    let check_conflicts = match parse_bool(req.params.get("checkConflicts"), false) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("checkConflicts {}", m), None),
    };
    let draft = match parse_draft(input, state.store.config()) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };
    if check_conflicts
        && !state.store.is_time_slot_available(
            draft.day,
            draft.start_time,
            draft.duration_minutes,
            draft.week,
            &draft.term_id,
            None,
        )
    {
        return conflict_error(req, draft.day, draft.week, &draft.term_id);
    }

    let lesson_id = state.store.add_lesson(draft);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "lessonId": lesson_id }))
}

fn handle_lessons_update(state: &mut AppState, req: &Request) -> Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };
    let check_conflicts = match parse_bool(req.params.get("checkConflicts"), false) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("checkConflicts {}", m), None),
    };
    let Some(mut lesson) = state.store.lesson(&lesson_id).cloned() else {
        return ok(&req.id, json!({ "changed": false }));
    };
    if let Err(m) = apply_patch(&mut lesson, patch, state.store.config()) {
        return err(&req.id, "bad_params", m, None);
    }
    if check_conflicts
        && !state.store.is_time_slot_available(
            lesson.day,
            lesson.start_time,
            lesson.duration_minutes,
            lesson.week,
            &lesson.term_id,
            Some(lesson.id.as_str()),
        )
    {
        return conflict_error(req, lesson.day, lesson.week, &lesson.term_id);
    }

    let changed = state.store.update_lesson(lesson);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "changed": changed }))
}

fn handle_lessons_delete(state: &mut AppState, req: &Request) -> Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let changed = state.store.delete_lesson(&lesson_id);
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "changed": changed }))
}

fn handle_lessons_delete_selected(state: &mut AppState, req: &Request) -> Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let deleted = state.store.delete_selected_lessons();
    if let Err(e) = persist(state, req) {
        return e;
    }
    ok(&req.id, json!({ "deleted": deleted }))
}

fn handle_lessons_by_term(state: &mut AppState, req: &Request) -> Value {
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let lessons = state.store.lessons_by_term(&term_id);
    ok(&req.id, json!({ "lessons": lessons_json(lessons) }))
}

fn handle_lessons_by_subject_and_week(state: &mut AppState, req: &Request) -> Value {
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let week = match required_week(req, "week") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let lessons = state.store.lessons_by_subject_and_week(&subject, week, &term_id);
    ok(&req.id, json!({ "lessons": lessons_json(lessons) }))
}

fn handle_lessons_open(state: &mut AppState, req: &Request) -> Value {
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(lesson) = state.store.lesson(&lesson_id) else {
        return err(&req.id, "not_found", "lesson not found", None);
    };
    ok(
        &req.id,
        json!({
            "lesson": lesson_json(lesson),
            "readyForApproval": lesson.is_ready_for_approval(),
            "selected": state.store.selected_ids().iter().any(|s| s == &lesson_id)
        }),
    )
}

fn handle_lessons_update_activities(state: &mut AppState, req: &Request) -> Value {
    if let Err(e) = require_workspace(state, req) {
        return e;
    }
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let default_minutes = state.store.config().default_duration_minutes;
    let activities = match parse_activities(req.params.get("activities"), default_minutes) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };
    let theme = match parse_opt_string(req.params.get("theme")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("theme {}", m), None),
    };
    let changed = state
        .store
        .update_lesson_activities(&lesson_id, activities, theme);
    if let Err(e) = persist(state, req) {
        return e;
    }
    let fully_planned = state
        .store
        .lesson(&lesson_id)
        .is_some_and(|l| l.is_fully_planned());
    ok(
        &req.id,
        json!({ "changed": changed, "fullyPlanned": fully_planned }),
    )
}

fn handle_lessons_check_slot(state: &mut AppState, req: &Request) -> Value {
    let config = state.store.config();
    let day = match parse_weekday(req.params.get("day")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("day {}", m), None),
    };
    // Any HH:MM is accepted here; alignment is enforced on write.
    let start = match parse_slot_time(req.params.get("startTime"), 1) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("startTime {}", m), None),
    };
    let duration = match parse_duration(req.params.get("duration"), config.default_duration_minutes)
    {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("duration {}", m), None),
    };
    let week = match required_week(req, "week") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let exclude = match parse_opt_string(req.params.get("excludeLessonId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("excludeLessonId {}", m), None),
    };
    let available = state.store.is_time_slot_available(
        day,
        start,
        duration,
        week,
        &term_id,
        exclude.as_deref(),
    );
    ok(
        &req.id,
        json!({ "available": available, "durationMinutes": duration }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "lessons.add" => Some(handle_lessons_add(state, req)),
        "lessons.update" => Some(handle_lessons_update(state, req)),
        "lessons.delete" => Some(handle_lessons_delete(state, req)),
        "lessons.deleteSelected" => Some(handle_lessons_delete_selected(state, req)),
        "lessons.byTerm" => Some(handle_lessons_by_term(state, req)),
        "lessons.bySubjectAndWeek" => Some(handle_lessons_by_subject_and_week(state, req)),
        "lessons.open" => Some(handle_lessons_open(state, req)),
        "lessons.updateActivities" => Some(handle_lessons_update_activities(state, req)),
        "lessons.checkSlot" => Some(handle_lessons_check_slot(state, req)),
        _ => None,
    }
}
