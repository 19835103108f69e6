mod test_support;

use serde_json::json;
use test_support::{error_code, lesson_input, request, request_ok, spawn_sidecar, str_field, temp_dir};

#[test]
fn setup_defaults_patch_and_effect_on_lessons() {
    let workspace = temp_dir("timetabled-setup");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let defaults = request_ok(&mut stdin, &mut reader, "2", "setup.get", json!({}));
    assert_eq!(defaults["timetable"]["defaultDurationMinutes"].as_i64(), Some(60));
    assert_eq!(defaults["timetable"]["slotAlignmentMinutes"].as_i64(), Some(30));
    assert_eq!(defaults["timetable"]["dayCutoff"].as_str(), Some("15:00"));
    assert_eq!(defaults["timetable"]["remainingLessonsCap"].as_i64(), Some(6));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({
            "section": "timetable",
            "patch": { "slotAlignmentMinutes": 15, "defaultDurationMinutes": 45 }
        }),
    );
    let mut input = lesson_input("Monday", "09:15", "", 1, "Autumn 1");
    input.as_object_mut().expect("object").remove("duration");
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lessons.add",
        json!({ "input": input }),
    );
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "lessons.open",
        json!({ "lessonId": str_field(&added, "lessonId") }),
    );
    assert_eq!(opened["lesson"]["durationMinutes"].as_u64(), Some(45));

    let out_of_range = request(
        &mut stdin,
        &mut reader,
        "6",
        "setup.update",
        json!({ "section": "timetable", "patch": { "remainingLessonsCap": 0 } }),
    );
    assert_eq!(error_code(&out_of_range), Some("bad_params"));
    let bad_time = request(
        &mut stdin,
        &mut reader,
        "7",
        "setup.update",
        json!({ "section": "timetable", "patch": { "dayCutoff": "3pm" } }),
    );
    assert_eq!(error_code(&bad_time), Some("bad_params"));
    let unknown_field = request(
        &mut stdin,
        &mut reader,
        "8",
        "setup.update",
        json!({ "section": "timetable", "patch": { "theme": "dark" } }),
    );
    assert_eq!(error_code(&unknown_field), Some("bad_params"));
    let unknown_section = request(
        &mut stdin,
        &mut reader,
        "9",
        "setup.update",
        json!({ "section": "printer", "patch": {} }),
    );
    assert_eq!(error_code(&unknown_section), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();

    // Settings come back with the workspace.
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let saved = request_ok(&mut stdin, &mut reader, "2", "setup.get", json!({}));
    assert_eq!(saved["timetable"]["slotAlignmentMinutes"].as_i64(), Some(15));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "lessons.add",
        json!({ "input": lesson_input("Monday", "10:45", "30", 1, "Autumn 1") }),
    );
}

#[test]
fn cutoff_and_cap_drive_remaining_count() {
    let workspace = temp_dir("timetabled-setup-cap");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    for (i, start) in ["09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00"]
        .iter()
        .enumerate()
    {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{}", i),
            "lessons.add",
            json!({ "input": lesson_input("Monday", start, "60", 1, "Autumn 1") }),
        );
    }
    let capped = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "schedule.remainingToday",
        json!({ "now": "2026-10-19T08:00" }),
    );
    assert_eq!(capped["remaining"].as_u64(), Some(6));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({
            "section": "timetable",
            "patch": { "remainingLessonsCap": 20, "dayCutoff": "17:00" }
        }),
    );
    let widened = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "schedule.remainingToday",
        json!({ "now": "2026-10-19T15:30" }),
    );
    assert_eq!(widened["remaining"].as_u64(), Some(1));
    let uncapped = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "schedule.remainingToday",
        json!({ "now": "2026-10-19T08:00" }),
    );
    assert_eq!(uncapped["remaining"].as_u64(), Some(8));
}
