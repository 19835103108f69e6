mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{error_code, lesson_input, request, request_ok, spawn_sidecar, str_field, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("timetabled-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "0", "health", json!({}));
    assert!(health["workspacePath"].is_null());
    let early = request(
        &mut stdin,
        &mut reader,
        "0b",
        "lessons.add",
        json!({ "input": lesson_input("Monday", "09:00", "60", 1, "Autumn 1") }),
    );
    assert_eq!(error_code(&early), Some("no_workspace"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "lessons.add",
        json!({ "input": lesson_input("Monday", "09:00", "60", 1, "Autumn 1") }),
    );
    let lesson_id = str_field(&added, "lessonId").to_string();

    let calls = vec![
        ("lessons.update", json!({ "lessonId": lesson_id, "patch": { "status": "taught" } })),
        ("lessons.byTerm", json!({ "termId": "Autumn 1" })),
        ("lessons.bySubjectAndWeek", json!({ "subject": "English", "week": 1, "termId": "Autumn 1" })),
        ("lessons.open", json!({ "lessonId": lesson_id })),
        ("lessons.updateActivities", json!({ "lessonId": lesson_id, "activities": {} })),
        ("lessons.checkSlot", json!({ "day": "Monday", "startTime": "11:00", "week": 1, "termId": "Autumn 1" })),
        ("selection.toggle", json!({ "lessonId": lesson_id })),
        ("selection.list", json!({})),
        ("objectives.update", json!({ "lessonId": lesson_id, "objectives": [] })),
        ("objectives.addToSelected", json!({ "objectiveId": "eng-r1" })),
        ("objectives.removeFromSelected", json!({ "objectiveId": "eng-r1" })),
        ("objectives.undo", json!({})),
        ("objectives.resetAll", json!({ "termId": "Autumn 1" })),
        ("themes.assign", json!({ "termId": "Autumn 1", "subject": "English", "yearGroup": "Year 7" })),
        ("themes.list", json!({ "subject": "English", "yearGroup": "Year 7" })),
        ("themes.undo", json!({})),
        ("themes.undoAll", json!({})),
        ("weeks.approve", json!({ "termId": "Autumn 1", "week": 1, "approvedBy": "X" })),
        ("weeks.status", json!({ "termId": "Autumn 1", "week": 1 })),
        ("weeks.overview", json!({ "termId": "Autumn 1" })),
        ("schedule.nextLesson", json!({ "now": "2026-10-19T08:00" })),
        ("schedule.remainingToday", json!({})),
        ("schedule.duplicateAcrossWeeks", json!({ "termId": "Autumn 1", "totalWeeks": 2, "confirm": true })),
        ("terms.list", json!({})),
        ("terms.locate", json!({ "date": "2026-11-10" })),
        ("terms.update", json!({ "key": "Summer 2", "startDate": "2027-06-07", "endDate": "2027-07-16" })),
        ("curriculum.objectives", json!({ "subject": "Science" })),
        ("filters.set", json!({ "patch": { "class": "A" } })),
        ("filters.get", json!({})),
        ("setup.get", json!({})),
        ("setup.update", json!({ "section": "timetable", "patch": { "dayCutoff": "15:30" } })),
        ("backup.export", json!({ "outPath": bundle_out.to_string_lossy() })),
        ("backup.import", json!({ "inPath": bundle_out.to_string_lossy() })),
        ("selection.clear", json!({})),
        ("lessons.deleteSelected", json!({})),
        ("lessons.delete", json!({ "lessonId": lesson_id })),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let _ = request_ok(&mut stdin, &mut reader, &format!("c{}", i), method, params);
    }

    let unknown = request(&mut stdin, &mut reader, "u", "lessons.teleport", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));
    let missing = request(&mut stdin, &mut reader, "m", "weeks.status", json!({ "termId": "Autumn 1" }));
    assert_eq!(error_code(&missing), Some("bad_params"));
}

#[test]
fn unparseable_line_gets_bad_json_and_the_loop_continues() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("response json");
    assert_eq!(value["ok"].as_bool(), Some(false));
    assert_eq!(error_code(&value), Some("bad_json"));

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["version"].is_string());
}
