use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{persist, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::timetable::snapshot::{
    decode_snapshot, encode_snapshot, SnapshotError, SnapshotLoad, SNAPSHOT_VERSION,
};
use crate::timetable::TimetableStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    if let Err(e) = require_workspace(state, req) {
        return e;
    }

    let payload = match encode_snapshot(&state.store.to_snapshot()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "io_failed", e.to_string(), None),
    };
    let out = PathBuf::from(&out_path);
    let export = match backup::export_snapshot_bundle(SNAPSHOT_VERSION, &payload, &out) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            )
        }
    };

    ok(
        &req.id,
        json!({
            "ok": true,
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "sha256": export.sha256,
            "lessonCount": state.store.lessons().len()
        }),
    )
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    if let Err(e) = require_workspace(state, req) {
        return e;
    }

    let bundle = match backup::import_snapshot_bundle(&PathBuf::from(&in_path)) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": in_path })),
            )
        }
    };
    let config = state.store.config().clone();
    let store = match decode_snapshot(bundle.snapshot_version, &bundle.payload) {
        Ok(SnapshotLoad::Loaded(snapshot)) => TimetableStore::from_snapshot(snapshot, config),
        Ok(SnapshotLoad::Discarded { from_version }) => {
            return err(
                &req.id,
                "snapshot_unsupported",
                format!("bundle holds snapshot version {} with no upgrade path", from_version),
                None,
            )
        }
        Err(e @ SnapshotError::UnsupportedVersion(_)) => {
            return err(&req.id, "snapshot_unsupported", e.to_string(), None)
        }
        Err(e @ SnapshotError::Corrupt(_)) => {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": in_path })),
            )
        }
    };

    let replaced = state.store.lessons().len();
    state.store = store;
    if let Err(e) = persist(state, req) {
        return e;
    }
    tracing::info!(
        path = %in_path,
        replaced,
        imported = state.store.lessons().len(),
        "store replaced from backup bundle"
    );
    ok(
        &req.id,
        json!({
            "ok": true,
            "path": in_path,
            "lessonCount": state.store.lessons().len()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
