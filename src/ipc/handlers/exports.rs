use serde_json::json;

use crate::assignment;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, required_str, svc_err};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::session;

fn reports_dir(state: &AppState, req: &Request) -> Result<std::path::PathBuf, serde_json::Value> {
    state
        .reports_dir()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn handle_export_session(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let dir = match reports_dir(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let session_id = match required_str(req, "sessionId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let row = match session::get_session(conn, &session_id) {
        Ok(v) => v,
        // The export path answers with plain text, not a structured error.
        Err(e) if e.code == "not_found" => return ok(&req.id, json!({ "text": "Not found" })),
        Err(e) => return svc_err(req, e),
    };

    let out = report::session_report_path(&dir, &session_id);
    match report::render_session_report(&row.responses, &out) {
        Ok(()) => ok(
            &req.id,
            json!({
                "file": out.to_string_lossy(),
                "downloadName": "session.pdf"
            }),
        ),
        Err(e) => svc_err(req, e),
    }
}

fn handle_export_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let dir = match reports_dir(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let entries = match assignment::list_submissions(conn, &assignment_id) {
        Ok(v) => v,
        Err(e) => return svc_err(req, e),
    };
    // Zero submissions: no artifact at all, just the textual signal.
    if entries.is_empty() {
        return ok(&req.id, json!({ "text": "No responses yet" }));
    }

    let out = report::class_report_path(&dir, &assignment_id);
    match report::render_class_report(&entries, &out) {
        Ok(()) => ok(
            &req.id,
            json!({
                "file": out.to_string_lossy(),
                "downloadName": format!("class-{assignment_id}.pdf")
            }),
        ),
        Err(e) => svc_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.exportSession" => Some(handle_export_session(state, req)),
        "reports.exportClass" => Some(handle_export_class(state, req)),
        _ => None,
    }
}
