use serde_json::json;

use crate::assignment;
use crate::ipc::error::ok;
use crate::ipc::helpers::{db_conn, required_str, str_or_empty, svc_err};
use crate::ipc::types::{AppState, Request};

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Absent fields fall through to the service's trim-then-validate rule,
    // so "missing" and "blank" report the same invalid_input outcome.
    let name = str_or_empty(req, "name");
    let response = str_or_empty(req, "response");

    match assignment::submit(conn, &assignment_id, &name, &response) {
        Ok(()) => ok(&req.id, json!({ "submitted": true })),
        Err(e) => svc_err(req, e),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assignment::list_submissions(conn, &assignment_id) {
        Ok(entries) => ok(&req.id, json!({ "entries": entries })),
        Err(e) => svc_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.submit" => Some(handle_submit(state, req)),
        "assignments.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
