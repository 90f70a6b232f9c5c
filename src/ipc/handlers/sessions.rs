use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, required_str, svc_err};
use crate::ipc::types::{AppState, Request};
use crate::session;

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match session::create_session(conn) {
        Ok(id) => ok(&req.id, json!({ "id": id })),
        Err(e) => svc_err(req, e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let session_id = match required_str(req, "sessionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match session::get_session(conn, &session_id) {
        Ok(row) => ok(&req.id, json!(row)),
        Err(e) => svc_err(req, e),
    }
}

fn handle_save_responses(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let session_id = match required_str(req, "sessionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let responses: Vec<String> = match req
        .params
        .get("responses")
        .cloned()
        .map(serde_json::from_value)
    {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            return err(
                &req.id,
                "bad_params",
                format!("responses must be an array of strings: {e}"),
                None,
            )
        }
        None => return err(&req.id, "bad_params", "missing responses", None),
    };

    match session::save_responses(conn, &session_id, &responses) {
        Ok(()) => ok(&req.id, json!({ "saved": true })),
        Err(e) => svc_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sessions.create" => Some(handle_create(state, req)),
        "sessions.get" => Some(handle_get(state, req)),
        "sessions.saveResponses" => Some(handle_save_responses(state, req)),
        _ => None,
    }
}
