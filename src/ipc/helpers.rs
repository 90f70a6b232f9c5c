use rusqlite::Connection;

use super::error::err;
use super::types::{AppState, Request};
use crate::store::SvcError;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Absent or non-string values come back as the empty string so the service
/// layer can apply its own trim-then-validate rule.
pub fn str_or_empty(req: &Request, key: &str) -> String {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn svc_err(req: &Request, e: SvcError) -> serde_json::Value {
    err(&req.id, &e.code, e.message, e.details)
}
