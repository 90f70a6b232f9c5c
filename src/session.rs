use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::store::{self, SessionRow, SvcError};

pub const RESPONSE_SLOTS: usize = 30;
const EXPIRY_MS: i64 = 30 * 24 * 60 * 60 * 1000;

pub fn create_session(conn: &Connection) -> Result<String, SvcError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().timestamp_millis();
    let row = SessionRow {
        id: id.clone(),
        created_at: now,
        expires_at: now + EXPIRY_MS,
        status: "draft".to_string(),
        responses: vec![String::new(); RESPONSE_SLOTS],
    };
    store::insert_session(conn, &row)?;
    Ok(id)
}

pub fn get_session(conn: &Connection, id: &str) -> Result<SessionRow, SvcError> {
    store::get_session(conn, id)?
        .ok_or_else(|| SvcError::new("not_found", "session not found"))
}

/// Replaces the whole 30-slot array. A save against an unknown id is a
/// silent no-op, matching the permissive contract the frontend relies on.
pub fn save_responses(conn: &Connection, id: &str, responses: &[String]) -> Result<(), SvcError> {
    if responses.len() != RESPONSE_SLOTS {
        return Err(SvcError::new(
            "invalid_input",
            format!("responses must hold exactly {RESPONSE_SLOTS} slots"),
        )
        .with_details(serde_json::json!({ "got": responses.len() })));
    }
    store::update_session_responses(conn, id, responses)?;
    Ok(())
}
