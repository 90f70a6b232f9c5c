use std::cmp::Ordering;

use chrono::Utc;
use rusqlite::Connection;

use crate::store::{self, AssignmentEntry, SvcError};

/// Collation used to order respondent names in listings and reports.
/// Pluggable so a locale-specific comparison can be swapped in.
pub type Collator = fn(&str, &str) -> Ordering;

/// Case-insensitive comparison over lowercase-mapped code points.
pub fn default_collator(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

pub fn submit(
    conn: &Connection,
    id: &str,
    name: &str,
    response: &str,
) -> Result<(), SvcError> {
    let name = name.trim();
    let response = response.trim();
    if name.is_empty() || response.is_empty() {
        return Err(SvcError::new(
            "invalid_input",
            "name and response are required",
        ));
    }

    // Friendly pre-check; the NOCASE unique index is the real guarantee.
    if store::entry_exists_ci(conn, id, name)? {
        return Err(SvcError::new(
            "already_submitted",
            "response already submitted for this name",
        ));
    }

    store::insert_entry(
        conn,
        &AssignmentEntry {
            id: id.to_string(),
            name: name.to_string(),
            response: response.to_string(),
            submitted_at: Utc::now().timestamp_millis(),
        },
    )
}

pub fn list_submissions(conn: &Connection, id: &str) -> Result<Vec<AssignmentEntry>, SvcError> {
    list_submissions_with(conn, id, default_collator)
}

pub fn list_submissions_with(
    conn: &Connection,
    id: &str,
    collate: Collator,
) -> Result<Vec<AssignmentEntry>, SvcError> {
    let mut entries = store::entries_for_assignment(conn, id)?;
    entries.sort_by(|a, b| collate(&a.name, &b.name));
    Ok(entries)
}
