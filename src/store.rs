use rusqlite::{Connection, ErrorCode, OptionalExtension};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SvcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SvcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub status: String,
    pub responses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEntry {
    pub id: String,
    pub name: String,
    pub response: String,
    pub submitted_at: i64,
}

pub fn insert_session(conn: &Connection, row: &SessionRow) -> Result<(), SvcError> {
    let responses = serde_json::to_string(&row.responses)
        .map_err(|e| SvcError::new("db_insert_failed", e.to_string()))?;
    conn.execute(
        "INSERT INTO sessions(id, created_at, expires_at, status, responses)
         VALUES(?, ?, ?, ?, ?)",
        (
            &row.id,
            row.created_at,
            row.expires_at,
            &row.status,
            &responses,
        ),
    )
    .map_err(|e| SvcError::new("db_insert_failed", e.to_string()))?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &str) -> Result<Option<SessionRow>, SvcError> {
    let row = conn
        .query_row(
            "SELECT id, created_at, expires_at, status, responses
             FROM sessions WHERE id = ?",
            [id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, i64>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .map_err(|e| SvcError::new("db_query_failed", e.to_string()))?;

    let Some((id, created_at, expires_at, status, responses)) = row else {
        return Ok(None);
    };
    let responses: Vec<String> = serde_json::from_str(&responses)
        .map_err(|e| SvcError::new("db_query_failed", format!("bad responses column: {e}")))?;
    Ok(Some(SessionRow {
        id,
        created_at,
        expires_at,
        status,
        responses,
    }))
}

/// Returns the number of rows touched; zero when the id is unknown.
pub fn update_session_responses(
    conn: &Connection,
    id: &str,
    responses: &[String],
) -> Result<usize, SvcError> {
    let encoded = serde_json::to_string(responses)
        .map_err(|e| SvcError::new("db_update_failed", e.to_string()))?;
    conn.execute(
        "UPDATE sessions SET responses = ? WHERE id = ?",
        (&encoded, id),
    )
    .map_err(|e| SvcError::new("db_update_failed", e.to_string()))
}

pub fn entry_exists_ci(conn: &Connection, id: &str, name: &str) -> Result<bool, SvcError> {
    conn.query_row(
        "SELECT 1 FROM assignments WHERE id = ? AND name = ? COLLATE NOCASE",
        (id, name),
        |r| r.get::<_, i64>(0),
    )
    .optional()
    .map(|v| v.is_some())
    .map_err(|e| SvcError::new("db_query_failed", e.to_string()))
}

/// A uniqueness-index conflict surfaces as `already_submitted` so that a
/// racing insert and a pre-checked duplicate report the same outcome.
pub fn insert_entry(conn: &Connection, entry: &AssignmentEntry) -> Result<(), SvcError> {
    conn.execute(
        "INSERT INTO assignments(id, name, response, submitted_at)
         VALUES(?, ?, ?, ?)",
        (&entry.id, &entry.name, &entry.response, entry.submitted_at),
    )
    .map_err(|e| match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == ErrorCode::ConstraintViolation =>
        {
            SvcError::new("already_submitted", "response already submitted for this name")
        }
        _ => SvcError::new("db_insert_failed", e.to_string()),
    })?;
    Ok(())
}

pub fn entries_for_assignment(
    conn: &Connection,
    id: &str,
) -> Result<Vec<AssignmentEntry>, SvcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, response, submitted_at
             FROM assignments WHERE id = ?",
        )
        .map_err(|e| SvcError::new("db_query_failed", e.to_string()))?;
    stmt.query_map([id], |r| {
        Ok(AssignmentEntry {
            id: r.get(0)?,
            name: r.get(1)?,
            response: r.get(2)?,
            submitted_at: r.get(3)?,
        })
    })
    .and_then(|it| it.collect::<Result<Vec<_>, _>>())
    .map_err(|e| SvcError::new("db_query_failed", e.to_string()))
}
