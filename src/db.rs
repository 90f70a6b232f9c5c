use rusqlite::Connection;
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("respond.sqlite3");
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions(
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            status TEXT NOT NULL,
            responses TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            response TEXT NOT NULL,
            submitted_at INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_id ON assignments(id)",
        [],
    )?;

    // Databases written before the uniqueness index existed may hold duplicate
    // respondents. Keep the earliest submission per (id, lower(name)) so the
    // index can be created.
    dedupe_assignments(conn)?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_assignments_id_name_nocase
         ON assignments(id, name COLLATE NOCASE)",
        [],
    )?;

    Ok(())
}

fn dedupe_assignments(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM assignments
         WHERE rowid NOT IN (
            SELECT MIN(rowid) FROM assignments
            GROUP BY id, LOWER(name)
         )",
        [],
    )?;
    Ok(())
}
