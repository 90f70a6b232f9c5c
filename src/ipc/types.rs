use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}

impl AppState {
    /// Rendered report artifacts live under the selected workspace.
    pub fn reports_dir(&self) -> Option<PathBuf> {
        self.workspace.as_ref().map(|w| w.join("reports"))
    }
}
