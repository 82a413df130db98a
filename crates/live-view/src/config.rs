//! Console Configuration
//!
//! JSON settings for the board columns and the activity log. Every field
//! has a default, so an empty object is a valid config.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{LiveResult, LiveViewError, TaskStatus};
use crate::projection::ColumnSpec;
use crate::query::RemoteHandle;

fn default_database() -> String {
    "(default)".to_string()
}

fn default_true() -> bool {
    true
}

fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("column-1", TaskStatus::TODO_TITLE),
        ColumnSpec::new("column-2", TaskStatus::IN_PROGRESS_TITLE),
        ColumnSpec::new("column-3", TaskStatus::DONE_TITLE),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnSpec>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Open the activity log filtered to today
    #[serde(default = "default_true")]
    pub default_to_today: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_to_today: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            board: BoardConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Parse and validate
    pub fn from_json(raw: &str) -> LiveResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| LiveViewError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LiveResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LiveViewError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&raw)?;
        log::info!(
            "[CONFIG] Loaded {} ({} board columns)",
            path.display(),
            config.board.columns.len()
        );
        Ok(config)
    }

    /// Board columns must be non-empty, with unique ids and titles
    pub fn validate(&self) -> LiveResult<()> {
        if self.database.trim().is_empty() {
            return Err(LiveViewError::Config("database is empty".to_string()));
        }
        if self.board.columns.is_empty() {
            return Err(LiveViewError::Config("board needs at least one column".to_string()));
        }
        let mut ids = HashSet::new();
        let mut titles = HashSet::new();
        for column in &self.board.columns {
            if column.id.trim().is_empty() {
                return Err(LiveViewError::Config("column id is empty".to_string()));
            }
            if !ids.insert(column.id.as_str()) {
                return Err(LiveViewError::Config(format!("duplicate column id {:?}", column.id)));
            }
            if !titles.insert(column.title.as_str()) {
                return Err(LiveViewError::Config(format!("duplicate column title {:?}", column.title)));
            }
        }
        Ok(())
    }

    pub fn remote(&self) -> RemoteHandle {
        RemoteHandle::new(self.database.clone())
    }
}
