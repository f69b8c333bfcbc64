use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp format used in the backing file. Display strings, not parsed back.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single to-do item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl Task {
    /// Creates a new active task. The description must already be trimmed
    /// and non-empty; the store enforces that before calling.
    pub fn new(description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            completed: false,
            created_at: now_string(),
            completed_at: None,
        }
    }
}

/// Current local time formatted for the backing file.
pub fn now_string() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Which tasks a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Parses a filter name, case-insensitively. Unrecognized input means All.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Filter::Active,
            "completed" => Filter::Completed,
            _ => Filter::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// The next filter in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}

/// Task counts computed in a single pass over the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}
