//! Task records as read from JSON, and their workflow status.

use serde::{Deserialize, Deserializer, Serialize};

/// A bug/task record to attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Component stated explicitly by whoever filed the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name_hint: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskRef {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.component_name_hint = Some(hint.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Trimmed hint, if any
    pub fn hint(&self) -> Option<&str> {
        self.component_name_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    /// Non-blank description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Trimmed title and non-blank description, joined by one space
    pub fn full_text(&self) -> String {
        let title = self.title.trim();
        match self.description().map(str::trim) {
            Some(description) if !title.is_empty() => format!("{} {}", title, description),
            Some(description) => description.to_string(),
            None => title.to_string(),
        }
    }

    /// Hint, title or description present
    pub fn has_content(&self) -> bool {
        self.hint().is_some() || !self.full_text().is_empty()
    }
}

/// Workflow status; only used to split bucket counts
///
/// Parsing ignores case and surrounding blanks and treats `-` and spaces like
/// `_`, so `"In Progress"`, `"in-progress"` and `"IN_PROGRESS"` are the same.
/// `null` and blank strings read as [`TaskStatus::Open`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
    Unknown,
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(TaskStatus::from_label).unwrap_or_default())
    }
}

impl TaskStatus {
    /// Map a free-form status label; anything unrecognized is `Unknown`
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "" | "open" | "todo" | "to_do" | "new" | "backlog" | "reopened" => TaskStatus::Open,
            "in_progress" | "doing" | "review" | "in_review" | "blocked" => TaskStatus::InProgress,
            "done" | "completed" | "closed" | "resolved" | "fixed" => TaskStatus::Done,
            _ => TaskStatus::Unknown,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
