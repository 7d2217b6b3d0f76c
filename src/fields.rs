//! Enumerations and field types for task management.
//!
//! This module defines the structured values a task carries (status and
//! priority) together with the keys and directions used to sort task lists.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Task completion status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Status {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    /// Selector order used by forms.
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    /// Stored and displayed text of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    /// Parse display text, CLI spelling or legacy spellings, ignoring case.
    pub fn parse(s: &str) -> Option<Status> {
        let norm: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        match norm.as_str() {
            "pending" | "open" | "todo" => Some(Status::Pending),
            "inprogress" | "doing" => Some(Status::InProgress),
            "completed" | "done" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Selector order used by forms.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Stored and displayed text of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse display text ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a stored status, falling back to the default for absent or unknown text.
pub fn lenient_status<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_text(deserializer)?;
    Ok(Status::parse(&raw).unwrap_or_default())
}

/// Decode a stored priority, falling back to the default for absent or unknown text.
pub fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_text(deserializer)?;
    Ok(Priority::parse(&raw).unwrap_or_default())
}

/// Decode any stored JSON value as text: null becomes "", strings are kept and
/// anything else keeps its JSON form.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Available sorting keys for task lists.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Status,
    Priority,
    #[default]
    #[value(name = "due")]
    DueDate,
}

impl SortKey {
    /// Column order on the list screen.
    pub const ALL: [SortKey; 4] = [SortKey::Title, SortKey::Status, SortKey::Priority, SortKey::DueDate];

    /// Column heading for the key.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Status => "Status",
            SortKey::Priority => "Priority",
            SortKey::DueDate => "Due Date",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_display_and_cli_spellings() {
        assert_eq!(Status::parse("In Progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("in-progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("COMPLETED"), Some(Status::Completed));
        assert_eq!(Status::parse("blocked"), None);
    }

    #[test]
    fn test_status_serialises_as_display_text() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse(" high "), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
