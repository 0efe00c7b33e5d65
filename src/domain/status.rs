//! Status Sets
//!
//! Closed status enumerations for projects and tasks. Text is matched
//! case-insensitively; anything unrecognised is left to the caller to treat
//! as "no status".

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::entity::DomainError;

/// Lifecycle of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }

    pub fn badge(&self) -> Badge {
        Badge::of(*self == ProjectStatus::Completed)
    }
}

impl FromStr for ProjectStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(ProjectStatus::Pending),
            "inprogress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(DomainError::Validation(format!("unknown project status '{}'", s))),
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Blocked => "Blocked",
        }
    }

    pub fn badge(&self) -> Badge {
        Badge::of(*self == TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(DomainError::Validation(format!("unknown task status '{}'", s))),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual treatment of a status; only completion gets its own badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    Completed,
    InProgress,
}

impl Badge {
    fn of(completed: bool) -> Self {
        if completed {
            Badge::Completed
        } else {
            Badge::InProgress
        }
    }
}

/// Lowercase and drop separators so "In Progress", "in-progress" and
/// "IN_PROGRESS" compare equal
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_parse_is_case_insensitive() {
        assert_eq!("completed".parse::<ProjectStatus>(), Ok(ProjectStatus::Completed));
        assert_eq!("IN PROGRESS".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("in-progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert!("Blocked".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_task_status_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert_eq!("todo".parse::<TaskStatus>(), Ok(TaskStatus::ToDo));
    }

    #[test]
    fn test_only_completed_gets_completed_badge() {
        assert_eq!(ProjectStatus::Completed.badge(), Badge::Completed);
        assert_eq!(ProjectStatus::Pending.badge(), Badge::InProgress);
        assert_eq!(TaskStatus::Blocked.badge(), Badge::InProgress);
    }

    #[test]
    fn test_status_wire_labels() {
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"To Do\"");
        assert_eq!(serde_json::to_string(&ProjectStatus::InProgress).unwrap(), "\"In Progress\"");
    }
}
