//! Task Entity
//!
//! A unit of work owned by one project and one team.

use serde::{Deserialize, Serialize};

use super::entity::{required, Collection, DomainError, DomainResult, Entity};
use super::status::{Badge, TaskStatus};
use super::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Owning project id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Owning team id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Estimated hours to complete
    #[serde(rename = "timeToComplete", skip_serializing_if = "Option::is_none")]
    pub time_to_complete: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Task as sent by the server
///
/// References arrive as `project`/`team` from some endpoints and as
/// `projectId`/`teamId` from others, occasionally both on one record.
#[derive(Deserialize)]
struct TaskRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default, deserialize_with = "wire::text")]
    name: String,
    #[serde(default, deserialize_with = "wire::reference")]
    project: Option<String>,
    #[serde(rename = "projectId", default, deserialize_with = "wire::reference")]
    project_id: Option<String>,
    #[serde(default, deserialize_with = "wire::reference")]
    team: Option<String>,
    #[serde(rename = "teamId", default, deserialize_with = "wire::reference")]
    team_id: Option<String>,
    #[serde(default, deserialize_with = "wire::strings")]
    owners: Vec<String>,
    #[serde(default, deserialize_with = "wire::strings")]
    tags: Vec<String>,
    #[serde(rename = "timeToComplete", default, deserialize_with = "wire::hours")]
    time_to_complete: Option<f64>,
    #[serde(default, deserialize_with = "wire::status")]
    status: Option<TaskStatus>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            project: record.project.or(record.project_id),
            team: record.team.or(record.team_id),
            owners: record.owners,
            tags: record.tags,
            time_to_complete: record.time_to_complete,
            status: record.status,
        }
    }
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project: None,
            team: None,
            owners: Vec::new(),
            tags: Vec::new(),
            time_to_complete: None,
            status: None,
        }
    }

    /// Status shown to the user; a task without one reads as "To Do"
    pub fn display_status(&self) -> TaskStatus {
        self.status.unwrap_or(TaskStatus::ToDo)
    }

    pub fn badge(&self) -> Badge {
        self.display_status().badge()
    }

    pub fn belongs_to_project(&self, project_id: &str) -> bool {
        self.project.as_deref() == Some(project_id)
    }

    pub fn belongs_to_team(&self, team_id: &str) -> bool {
        self.team.as_deref() == Some(team_id)
    }
}

impl Entity for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub project: String,
    pub team: String,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    pub time_to_complete: Option<f64>,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn new(name: impl Into<String>, project: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            team: team.into(),
            owners: Vec::new(),
            tags: Vec::new(),
            time_to_complete: None,
            status: TaskStatus::ToDo,
        }
    }

    pub fn validate(&self) -> DomainResult<NewTask> {
        if let Some(hours) = self.time_to_complete {
            if !hours.is_finite() || hours < 0.0 {
                return Err(DomainError::Validation(format!(
                    "time to complete must be a non-negative number of hours, got {}",
                    hours
                )));
            }
        }
        Ok(NewTask {
            name: required("task name", &self.name)?,
            project: required("task project", &self.project)?,
            team: required("task team", &self.team)?,
            owners: non_blank(&self.owners),
            tags: non_blank(&self.tags),
            time_to_complete: self.time_to_complete,
            status: self.status,
        })
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_accepts_project_id_alias() {
        let json = r#"{"_id":"t1","name":"Task1","projectId":"p1","status":"To Do"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.belongs_to_project("p1"));
        assert_eq!(task.status, Some(TaskStatus::ToDo));
    }

    #[test]
    fn test_task_accepts_populated_references() {
        let json = r#"{
            "_id": "t2",
            "name": "Write docs",
            "project": {"_id": "p1", "name": "Alpha"},
            "team": {"_id": "m1", "name": "Eng"},
            "owners": [{"_id": "u1"}, "u2"],
            "timeToComplete": "36"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.project.as_deref(), Some("p1"));
        assert_eq!(task.team.as_deref(), Some("m1"));
        assert_eq!(task.owners, vec!["u1".to_string(), "u2".to_string()]);
        assert_eq!(task.time_to_complete, Some(36.0));
        assert_eq!(task.display_status(), TaskStatus::ToDo);
    }

    #[test]
    fn test_task_with_both_reference_keys_decodes() {
        let json = r#"[
            {"_id":"t1","name":"A","project":"p1","projectId":"p1","teamId":"m1"},
            {"_id":"t2","name":"B","project":null,"projectId":"p2","team":"m2","teamId":"m9"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].project.as_deref(), Some("p1"));
        assert_eq!(tasks[0].team.as_deref(), Some("m1"));
        assert_eq!(tasks[1].project.as_deref(), Some("p2"));
        assert_eq!(tasks[1].team.as_deref(), Some("m2"));
    }

    #[test]
    fn test_cached_task_round_trips() {
        let mut task = Task::new("t9", "Ship");
        task.project = Some("p1".to_string());
        task.time_to_complete = Some(2.0);
        task.status = Some(TaskStatus::Blocked);
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_negative_hours_decode_as_absent() {
        let json = r#"{"_id":"t3","name":"Oops","timeToComplete":-4}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.time_to_complete, None);
    }

    #[test]
    fn test_new_task_validation() {
        let mut draft = NewTask::new("Design", "p1", "m1");
        draft.time_to_complete = Some(4.5);
        draft.tags = vec!["ui".to_string(), " ".to_string()];
        let valid = draft.validate().unwrap();
        assert_eq!(valid.tags, vec!["ui".to_string()]);

        assert!(NewTask::new("Design", "", "m1").validate().is_err());
        assert!(NewTask::new("", "p1", "m1").validate().is_err());

        let mut negative = NewTask::new("Design", "p1", "m1");
        negative.time_to_complete = Some(-1.0);
        assert!(negative.validate().is_err());
    }
}
