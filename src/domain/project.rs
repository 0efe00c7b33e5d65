//! Project Entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{optional, required, Collection, DomainResult, Entity};
use super::status::{Badge, ProjectStatus};
use super::wire;

/// A project as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::optional_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::status", skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "wire::date", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            status: None,
            deadline: None,
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Status shown to the user; a project without one reads as in progress
    pub fn display_status(&self) -> ProjectStatus {
        self.status.unwrap_or(ProjectStatus::InProgress)
    }

    pub fn badge(&self) -> Badge {
        self.display_status().badge()
    }
}

impl Entity for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Input for creating a project; the server assigns the id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Trimmed copy, or a validation error when the name is blank
    pub fn validate(&self) -> DomainResult<NewProject> {
        Ok(NewProject {
            name: required("project name", &self.name)?,
            description: optional(self.description.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_project_decodes_server_shape() {
        let json = r#"{"_id":"p1","name":"Alpha","status":"In Progress","deadline":"2025-01-31T00:00:00.000Z","__v":0}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id(), "p1");
        assert_eq!(project.status, Some(ProjectStatus::InProgress));
        assert_eq!(project.deadline, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_unknown_status_is_not_an_error() {
        let json = r#"{"_id":"p1","name":"Alpha","status":"Archived"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.status, None);
        assert_eq!(project.display_status(), ProjectStatus::InProgress);
        assert_eq!(project.badge(), Badge::InProgress);
    }

    #[test]
    fn test_non_text_description_is_dropped() {
        let json = r#"[{"_id":"p1","name":"Alpha","description":42},{"_id":"p2","name":"Beta","description":"ok"}]"#;
        let projects: Vec<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(projects[0].description, None);
        assert_eq!(projects[1].description.as_deref(), Some("ok"));
    }

    #[test]
    fn test_cache_round_trip_keeps_fields() {
        let mut project = Project::new("p9", "Launch").with_status(ProjectStatus::Completed);
        project.description = Some("Ship it".to_string());
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"_id\":\"p9\""));
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn test_new_project_validation() {
        let draft = NewProject::new("  Alpha  ", Some("   ".to_string()));
        let valid = draft.validate().unwrap();
        assert_eq!(valid.name, "Alpha");
        assert_eq!(valid.description, None);

        let blank = NewProject::new(" ", None);
        assert!(matches!(blank.validate(), Err(DomainError::Validation(_))));
    }
}
