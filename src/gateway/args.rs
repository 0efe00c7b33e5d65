//! Request Body Structs
//!
//! JSON payloads in the exact shape the API expects.

use serde::Serialize;

use crate::domain::{NewProject, NewTask, NewTeam, ProjectStatus, TaskStatus};

#[derive(Serialize)]
pub struct CreateProjectArgs<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

impl<'a> From<&'a NewProject> for CreateProjectArgs<'a> {
    fn from(draft: &'a NewProject) -> Self {
        Self {
            name: &draft.name,
            description: draft.description.as_deref(),
        }
    }
}

#[derive(Serialize)]
pub struct CreateTaskArgs<'a> {
    pub name: &'a str,
    pub project: &'a str,
    pub team: &'a str,
    pub owners: &'a [String],
    pub tags: &'a [String],
    #[serde(rename = "timeToComplete", skip_serializing_if = "Option::is_none")]
    pub time_to_complete: Option<f64>,
    pub status: TaskStatus,
}

impl<'a> From<&'a NewTask> for CreateTaskArgs<'a> {
    fn from(draft: &'a NewTask) -> Self {
        Self {
            name: &draft.name,
            project: &draft.project,
            team: &draft.team,
            owners: &draft.owners,
            tags: &draft.tags,
            time_to_complete: draft.time_to_complete,
            status: draft.status,
        }
    }
}

#[derive(Serialize)]
pub struct MemberArgs<'a> {
    pub name: &'a str,
}

#[derive(Serialize)]
pub struct CreateTeamArgs<'a> {
    pub name: &'a str,
    pub members: Vec<MemberArgs<'a>>,
}

impl<'a> From<&'a NewTeam> for CreateTeamArgs<'a> {
    fn from(draft: &'a NewTeam) -> Self {
        Self {
            name: &draft.name,
            members: draft.members.iter().map(|m| MemberArgs { name: &m.name }).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct StatusArgs {
    pub status: ProjectStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_args_use_api_field_names() {
        let mut draft = NewTask::new("Design", "p1", "m1");
        draft.time_to_complete = Some(3.0);
        let body = serde_json::to_value(CreateTaskArgs::from(&draft)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Design",
                "project": "p1",
                "team": "m1",
                "owners": [],
                "tags": [],
                "timeToComplete": 3.0,
                "status": "To Do"
            })
        );
    }

    #[test]
    fn test_team_args_nest_member_names() {
        let draft = NewTeam::new("Eng", ["Ann", "", "Bob"]);
        let body = serde_json::to_value(CreateTeamArgs::from(&draft)).unwrap();
        assert_eq!(body, json!({"name": "Eng", "members": [{"name": "Ann"}, {"name": "Bob"}]}));
    }
}
