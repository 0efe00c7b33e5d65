//! Reports & Analytics
//!
//! Aggregates behind the report page: status distributions, hours per task
//! and per-project/per-team task counts.

use serde::Serialize;

use crate::domain::{ProjectStatus, TaskStatus};
use crate::store::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHours {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerCount {
    pub id: String,
    pub name: String,
    pub tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub project_status: Vec<StatusCount>,
    pub task_status: Vec<StatusCount>,
    pub hours_per_task: Vec<TaskHours>,
    pub tasks_per_project: Vec<OwnerCount>,
    pub tasks_per_team: Vec<OwnerCount>,
}

impl Report {
    pub fn build(state: &AppState) -> Self {
        let projects = &state.projects.items;
        let tasks = &state.tasks.items;

        let project_status = ProjectStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.as_str(),
                count: projects.iter().filter(|p| p.display_status() == *status).count(),
            })
            .collect();

        let task_status = TaskStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.as_str(),
                count: tasks.iter().filter(|t| t.display_status() == *status).count(),
            })
            .collect();

        let hours_per_task = tasks
            .iter()
            .filter_map(|t| {
                t.time_to_complete.map(|hours| TaskHours {
                    name: t.name.clone(),
                    hours,
                })
            })
            .collect();

        let tasks_per_project = projects
            .iter()
            .map(|p| OwnerCount {
                id: p.id.clone(),
                name: p.name.clone(),
                tasks: tasks.iter().filter(|t| t.belongs_to_project(&p.id)).count(),
            })
            .collect();

        let tasks_per_team = state
            .teams
            .items
            .iter()
            .map(|team| OwnerCount {
                id: team.id.clone(),
                name: team.display_name().to_string(),
                tasks: tasks.iter().filter(|t| t.belongs_to_team(&team.id)).count(),
            })
            .collect();

        Self {
            project_status,
            task_status,
            hours_per_task,
            tasks_per_project,
            tasks_per_team,
        }
    }

    /// Count for a status label in either distribution
    pub fn count(distribution: &[StatusCount], status: &str) -> usize {
        distribution
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}
