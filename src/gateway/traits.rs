//! Gateway Trait
//!
//! Abstract interface over the remote API so the sync layer can run against
//! HTTP in production and fakes in tests.

use async_trait::async_trait;

use super::GatewayResult;
use crate::domain::{NewMember, NewProject, NewTask, NewTeam, Project, ProjectStatus, Task, Team};

/// Read and write operations against the remote collections
///
/// Drafts passed to create operations are expected to be validated already.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /projects`
    async fn list_projects(&self) -> GatewayResult<Vec<Project>>;

    /// `GET /tasks`
    async fn list_tasks(&self) -> GatewayResult<Vec<Task>>;

    /// `GET /teams`
    async fn list_teams(&self) -> GatewayResult<Vec<Team>>;

    /// `POST /projects`, returning the stored project with its new id
    async fn create_project(&self, draft: &NewProject) -> GatewayResult<Project>;

    /// `POST /tasks`
    async fn create_task(&self, draft: &NewTask) -> GatewayResult<Task>;

    /// `POST /teams`
    async fn create_team(&self, draft: &NewTeam) -> GatewayResult<Team>;

    /// `PATCH /projects/{id}` with only the status field
    async fn update_project_status(&self, id: &str, status: ProjectStatus) -> GatewayResult<()>;

    /// `POST /teams/{id}/members`
    async fn add_team_member(&self, team_id: &str, member: &NewMember) -> GatewayResult<()>;
}
