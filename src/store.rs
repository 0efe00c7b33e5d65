//! View State Store
//!
//! In-memory collections owned by one view, plus where each one came from.

use serde::Serialize;

use crate::domain::{Collection, Entity, Member, Project, ProjectStatus, Task, Team};

/// Where a collection's current contents came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Never refreshed
    Unloaded,
    /// Last refresh reached the server
    Remote,
    /// Server unreachable; showing the cached snapshot
    Cache,
    /// Server unreachable and nothing cached; any items are from an
    /// earlier refresh
    Unavailable,
}

/// What a view should show for a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Items,
    /// The server (or cache) confirmed there is nothing
    Empty,
    /// Nothing could be loaded at all
    LoadFailed,
}

/// A collection together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub source: Source,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            source: Source::Unloaded,
        }
    }
}

impl<T: Entity> Loaded<T> {
    pub fn display_state(&self) -> DisplayState {
        if !self.items.is_empty() {
            return DisplayState::Items;
        }
        match self.source {
            Source::Unloaded => DisplayState::Loading,
            Source::Unavailable => DisplayState::LoadFailed,
            Source::Remote | Source::Cache => DisplayState::Empty,
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Append, or replace in place when the id is already present
    pub fn upsert(&mut self, entity: T) {
        match self.get_mut(entity.id()) {
            Some(existing) => *existing = entity,
            None => self.items.push(entity),
        }
    }
}

/// Every collection a view can hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub projects: Loaded<Project>,
    pub tasks: Loaded<Task>,
    pub teams: Loaded<Team>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self, collection: Collection) -> Source {
        match collection {
            Collection::Projects => self.projects.source,
            Collection::Tasks => self.tasks.source,
            Collection::Teams => self.teams.source,
        }
    }
}

// ========================
// Store Helper Functions
// ========================

/// Set a project's status by id; false when the project is unknown
pub fn store_set_project_status(state: &mut AppState, project_id: &str, status: ProjectStatus) -> bool {
    match state.projects.get_mut(project_id) {
        Some(project) => {
            project.status = Some(status);
            true
        }
        None => false,
    }
}

/// Append a member to a team by id; false when the team is unknown
pub fn store_add_member(state: &mut AppState, team_id: &str, member: Member) -> bool {
    match state.teams.get_mut(team_id) {
        Some(team) => {
            team.members.push(member);
            true
        }
        None => false,
    }
}

/// Tasks whose project reference matches `project_id`
pub fn store_tasks_for_project<'a>(state: &'a AppState, project_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
    state.tasks.items.iter().filter(move |t| t.belongs_to_project(project_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_project() -> AppState {
        let mut state = AppState::new();
        state.projects.items.push(Project::new("p1", "Alpha"));
        state.projects.source = Source::Remote;
        state
    }

    #[test]
    fn test_display_state_distinguishes_empty_from_failed() {
        let mut loaded: Loaded<Project> = Loaded::default();
        assert_eq!(loaded.display_state(), DisplayState::Loading);
        loaded.source = Source::Unavailable;
        assert_eq!(loaded.display_state(), DisplayState::LoadFailed);
        loaded.source = Source::Remote;
        assert_eq!(loaded.display_state(), DisplayState::Empty);
        loaded.items.push(Project::new("p1", "Alpha"));
        assert_eq!(loaded.display_state(), DisplayState::Items);
    }

    #[test]
    fn test_set_project_status() {
        let mut state = state_with_project();
        assert!(store_set_project_status(&mut state, "p1", ProjectStatus::Completed));
        assert_eq!(state.projects.items[0].status, Some(ProjectStatus::Completed));
        assert!(!store_set_project_status(&mut state, "nope", ProjectStatus::Completed));
    }

    #[test]
    fn test_upsert_keeps_order() {
        let mut state = state_with_project();
        state.projects.upsert(Project::new("p2", "Beta"));
        state.projects.upsert(Project::new("p1", "Alpha v2"));
        let names: Vec<_> = state.projects.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha v2", "Beta"]);
    }

    #[test]
    fn test_dangling_task_references_are_ignored() {
        let mut state = state_with_project();
        let mut owned = Task::new("t1", "Owned");
        owned.project = Some("p1".to_string());
        let mut dangling = Task::new("t2", "Dangling");
        dangling.project = Some("gone".to_string());
        state.tasks.items = vec![owned, dangling, Task::new("t3", "Loose")];

        let ids: Vec<_> = store_tasks_for_project(&state, "p1").map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1"]);
    }

    #[test]
    fn test_add_member() {
        let mut state = AppState::new();
        state.teams.items.push(Team::new("m1", "Eng"));
        assert!(store_add_member(&mut state, "m1", Member::named("Ann")));
        assert_eq!(state.teams.items[0].members.len(), 1);
        assert!(!store_add_member(&mut state, "m2", Member::named("Bob")));
    }
}
