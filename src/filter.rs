//! Filter/Search View
//!
//! Derives the displayed subset of a collection from a status filter and a
//! free-text query. Pure: the source slice is never modified, and results
//! keep the source order.

use std::str::FromStr;

use crate::domain::{DomainError, Project, ProjectStatus, Task, TaskStatus, Team};

/// `All`, or exactly one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    #[default]
    All,
    Only(S),
}

impl<S: PartialEq> StatusFilter<S> {
    /// Items without a status only pass the `All` filter
    pub fn accepts(&self, status: Option<&S>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(wanted),
        }
    }
}

impl<S: FromStr<Err = DomainError>> FromStr for StatusFilter<S> {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Something that can be matched by a free-text query
pub trait Searchable {
    /// `needle` is already lowercased
    fn matches_text(&self, needle: &str) -> bool;
}

/// Searchable records that also carry a status
pub trait Filterable: Searchable {
    type Status: PartialEq;

    fn status(&self) -> Option<&Self::Status>;
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Searchable for Project {
    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, needle))
    }
}

impl Filterable for Project {
    type Status = ProjectStatus;

    fn status(&self) -> Option<&ProjectStatus> {
        self.status.as_ref()
    }
}

impl Searchable for Task {
    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
    }
}

impl Filterable for Task {
    type Status = TaskStatus;

    fn status(&self) -> Option<&TaskStatus> {
        self.status.as_ref()
    }
}

impl Searchable for Team {
    fn matches_text(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
    }
}

/// Items passing both the status filter and the case-insensitive query
pub fn filter_view<'a, T: Filterable>(items: &'a [T], status: &StatusFilter<T::Status>, query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| status.accepts(item.status()) && item.matches_text(&needle))
        .collect()
}

/// Items matching the case-insensitive query
pub fn search_view<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    items.iter().filter(|item| item.matches_text(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn project(id: &str, name: &str, status: Option<ProjectStatus>) -> Project {
        let mut p = Project::new(id, name);
        p.status = status;
        p
    }

    #[test]
    fn test_dashboard_scenario() {
        let projects: Vec<Project> =
            serde_json::from_str(r#"[{"_id":"p1","name":"Alpha","status":"In Progress"}]"#).unwrap();
        let tasks: Vec<Task> =
            serde_json::from_str(r#"[{"_id":"t1","name":"Task1","project":"p1","status":"To Do"}]"#).unwrap();

        let matched = filter_view(&projects, &StatusFilter::All, "alp");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "p1");
        assert!(filter_view(&tasks, &StatusFilter::All, "alp").is_empty());
    }

    #[test]
    fn test_project_description_is_searched() {
        let mut p = project("p1", "Website", None);
        p.description = Some("Marketing REFRESH".to_string());
        let items = vec![p];
        assert_eq!(filter_view(&items, &StatusFilter::All, "refresh").len(), 1);
    }

    #[test]
    fn test_missing_status_only_matches_all() {
        let items = vec![project("p1", "Alpha", None)];
        assert_eq!(filter_view(&items, &StatusFilter::All, "").len(), 1);
        assert!(filter_view(&items, &StatusFilter::Only(ProjectStatus::InProgress), "").is_empty());
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter<TaskStatus>>(), Ok(StatusFilter::All));
        assert_eq!(
            "blocked".parse::<StatusFilter<TaskStatus>>(),
            Ok(StatusFilter::Only(TaskStatus::Blocked))
        );
        assert!("later".parse::<StatusFilter<TaskStatus>>().is_err());
    }

    #[test]
    fn test_team_search() {
        let teams = vec![Team::new("m1", "Design"), Team::new("m2", "Engineering")];
        let found = search_view(&teams, "ENG");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "m2");
    }

    fn arb_status() -> impl Strategy<Value = Option<ProjectStatus>> {
        prop_oneof![
            Just(None),
            Just(Some(ProjectStatus::Pending)),
            Just(Some(ProjectStatus::InProgress)),
            Just(Some(ProjectStatus::Completed)),
        ]
    }

    fn arb_filter() -> impl Strategy<Value = StatusFilter<ProjectStatus>> {
        prop_oneof![
            Just(StatusFilter::All),
            Just(StatusFilter::Only(ProjectStatus::Pending)),
            Just(StatusFilter::Only(ProjectStatus::InProgress)),
            Just(StatusFilter::Only(ProjectStatus::Completed)),
        ]
    }

    proptest! {
        #[test]
        fn prop_filter_is_ordered_exact_subsequence(
            entries in prop::collection::vec(("[a-cA-C ]{0,6}", arb_status()), 0..20),
            filter in arb_filter(),
            query in "[a-cA-C]{0,2}",
        ) {
            let items: Vec<Project> = entries
                .iter()
                .enumerate()
                .map(|(i, (name, status))| project(&format!("p{}", i), name, *status))
                .collect();
            let before = items.clone();

            let result = filter_view(&items, &filter, &query);

            let expected: Vec<&str> = items
                .iter()
                .filter(|p| match filter {
                    StatusFilter::All => true,
                    StatusFilter::Only(s) => p.status == Some(s),
                })
                .filter(|p| p.name.to_lowercase().contains(&query.to_lowercase()))
                .map(|p| p.id.as_str())
                .collect();
            let actual: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();

            prop_assert_eq!(actual, expected);
            prop_assert_eq!(items, before);
        }
    }
}
