//! Optimistic Mutations
//!
//! A mutation is applied locally first and then sent to the server. Its
//! lifecycle is `Pending -> Confirmed` when the server accepts the write, or
//! `Pending -> LocalOnly` when it does not. Local changes are never reverted.

use std::sync::Arc;

use crate::domain::{NewMember, ProjectStatus};
use crate::gateway::{Gateway, GatewayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    ProjectStatus { project_id: String, status: ProjectStatus },
    AddMember { team_id: String, member: NewMember },
}

impl MutationKind {
    pub fn describe(&self) -> String {
        match self {
            MutationKind::ProjectStatus { project_id, status } => {
                format!("status of project {} set to '{}'", project_id, status)
            }
            MutationKind::AddMember { team_id, member } => {
                format!("member '{}' added to team {}", member.name, team_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Confirmed,
    /// Kept locally; the server was not updated
    LocalOnly { warning: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub id: MutationId,
    pub kind: MutationKind,
    pub state: MutationState,
}

/// Per-view record of mutations and their outcomes
#[derive(Debug, Default)]
pub struct MutationLog {
    next_id: u64,
    entries: Vec<Mutation>,
}

impl MutationLog {
    pub(crate) fn begin(&mut self, kind: MutationKind) -> MutationId {
        self.next_id += 1;
        let id = MutationId(self.next_id);
        self.entries.push(Mutation {
            id,
            kind,
            state: MutationState::Pending,
        });
        id
    }

    /// Record the server's answer for `id` and return the resulting state
    pub(crate) fn settle(&mut self, id: MutationId, result: &GatewayResult<()>) -> MutationState {
        let entry = self.entries.iter_mut().find(|m| m.id == id);
        let state = match result {
            Ok(()) => MutationState::Confirmed,
            Err(error) => {
                let what = entry
                    .as_ref()
                    .map(|m| m.kind.describe())
                    .unwrap_or_else(|| "change".to_string());
                MutationState::LocalOnly {
                    warning: format!("{} was saved locally only; the server was not updated ({})", what, error),
                }
            }
        };
        if let Some(entry) = entry {
            entry.state = state.clone();
        }
        state
    }

    /// Drop settled entries once a fresh server read has superseded them
    pub(crate) fn prune_settled(&mut self) {
        self.entries.retain(|m| m.state == MutationState::Pending);
    }

    pub fn get(&self, id: MutationId) -> Option<&Mutation> {
        self.entries.iter().find(|m| m.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Mutation> {
        self.entries.iter().filter(|m| m.state == MutationState::Pending)
    }

    pub fn local_only(&self) -> impl Iterator<Item = &Mutation> {
        self.entries
            .iter()
            .filter(|m| matches!(m.state, MutationState::LocalOnly { .. }))
    }
}

/// A remote write that has been applied locally but not yet sent
///
/// Owns everything it needs, so it can be moved onto another task.
#[must_use = "a staged write does nothing until it is sent"]
pub struct PendingWrite {
    id: MutationId,
    kind: MutationKind,
    gateway: Arc<dyn Gateway>,
}

impl PendingWrite {
    pub(crate) fn new(id: MutationId, kind: MutationKind, gateway: Arc<dyn Gateway>) -> Self {
        Self { id, kind, gateway }
    }

    pub fn id(&self) -> MutationId {
        self.id
    }

    /// Perform the single round trip for this mutation
    pub async fn send(self) -> WriteReceipt {
        let result = match &self.kind {
            MutationKind::ProjectStatus { project_id, status } => {
                self.gateway.update_project_status(project_id, *status).await
            }
            MutationKind::AddMember { team_id, member } => {
                self.gateway.add_team_member(team_id, member).await
            }
        };
        WriteReceipt { id: self.id, result }
    }
}

/// Server answer for a sent write; hand it back to the view to settle
#[derive(Debug)]
pub struct WriteReceipt {
    pub id: MutationId,
    pub result: GatewayResult<()>,
}

/// Outcome of a mutation as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub id: MutationId,
    pub state: MutationState,
}

impl MutationReport {
    pub fn is_confirmed(&self) -> bool {
        self.state == MutationState::Confirmed
    }

    pub fn warning(&self) -> Option<&str> {
        match &self.state {
            MutationState::LocalOnly { warning } => Some(warning),
            _ => None,
        }
    }
}
