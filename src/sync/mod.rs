//! Synchronized Collection State
//!
//! `SyncHub` holds what all views share: the gateway, the optional cache and
//! the invalidation context. Each open view owns a `ViewSync` with its own
//! copy of the collections it displays.
//!
//! Reads are refreshed from the server and written through to the cache,
//! falling back to the cache when the server is unreachable. Status changes
//! and member additions are optimistic: memory and cache are updated before
//! the remote write is attempted, and stay updated if it fails.

mod mutation;


use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::{self, CacheStore};
use crate::context::{DataUpdated, SyncContext, ViewId};
use crate::domain::{
    Collection, DomainError, Entity, NewMember, NewProject, NewTask, NewTeam, Project, ProjectStatus,
    Task, TaskStatus, Team,
};
use crate::error::SyncResult;
use crate::filter::{filter_view, search_view, StatusFilter};
use crate::gateway::{Gateway, GatewayError, GatewayResult};
use crate::report::Report;
use crate::store::{store_add_member, store_set_project_status, AppState, Loaded, Source};

pub use mutation::{
    Mutation, MutationId, MutationKind, MutationLog, MutationReport, MutationState, PendingWrite,
    WriteReceipt,
};

/// Services shared by every view
#[derive(Clone)]
pub struct SyncHub {
    gateway: Arc<dyn Gateway>,
    cache: Option<Arc<dyn CacheStore>>,
    context: SyncContext,
}

impl SyncHub {
    /// Hub without a cache; refresh failures leave collections empty
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            cache: None,
            context: SyncContext::new(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    /// Open a view that displays the given collections
    pub fn open_view(&self, needs: &[Collection]) -> ViewSync {
        let updates = self.context.subscribe();
        let seen_seq = updates.borrow().seq;
        ViewSync {
            id: self.context.register_view(),
            hub: self.clone(),
            needs: needs.to_vec(),
            state: AppState::new(),
            mutations: MutationLog::default(),
            updates,
            seen_seq,
            seen_marker: None,
        }
    }

    /// `dataUpdated` marker as last persisted, possibly by another process
    pub async fn persisted_marker(&self) -> Option<i64> {
        let cache = self.cache.as_deref()?;
        match cache::read_marker(cache).await {
            Ok(marker) => marker,
            Err(e) => {
                log::warn!("[SYNC] ignoring unreadable marker: {}", e);
                None
            }
        }
    }

    async fn publish(&self, origin: ViewId) -> DataUpdated {
        let signal = self.context.reload(origin);
        if let Some(cache) = self.cache.as_deref() {
            if let Err(e) = cache::write_marker(cache, signal.at_millis).await {
                log::warn!("[SYNC] failed to persist dataUpdated marker: {}", e);
            }
        }
        log::debug!("[SYNC] view {} published update #{}", origin.0, signal.seq);
        signal
    }

    async fn write_through<T: Entity>(&self, items: &[T]) {
        if let Some(cache) = self.cache.as_deref() {
            if let Err(e) = cache::write_collection(cache, items).await {
                log::warn!("[SYNC] cache write for {} failed: {}", T::COLLECTION, e);
            }
        }
    }

    async fn cached<T: Entity>(&self) -> Option<Vec<T>> {
        let cache = self.cache.as_deref()?;
        match cache::read_collection::<T>(cache).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("[SYNC] ignoring cached {}: {}", T::COLLECTION, e);
                None
            }
        }
    }
}

/// How one collection fared during a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Remote { count: usize },
    FromCache { count: usize, error: GatewayError },
    Unavailable { error: GatewayError },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub outcomes: Vec<(Collection, RefreshOutcome)>,
}

impl RefreshReport {
    pub fn outcome(&self, collection: Collection) -> Option<&RefreshOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, outcome)| outcome)
    }

    pub fn all_remote(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, RefreshOutcome::Remote { .. }))
    }
}

/// State of one open view
pub struct ViewSync {
    id: ViewId,
    hub: SyncHub,
    needs: Vec<Collection>,
    state: AppState,
    mutations: MutationLog,
    updates: watch::Receiver<DataUpdated>,
    /// Newest invalidation this view's state already reflects
    seen_seq: u64,
    /// Persisted `dataUpdated` marker as of the last refresh or own write
    seen_marker: Option<i64>,
}

impl ViewSync {
    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn projects(&self) -> &Loaded<Project> {
        &self.state.projects
    }

    pub fn tasks(&self) -> &Loaded<Task> {
        &self.state.tasks
    }

    pub fn teams(&self) -> &Loaded<Team> {
        &self.state.teams
    }

    pub fn mutations(&self) -> &MutationLog {
        &self.mutations
    }

    fn needs(&self, collection: Collection) -> bool {
        self.needs.contains(&collection)
    }

    // ========================
    // Refresh
    // ========================

    /// Fetch every needed collection concurrently and settle each one
    pub async fn refresh(&mut self) -> RefreshReport {
        self.seen_seq = self.updates.borrow_and_update().seq;
        self.seen_marker = self.hub.persisted_marker().await;

        let gateway = Arc::clone(&self.hub.gateway);
        let (want_projects, want_tasks, want_teams) = (
            self.needs(Collection::Projects),
            self.needs(Collection::Tasks),
            self.needs(Collection::Teams),
        );
        let (projects, tasks, teams) = tokio::join!(
            async {
                if want_projects {
                    Some(gateway.list_projects().await)
                } else {
                    None
                }
            },
            async {
                if want_tasks {
                    Some(gateway.list_tasks().await)
                } else {
                    None
                }
            },
            async {
                if want_teams {
                    Some(gateway.list_teams().await)
                } else {
                    None
                }
            }
        );

        let mut report = RefreshReport::default();
        if let Some(fetched) = projects {
            let outcome = settle_collection(&self.hub, &mut self.state.projects, fetched).await;
            report.outcomes.push((Collection::Projects, outcome));
        }
        if let Some(fetched) = tasks {
            let outcome = settle_collection(&self.hub, &mut self.state.tasks, fetched).await;
            report.outcomes.push((Collection::Tasks, outcome));
        }
        if let Some(fetched) = teams {
            let outcome = settle_collection(&self.hub, &mut self.state.teams, fetched).await;
            report.outcomes.push((Collection::Teams, outcome));
        }

        if report.all_remote() {
            self.mutations.prune_settled();
        }
        report
    }

    /// Refresh if another view, in this process or another one sharing the
    /// cache, has changed remote data since this view last loaded; returns
    /// `None` when nothing was pending
    pub async fn refresh_if_invalidated(&mut self) -> Option<RefreshReport> {
        let latest = self.updates.borrow_and_update().seq;
        if latest > self.seen_seq {
            log::info!("[SYNC] view {} invalidated (update #{}), refreshing", self.id.0, latest);
            return Some(self.refresh().await);
        }
        let marker = self.hub.persisted_marker().await;
        if marker > self.seen_marker {
            log::info!("[SYNC] view {} invalidated by persisted marker {:?}, refreshing", self.id.0, marker);
            return Some(self.refresh().await);
        }
        None
    }

    /// Wait until some other view publishes an update
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next_invalidation(&mut self) -> Option<DataUpdated> {
        loop {
            self.updates.changed().await.ok()?;
            let signal = *self.updates.borrow_and_update();
            if signal.seq > self.seen_seq {
                return Some(signal);
            }
        }
    }

    async fn publish(&mut self) {
        let signal = self.hub.publish(self.id).await;
        // only skip our own signal when nothing else slipped in before it
        if signal.seq == self.seen_seq + 1 {
            self.seen_seq = signal.seq;
            self.seen_marker = Some(signal.at_millis);
        }
    }

    // ========================
    // Optimistic Mutations
    // ========================

    /// Apply a status change locally and return the remote write to send
    pub async fn stage_project_status(&mut self, project_id: &str, status: ProjectStatus) -> SyncResult<PendingWrite> {
        if !store_set_project_status(&mut self.state, project_id, status) {
            return Err(DomainError::NotFound(format!("project {}", project_id)).into());
        }
        self.hub.write_through(&self.state.projects.items).await;

        let kind = MutationKind::ProjectStatus {
            project_id: project_id.to_string(),
            status,
        };
        log::info!("[SYNC] {} (pending)", kind.describe());
        let id = self.mutations.begin(kind.clone());
        Ok(PendingWrite::new(id, kind, Arc::clone(&self.hub.gateway)))
    }

    /// Append a member locally and return the remote write to send
    pub async fn stage_team_member(&mut self, team_id: &str, name: &str) -> SyncResult<PendingWrite> {
        let member = NewMember::new(name)?;
        if !store_add_member(&mut self.state, team_id, member.clone().into_member()) {
            return Err(DomainError::NotFound(format!("team {}", team_id)).into());
        }
        self.hub.write_through(&self.state.teams.items).await;

        let kind = MutationKind::AddMember {
            team_id: team_id.to_string(),
            member,
        };
        log::info!("[SYNC] {} (pending)", kind.describe());
        let id = self.mutations.begin(kind.clone());
        Ok(PendingWrite::new(id, kind, Arc::clone(&self.hub.gateway)))
    }

    /// Record the server's answer for a staged write
    pub async fn settle(&mut self, receipt: WriteReceipt) -> MutationReport {
        let state = self.mutations.settle(receipt.id, &receipt.result);
        match &state {
            MutationState::Confirmed => self.publish().await,
            MutationState::LocalOnly { warning } => log::warn!("[SYNC] {}", warning),
            MutationState::Pending => {}
        }
        MutationReport {
            id: receipt.id,
            state,
        }
    }

    /// Change a project's status: local first, then the server
    pub async fn set_project_status(&mut self, project_id: &str, status: ProjectStatus) -> SyncResult<MutationReport> {
        let pending = self.stage_project_status(project_id, status).await?;
        let receipt = pending.send().await;
        Ok(self.settle(receipt).await)
    }

    /// Add a member to a team: local first, then the server
    pub async fn add_team_member(&mut self, team_id: &str, name: &str) -> SyncResult<MutationReport> {
        let pending = self.stage_team_member(team_id, name).await?;
        let receipt = pending.send().await;
        Ok(self.settle(receipt).await)
    }

    // ========================
    // Creates
    // ========================

    pub async fn create_project(&mut self, draft: &NewProject) -> SyncResult<Project> {
        let draft = draft.validate()?;
        let project = self
            .hub
            .gateway
            .create_project(&draft)
            .await
            .inspect_err(|e| log::warn!("[SYNC] create project '{}' failed: {}", draft.name, e))?;
        self.state.projects.upsert(project.clone());
        self.hub.write_through(&self.state.projects.items).await;
        self.publish().await;
        Ok(project)
    }

    pub async fn create_task(&mut self, draft: &NewTask) -> SyncResult<Task> {
        let draft = draft.validate()?;
        let task = self
            .hub
            .gateway
            .create_task(&draft)
            .await
            .inspect_err(|e| log::warn!("[SYNC] create task '{}' failed: {}", draft.name, e))?;
        self.state.tasks.upsert(task.clone());
        self.hub.write_through(&self.state.tasks.items).await;
        self.publish().await;
        Ok(task)
    }

    pub async fn create_team(&mut self, draft: &NewTeam) -> SyncResult<Team> {
        let draft = draft.validate()?;
        let team = self
            .hub
            .gateway
            .create_team(&draft)
            .await
            .inspect_err(|e| log::warn!("[SYNC] create team '{}' failed: {}", draft.name, e))?;
        self.state.teams.upsert(team.clone());
        self.hub.write_through(&self.state.teams.items).await;
        self.publish().await;
        Ok(team)
    }

    // ========================
    // Derived Views
    // ========================

    pub fn filtered_projects(&self, status: &StatusFilter<ProjectStatus>, query: &str) -> Vec<&Project> {
        filter_view(&self.state.projects.items, status, query)
    }

    pub fn filtered_tasks(&self, status: &StatusFilter<TaskStatus>, query: &str) -> Vec<&Task> {
        filter_view(&self.state.tasks.items, status, query)
    }

    pub fn searched_teams(&self, query: &str) -> Vec<&Team> {
        search_view(&self.state.teams.items, query)
    }

    pub fn report(&self) -> Report {
        Report::build(&self.state)
    }
}

/// Apply one collection's fetch result: server data wins, then the cache
async fn settle_collection<T: Entity>(
    hub: &SyncHub,
    loaded: &mut Loaded<T>,
    fetched: GatewayResult<Vec<T>>,
) -> RefreshOutcome {
    let collection = T::COLLECTION;
    match fetched {
        Ok(items) => {
            log::info!("[SYNC] {} refreshed from server ({} items)", collection, items.len());
            hub.write_through(&items).await;
            let count = items.len();
            loaded.items = items;
            loaded.source = Source::Remote;
            RefreshOutcome::Remote { count }
        }
        Err(error) => match hub.cached::<T>().await {
            Some(items) => {
                log::warn!("[SYNC] {} refresh failed, using cache: {}", collection, error);
                let count = items.len();
                loaded.items = items;
                loaded.source = Source::Cache;
                RefreshOutcome::FromCache { count, error }
            }
            None => {
                log::warn!("[SYNC] {} refresh failed, nothing cached: {}", collection, error);
                // items from an earlier refresh stay, but are no longer fresh
                loaded.source = Source::Unavailable;
                RefreshOutcome::Unavailable { error }
            }
        },
    }
}
