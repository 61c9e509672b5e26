pub mod filter;

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clients::ResourceFetcher;
use crate::error::{FetchError, StoreError};
use crate::helpers::human_time;
use crate::models::resources::{ResourceKind, ResourceRecord, ResourceSnapshot, SnapshotState};
use crate::models::views::{ClusterList, ClusterSummary, ErrorInfo, StatusView};

use filter::{FilterSelection, RecordFilter};

/// Whether a namespace change is pushed down to the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceMode {
    /// Filter the full snapshot locally; namespace changes never fetch.
    #[default]
    Local,
    /// Refetch with the namespace when the fetcher supports it.
    Server,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub default_cluster: Option<String>,
    pub fetch_timeout: Duration,
    pub namespace_mode: NamespaceMode,
    pub search_matches_namespace: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_cluster: None,
            fetch_timeout: Duration::from_secs(10),
            namespace_mode: NamespaceMode::Local,
            search_matches_namespace: false,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: ResourceSnapshot,
    selection: FilterSelection,
    clusters: Vec<String>,
    last_error: Option<ErrorInfo>,
    using_fallback_data: bool,
    refreshing: bool,
}

/// Identity of a snapshot request; equal keys share one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RefreshKey {
    cluster: Option<String>,
    namespace: Option<String>,
}

struct PendingRefresh {
    key: RefreshKey,
    done: Shared<BoxFuture<'static, ()>>,
}

enum Joined {
    Started,
    Coalesced,
    Superseded,
}

/// In-memory cache of cluster resources plus the user's filter selection.
pub struct ResourceStore {
    fetcher: Arc<dyn ResourceFetcher>,
    settings: StoreSettings,
    state: RwLock<StoreState>,
    pending: Mutex<Option<PendingRefresh>>,
}

impl ResourceStore {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, settings: StoreSettings) -> Self {
        let mut state = StoreState::default();
        if let Some(cluster) = settings.default_cluster.clone() {
            state.clusters.push(cluster.clone());
            state.selection.selected_cluster = Some(cluster);
        }

        Self {
            fetcher,
            settings,
            state: RwLock::new(state),
            pending: Mutex::new(None),
        }
    }

    // --- Mutations ---

    /// Fetches a fresh snapshot for the current selection. Joins an
    /// in-flight fetch for the same request instead of issuing another.
    pub async fn refresh(self: &Arc<Self>) {
        loop {
            let key = self.refresh_key();
            let (joined, done) = {
                let mut pending = self.pending.lock().await;
                match pending.as_ref() {
                    Some(p) if p.key == key => (Joined::Coalesced, p.done.clone()),
                    Some(p) => (Joined::Superseded, p.done.clone()),
                    None => {
                        let done = self.spawn_refresh(key.clone());
                        *pending = Some(PendingRefresh {
                            key,
                            done: done.clone(),
                        });
                        (Joined::Started, done)
                    }
                }
            };

            done.await;
            match joined {
                Joined::Started => return,
                Joined::Coalesced => {
                    debug!("refresh coalesced into in-flight fetch");
                    return;
                }
                Joined::Superseded => {
                    debug!("in-flight fetch was for a previous selection, refetching");
                }
            }
        }
    }

    pub async fn set_namespace(self: &Arc<Self>, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.write().selection.selected_namespace = namespace;
        if self.server_side_namespace() {
            self.refresh().await;
        }
    }

    pub async fn set_cluster(self: &Arc<Self>, cluster: impl Into<String>) -> Result<(), StoreError> {
        let cluster = cluster.into();
        {
            let mut state = self.write();
            if state.clusters.is_empty() {
                state.clusters.push(cluster.clone());
            } else if !state.clusters.contains(&cluster) {
                return Err(StoreError::InvalidCluster(cluster));
            }
            info!("selected cluster {}", cluster);
            state.selection.selected_cluster = Some(cluster);
        }
        self.refresh().await;
        Ok(())
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.write().selection.search_term = term.into();
    }

    /// Reloads the known clusters, keeping the selection inside the set.
    pub async fn list_clusters(self: &Arc<Self>) {
        let clusters = match self.with_timeout(self.fetcher.fetch_clusters()).await {
            Ok(clusters) => clusters,
            Err(e) => {
                warn!("error listing clusters: {}", e);
                self.write().last_error = Some(ErrorInfo::new("list_clusters", &e));
                return;
            }
        };

        if clusters.is_empty() {
            warn!("backend reported no clusters, keeping previous list");
            return;
        }

        let reassigned = {
            let mut state = self.write();
            state.clusters = clusters;
            let known = state
                .selection
                .selected_cluster
                .as_ref()
                .is_some_and(|c| state.clusters.contains(c));
            if known {
                false
            } else {
                let first = state.clusters[0].clone();
                info!("selected cluster not in cluster list, switching to {}", first);
                state.selection.selected_cluster = Some(first);
                true
            }
        };

        if reassigned {
            self.refresh().await;
        }
    }

    /// Periodically refreshes until `shutdown` fires. Ticks that land while
    /// a fetch is in flight are dropped.
    pub async fn run_refresh_loop(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: tokio::sync::watch::Receiver<()>,
    ) {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.is_refreshing() {
                        debug!("refresh in flight, dropping tick");
                        continue;
                    }
                    self.refresh().await;
                }
                _ = shutdown.changed() => {
                    info!("refresh loop shutting down");
                    return;
                }
            }
        }
    }

    // --- Views ---

    pub fn filtered_resources(&self, kind: ResourceKind) -> Vec<ResourceRecord> {
        let state = self.read();
        let filter = RecordFilter::new(&state.selection, self.settings.search_matches_namespace);
        let snap = &state.snapshot;

        let records: Vec<ResourceRecord> = match kind {
            ResourceKind::Pods => filter
                .apply(&snap.pods)
                .into_iter()
                .map(|r| ResourceRecord::Pod(r.clone()))
                .collect(),
            ResourceKind::Deployments => filter
                .apply(&snap.deployments)
                .into_iter()
                .map(|r| ResourceRecord::Deployment(r.clone()))
                .collect(),
            ResourceKind::Services => filter
                .apply(&snap.services)
                .into_iter()
                .map(|r| ResourceRecord::Service(r.clone()))
                .collect(),
            ResourceKind::Nodes => filter
                .apply(&snap.nodes)
                .into_iter()
                .map(|r| ResourceRecord::Node(r.clone()))
                .collect(),
        };
        debug!("{} {} match the selection", records.len(), kind);
        records
    }

    pub fn unique_namespaces(&self) -> Vec<String> {
        filter::unique_namespaces(&self.read().snapshot)
    }

    /// Overview counts for the selected namespace. The search term does not
    /// narrow the summary.
    pub fn summary(&self) -> ClusterSummary {
        let state = self.read();
        let by_namespace = FilterSelection {
            search_term: String::new(),
            ..state.selection.clone()
        };
        let filter = RecordFilter::new(&by_namespace, false);
        let snap = &state.snapshot;

        let pods = filter.apply(&snap.pods);
        let nodes = filter.apply(&snap.nodes);
        ClusterSummary {
            cluster: state.selection.selected_cluster.clone(),
            namespace: state.selection.selected_namespace.clone(),
            pod_count: pods.len(),
            running_pods: pods.iter().filter(|p| p.is_running()).count(),
            deployment_count: filter.apply(&snap.deployments).len(),
            service_count: filter.apply(&snap.services).len(),
            node_count: nodes.len(),
            ready_nodes: nodes.iter().filter(|n| n.is_ready()).count(),
        }
    }

    pub fn status(&self) -> StatusView {
        let state = self.read();
        StatusView {
            selected_cluster: state.selection.selected_cluster.clone(),
            selected_namespace: state.selection.selected_namespace.clone(),
            search_term: state.selection.search_term.clone(),
            last_updated: state.snapshot.timestamp,
            last_updated_display: human_time(state.snapshot.timestamp),
            snapshot_state: SnapshotState::of(&state.snapshot),
            last_error: state.last_error.clone(),
            using_fallback_data: state.using_fallback_data,
            refreshing: state.refreshing,
        }
    }

    pub fn clusters(&self) -> ClusterList {
        let state = self.read();
        ClusterList {
            clusters: state.clusters.clone(),
            selected: state.selection.selected_cluster.clone(),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        self.read().snapshot.clone()
    }

    pub fn selection(&self) -> FilterSelection {
        self.read().selection.clone()
    }

    pub fn last_error(&self) -> Option<ErrorInfo> {
        self.read().last_error.clone()
    }

    pub fn using_fallback_data(&self) -> bool {
        self.read().using_fallback_data
    }

    pub fn is_refreshing(&self) -> bool {
        self.read().refreshing
    }

    // --- Internals ---

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn server_side_namespace(&self) -> bool {
        self.settings.namespace_mode == NamespaceMode::Server
            && self.fetcher.supports_namespace_filter()
    }

    fn refresh_key(&self) -> RefreshKey {
        let state = self.read();
        let namespace = if self.server_side_namespace() {
            state.selection.namespace_filter().map(str::to_string)
        } else {
            None
        };
        RefreshKey {
            cluster: state.selection.selected_cluster.clone(),
            namespace,
        }
    }

    // The fetch runs on its own task so it completes and clears `pending`
    // even if every caller awaiting it is dropped. The outer task does the
    // cleanup so a panicking fetcher cannot leave `pending` set.
    fn spawn_refresh(self: &Arc<Self>, key: RefreshKey) -> Shared<BoxFuture<'static, ()>> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let fetch = tokio::spawn({
                let store = Arc::clone(&store);
                async move { store.run_refresh(key).await }
            });
            if let Err(e) = fetch.await {
                warn!("refresh task failed: {}", e);
            }
            store.write().refreshing = false;
            *store.pending.lock().await = None;
        })
        .map(|_| ())
        .boxed()
        .shared()
    }

    async fn run_refresh(&self, key: RefreshKey) {
        self.write().refreshing = true;

        let result = self
            .with_timeout(
                self.fetcher
                    .fetch_snapshot(key.cluster.as_deref(), key.namespace.as_deref()),
            )
            .await;

        match result {
            Ok(mut snapshot) => {
                if self.refresh_key() != key {
                    debug!("discarding snapshot for superseded selection {:?}", key);
                } else {
                    snapshot.timestamp = Some(Utc::now());
                    info!(
                        "refreshed resources: {} pods, {} deployments, {} services, {} nodes",
                        snapshot.pods.len(),
                        snapshot.deployments.len(),
                        snapshot.services.len(),
                        snapshot.nodes.len()
                    );
                    let mut state = self.write();
                    state.snapshot = snapshot;
                    state.last_error = None;
                    state.using_fallback_data = false;
                }
            }
            Err(e) => {
                if self.refresh_key() != key {
                    debug!("ignoring failure for superseded selection {:?}: {}", key, e);
                } else {
                    self.handle_refresh_failure(e).await;
                }
            }
        }
    }

    async fn handle_refresh_failure(&self, err: FetchError) {
        warn!("error refreshing resources: {}", err);
        let already_fallback = {
            let mut state = self.write();
            state.last_error = Some(ErrorInfo::new("refresh", &err));
            state.using_fallback_data
        };
        if already_fallback {
            return;
        }

        match self.with_timeout(self.fetcher.fetch_mock_snapshot()).await {
            Ok(mut snapshot) => {
                info!("falling back to mock data");
                snapshot.timestamp = Some(Utc::now());
                let mut state = self.write();
                state.snapshot = snapshot;
                state.using_fallback_data = true;
            }
            Err(e) => warn!("fallback data unavailable: {}", e),
        }
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        let limit = self.settings.fetch_timeout;
        match time::timeout(limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(FetchError::Timeout(limit)),
        }
    }
}
