//! Sync Orchestrator
//!
//! Single entry point for the presentation layer. Sequences sparse pulls,
//! tree refreshes, and mutations, and owns the two guarantees the lower layers
//! do not provide:
//!
//! - last navigation wins: each `navigate` call takes a generation, and a call
//!   that completes after a newer one started reports `Superseded`;
//! - overlapping mutations are serialized out: while a mutation on a path is
//!   in flight, mutations on that path, its ancestors, or its descendants are
//!   rejected with [`SyncError::PathBusy`].

mod guard;
mod state;

pub use guard::{PathGuard, PathLocks};
pub use state::{
    MutationReceipt, NavigationOutcome, OpState, OperationEvent, OperationKind,
    OperationObserver, TreeView,
};

use crate::config::{SyncConfig, SyncPolicyConfig};
use crate::error::SyncError;
use crate::mutator::{MutationOp, WorkspaceMutator};
use crate::navigator::SparseNavigator;
use crate::transport::{HttpTransport, Transport};
use crate::tree::{DefaultWorkspaceTree, SyncHealth, TreeCache, TreeSnapshot, WorkspacePath};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct SyncOrchestrator {
    cache: TreeCache,
    navigator: SparseNavigator,
    mutator: WorkspaceMutator,
    locks: PathLocks,
    policy: SyncPolicyConfig,
    navigation_generation: AtomicU64,
    operation_ids: AtomicU64,
    observer: Option<OperationObserver>,
}

impl SyncOrchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        fallback: DefaultWorkspaceTree,
        policy: SyncPolicyConfig,
    ) -> Self {
        Self {
            cache: TreeCache::new(Arc::clone(&transport), fallback),
            navigator: SparseNavigator::new(Arc::clone(&transport)),
            mutator: WorkspaceMutator::new(transport),
            locks: PathLocks::new(),
            policy,
            navigation_generation: AtomicU64::new(0),
            operation_ids: AtomicU64::new(0),
            observer: None,
        }
    }

    /// Build the production stack from a loaded configuration.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.api)?);
        let fallback = DefaultWorkspaceTree::from_policy(&config.sync)?;
        info!(base_url = transport.base_url(), "workspace sync initialized");
        Ok(Self::new(transport, fallback, config.sync.clone()))
    }

    pub fn with_observer(mut self, observer: impl Fn(&OperationEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    pub fn locks(&self) -> &PathLocks {
        &self.locks
    }

    pub fn snapshot(&self) -> Option<Arc<TreeSnapshot>> {
        self.cache.current()
    }

    pub fn health(&self) -> Option<SyncHealth> {
        self.cache.health()
    }

    /// Listing for `path` from the cached tree, without touching the network.
    pub fn view(&self, path: &WorkspacePath) -> Option<TreeView> {
        self.cache
            .current()
            .map(|snapshot| TreeView::from_snapshot(path.clone(), snapshot))
    }

    /// Generation of the most recently started navigation.
    pub fn latest_generation(&self) -> u64 {
        self.navigation_generation.load(Ordering::SeqCst)
    }

    fn next_operation(&self) -> u64 {
        self.operation_ids.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn emit(
        &self,
        operation: u64,
        kind: OperationKind,
        path: &WorkspacePath,
        state: OpState,
        error: Option<String>,
    ) {
        debug!(
            operation,
            kind = ?kind,
            path = %path,
            state = state.as_str(),
            "operation state changed"
        );
        if let Some(observer) = &self.observer {
            observer(&OperationEvent {
                operation,
                kind,
                path: path.to_string(),
                state,
                error,
            });
        }
    }

    /// Fetch the tree and install it in the cache. Never fails.
    pub async fn refresh(&self) -> Arc<TreeSnapshot> {
        let operation = self.next_operation();
        let root = WorkspacePath::root();
        self.emit(operation, OperationKind::Refresh, &root, OpState::Pending, None);
        let snapshot = self.cache.refresh().await;
        self.emit(operation, OperationKind::Refresh, &root, OpState::Applied, None);
        snapshot
    }

    /// Navigate into `path`: sparse-pull it, refresh the tree when the pull
    /// materialized new content or nothing is cached yet, and return the view.
    #[instrument(skip(self, path), fields(path = %path))]
    pub async fn navigate(&self, path: &WorkspacePath) -> Result<NavigationOutcome, SyncError> {
        let generation = self.navigation_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let operation = self.next_operation();
        self.emit(operation, OperationKind::Navigate, path, OpState::Pending, None);

        let pulled = self.navigator.sparse_pull(path).await;
        if let Some(outcome) = self.superseded(generation) {
            if let Err(e) = &pulled {
                warn!(generation, error = %e, "sparse pull failed for superseded navigation");
            }
            self.emit(operation, OperationKind::Navigate, path, OpState::Superseded, None);
            return Ok(outcome);
        }

        let pulled = match pulled {
            Ok(pulled) => pulled,
            Err(e) => {
                self.emit(
                    operation,
                    OperationKind::Navigate,
                    path,
                    OpState::Failed,
                    Some(e.to_string()),
                );
                return Err(e);
            }
        };

        let (snapshot, refreshed) = match (pulled.materialized, self.cache.current()) {
            (false, Some(snapshot)) => (snapshot, false),
            _ => (self.cache.refresh().await, true),
        };

        if let Some(outcome) = self.superseded(generation) {
            self.emit(operation, OperationKind::Navigate, path, OpState::Superseded, None);
            return Ok(outcome);
        }

        self.emit(operation, OperationKind::Navigate, path, OpState::Applied, None);
        Ok(NavigationOutcome::Applied {
            view: TreeView::from_snapshot(path.clone(), snapshot),
            refreshed,
        })
    }

    fn superseded(&self, generation: u64) -> Option<NavigationOutcome> {
        let latest = self.latest_generation();
        if latest == generation {
            return None;
        }
        info!(generation, latest, "discarding superseded navigation");
        Some(NavigationOutcome::Superseded { generation, latest })
    }

    /// Run one mutation, then reconcile the cached tree.
    #[instrument(skip(self, op), fields(op = op.name()))]
    pub async fn mutate(&self, op: MutationOp) -> Result<MutationReceipt, SyncError> {
        let operation = self.next_operation();
        let kind = kind_of(&op);
        let path = op.affected_path();

        let guard = if self.policy.guard_concurrent_mutations {
            match self.locks.try_acquire(&path) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    warn!(path = %path, "mutation rejected, path busy");
                    self.emit(operation, kind, &path, OpState::Failed, Some(e.to_string()));
                    return Err(e);
                }
            }
        } else {
            None
        };
        self.emit(operation, kind, &path, OpState::Pending, None);

        let created_folder = match &op {
            MutationOp::CreateFolder {
                base_dir,
                folder_name,
            } => Some((base_dir.clone(), folder_name.clone())),
            _ => None,
        };

        let result = self.mutator.apply(op).await;
        drop(guard);

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                warn!(path = %path, error = %e, "mutation failed");
                self.emit(operation, kind, &path, OpState::Failed, Some(e.to_string()));
                return Err(e);
            }
        };

        if let Some((base_dir, folder_name)) = created_folder {
            if self.cache.apply_created_folder(&base_dir, &folder_name) {
                debug!(folder = %folder_name, "added created folder to cached tree");
            }
        }

        let health = if self.policy.refresh_after_mutation {
            Some(self.cache.refresh().await.health)
        } else {
            self.cache.health()
        };

        self.emit(operation, kind, &path, OpState::Applied, None);
        Ok(MutationReceipt {
            payload,
            path,
            health,
        })
    }
}

fn kind_of(op: &MutationOp) -> OperationKind {
    match op {
        MutationOp::Upload(_) => OperationKind::Upload,
        MutationOp::CreateFolder { .. } => OperationKind::CreateFolder,
        MutationOp::Delete { .. } => OperationKind::Delete,
        MutationOp::Export { .. } => OperationKind::Export,
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .field("latest_generation", &self.latest_generation())
            .finish()
    }
}
