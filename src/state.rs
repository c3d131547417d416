//! Application state: configuration, the shared dataset, and the session store.
//!
//! This module owns:
//!   - the dataset slot (loading -> ready | unavailable), filled once at boot
//!   - per-tab `SessionContext`s keyed by UUID
//!
//! Sessions pick up a late-arriving dataset lazily on their next access, and
//! are evicted by a background sweep once idle past the configured window.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::domain::Dataset;
use crate::error::ApiError;
use crate::session::SessionContext;

#[derive(Clone, Debug, Default)]
pub enum DatasetStatus {
    #[default]
    Loading,
    Ready(Arc<Dataset>),
    Unavailable,
}

impl DatasetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetStatus::Loading => "loading",
            DatasetStatus::Ready(_) => "ready",
            DatasetStatus::Unavailable => "unavailable",
        }
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            DatasetStatus::Ready(d) => Some(d),
            _ => None,
        }
    }
}

pub struct AppState {
    pub config: DashboardConfig,
    pub dataset: Arc<RwLock<DatasetStatus>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: Arc::new(RwLock::new(DatasetStatus::Loading)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// One-shot fetch of the configured dataset. No retries.
    #[instrument(level = "info", skip(self))]
    pub async fn load_dataset(&self) {
        let source = self.config.dataset_source();
        let loaded = catalog::load(&source).await;
        self.set_dataset(loaded).await;
    }

    pub async fn set_dataset(&self, dataset: Option<Dataset>) {
        let status = match dataset {
            Some(d) => DatasetStatus::Ready(Arc::new(d)),
            None => DatasetStatus::Unavailable,
        };
        info!(target: "dataset", status = status.label(), "Dataset status updated");
        *self.dataset.write().await = status;
    }

    pub async fn dataset_status(&self) -> DatasetStatus {
        self.dataset.read().await.clone()
    }

    pub async fn current_dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.read().await.dataset().cloned()
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        let dashboard = Dashboard::new(
            self.current_dataset().await,
            self.config.content_policy(),
            self.config.texts.clone(),
        );
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, SessionContext::new(id, dashboard));
        info!(target: "session", session = %id, open_sessions = sessions.len(), "Session created");
        id
    }

    /// Tear a session down, releasing its document.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(mut ctx) => {
                ctx.release_document();
                info!(target: "session", session = %id, "Session closed");
                true
            }
            None => {
                warn!(target: "session", session = %id, "Close requested for unknown session");
                false
            }
        }
    }

    /// Run `f` against a session after syncing its dashboard with the current dataset.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SessionContext, &DatasetStatus) -> R,
    ) -> Result<R, ApiError> {
        let status = self.dataset_status().await;
        let mut sessions = self.sessions.write().await;
        let ctx = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        ctx.touch();
        if ctx.dashboard.sync_dataset(status.dataset()) {
            info!(target: "dashboard", session = %id, status = status.label(), "Session adopted dataset");
        }
        Ok(f(ctx, &status))
    }

    /// Drop every session idle for at least `max_idle` as of `now`, releasing
    /// its document. Returns how many were evicted.
    pub async fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, ctx)| ctx.idle_for(now) >= max_idle)
            .map(|(id, _)| *id)
            .collect();
        for id in &idle {
            if let Some(mut ctx) = sessions.remove(id) {
                ctx.release_document();
                info!(target: "session", session = %id, idle_secs = ctx.idle_for(now).as_secs(), "Idle session evicted");
            }
        }
        idle.len()
    }

    /// Periodic eviction loop; spawned once at boot.
    pub async fn run_idle_sweeper(self: Arc<Self>, max_idle: Duration) {
        let period = max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = self.evict_idle(Instant::now(), max_idle).await;
            let open_sessions = self.sessions.read().await.len();
            debug!(target: "session", evicted, open_sessions, "Idle sweep finished");
        }
    }
}
