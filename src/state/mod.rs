pub mod listing;
pub mod selection;
pub mod session;
pub mod workspace;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::doc_store::DocumentStore, identity::IdentityProvider};

pub use self::{
    listing::{NextPage, PagedListing},
    selection::{Selection, StaleSelection},
    session::{Session, SessionManager},
    workspace::Workspace,
};

pub type SharedState = Arc<AppState>;

/// Central application state: store handle, identity provider and sessions.
pub struct AppState {
    store: RwLock<Option<Arc<dyn DocumentStore>>>,
    degraded: watch::Sender<bool>,
    sessions: SessionManager,
    identity: Arc<dyn IdentityProvider>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, identity: Arc<dyn IdentityProvider>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            sessions: SessionManager::new(),
            identity,
            config,
        })
    }

    /// Obtain a handle to the current document store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new document store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn DocumentStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::doc_store::memory::MemoryDocumentStore, identity::memory::MemoryIdentityProvider};

    #[tokio::test]
    async fn installing_store_leaves_degraded_mode() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryIdentityProvider::new()),
        );
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded());
        assert!(state.store().await.is_none());

        state.install_store(Arc::new(MemoryDocumentStore::new())).await;
        assert!(!state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());

        state.clear_store().await;
        assert!(state.is_degraded());
    }
}
