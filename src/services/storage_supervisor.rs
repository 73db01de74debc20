use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{doc_store::DocumentStore, storage::StorageError},
    state::SharedState,
};

/// Timings of the supervision loop.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub health_poll_interval: Duration,
    pub max_reconnect_attempts: u32,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

impl SupervisorPolicy {
    fn backoff(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

/// Connect to the document store and keep the shared state in degraded mode while it is unreachable.
pub async fn run<F, Fut>(state: SharedState, policy: SupervisorPolicy, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn DocumentStore>, StorageError>> + Send,
{
    let mut delay = policy.initial_delay;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = policy.initial_delay;

                watch_health(&state, &policy, store.as_ref()).await;

                warn!("exhausted storage reconnect attempts; connecting from scratch");
                state.clear_store().await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = policy.backoff(delay);
    }
}

/// Poll the store until it stays unreachable after every reconnect attempt.
async fn watch_health(state: &SharedState, policy: &SupervisorPolicy, store: &dyn DocumentStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded() {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false);
            }
            sleep(policy.health_poll_interval).await;
            continue;
        }

        let mut reconnect_delay = policy.initial_delay;
        let mut reconnected = false;
        for attempt in 0..policy.max_reconnect_attempts {
            match store.try_reconnect().await {
                Ok(()) => {
                    info!(attempt, "storage reconnected after failed health check");
                    reconnected = true;
                    break;
                }
                Err(err) => {
                    if attempt == 0 {
                        warn!(attempt, error = %err, "storage reconnect failed; entering degraded mode");
                        state.update_degraded(true);
                    } else {
                        warn!(attempt, error = %err, "storage reconnect attempt failed");
                    }
                    sleep(reconnect_delay).await;
                    reconnect_delay = policy.backoff(reconnect_delay);
                }
            }
        }

        if !reconnected {
            return;
        }
        state.update_degraded(false);
        sleep(policy.health_poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{
        config::AppConfig, dao::doc_store::memory::MemoryDocumentStore,
        identity::memory::MemoryIdentityProvider, state::AppState,
    };

    fn fast_policy() -> SupervisorPolicy {
        SupervisorPolicy {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            health_poll_interval: Duration::from_millis(5),
            max_reconnect_attempts: 1,
        }
    }

    #[tokio::test]
    async fn installs_store_once_connected() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryIdentityProvider::new()));
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let mut degraded = state.degraded_watcher();
        let task = tokio::spawn(run(state.clone(), fast_policy(), move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(StorageError::unavailable(
                        "not yet".into(),
                        std::io::Error::other("refused"),
                    ))
                } else {
                    Ok(Arc::new(MemoryDocumentStore::new()) as Arc<dyn DocumentStore>)
                }
            }
        }));

        tokio::time::timeout(Duration::from_secs(2), degraded.wait_for(|value| !*value))
            .await
            .unwrap()
            .unwrap();
        assert!(state.store().await.is_some());
        assert!(attempts.load(Ordering::SeqCst) >= 3);
        task.abort();
    }
}
