//! Stat Tracker Back binary entrypoint wiring REST, SSE, identity and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stat_tracker_back::{
    config::AppConfig,
    dao::{
        doc_store::{DocumentStore, memory::MemoryDocumentStore},
        storage::StorageError,
    },
    identity::{
        IdentityProvider,
        memory::MemoryIdentityProvider,
        toolkit::{ToolkitConfig, ToolkitIdentityProvider},
    },
    routes,
    services::{
        session_service,
        storage_supervisor::{self, SupervisorPolicy},
    },
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let identity = build_identity(&config)?;
    let app_state = AppState::new(config, identity);

    spawn_storage_supervisor(app_state.clone())?;
    tokio::spawn(session_service::run_session_sweeper(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(app_state))
        .await
        .context("serving axum")?;

    Ok(())
}

/// Use the hosted identity toolkit when an API key is configured, the in-process provider otherwise.
fn build_identity(config: &AppConfig) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    match ToolkitConfig::from_env(config.request_timeout) {
        Some(toolkit) => {
            let provider =
                ToolkitIdentityProvider::new(toolkit).context("building identity client")?;
            info!("using hosted identity provider");
            Ok(Arc::new(provider))
        }
        None => {
            warn!("IDENTITY_API_KEY not set; using in-memory identity provider");
            Ok(Arc::new(MemoryIdentityProvider::new()))
        }
    }
}

/// Start the supervision loop of the backend selected by `STORAGE_BACKEND`.
fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".into());
    let policy = SupervisorPolicy::default();
    info!(%backend, "selected storage backend");

    match backend.as_str() {
        "memory" => {
            let store = MemoryDocumentStore::new();
            tokio::spawn(storage_supervisor::run(state, policy, move || {
                let store = store.clone();
                async move { Ok::<Arc<dyn DocumentStore>, StorageError>(Arc::new(store)) }
            }));
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use stat_tracker_back::dao::doc_store::couchdb::{CouchConfig, CouchDocumentStore};

            let timeout = state.config().request_timeout;
            let couch = CouchConfig::from_env()
                .context("reading CouchDB configuration")?
                .with_timeout(timeout);
            tokio::spawn(storage_supervisor::run(state, policy, move || {
                let couch = couch.clone();
                async move {
                    let store = CouchDocumentStore::connect(couch).await?;
                    Ok::<Arc<dyn DocumentStore>, StorageError>(Arc::new(store))
                }
            }));
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use stat_tracker_back::dao::doc_store::mongodb::{MongoConfig, MongoDocumentStore};

            tokio::spawn(storage_supervisor::run(state, policy, || async {
                let mongo = MongoConfig::from_env().await?;
                let store = MongoDocumentStore::connect(mongo).await?;
                Ok::<Arc<dyn DocumentStore>, StorageError>(Arc::new(store))
            }));
        }
        other => anyhow::bail!("unsupported STORAGE_BACKEND `{other}`"),
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM, then sign every session out so SSE streams end.
async fn shutdown_signal(state: SharedState) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    let closed = state.sessions().close_all();
    info!(closed, "shutting down");
}
