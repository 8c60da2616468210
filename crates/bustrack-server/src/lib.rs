//! REST server for the bustrack vehicle registry.
//!
//! Routes (all JSON unless noted):
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/` | liveness text |
//! | GET | `/health` | `{status, store}` |
//! | GET, POST | `/api/buses` | list, create (201) |
//! | GET, PUT | `/api/buses/{id}` | fetch, full replace |
//! | POST | `/api/track/{id}` | tracking acknowledgement |
//!
//! Errors come back as `{"error": "..."}`. A store that fails to open
//! leaves the server up and answering 503, unless `fail_fast` is set.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use bustrack_config::{Config, ServerSettings};

pub mod error;
pub mod registry;
pub mod routes;
pub mod seed;
pub mod state;
pub mod storage;

pub use error::{RegistryError, ServerError, StorageError};
pub use registry::Registry;
pub use state::AppState;
pub use storage::StoreUrl;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route(
            "/api/buses",
            get(routes::list_buses).post(routes::create_bus),
        )
        .route(
            "/api/buses/{id}",
            get(routes::get_bus).put(routes::update_bus),
        )
        .route("/api/track/{id}", post(routes::track_bus))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the configured store. Without `fail_fast` a failure yields an
/// unavailable registry instead of an error.
pub async fn open_registry(settings: &ServerSettings) -> Result<Registry, ServerError> {
    let secret = settings.store_url();
    let opened = match secret.expose_secret().parse::<StoreUrl>() {
        Ok(url) => Registry::open(&url).await,
        Err(e) => Err(e),
    };

    match opened {
        Ok(registry) => Ok(registry),
        Err(e) if settings.fail_fast => Err(ServerError::Store(e)),
        Err(e) => {
            error!(
                store = %settings.redacted_store_url(),
                error = %e,
                "bus store failed to open, registry requests will answer 503"
            );
            Ok(Registry::unavailable(e.to_string()))
        }
    }
}

// ── Running server ──────────────────────────────────────────────────

/// Handle to a server running on a background task.
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL of the REST API, e.g. `http://127.0.0.1:5000/api`.
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.local_addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.cancel.cancel();
        self.handle
            .await
            .map_err(|e| ServerError::Io(std::io::Error::other(e)))?
    }
}

/// Bind `addr` and serve `state` on a background task.
pub async fn spawn(addr: SocketAddr, state: AppState) -> Result<RunningServer, ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "bustrack server listening");

    let cancel = CancellationToken::new();
    let stop = cancel.clone().cancelled_owned();
    let app = router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(stop)
            .await
            .map_err(ServerError::from)
    });

    Ok(RunningServer {
        local_addr,
        cancel,
        handle,
    })
}

/// Run the server until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config) -> Result<(), ServerError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;
    let registry = open_registry(&config.server).await?;
    let server = spawn(addr, AppState::new(registry)).await?;

    shutdown_signal().await;
    server.shutdown().await?;
    info!("bustrack server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl-C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
