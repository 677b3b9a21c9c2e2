//! Server lifecycle.
//!
//! [`PortalServer`] wires the local grid backend, the session store, the
//! renderer and the router together and serves them until shut down.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backend::{ConfiguredResources, ConfiguredUsers, LocalGrid};
use crate::config::Config;
use crate::controller::CollectionController;
use crate::render::ViewRenderer;
use crate::router::{build_router, AppState, RouterSettings};
use crate::session::SessionStore;

/// Interval between idle-session sweeps.
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Lifecycle state of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not serving.
    Stopped,
    /// Accepting requests.
    Running,
    /// Draining in-flight requests.
    ShuttingDown,
}

/// The HTTP portal.
pub struct PortalServer {
    config: Config,
    state: Arc<RwLock<ServerState>>,
    app_state: AppState,
    shutdown_token: CancellationToken,
}

impl PortalServer {
    /// Build the server from a validated configuration.
    ///
    /// Creates the local grid root and the home collections of every
    /// configured user.
    pub fn new(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let grid = LocalGrid::new(config.grid.zone.clone(), config.grid.root.clone());
        let users = ConfiguredUsers::new(&config.grid.zone, &config.users);
        grid.provision(users.usernames())
            .with_context(|| format!("Failed to provision {}", config.grid.root.display()))?;
        info!(
            zone = %config.grid.zone,
            root = %config.grid.root.display(),
            users = users.len(),
            "Local grid ready"
        );

        let resources = ConfiguredResources::new(&config.grid.zone, &config.grid.resources);
        let controller = Arc::new(CollectionController::new(
            Arc::new(grid),
            Arc::new(resources),
            Arc::new(users),
        ));

        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.session.idle_timeout_secs,
        )));
        let renderer = Arc::new(ViewRenderer::new().context("Failed to load templates")?);

        let app_state = AppState::new(
            controller,
            sessions,
            renderer,
            RouterSettings {
                user_header: config.auth.user_header.clone(),
                default_user: config.auth.default_user.clone(),
                request_header: config.ui.header.clone(),
            },
        );

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            app_state,
            shutdown_token: CancellationToken::new(),
        })
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// The router serving all routes.
    pub fn app(&self) -> Router {
        build_router(self.app_state.clone())
    }

    /// Bind the configured address and serve until [`stop`](Self::stop) or
    /// `signal` completes.
    pub async fn run<F>(&self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve(listener, signal).await
    }

    /// Serve on an already bound listener.
    pub async fn serve<F>(&self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Stopped {
                anyhow::bail!("Server is already running");
            }
            *state = ServerState::Running;
        }

        let local: SocketAddr = listener.local_addr()?;
        info!("Gridview listening on http://{}", local);

        self.app_state.sessions().start_cleanup_task(
            Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS),
            self.shutdown_token.clone(),
        );
        debug!("Started session cleanup task");

        let token = self.shutdown_token.clone();
        let state = Arc::clone(&self.state);
        let shutdown = async move {
            tokio::select! {
                _ = signal => {}
                _ = token.cancelled() => {}
            }
            *state.write().await = ServerState::ShuttingDown;
            token.cancel();
            info!("Shutting down, draining requests");
        };

        let result = axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed");

        *self.state.write().await = ServerState::Stopped;
        info!("Gridview stopped");
        result
    }

    /// Ask a running server to shut down.
    pub fn stop(&self) {
        self.shutdown_token.cancel();
    }

    /// Token cancelled when the server shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Session store of the running server.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.app_state.sessions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserEntry;
    use grid::UserType;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.bind = "127.0.0.1:0".to_string();
        config.grid.root = temp_dir.path().join("grid");
        config.users = vec![UserEntry {
            username: "alice".to_string(),
            user_type: UserType::RodsUser,
            force_file_overwriting: false,
        }];
        config
    }

    #[tokio::test]
    async fn test_server_creation_provisions_homes() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);

        let server = PortalServer::new(config).unwrap();
        assert_eq!(server.state().await, ServerState::Stopped);
        assert!(temp_dir.path().join("grid/home/alice").is_dir());
        assert!(temp_dir.path().join("grid/home/public").is_dir());
        assert!(server.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir);
        config.grid.zone = "bad/zone".to_string();

        assert!(PortalServer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_serve_and_stop() {
        let temp_dir = TempDir::new().unwrap();
        let server = Arc::new(PortalServer::new(create_test_config(&temp_dir)).unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            running
                .serve(listener, std::future::pending::<()>())
                .await
        });

        // Wait for the state to flip before stopping
        for _ in 0..50 {
            if server.state().await == ServerState::Running {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(server.state().await, ServerState::Running);

        server.stop();
        handle.await.unwrap().unwrap();
        assert_eq!(server.state().await, ServerState::Stopped);
        assert!(server.shutdown_token().is_cancelled());
    }
}
