//! Server implementation.
//!
//! Main entry point for running the reporting service.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::engine::ReportDb;
use crate::error::{ReportError, ReportResult};
use crate::router::create_router;
use crate::templates::TemplateStore;

/// Shared state for the HTTP handlers.
pub struct AppState {
    pub db: ReportDb,
    pub templates: TemplateStore,
    pub config: ServerConfig,
}

/// The reporting server.
pub struct Server {
    config: ServerConfig,
    state: Option<Arc<AppState>>,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Initialize the server (connect to the database, set up state).
    pub async fn init(&mut self) -> ReportResult<()> {
        tracing::info!("Initializing reporting server...");

        tracing::info!(
            "Creating connection pool (max {} connections)...",
            self.config.max_connections
        );
        let db = ReportDb::connect(&self.config.database_url, self.config.max_connections).await?;

        self.state = Some(Arc::new(AppState {
            db,
            templates: TemplateStore::new(),
            config: self.config.clone(),
        }));

        tracing::info!("Server initialized");
        Ok(())
    }

    /// Start serving requests.
    ///
    /// # Errors
    /// Returns error if the server fails to bind or serve.
    pub async fn serve(&self) -> ReportResult<()> {
        let state = self.state.as_ref().ok_or_else(|| {
            ReportError::Config("Server not initialized. Call init() first.".to_string())
        })?;

        let router = create_router(Arc::clone(state));

        let addr = &self.config.bind_address;
        tracing::info!("Reporting server starting on {}", addr);
        tracing::info!("   GET  /health                 - Health check");
        tracing::info!("   POST /api/reports/run        - Run a report");
        tracing::info!("   GET  /api/reports/templates  - List saved templates");
        tracing::info!("   POST /api/reports/templates  - Save a template");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ReportError::Config(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ReportError::Execution(e.to_string()))?;

        Ok(())
    }
}

/// Builder for the server.
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Set the database URL.
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    /// Set the connection pool size.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.config.max_connections = n;
        self
    }

    /// Build the server.
    pub fn build(self) -> Server {
        Server::new(self.config)
    }

    /// Build and initialize the server.
    ///
    /// # Errors
    /// Returns error if initialization fails.
    pub async fn build_and_init(self) -> ReportResult<Server> {
        let mut server = self.build();
        server.init().await?;
        Ok(server)
    }
}
