// HTTP server implementation for the book catalog
// Serves the REST router and the GraphQL endpoint from one listener

use std::net::SocketAddr;
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router, Server,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::api;
use crate::engine::{
    graphql::{create_schema, BookCatalogSchema},
    repository::BookRepository,
    storage::BookStorage,
};
use crate::settings::{normalize_prefix, CatalogConfig};
use crate::{BookCatalogError, Result};

/// HTTP server configuration
#[derive(Clone, Debug)]
pub struct CatalogServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub rest_prefix: Option<String>,
}

impl Default for CatalogServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_enabled: true,
            rest_prefix: None,
        }
    }
}

impl From<&CatalogConfig> for CatalogServerConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            cors_enabled: config.cors_enabled,
            rest_prefix: config.normalized_rest_prefix(),
        }
    }
}

/// Book catalog HTTP server
///
/// Owns the repository for the lifetime of the process; both protocol
/// adapters share it.
pub struct CatalogServer {
    config: CatalogServerConfig,
    repository: BookRepository,
}

impl CatalogServer {
    pub fn new(repository: BookRepository) -> Self {
        Self {
            config: CatalogServerConfig::default(),
            repository,
        }
    }

    pub fn with_config(mut self, config: CatalogServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CatalogServerConfig {
        &self.config
    }

    pub fn repository(&self) -> &BookRepository {
        &self.repository
    }

    /// Build the full application router
    pub fn router(&self) -> Router {
        let schema = create_schema(self.repository.clone());
        let rest = api::create_router(self.repository.clone());

        let graphql = Router::new()
            .route("/graphql", get(graphiql).post(graphql_handler))
            .route("/playground", get(graphiql))
            .with_state(schema);

        let mut app = match &self.config.rest_prefix {
            Some(prefix) => Router::new().nest(prefix, rest),
            None => rest,
        };

        app = app
            .merge(graphql)
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            app = app.layer(CorsLayer::permissive());
        }

        app
    }

    fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        addr.parse()
            .map_err(|e| BookCatalogError::Config(format!("Invalid listen address {}: {}", addr, e)))
    }

    /// Run until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.socket_addr()?;
        let app = self.router();
        let rest_base = self.config.rest_prefix.clone().unwrap_or_default();

        info!("🚀 Book catalog running on http://{}", addr);
        info!("📚 REST API: http://{}{}/books", addr, rest_base);
        info!("🔗 GraphQL endpoint: http://{}/graphql", addr);
        info!("📊 GraphiQL interface: http://{}/playground", addr);
        info!("💾 Storage backend: {}", self.repository.backend_name());
        info!("CORS enabled: {}", self.config.cors_enabled);

        Server::try_bind(&addr)
            .map_err(|e| BookCatalogError::Server(format!("Failed to bind {}: {}", addr, e)))?
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| BookCatalogError::Server(e.to_string()))?;

        info!("👋 Book catalog stopped");
        Ok(())
    }
}

/// Builder for [`CatalogServer`]
pub struct CatalogServerBuilder {
    config: CatalogServerConfig,
    storage: Option<Arc<dyn BookStorage>>,
}

impl CatalogServerBuilder {
    pub fn new() -> Self {
        Self {
            config: CatalogServerConfig::default(),
            storage: None,
        }
    }

    pub fn with_config(mut self, config: CatalogServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    pub fn with_rest_prefix(mut self, prefix: &str) -> Self {
        self.config.rest_prefix = normalize_prefix(prefix);
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn BookStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the server; without an explicit storage it uses in-memory storage
    pub fn build(self) -> CatalogServer {
        let repository = match self.storage {
            Some(storage) => BookRepository::new(storage),
            None => BookRepository::in_memory(),
        };
        CatalogServer::new(repository).with_config(self.config)
    }

    pub async fn build_and_run(self) -> Result<()> {
        self.build().run().await
    }
}

impl Default for CatalogServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// GraphQL handler
async fn graphql_handler(
    State(schema): State<BookCatalogSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

// GraphiQL interface
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "book-catalog",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
