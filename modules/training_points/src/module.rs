//! Module declaration and lifecycle

use crate::config::Config;
use crate::contract::TrainingPointsApi;
use crate::domain::{Paging, Service};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Training points module
///
/// Lifecycle: [`migrate`](Self::migrate), then [`init`](Self::init), then
/// either [`client`](Self::client) for in-process use or
/// [`register_rest`](Self::register_rest) / [`serve`](Self::serve) for HTTP.
pub struct TrainingPointsModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for TrainingPointsModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            service: RwLock::new(None),
        }
    }
}

impl TrainingPointsModule {
    /// Apply pending schema migrations
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Training points migrations completed");
        Ok(())
    }

    /// Build repositories and the domain service
    pub fn init(&self, cfg: Config, db: Arc<DatabaseConnection>) -> Result<()> {
        let paging = Paging {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        };
        *self.config.write() = cfg;

        let repos = crate::infra::storage::repositories(db);
        let service = Arc::new(Service::with_paging(repos, paging));
        *self.service.write() = Some(service);

        tracing::info!(
            default_page_size = paging.default_page_size,
            max_page_size = paging.max_page_size,
            "Training points service initialized"
        );
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// Native client for in-process callers
    pub fn client(&self) -> Result<Arc<dyn TrainingPointsApi>> {
        let client = crate::api::native::NativeClient::new(self.service()?);
        Ok(Arc::new(client))
    }

    /// Mount the REST routes on `router`
    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;
        tracing::info!("Registering training points REST routes");
        Ok(crate::api::rest::register_routes(router, service))
    }

    /// Serve the REST API until `cancel` fires
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let bind_addr = self.config.read().bind_addr.clone();
        let app = self
            .register_rest(axum::Router::new())?
            .layer(tower_http::trace::TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        tracing::info!(addr = %bind_addr, "Training points server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("Training points server stopped");
        Ok(())
    }
}
