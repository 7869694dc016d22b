//! SHELF Application Library
//!
//! Wires the project modules onto the kernel, storage, and HTTP layers.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use shelf_db::Database;
use shelf_kernel::{InitCtx, ModuleRegistry, Settings};

pub mod modules;

/// A bootstrapped application: storage opened, modules initialized,
/// migrated, and started.
pub struct App {
    settings: Settings,
    registry: ModuleRegistry,
}

impl App {
    /// Open storage and bring every module up.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::open(&settings.database.path)
            .with_context(|| format!("failed to open database '{}'", settings.database.path))?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;
        registry.run_migrations(&db)?;
        registry.start_modules(&ctx).await?;

        tracing::info!(modules = registry.len(), "shelf-app bootstrap complete");

        Ok(Self { settings, registry })
    }

    /// The fully layered HTTP router.
    pub fn router(&self) -> Router {
        shelf_http::build_router(&self.registry, &self.settings)
    }

    /// Merged OpenAPI document for every module.
    pub fn openapi(&self) -> serde_json::Value {
        shelf_http::openapi::merged_openapi(&self.registry, &self.settings.server)
    }

    /// Serve HTTP until `shutdown` resolves, then stop every module.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = shelf_http::start_server(&self.registry, &self.settings, shutdown).await;
        self.registry.stop_modules().await?;
        served
    }

    /// Stop every module without serving.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_modules().await
    }
}

/// Bootstrap and serve until Ctrl-C or SIGTERM.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        "shelf-app bootstrap starting"
    );

    App::bootstrap(settings)
        .await?
        .serve(shelf_http::shutdown_signal())
        .await
}
