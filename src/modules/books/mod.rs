pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use shelf_db::Database;
use shelf_kernel::{InitCtx, Migration, Module};

use repository::SqliteBookRepository;
use service::BookService;

/// Books module: CRUD and title pagination over the `books` table
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.path,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let (router, _) = routes::router().split_for_parts();
        router.with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let (_, api) = routes::router().split_for_parts();
        match serde_json::to_value(api) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(module = self.name(), error = %e, "failed to serialize OpenAPI");
                None
            }
        }
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: repository::CREATE_BOOKS,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let stored = self.service.all()?.len();
        tracing::info!(module = self.name(), stored, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over `db`
pub fn create_module(db: &Database) -> Arc<dyn Module> {
    let repo = Arc::new(SqliteBookRepository::new(db.clone()));
    Arc::new(BooksModule::new(BookService::new(repo)))
}
