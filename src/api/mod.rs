mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::WorkspaceConfig;
use crate::generation::{CommandRunner, GenerationOrchestrator, ProcessExecutor, WorkerPool};
use crate::platform::{Platform, PlatformAdapter};
use crate::store::ProjectStore;

/// Largest accepted thumbnail upload.
const THUMBNAIL_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: ProjectStore,
    pub generator: GenerationOrchestrator,
}

impl AppState {
    /// Wire the store and generator with a custom command runner.
    pub fn with_runner(config: &WorkspaceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let store = ProjectStore::new(config.projects_dir.clone());
        let platform = Arc::new(PlatformAdapter::new(config.tool_lookup_timeout()));
        let workers = WorkerPool::new(runner, config.max_concurrent_generations);
        let generator =
            GenerationOrchestrator::new(store.clone(), platform, workers, config.tool.clone());
        Self { store, generator }
    }

    /// Wire the store and generator to run the real tool through the platform shell.
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let platform = Platform::current();
        tracing::info!("Running on {}", platform.as_str());
        Self::with_runner(config, Arc::new(ProcessExecutor::new(platform.shell())))
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/list", get(handlers::list_other_projects))
        .route("/projects/exit", post(handlers::exit_project))
        .route(
            "/projects/thumbnail",
            post(handlers::upload_thumbnail).layer(DefaultBodyLimit::max(THUMBNAIL_BODY_LIMIT)),
        )
        .route("/projects/{name}", delete(handlers::delete_project))
        .route("/projects/{name}/select", post(handlers::select_project))
        .route("/projects/{name}/rename", post(handlers::rename_project))
        .route("/projects/{name}/thumbnail", get(handlers::get_thumbnail))
        // Active project
        .route("/generate", post(handlers::generate))
        .route("/html", get(handlers::get_html))
        .route("/prompts", get(handlers::get_prompts))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
