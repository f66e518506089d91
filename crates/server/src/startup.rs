use std::{future::Future, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;
use service::{
    storage::memory::MemoryStudentRepository,
    student::{
        repository::{MongoStudentRepository, StudentRepository},
        service::StudentService,
    },
};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Construct the store selected by `database.url` and wrap it in the service.
pub async fn build_service(cfg: &AppConfig) -> anyhow::Result<Arc<StudentService>> {
    let repo: Arc<dyn StudentRepository> = if cfg.database.is_memory() {
        warn!("using in-memory student store; data is lost on exit");
        Arc::new(MemoryStudentRepository::new())
    } else {
        Arc::new(MongoStudentRepository::connect(&cfg.database).await?)
    };
    Ok(Arc::new(StudentService::new(repo, cfg.service.list_cap)))
}

pub fn build_app(students: Arc<StudentService>) -> Router {
    routes::build_router(AppState { students }, build_cors())
}

/// Connect the store, serve until `shutdown` resolves, drain in-flight
/// requests, then close the store.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let students = build_service(&cfg).await?;
    let app = build_app(Arc::clone(&students));

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting student records server");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;

    students.close().await;
    info!("document store closed");
    served?;
    Ok(())
}
