use axum::body::Body;
use issuetracker::app::{AppState, build_router};
use issuetracker::store::IssueStore;
use std::sync::Arc;

pub type App = axum::routing::RouterIntoService<Body, ()>;

pub fn app_with_store(store: Arc<dyn IssueStore>) -> App {
    build_router(AppState::new(store)).into_service()
}

pub fn memory_app() -> App {
    app_with_store(Arc::new(issuetracker::store::memory::InMemoryStore::new()))
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
