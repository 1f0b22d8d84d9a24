use std::sync::Arc;

use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::InMemoryLibrary,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{DtoProjector, ItemStore, PeopleIndex, ResultProjector},
};

pub mod similar;

/// Collaborators shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub people: Arc<dyn PeopleIndex>,
    pub projector: Arc<dyn ResultProjector>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ItemStore>,
        people: Arc<dyn PeopleIndex>,
        projector: Arc<dyn ResultProjector>,
    ) -> Self {
        Self {
            store,
            people,
            projector,
        }
    }

    /// State serving everything from one in-memory library
    pub fn in_memory(library: InMemoryLibrary) -> Self {
        let store: Arc<dyn ItemStore> = Arc::new(library.clone());
        let projector = Arc::new(DtoProjector::new(store.clone()));
        Self::new(store, Arc::new(library), projector)
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/items/similar", get(similar::similar_to_root))
        .route("/items/:id/similar", get(similar::similar_items))
        .route("/movies/:id/similar", get(similar::similar_movies))
        .route("/shows/:id/similar", get(similar::similar_shows))
        .route("/albums/:id/similar", get(similar::similar_albums))
        .route("/artists/:id/similar", get(similar::similar_artists))
        .route("/trailers/:id/similar", get(similar::similar_trailers))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
