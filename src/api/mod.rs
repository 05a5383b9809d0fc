//! HTTP API
//!
//! REST endpoints for the catalog, likes, history, generation, scheduler,
//! and playback control, plus the SSE event stream and static media
//! serving. All handlers share one `AppContext`.

pub mod handlers;
pub mod playback;
pub mod sse;

use crate::config::Config;
use crate::events::EventBus;
use crate::generate::ContentGenerator;
use crate::playback::PlaybackEngine;
use crate::scheduler::BackgroundScheduler;
use crate::storage::BlobStore;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppContext {
    pub db: SqlitePool,
    pub engine: Arc<PlaybackEngine>,
    pub bus: EventBus,
    pub store: BlobStore,
    pub generator: ContentGenerator,
    pub scheduler: Arc<BackgroundScheduler>,
    pub config: Arc<Config>,
}

/// Build the service router
pub fn create_router(ctx: AppContext) -> Router {
    let media_root = ctx.config.media_root();

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                // Catalog
                .route(
                    "/tracks",
                    get(handlers::list_tracks).post(handlers::create_track),
                )
                .route("/tracks/upload", post(handlers::upload_track))
                .route(
                    "/tracks/:id",
                    get(handlers::get_track)
                        .put(handlers::update_track)
                        .delete(handlers::delete_track),
                )
                .route("/tracks/:id/play", post(handlers::record_play))
                // User state
                .route(
                    "/likes",
                    get(handlers::like_status).post(handlers::toggle_like),
                )
                .route(
                    "/history",
                    get(handlers::list_history).post(handlers::record_history),
                )
                // Generation and scheduling
                .route("/generate", post(handlers::generate_track))
                .route("/scheduler/start", post(handlers::scheduler_start))
                .route("/scheduler/stop", post(handlers::scheduler_stop))
                .route("/scheduler/status", get(handlers::scheduler_status))
                // Playback control
                .route("/playback/queue", post(playback::set_queue))
                .route("/playback/toggle", post(playback::toggle_play))
                .route("/playback/next", post(playback::play_next))
                .route("/playback/previous", post(playback::play_previous))
                .route("/playback/seek", post(playback::seek))
                .route("/playback/volume", post(playback::set_volume))
                .route("/playback/crossfade", post(playback::crossfade_to_next))
                .route("/playback/state", get(playback::get_state))
                // Events
                .route("/events", get(sse::event_stream)),
        )
        .nest_service("/media", ServeDir::new(media_root))
        // Headroom over the audio cap for the other multipart fields
        .layer(DefaultBodyLimit::max(handlers::MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// GET /health - liveness check
async fn health(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "port": ctx.config.port,
    }))
}
