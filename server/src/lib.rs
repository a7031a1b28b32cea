//! MoodFlow HTTP and WebSocket server
pub mod error;
pub mod handlers;
pub mod realtime;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use moodflow_lib::service::CommonService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// `*` allows any origin; anything else must be a single origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    if origin.trim() == "*" {
        return Ok(CorsLayer::permissive());
    }
    let origin = origin
        .trim()
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin: {}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true))
}

pub fn create_router(service: CommonService, cors_origin: &str) -> Result<Router> {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze-emotion", post(handlers::analyze_emotion))
        .route("/analyze-emotion-image", post(handlers::analyze_emotion))
        .route("/get-recommendations", post(handlers::get_recommendations))
        .route("/analyze-mood", post(handlers::analyze_mood))
        .route("/search-spotify", post(handlers::search_spotify))
        .route("/playlists", get(handlers::list_playlists))
        .route("/create-playlist", post(handlers::create_playlist))
        .route("/playlist/:id/like", post(handlers::like_playlist));

    let app = Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(realtime::handle_websocket))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(false)))
        .layer(cors_layer(cors_origin)?)
        .with_state(service);

    Ok(app)
}
