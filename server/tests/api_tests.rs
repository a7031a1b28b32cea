//! HTTP integration tests driving the router with in-process fakes
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use moodflow_lib::config::EmotionFallback;
use moodflow_lib::service::common_structs::{Song, SongId};
use moodflow_lib::service::language_model::{LanguageModel, ModelRequest};
use moodflow_lib::service::playlist_store::InMemoryPlaylistStore;
use moodflow_lib::service::recommendation_service::fallback_table::fallback_songs;
use moodflow_lib::service::spotify_service::MusicCatalog;
use moodflow_lib::service::CommonService;
use moodflow_server::create_router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const EMOTION_REPLY: &str = r#"{
    "emotions": {"happy": 0.85, "sad": 0.02, "angry": 0.01, "fearful": 0.01, "disgusted": 0.01, "surprised": 0.05, "neutral": 0.05},
    "dominant_emotion": "happy",
    "confidence": 0.85,
    "description": "Broad smile"
}"#;

const SONG_REPLY: &str = r#"[{"title": "Walking on Sunshine", "artist": "Katrina & The Waves", "genre": "Rock"}]"#;

/// Answers the emotion prompt when a tool is forced, the song prompt otherwise.
struct FakeModel {
    healthy: bool,
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, request: ModelRequest) -> Result<String> {
        if !self.healthy {
            bail!("model unavailable");
        }
        match request.tool {
            Some(_) => Ok(EMOTION_REPLY.to_owned()),
            None => Ok(SONG_REPLY.to_owned()),
        }
    }
}

struct FakeCatalog;

#[async_trait]
impl MusicCatalog for FakeCatalog {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Song>> {
        Ok((0..limit.min(3))
            .map(|i| Song {
                id: SongId::Catalog(format!("track-{}", i)),
                title: format!("{} {}", query, i),
                artist: "Catalog Artist".to_owned(),
                genre: "Unknown".to_owned(),
                duration: "3:00".to_owned(),
                cover: "https://i.scdn.co/image/cover".to_owned(),
                preview_url: None,
                spotify_url: Some(format!("https://open.spotify.com/track/track-{}", i)),
            })
            .collect())
    }
}

fn service(model: Option<FakeModel>, catalog: bool, fallback: EmotionFallback) -> CommonService {
    let model: Option<Arc<dyn LanguageModel>> = match model {
        Some(model) => Some(Arc::new(model)),
        None => None,
    };
    let catalog: Option<Arc<dyn MusicCatalog>> = if catalog { Some(Arc::new(FakeCatalog)) } else { None };
    CommonService::new(model, catalog, Arc::new(InMemoryPlaylistStore::new()), fallback, 16)
}

fn app(service: CommonService) -> Router {
    create_router(service, "http://localhost:3000").unwrap()
}

fn bare_app() -> Router {
    app(service(None, false, EmotionFallback::Reject))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn health_reports_capabilities() {
    let (status, body) = send(&bare_app(), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["ai"], false);
    assert_eq!(body["spotify"], false);
    assert_eq!(body["playlistStore"], "memory");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn recommendations_without_capabilities_use_table() {
    let (status, body) = send(&bare_app(), post_json("/api/get-recommendations", json!({"mood": "happy"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["aiPowered"], false);
    assert_eq!(body["spotifyPowered"], false);
    assert_eq!(body["recommendations"], serde_json::to_value(fallback_songs("happy")).unwrap());
}

#[tokio::test]
async fn blank_mood_is_rejected() {
    let app = bare_app();
    for body in [json!({"mood": "  "}), json!({})] {
        let (status, body) = send(&app, post_json("/api/get-recommendations", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn ai_recommendations_are_flagged() {
    let app = app(service(Some(FakeModel { healthy: true }), false, EmotionFallback::Reject));
    let body = json!({"mood": "happy", "userPreferences": {"favoriteGenres": ["rock"], "favoriteArtists": []}});
    let (status, body) = send(&app, post_json("/api/get-recommendations", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["aiPowered"], true);
    assert_eq!(body["spotifyPowered"], false);
    assert_eq!(body["recommendations"][0]["title"], "Walking on Sunshine");
    assert_eq!(body["recommendations"][0]["id"], 1);
}

#[tokio::test]
async fn emotion_without_model_is_unavailable() {
    let (status, body) = send(&bare_app(), post_json("/api/analyze-emotion", json!({"image": "aGVsbG8="}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn emotion_requires_image() {
    let (status, _) = send(&bare_app(), post_json("/api/analyze-emotion", json!({"image": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&bare_app(), post_json("/api/analyze-emotion", json!({"image": "%%%"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn emotion_is_classified_by_model() {
    let app = app(service(Some(FakeModel { healthy: true }), false, EmotionFallback::Reject));
    let body = json!({"image": "data:image/png;base64,aGVsbG8=", "timestamp": "2024-05-01T10:00:00Z"});
    let (status, body) = send(&app, post_json("/api/analyze-emotion-image", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"]["dominant"], "happy");
    assert_eq!(body["analysis"]["confidence"], 0.85);
    assert_eq!(body["analysis"]["timestamp"], "2024-05-01T10:00:00Z");
    assert!(body["analysis"].get("simulated").is_none());
}

#[tokio::test]
async fn failing_model_maps_to_bad_gateway() {
    let app = app(service(Some(FakeModel { healthy: false }), false, EmotionFallback::Reject));
    let (status, _) = send(&app, post_json("/api/analyze-emotion", json!({"image": "aGVsbG8="}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn simulate_policy_synthesizes_analysis() {
    let app = app(service(None, false, EmotionFallback::Simulate));
    let (status, body) = send(&app, post_json("/api/analyze-emotion", json!({"image": "aGVsbG8="}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["simulated"], true);
    let confidence = body["analysis"]["confidence"].as_f64().unwrap();
    assert!((0.7..=1.0).contains(&confidence));
}

#[tokio::test]
async fn analyze_mood_reduces_scores() {
    let body = json!({"emotionData": {"happy": 0.1, "sad": 0.7, "angry": 0.05, "neutral": 0.1, "surprised": 0.05}});
    let (status, body) = send(&bare_app(), post_json("/api/analyze-mood", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood"]["dominant"], "sad");
    assert_eq!(body["mood"]["confidence"], 0.7);
    assert_eq!(body["recommendations"], serde_json::to_value(fallback_songs("sad")).unwrap());
    assert!(uuid::Uuid::parse_str(body["playlistId"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn search_requires_catalog() {
    let (status, body) = send(&bare_app(), post_json("/api/search-spotify", json!({"query": "daft punk"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn search_returns_catalog_tracks() {
    let app = app(service(None, true, EmotionFallback::Reject));
    let (status, body) = send(&app, post_json("/api/search-spotify", json!({"query": "daft punk", "limit": 2}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["query"], "daft punk");
    assert_eq!(body["songs"][0]["id"], "track-0");
}

#[tokio::test]
async fn catalog_recommendations_are_flagged() {
    let app = app(service(None, true, EmotionFallback::Reject));
    let (_, body) = send(&app, post_json("/api/get-recommendations", json!({"mood": "neutral"}))).await;

    assert_eq!(body["aiPowered"], false);
    assert_eq!(body["spotifyPowered"], true);
    assert_eq!(body["recommendations"][0]["title"], "calm peaceful ambient 0");
}

#[tokio::test]
async fn playlist_lifecycle() {
    let app = bare_app();

    let create = json!({
        "name": "Morning Boost",
        "mood": "happy",
        "userId": "user-1",
        "songs": serde_json::to_value(fallback_songs("happy")).unwrap(),
    });
    let (status, body) = send(&app, post_json("/api/create-playlist", create)).await;
    assert_eq!(status, StatusCode::OK);
    let playlist = body["playlist"].clone();
    let id = playlist["id"].as_str().unwrap().to_owned();
    assert_eq!(playlist["likes"], 0);
    assert_eq!(playlist["ownerId"], "user-1");

    let (_, body) = send(&app, get("/api/playlists")).await;
    assert_eq!(body["playlists"].as_array().unwrap().len(), 1);

    let like_uri = format!("/api/playlist/{}/like", id);
    let (_, body) = send(&app, post_json(&like_uri, json!({}))).await;
    assert_eq!(body["likes"], 1);
    let (status, body) = send(&app, post_json(&like_uri, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 2);
}

#[tokio::test]
async fn like_unknown_playlist_is_not_found() {
    let (status, body) = send(&bare_app(), post_json("/api/playlist/missing/like", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn playlist_requires_name() {
    let (status, _) = send(&bare_app(), post_json("/api/create-playlist", json!({"name": " ", "songs": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&bare_app(), post_json("/api/create-playlist", json!({"songs": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_without_content_type_is_structured_error() {
    let request = Request::builder()
        .uri("/api/get-recommendations")
        .method("POST")
        .body(Body::from(r#"{"mood": "happy"}"#))
        .unwrap();
    let (status, body) = send(&bare_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_json_is_structured_error() {
    let request = Request::builder()
        .uri("/api/create-playlist")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&bare_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn configured_origin_allows_credentials() {
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = bare_app().oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
