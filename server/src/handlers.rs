use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use moodflow_lib::service::common_structs::{EmotionScores, NewPlaylist, UserPreferences};
use moodflow_lib::service::CommonService;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

const DEFAULT_SEARCH_LIMIT: usize = 10;


/// Body errors, including axum's own JSON rejections, become `ApiError::BadRequest`.
fn parse_body<T: DeserializeOwned>(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<T> {
    let Json(params) = payload?;
    serde_json::from_value::<T>(params).map_err(|error| ApiError::BadRequest(format!("Invalid request body: {}", error)))
}


#[derive(Debug, Deserialize)]
struct AnalyzeEmotionRequest {
    #[serde(default)]
    image: String,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationParams {
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    user_preferences: Option<UserPreferences>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeMoodRequest {
    emotion_data: EmotionScores,
    #[serde(default)]
    user_preferences: Option<UserPreferences>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}


/// GET /api/health
pub async fn health(State(service): State<CommonService>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "MoodFlow backend is running",
        "timestamp": Utc::now().to_rfc3339(),
        "ai": service.ai_configured(),
        "spotify": service.spotify_configured(),
        "playlistStore": service.playlists.kind(),
    }))
}


/// POST /api/analyze-emotion
pub async fn analyze_emotion(
    State(service): State<CommonService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request: AnalyzeEmotionRequest = parse_body(payload)?;
    let analysis = service.emotion.analyze_image(&request.image, request.timestamp).await?;
    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
    })))
}


/// POST /api/get-recommendations
pub async fn get_recommendations(
    State(service): State<CommonService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request: RecommendationParams = parse_body(payload)?;
    let mood = request.mood.unwrap_or_default();
    if mood.trim().is_empty() {
        return Err(ApiError::BadRequest("Mood is required".to_owned()));
    }

    let preferences = request.user_preferences.unwrap_or_default();
    let recommendations = service.recommendations.recommend(&mood, &preferences).await;
    Ok(Json(json!({
        "success": true,
        "recommendations": recommendations.songs,
        "aiPowered": recommendations.ai_powered,
        "spotifyPowered": recommendations.spotify_powered,
    })))
}


/// POST /api/analyze-mood
pub async fn analyze_mood(
    State(service): State<CommonService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request: AnalyzeMoodRequest = parse_body(payload)?;
    let preferences = request.user_preferences.unwrap_or_default();
    let (mood, recommendations) = service.analyze_mood(&request.emotion_data, &preferences).await;
    info!(mood = %mood.dominant, count = recommendations.songs.len(), "mood analyzed");

    Ok(Json(json!({
        "success": true,
        "mood": mood,
        "recommendations": recommendations.songs,
        "playlistId": Uuid::new_v4().to_string(),
        "aiPowered": recommendations.ai_powered,
        "spotifyPowered": recommendations.spotify_powered,
    })))
}


/// POST /api/search-spotify
pub async fn search_spotify(
    State(service): State<CommonService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request: SearchRequest = parse_body(payload)?;
    let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let songs = service.search_catalog(&request.query, limit).await?;

    Ok(Json(json!({
        "success": true,
        "total": songs.len(),
        "songs": songs,
        "query": request.query,
    })))
}


/// GET /api/playlists
pub async fn list_playlists(State(service): State<CommonService>) -> ApiResult<Json<Value>> {
    let playlists = service.playlists.list().await?;
    Ok(Json(json!({
        "success": true,
        "playlists": playlists,
    })))
}


/// POST /api/create-playlist
pub async fn create_playlist(
    State(service): State<CommonService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let new_playlist: NewPlaylist = parse_body(payload)?;
    let playlist = service.playlists.create(new_playlist).await?;
    info!(id = %playlist.id, name = %playlist.name, "playlist created");

    Ok(Json(json!({
        "success": true,
        "playlist": playlist,
    })))
}


/// POST /api/playlist/:id/like
pub async fn like_playlist(
    State(service): State<CommonService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let likes = service.playlists.like(&id).await?;
    Ok(Json(json!({
        "success": true,
        "likes": likes,
    })))
}
