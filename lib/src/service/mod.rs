pub mod common_structs;
pub mod language_model;
pub mod bedrock_service;
pub mod emotion_service;
pub mod recommendation_service;
pub mod spotify_service;
pub mod token_cache;
pub mod playlist_store;
pub mod dynamo_service;
pub mod realtime;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::{AppConfig, EmotionFallback};
use crate::error::{ServiceError, ServiceResult};
use common_structs::{EmotionScores, MoodAnalysis, Recommendations, Song, UserPreferences};
use emotion_service::{analyze_mood, EmotionService};
use language_model::LanguageModel;
use playlist_store::{InMemoryPlaylistStore, PlaylistStore};
use realtime::RealtimeBroadcaster;
use recommendation_service::RecommendationService;
use spotify_service::{MusicCatalog, SpotifyService};


/// Everything a request handler needs, cheap to clone into axum state.
#[derive(Clone)]
pub struct CommonService {
    pub emotion: EmotionService,
    pub recommendations: RecommendationService,
    pub catalog: Option<Arc<dyn MusicCatalog>>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub realtime: RealtimeBroadcaster,
}

impl CommonService {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let sdk_config = if config.needs_aws() {
            Some(aws_config::load_from_env().await)
        } else {
            None
        };

        let model: Option<Arc<dyn LanguageModel>> = match (&sdk_config, &config.chat_model_id) {
            (Some(sdk_config), Some(model_id)) => {
                let bedrock_client = aws_sdk_bedrockruntime::Client::new(sdk_config);
                Some(Arc::new(bedrock_service::BedrockService::new(&bedrock_client, model_id, config.outbound_timeout)))
            }
            _ => None,
        };

        let catalog: Option<Arc<dyn MusicCatalog>> = match &config.spotify {
            Some(credentials) => Some(Arc::new(SpotifyService::new(credentials, config.outbound_timeout)?)),
            None => None,
        };

        let playlists: Arc<dyn PlaylistStore> = match (&sdk_config, &config.playlist_table_name) {
            (Some(sdk_config), Some(table_name)) => {
                let dynamo_client = aws_sdk_dynamodb::Client::new(sdk_config);
                Arc::new(dynamo_service::DynamoPlaylistStore::new(&dynamo_client, table_name))
            }
            _ => Arc::new(InMemoryPlaylistStore::new()),
        };

        let service = Self::new(
            model,
            catalog,
            playlists,
            config.emotion_fallback,
            config.realtime_capacity,
        );
        info!(
            ai = service.ai_configured(),
            spotify = service.spotify_configured(),
            playlist_store = service.playlists.kind(),
            strategies = ?service.recommendations.strategy_names(),
            redirect_uri = ?config.spotify.as_ref().and_then(|s| s.redirect_uri.as_deref()),
            "services configured"
        );
        Ok(service)
    }

    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        catalog: Option<Arc<dyn MusicCatalog>>,
        playlists: Arc<dyn PlaylistStore>,
        emotion_fallback: EmotionFallback,
        realtime_capacity: usize,
    ) -> Self {
        Self {
            emotion: EmotionService::new(model.clone(), emotion_fallback),
            recommendations: RecommendationService::new(model, catalog.clone()),
            catalog,
            playlists,
            realtime: RealtimeBroadcaster::new(realtime_capacity),
        }
    }

    pub fn ai_configured(&self) -> bool {
        self.emotion.is_configured()
    }

    pub fn spotify_configured(&self) -> bool {
        self.catalog.is_some()
    }

    /// Reduce client scores to a mood and recommend for it.
    pub async fn analyze_mood(
        &self,
        emotion_data: &EmotionScores,
        preferences: &UserPreferences,
    ) -> (MoodAnalysis, Recommendations) {
        let mood = analyze_mood(emotion_data);
        let recommendations = self.recommendations.recommend(mood.dominant.as_str(), preferences).await;
        (mood, recommendations)
    }

    pub async fn search_catalog(&self, query: &str, limit: usize) -> ServiceResult<Vec<Song>> {
        if query.trim().is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".to_owned()));
        }
        let catalog = self.catalog
            .as_ref()
            .ok_or_else(|| ServiceError::BadRequest("Spotify not configured".to_owned()))?;
        Ok(catalog.search_tracks(query, limit).await?)
    }
}
