use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::service::common_structs::{Emotion, Song, SongId};
use crate::service::language_model::{LanguageModel, ModelRequest};
use crate::service::spotify_service::MusicCatalog;
use crate::utilities::parse_model_json;
use super::RecommendationRequest;

/// Target size of a catalog-backed list.
pub const CATALOG_TARGET: usize = 10;
pub const MAX_SONGS: usize = 15;

const DEFAULT_COVER: &str = "🎵";
const UNKNOWN_GENRE: &str = "Unknown";
const UNKNOWN_DURATION: &str = "0:00";

const SYSTEM_PROMPT: &str = "You are a music recommendation expert. You provide personalized song recommendations based on user mood and preferences. Always return valid JSON arrays.";


#[async_trait]
pub trait RecommendationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn ai_powered(&self) -> bool;

    fn spotify_powered(&self) -> bool;

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Song>>;
}


pub fn mood_keyword(mood: &str) -> &'static str {
    match Emotion::from_label(mood) {
        Some(Emotion::Happy) => "upbeat happy energetic",
        Some(Emotion::Sad) => "melancholy sad emotional",
        Some(Emotion::Angry) => "intense powerful aggressive",
        Some(Emotion::Neutral) => "calm peaceful ambient",
        Some(Emotion::Surprised) => "exciting dynamic energetic",
        _ => "pop",
    }
}

/// `"{keyword} {genre genre ...}"`
pub fn mood_query(request: &RecommendationRequest) -> String {
    let genres = request.preferences.favorite_genres.join(" ");
    format!("{} {}", mood_keyword(&request.mood), genres).trim().to_owned()
}

fn preference_prompt(request: &RecommendationRequest) -> String {
    format!(
        "The user is {}, here are the user's favorite genres: [{}] and favorite artists: [{}].",
        request.mood,
        request.preferences.favorite_genres.join(", "),
        request.preferences.favorite_artists.join(", "),
    )
}


#[derive(Debug, Deserialize)]
struct SongPair {
    title: String,
    artist: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestedSong {
    title: String,
    artist: String,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    preview_url: Option<String>,
}

fn song_id(value: Option<Value>) -> Option<SongId> {
    let id = match value? {
        Value::Number(n) => SongId::Index(n.as_u64()?),
        Value::String(s) => SongId::Catalog(s),
        _ => return None,
    };
    (!id.is_blank()).then_some(id)
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or(default.to_owned())
}

/// Parse a model reply listing full song objects. Missing ids become the
/// 1-based position in the list.
pub fn parse_suggested_songs(reply: &str) -> Result<Vec<Song>> {
    let suggestions: Vec<SuggestedSong> = parse_model_json(reply)?;
    let songs = suggestions
        .into_iter()
        .take(MAX_SONGS)
        .enumerate()
        .map(|(index, s)| Song {
            id: song_id(s.id).unwrap_or(SongId::Index(index as u64 + 1)),
            title: s.title,
            artist: s.artist,
            genre: non_empty(s.genre, UNKNOWN_GENRE),
            duration: non_empty(s.duration, UNKNOWN_DURATION),
            cover: non_empty(s.cover, DEFAULT_COVER),
            preview_url: s.preview_url,
            spotify_url: None,
        })
        .collect();
    Ok(songs)
}


/// AI names the songs, the catalog resolves them.
pub struct AiCatalogStrategy {
    model: Arc<dyn LanguageModel>,
    catalog: Arc<dyn MusicCatalog>,
}

impl AiCatalogStrategy {
    pub fn new(model: Arc<dyn LanguageModel>, catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { model, catalog }
    }

    async fn suggest_pairs(&self, request: &RecommendationRequest) -> Result<Vec<SongPair>> {
        let prompt = format!(
            "{}

            Recommend 10-15 specific song titles and artists that would be perfect for this mood and user preferences.

            Return the response as a JSON array with this exact format:
            [
              {{
                \"title\": \"Song Title\",
                \"artist\": \"Artist Name\"
              }}
            ]

            Make sure the songs match the user's mood and preferences. Include a mix of songs from their favorite artists and new recommendations.",
            preference_prompt(request),
        );
        let system_prompt = format!("{} Each entry has only a song title and artist.", SYSTEM_PROMPT);
        let reply = self.model.complete(ModelRequest::new(system_prompt, prompt)).await?;
        let mut pairs: Vec<SongPair> = parse_model_json(&reply)?;
        pairs.truncate(MAX_SONGS);
        Ok(pairs)
    }
}

#[async_trait]
impl RecommendationStrategy for AiCatalogStrategy {
    fn name(&self) -> &'static str {
        "ai+catalog"
    }

    fn ai_powered(&self) -> bool {
        true
    }

    fn spotify_powered(&self) -> bool {
        true
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Song>> {
        let pairs = self.suggest_pairs(request).await?;
        let queries: Vec<String> = pairs
            .iter()
            .map(|pair| format!("{} {}", pair.title, pair.artist))
            .collect();

        let lookups = join_all(queries.iter().map(|query| self.catalog.search_tracks(query, 1))).await;

        let mut songs: Vec<Song> = vec![];
        for (query, lookup) in queries.iter().zip(lookups) {
            match lookup {
                Ok(found) => songs.extend(found.into_iter().take(1)),
                Err(error) => debug!(query = %query, error = %error, "catalog lookup failed"),
            }
        }

        if songs.len() < CATALOG_TARGET {
            let query = mood_query(request);
            match self.catalog.search_tracks(&query, CATALOG_TARGET - songs.len()).await {
                Ok(extra) => songs.extend(extra.into_iter().take(CATALOG_TARGET - songs.len())),
                Err(error) => warn!(query = %query, error = %error, "catalog top-up failed"),
            }
        }

        Ok(songs)
    }
}


/// Mood keyword search against the catalog.
pub struct CatalogStrategy {
    catalog: Arc<dyn MusicCatalog>,
}

impl CatalogStrategy {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl RecommendationStrategy for CatalogStrategy {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn ai_powered(&self) -> bool {
        false
    }

    fn spotify_powered(&self) -> bool {
        true
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Song>> {
        self.catalog.search_tracks(&mood_query(request), CATALOG_TARGET).await
    }
}


/// Full song objects straight from the model.
pub struct AiStrategy {
    model: Arc<dyn LanguageModel>,
}

impl AiStrategy {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl RecommendationStrategy for AiStrategy {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn ai_powered(&self) -> bool {
        true
    }

    fn spotify_powered(&self) -> bool {
        false
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Song>> {
        let prompt = format!(
            "{}

            Recommend 10-15 songs from these artists + some new ones that the user might like.

            Return the response as a JSON array with this exact format:
            [
              {{
                \"title\": \"Song Title\",
                \"artist\": \"Artist Name\",
                \"genre\": \"Genre\",
                \"duration\": \"3:45\",
                \"cover\": \"🎵\",
                \"id\": 1
              }}
            ]

            Make sure the songs match the user's mood and preferences. Include a mix of songs from their favorite artists and new recommendations.",
            preference_prompt(request),
        );
        let reply = self.model.complete(ModelRequest::new(SYSTEM_PROMPT, prompt)).await?;
        let songs = parse_suggested_songs(&reply)?;
        if songs.is_empty() {
            bail!("model suggested no songs");
        }
        Ok(songs)
    }
}
