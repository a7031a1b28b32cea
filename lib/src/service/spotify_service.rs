

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue, ACCEPT}, Client};
use serde::Deserialize;
use tracing::debug;

use crate::config::SpotifyCredentials;
use crate::utilities::format_duration;
use super::common_structs::{Song, SongId};
use super::token_cache::{AccessToken, TokenCache, TokenGrant};

const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
const SEARCH_ENDPOINT: &str = "https://api.spotify.com/v1/search";
const MARKET: &str = "US";
const MAX_SEARCH_LIMIT: usize = 50;
const DEFAULT_COVER: &str = "🎵";
const UNKNOWN_GENRE: &str = "Unknown";


/// Music catalog able to resolve free-text queries to tracks.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Song>>;
}


#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    #[serde(default)]
    images: Vec<SpotifyImage>,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl From<SpotifyTrack> for Song {
    fn from(track: SpotifyTrack) -> Self {
        let artist = track.artists
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<String>>()
            .join(", ");

        Song {
            id: SongId::Catalog(track.id),
            title: track.name,
            artist,
            genre: track.album.genres.into_iter().next().unwrap_or(UNKNOWN_GENRE.to_owned()),
            duration: format_duration(track.duration_ms),
            cover: track.album.images.into_iter().next().map(|i| i.url).unwrap_or(DEFAULT_COVER.to_owned()),
            preview_url: track.preview_url,
            spotify_url: track.external_urls.spotify,
        }
    }
}


/// Client-credentials grant against the Spotify accounts service.
#[derive(Debug, Clone)]
pub struct ClientCredentialsGrant {
    client: Client,
    credentials: SpotifyCredentials,
}

impl ClientCredentialsGrant {
    pub fn new(client: &Client, credentials: &SpotifyCredentials) -> Self {
        Self {
            client: client.to_owned(),
            credentials: credentials.to_owned(),
        }
    }
}

#[async_trait]
impl TokenGrant for ClientCredentialsGrant {
    async fn request_token(&self) -> Result<AccessToken> {
        let response = self.client
            .post(TOKEN_ENDPOINT)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body_string = response.text().await?;
        if !status.is_success() {
            bail!("Spotify token request failed ({}): {}", status, body_string);
        }

        let body = serde_json::from_str::<TokenResponse>(&body_string)
            .context("unable to read Spotify token response")?;
        Ok(AccessToken {
            access_token: body.access_token,
            expires_in: body.expires_in,
        })
    }
}


pub struct SpotifyService {
    client: Client,
    headers: HeaderMap,
    tokens: TokenCache,
}

impl SpotifyService {
    pub fn new(credentials: &SpotifyCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let grant = ClientCredentialsGrant::new(&client, credentials);
        Ok(Self::with_grant(client, Arc::new(grant)))
    }

    pub fn with_grant(client: Client, grant: Arc<dyn TokenGrant>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            client,
            headers,
            tokens: TokenCache::new(grant),
        }
    }
}

#[async_trait]
impl MusicCatalog for SpotifyService {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Song>> {
        let token = self.tokens.get().await?;
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();

        let response = self.client
            .get(SEARCH_ENDPOINT)
            .headers(self.headers.clone())
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str()), ("market", MARKET)])
            .send()
            .await?;

        let status = response.status();
        let body_string = response.text().await?;
        if !status.is_success() {
            bail!("Spotify search failed ({}): {}", status, body_string);
        }

        let body = serde_json::from_str::<SearchResponse>(&body_string)
            .context("unable to read Spotify search response")?;
        let songs: Vec<Song> = body.tracks.items.into_iter().map(Song::from).collect();
        debug!(query, count = songs.len(), "spotify search finished");
        Ok(songs)
    }
}
