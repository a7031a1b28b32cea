use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use super::common_structs::{NewPlaylist, Playlist};


#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Short name reported by the health endpoint.
    fn kind(&self) -> &'static str;

    async fn create(&self, new_playlist: NewPlaylist) -> ServiceResult<Playlist>;

    async fn list(&self) -> ServiceResult<Vec<Playlist>>;

    /// Increment the like counter, returning the new count.
    async fn like(&self, id: &str) -> ServiceResult<u64>;
}


pub fn build_playlist(new_playlist: NewPlaylist) -> ServiceResult<Playlist> {
    let name = new_playlist.name.trim();
    if name.is_empty() {
        return Err(ServiceError::BadRequest("Playlist name is required".to_owned()));
    }
    Ok(Playlist {
        id: Uuid::new_v4().to_string(),
        name: name.to_owned(),
        songs: new_playlist.songs,
        mood: new_playlist.mood,
        owner_id: new_playlist.owner_id,
        created_at: Utc::now(),
        likes: 0,
        shares: 0,
    })
}

pub fn playlist_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Playlist not found: {}", id))
}


#[derive(Debug, Default)]
pub struct InMemoryPlaylistStore {
    playlists: RwLock<HashMap<String, Playlist>>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, new_playlist: NewPlaylist) -> ServiceResult<Playlist> {
        let playlist = build_playlist(new_playlist)?;
        self.playlists.write().await.insert(playlist.id.clone(), playlist.clone());
        Ok(playlist)
    }

    async fn list(&self) -> ServiceResult<Vec<Playlist>> {
        let mut playlists: Vec<Playlist> = self.playlists.read().await.values().cloned().collect();
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(playlists)
    }

    async fn like(&self, id: &str) -> ServiceResult<u64> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists.get_mut(id).ok_or_else(|| playlist_not_found(id))?;
        playlist.likes += 1;
        Ok(playlist.likes)
    }
}
