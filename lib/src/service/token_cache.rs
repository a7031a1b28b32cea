use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::info;

/// Seconds shaved off the reported lifetime so a token is never used at the edge of expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 60;


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: i64,
}

#[async_trait]
pub trait TokenGrant: Send + Sync {
    async fn request_token(&self) -> Result<AccessToken>;
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCacheEntry {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenCacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}


/// Single-slot bearer token cache.
///
/// The slot lock is held across the grant call so callers arriving while the
/// token is missing or expired wait for one grant instead of issuing their own.
pub struct TokenCache {
    grant: Arc<dyn TokenGrant>,
    slot: Mutex<Option<TokenCacheEntry>>,
}

impl TokenCache {
    pub fn new(grant: Arc<dyn TokenGrant>) -> Self {
        Self {
            grant,
            slot: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<String> {
        self.get_at(Utc::now()).await
    }

    pub async fn get_at(&self, now: DateTime<Utc>) -> Result<String> {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref().filter(|entry| !entry.is_expired(now)) {
            return Ok(entry.token.clone());
        }

        let granted = self.grant.request_token().await?;
        let lifetime = (granted.expires_in - EXPIRY_MARGIN_SECS).max(0);
        let entry = TokenCacheEntry {
            token: granted.access_token,
            expires_at: now + Duration::seconds(lifetime),
        };
        info!(expires_at = %entry.expires_at, "catalog access token obtained");

        let token = entry.token.clone();
        *slot = Some(entry);
        Ok(token)
    }

    #[cfg(test)]
    pub async fn entry(&self) -> Option<TokenCacheEntry> {
        self.slot.lock().await.clone()
    }
}
