use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::env_keys::{
    CHAT_MODEL, CORS_ORIGIN, EMOTION_FALLBACK, HOST, OUTBOUND_TIMEOUT_SECS, PLAYLIST_TABLE_NAME,
    PORT, REALTIME_CAPACITY, SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET, SPOTIFY_REDIRECT_URI,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_REALTIME_CAPACITY: usize = 100;


/// What the emotion gateway does when the model cannot produce an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmotionFallback {
    /// Surface the failure to the caller.
    #[default]
    Reject,
    /// Synthesize a random analysis so the rest of the flow can proceed.
    Simulate,
}

impl FromStr for EmotionFallback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "error" => Ok(Self::Reject),
            "simulate" | "random" => Ok(Self::Simulate),
            other => bail!("unknown emotion fallback policy: {}", other),
        }
    }
}


#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Option<String>,
}


#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub chat_model_id: Option<String>,
    pub spotify: Option<SpotifyCredentials>,
    pub playlist_table_name: Option<String>,
    pub emotion_fallback: EmotionFallback,
    pub outbound_timeout: Duration,
    pub realtime_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_owned(),
            chat_model_id: None,
            spotify: None,
            playlist_table_name: None,
            emotion_fallback: EmotionFallback::default(),
            outbound_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            realtime_capacity: DEFAULT_REALTIME_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let spotify = match (read(SPOTIFY_CLIENT_ID), read(SPOTIFY_CLIENT_SECRET)) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
                redirect_uri: read(SPOTIFY_REDIRECT_URI),
            }),
            _ => None,
        };

        let port = match read(PORT) {
            Some(port) => port.parse().with_context(|| format!("invalid {}: {}", PORT, port))?,
            None => defaults.port,
        };

        let outbound_timeout = match read(OUTBOUND_TIMEOUT_SECS) {
            Some(secs) => {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("invalid {}: {}", OUTBOUND_TIMEOUT_SECS, secs))?;
                if secs == 0 {
                    bail!("{} must be greater than zero", OUTBOUND_TIMEOUT_SECS);
                }
                Duration::from_secs(secs)
            }
            None => defaults.outbound_timeout,
        };

        let realtime_capacity = match read(REALTIME_CAPACITY) {
            Some(capacity) => {
                let capacity: usize = capacity
                    .parse()
                    .with_context(|| format!("invalid {}: {}", REALTIME_CAPACITY, capacity))?;
                if capacity == 0 {
                    bail!("{} must be greater than zero", REALTIME_CAPACITY);
                }
                capacity
            }
            None => defaults.realtime_capacity,
        };

        let emotion_fallback = match read(EMOTION_FALLBACK) {
            Some(policy) => policy.parse()?,
            None => defaults.emotion_fallback,
        };

        Ok(Self {
            host: read(HOST).unwrap_or(defaults.host),
            port,
            cors_origin: read(CORS_ORIGIN).unwrap_or(defaults.cors_origin),
            chat_model_id: read(CHAT_MODEL),
            spotify,
            playlist_table_name: read(PLAYLIST_TABLE_NAME),
            emotion_fallback,
            outbound_timeout,
            realtime_capacity,
        })
    }

    pub fn ai_configured(&self) -> bool {
        self.chat_model_id.is_some()
    }

    pub fn spotify_configured(&self) -> bool {
        self.spotify.is_some()
    }

    /// AWS config is only needed when Bedrock or DynamoDB is in use.
    pub fn needs_aws(&self) -> bool {
        self.ai_configured() || self.playlist_table_name.is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.ai_configured());
        assert!(!config.spotify_configured());
        assert!(!config.needs_aws());
        assert_eq!(config.emotion_fallback, EmotionFallback::Reject);
        assert_eq!(config.outbound_timeout, Duration::from_secs(20));
    }

    #[test]
    fn spotify_requires_both_credentials() {
        let config = config_from(&[(SPOTIFY_CLIENT_ID, "id")]).unwrap();
        assert!(!config.spotify_configured());

        let config = config_from(&[(SPOTIFY_CLIENT_ID, "id"), (SPOTIFY_CLIENT_SECRET, "secret")]).unwrap();
        assert!(config.spotify_configured());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = config_from(&[(CHAT_MODEL, "   ")]).unwrap();
        assert!(!config.ai_configured());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(config_from(&[(PORT, "eighty")]).is_err());
        assert!(config_from(&[(OUTBOUND_TIMEOUT_SECS, "0")]).is_err());
        assert!(config_from(&[(REALTIME_CAPACITY, "-1")]).is_err());
    }

    #[test]
    fn fallback_policy_parses() {
        let config = config_from(&[(EMOTION_FALLBACK, "Simulate")]).unwrap();
        assert_eq!(config.emotion_fallback, EmotionFallback::Simulate);
        assert!(config_from(&[(EMOTION_FALLBACK, "maybe")]).is_err());
    }
}
