pub static CHAT_MODEL: &str = "CHAT_MODEL";

pub static SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub static SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub static SPOTIFY_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";

pub static PLAYLIST_TABLE_NAME: &str = "PLAYLIST_TABLE_NAME";

pub static EMOTION_FALLBACK: &str = "EMOTION_FALLBACK";
pub static OUTBOUND_TIMEOUT_SECS: &str = "OUTBOUND_TIMEOUT_SECS";

pub static HOST: &str = "HOST";
pub static PORT: &str = "PORT";
pub static CORS_ORIGIN: &str = "CORS_ORIGIN";
pub static REALTIME_CAPACITY: &str = "REALTIME_CAPACITY";
