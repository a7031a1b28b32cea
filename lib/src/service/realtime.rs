use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use super::common_structs::{EmotionScores, MoodAnalysis, Recommendations, UserPreferences};


/// Frames a client may send, `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    MoodUpdate {
        emotion_data: EmotionScores,
        #[serde(default)]
        user_preferences: UserPreferences,
    },
    PlaylistCreated(Value),
}


#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MoodAnalyzed {
    pub mood: MoodAnalysis,
    #[serde(flatten)]
    pub recommendations: Recommendations,
}


/// Frames the server sends, same envelope as [`ClientEvent`].
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    MoodAnalyzed(MoodAnalyzed),
    NewPlaylist(Value),
}


/// A fanned-out event tagged with the connection that produced it.
#[derive(Debug, Clone)]
pub struct RealtimeEnvelope {
    pub origin: Uuid,
    pub event: ServerEvent,
}


/// Fan-out hub shared by every WebSocket session. Lagging receivers lose
/// events; nothing is replayed.
#[derive(Debug, Clone)]
pub struct RealtimeBroadcaster {
    tx: broadcast::Sender<RealtimeEnvelope>,
}

impl RealtimeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        info!("realtime broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEnvelope> {
        self.tx.subscribe()
    }

    /// Broadcast an event, ignoring the case where nobody is listening.
    pub fn broadcast_lossy(&self, origin: Uuid, event: ServerEvent) {
        if let Ok(count) = self.tx.send(RealtimeEnvelope { origin, event }) {
            debug!("broadcast event to {} sessions", count);
        }
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::common_structs::Emotion;
    use serde_json::json;

    #[test]
    fn parses_mood_update() {
        let frame = json!({
            "event": "mood-update",
            "data": {"emotionData": {"happy": 0.8, "sad": 0.1}}
        });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        match event {
            ClientEvent::MoodUpdate { emotion_data, user_preferences } => {
                assert_eq!(emotion_data.get(Emotion::Happy), 0.8);
                assert_eq!(user_preferences, UserPreferences::default());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn unknown_event_is_rejected() {
        let frame = json!({"event": "dance", "data": {}});
        assert!(serde_json::from_value::<ClientEvent>(frame).is_err());
    }

    #[test]
    fn new_playlist_keeps_payload() {
        let payload = json!({"id": "abc", "name": "Chill"});
        let frame = serde_json::to_value(ServerEvent::NewPlaylist(payload.clone())).unwrap();
        assert_eq!(frame, json!({"event": "new-playlist", "data": payload}));
    }

    #[tokio::test]
    async fn subscribers_receive_origin() {
        let broadcaster = RealtimeBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.client_count(), 1);

        let origin = Uuid::new_v4();
        broadcaster.broadcast_lossy(origin, ServerEvent::NewPlaylist(json!({"id": "p1"})));
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.origin, origin);
        assert_eq!(envelope.event, ServerEvent::NewPlaylist(json!({"id": "p1"})));
    }

    #[test]
    fn broadcast_without_listeners_is_silent() {
        let broadcaster = RealtimeBroadcaster::new(4);
        broadcaster.broadcast_lossy(Uuid::new_v4(), ServerEvent::NewPlaylist(json!(null)));
        assert_eq!(broadcaster.client_count(), 0);
    }
}
