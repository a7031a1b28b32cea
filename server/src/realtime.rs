use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use moodflow_lib::service::realtime::{ClientEvent, MoodAnalyzed, RealtimeEnvelope, ServerEvent};
use moodflow_lib::service::CommonService;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;


/// GET /ws
pub async fn handle_websocket(ws: WebSocketUpgrade, State(service): State<CommonService>) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, service))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
        Err(error) => {
            warn!("failed to encode realtime event: {}", error);
            true
        }
    }
}

/// Broadcast events from other sessions; a session never hears its own.
fn forwarded(envelope: &RealtimeEnvelope, session_id: Uuid) -> Option<&ServerEvent> {
    (envelope.origin != session_id).then_some(&envelope.event)
}

/// Parse one text frame and act on it. Returns the reply for the sender, if any.
async fn handle_frame(service: &CommonService, session_id: Uuid, text: &str) -> Option<ServerEvent> {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => handle_client_event(service, session_id, event).await,
        Err(error) => {
            warn!(session = %session_id, error = %error, "ignoring unparsable frame");
            None
        }
    }
}

async fn handle_client_event(service: &CommonService, session_id: Uuid, event: ClientEvent) -> Option<ServerEvent> {
    match event {
        ClientEvent::MoodUpdate { emotion_data, user_preferences } => {
            let (mood, recommendations) = service.analyze_mood(&emotion_data, &user_preferences).await;
            Some(ServerEvent::MoodAnalyzed(MoodAnalyzed { mood, recommendations }))
        }
        ClientEvent::PlaylistCreated(playlist) => {
            service.realtime.broadcast_lossy(session_id, ServerEvent::NewPlaylist(playlist));
            None
        }
    }
}

async fn handle_session(mut socket: WebSocket, service: CommonService) {
    let session_id = Uuid::new_v4();
    let mut events = service.realtime.subscribe();
    info!(session = %session_id, clients = service.realtime.client_count(), "realtime client connected");

    loop {
        tokio::select! {
            received = events.recv() => {
                match received {
                    Ok(envelope) => {
                        if let Some(event) = forwarded(&envelope, session_id) {
                            if !send_event(&mut socket, event).await {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(session = %session_id, skipped, "realtime client lagging"),
                    Err(RecvError::Closed) => break,
                }
            }
            frame = socket.recv() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                if let Some(reply) = handle_frame(&service, session_id, &text).await {
                    if !send_event(&mut socket, &reply).await {
                        break;
                    }
                }
            }
        }
    }

    info!(session = %session_id, "realtime client disconnected");
}
