//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//! The socket belongs to the dashboard view: closing it tears the session down.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Path, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};
use uuid::Uuid;

use crate::logic::{apply_intent, Intent};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state, ws), fields(%id))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  Path(id): Path<Uuid>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  info!(target: "sensei_dashboard", session = %id, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, id))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, id: Uuid) {
  info!(target: "sensei_dashboard", session = %id, "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "sensei_dashboard", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, id).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "sensei_dashboard", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "sensei_dashboard", session = %id, "WebSocket disconnected");
  state.remove_session(id).await;
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, id: Uuid) -> ServerWsMessage {
  let intent = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,
    ClientWsMessage::View => Intent::View,
    ClientWsMessage::SelectSubtopic { subtopic_id } => Intent::SelectSubtopic(subtopic_id),
    ClientWsMessage::Answer { choice_id } => Intent::Answer(choice_id),
    ClientWsMessage::Advance => Intent::Advance,
  };
  match apply_intent(state, id, intent).await {
    Ok(view) => ServerWsMessage::Dashboard { view },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}
