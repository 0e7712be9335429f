//! Realtime feed endpoint.
//!
//! `GET /api/messaging/ws?token=&channelId=|peerId=` upgrades to a websocket
//! that streams message events for one conversation. Authentication and
//! channel-membership authorization happen before the upgrade; the feed
//! subscription is dropped when the handler task returns on any path, which
//! releases the registration.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use outreach_auth::User;
use outreach_messaging::{ConversationScope, Subscription};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub token: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub peer_id: Option<String>,
}

pub fn create_websocket_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/api/messaging/ws", get(feed_handler))
}

pub async fn feed_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<FeedQuery>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Response> {
    let (user, _session) = state.authenticator.authenticate_token(&params.token).await?;

    let scope = match (&params.channel_id, &params.peer_id) {
        (Some(channel_id), None) => {
            let channel = state
                .channel_service
                .require_membership(&user, channel_id)
                .await?;
            ConversationScope::channel(channel.id)
        }
        (None, Some(peer_id)) => {
            let peer = state
                .authenticator
                .find_user_by_public_id(peer_id)
                .await?
                .ok_or_else(|| GatewayError::NotFound(format!("user not found: {peer_id}")))?;
            ConversationScope::direct(user.id, peer.id)
        }
        _ => {
            return Err(GatewayError::Validation(
                "exactly one of channelId / peerId is required".to_string(),
            ))
        }
    };

    let subscription = state.feed.subscribe(scope);
    Ok(ws.on_upgrade(move |socket| run_feed(socket, subscription, user)))
}

async fn run_feed(socket: WebSocket, mut subscription: Subscription, user: User) {
    debug!(user = %user.public_id, scope = ?subscription.scope(), "feed connected");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize feed event");
                        break;
                    }
                };
                if sink.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    // Pings are answered by axum; other frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(user = %user.public_id, "feed disconnected");
}
