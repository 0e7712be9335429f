//! Messaging REST endpoints: send, search, export, edit, delete.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use outreach_database::Message;
use outreach_messaging::{ExportRequest, SearchRequest, SendMessageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::require_bearer;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: Option<String>,
    pub channel_id: Option<String>,
    pub content: String,
    pub reply_to_id: Option<String>,
    pub created_at: String,
    pub edited_at: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.public_id,
            sender_id: message.sender_public_id,
            recipient_id: message.recipient_public_id,
            channel_id: message.channel_public_id,
            content: message.content,
            reply_to_id: message.reply_to_public_id,
            created_at: message.created_at,
            edited_at: message.edited_at,
        }
    }
}

/// Send body. Mirrors the wire contract: exactly one of `channelId` /
/// `recipientId`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    pub content: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendResponse {
    pub ok: bool,
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub ok: bool,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditBody {
    pub content: String,
}

pub fn create_messaging_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/messaging/send", post(send_message))
        .route("/api/messaging/search", get(search_messages))
        .route("/api/messaging/export", get(export_messages))
        .route(
            "/api/messaging/messages/:id",
            patch(edit_message).delete(delete_message),
        )
        .route("/api/messaging/direct/:peer_id", get(direct_conversation))
}

#[utoipa::path(
    post,
    path = "/api/messaging/send",
    tag = "messaging",
    security(("bearer" = [])),
    request_body = SendBody,
    responses(
        (status = 201, description = "Message persisted", body = SendResponse),
        (status = 400, description = "Validation failure", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member of the target channel", body = crate::error::ErrorResponse),
        (status = 404, description = "Recipient not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(payload): Json<SendBody>,
) -> GatewayResult<(StatusCode, Json<SendResponse>)> {
    let user = require_bearer(&state, &headers).await?;

    let message = state
        .message_service
        .send(
            &user,
            &SendMessageRequest {
                content: payload.content,
                channel_id: payload.channel_id,
                recipient_id: payload.recipient_id,
                reply_to_id: payload.reply_to_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SendResponse {
            ok: true,
            id: message.public_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/messaging/search",
    tag = "messaging",
    security(("bearer" = [])),
    params(
        ("q" = Option<String>, Query, description = "Free-text content filter"),
        ("channelId" = Option<String>, Query, description = "Channel public id"),
        ("senderId" = Option<String>, Query, description = "Sender public id"),
        ("after" = Option<String>, Query, description = "RFC3339 lower bound"),
        ("before" = Option<String>, Query, description = "RFC3339 upper bound")
    ),
    responses(
        (status = 200, description = "Matching messages, oldest first", body = SearchResponse),
        (status = 400, description = "Empty or invalid filter set", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 403, description = "Channel-scoped search by a non-member", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_messages(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Query(params): Query<SearchRequest>,
) -> GatewayResult<Json<SearchResponse>> {
    let user = require_bearer(&state, &headers).await?;

    let messages = state.message_service.search(&user, &params).await?;

    Ok(Json(SearchResponse {
        ok: true,
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/messaging/export",
    tag = "messaging",
    security(("bearer" = [])),
    params(
        ("channelId" = Option<String>, Query, description = "Channel public id"),
        ("userId" = Option<String>, Query, description = "Messages sent or received by this user"),
        ("format" = Option<String>, Query, description = "csv (default) or json")
    ),
    responses(
        (status = 200, description = "Export document", body = String),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the founder", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_messages(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Query(params): Query<ExportRequest>,
) -> GatewayResult<Response> {
    let user = require_bearer(&state, &headers).await?;

    let output = state.message_service.export(&user, &params).await?;

    let response = (
        [
            (header::CONTENT_TYPE, output.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.file_name()),
            ),
        ],
        output.body,
    )
        .into_response();

    Ok(response)
}

#[utoipa::path(
    patch,
    path = "/api/messaging/messages/{id}",
    tag = "messaging",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Message public id")),
    request_body = EditBody,
    responses(
        (status = 200, description = "Edited message", body = MessageResponse),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the sender", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown or deleted message", body = crate::error::ErrorResponse)
    )
)]
pub async fn edit_message(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<EditBody>,
) -> GatewayResult<Json<MessageResponse>> {
    let user = require_bearer(&state, &headers).await?;

    let message = state.message_service.edit(&user, &id, &payload.content).await?;
    Ok(Json(message.into()))
}

#[utoipa::path(
    delete,
    path = "/api/messaging/messages/{id}",
    tag = "messaging",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Message public id")),
    responses(
        (status = 204, description = "Message soft-deleted"),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is neither sender nor staff", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown or already deleted message", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_message(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<StatusCode> {
    let user = require_bearer(&state, &headers).await?;

    state.message_service.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/messaging/direct/{peer_id}",
    tag = "messaging",
    security(("bearer" = [])),
    params(("peer_id" = String, Path, description = "Peer user public id")),
    responses(
        (status = 200, description = "Direct conversation, oldest first", body = SearchResponse),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse),
        (status = 404, description = "Peer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn direct_conversation(
    State(state): State<Arc<GatewayState>>,
    Path(peer_id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<Json<SearchResponse>> {
    let user = require_bearer(&state, &headers).await?;

    let messages = state.message_service.direct_conversation(&user, &peer_id).await?;

    Ok(Json(SearchResponse {
        ok: true,
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}
