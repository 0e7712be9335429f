//! Channel REST endpoints: listing, creation, and membership.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use outreach_database::{Channel, ChannelParticipant};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::require_bearer;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.public_id,
            name: channel.name,
            description: channel.description,
            created_at: channel.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: i64,
    pub joined_at: String,
}

impl From<ChannelParticipant> for MemberResponse {
    fn from(participant: ChannelParticipant) -> Self {
        Self {
            user_id: participant.user_id,
            joined_at: participant.joined_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn create_channel_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/api/messaging/channels",
            get(list_channels).post(create_channel),
        )
        .route("/api/messaging/channels/:id/join", post(join_channel))
        .route("/api/messaging/channels/:id/leave", post(leave_channel))
        .route("/api/messaging/channels/:id/members", get(list_members))
}

#[utoipa::path(
    get,
    path = "/api/messaging/channels",
    tag = "channels",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Channels the caller belongs to", body = Vec<ChannelResponse>),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_channels(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> GatewayResult<Json<Vec<ChannelResponse>>> {
    let user = require_bearer(&state, &headers).await?;

    let channels = state.channel_service.list_for(&user).await?;
    Ok(Json(channels.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/messaging/channels",
    tag = "channels",
    security(("bearer" = [])),
    request_body = CreateChannelBody,
    responses(
        (status = 201, description = "Channel created, creator joined", body = ChannelResponse),
        (status = 400, description = "Invalid channel name", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not staff", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_channel(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateChannelBody>,
) -> GatewayResult<(StatusCode, Json<ChannelResponse>)> {
    let user = require_bearer(&state, &headers).await?;

    let channel = state
        .channel_service
        .create(
            &user,
            &outreach_messaging::CreateChannelRequest {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(channel.into())))
}

#[utoipa::path(
    post,
    path = "/api/messaging/channels/{id}/join",
    tag = "channels",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Channel public id")),
    responses(
        (status = 200, description = "Joined", body = MemberResponse),
        (status = 400, description = "Already a member", body = crate::error::ErrorResponse),
        (status = 404, description = "Channel not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_channel(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<Json<MemberResponse>> {
    let user = require_bearer(&state, &headers).await?;

    let participant = state.channel_service.join(&user, &id).await?;
    Ok(Json(participant.into()))
}

#[utoipa::path(
    post,
    path = "/api/messaging/channels/{id}/leave",
    tag = "channels",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Channel public id")),
    responses(
        (status = 204, description = "Left the channel"),
        (status = 404, description = "Channel not found or not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_channel(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<StatusCode> {
    let user = require_bearer(&state, &headers).await?;

    state.channel_service.leave(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/messaging/channels/{id}/members",
    tag = "channels",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Channel public id")),
    responses(
        (status = 200, description = "Channel members, oldest first", body = Vec<MemberResponse>),
        (status = 403, description = "Caller is not a member", body = crate::error::ErrorResponse),
        (status = 404, description = "Channel not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<Json<Vec<MemberResponse>>> {
    let user = require_bearer(&state, &headers).await?;

    let members = state.channel_service.members(&user, &id).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}
