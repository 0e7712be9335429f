//! Outreach Gateway Crate
//!
//! The HTTP surface of the backend: REST endpoints under `/api`, a
//! websocket feed endpoint, and the error type mapping domain failures to
//! status codes. Handlers authenticate via bearer session tokens and
//! delegate to the domain services in `outreach-messaging`.

pub mod error;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{ErrorResponse, GatewayError, GatewayResult};
pub use state::GatewayState;

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::auth::register,
        rest::auth::login,
        rest::auth::me,
        rest::messaging::send_message,
        rest::messaging::search_messages,
        rest::messaging::export_messages,
        rest::messaging::edit_message,
        rest::messaging::delete_message,
        rest::messaging::direct_conversation,
        rest::channels::list_channels,
        rest::channels::create_channel,
        rest::channels::join_channel,
        rest::channels::leave_channel,
        rest::channels::list_members,
        rest::health::health,
    ),
    components(schemas(
        error::ErrorResponse,
        rest::auth::RegisterRequest,
        rest::auth::LoginRequest,
        rest::auth::SessionResponse,
        rest::auth::UserResponse,
        rest::messaging::SendBody,
        rest::messaging::SendResponse,
        rest::messaging::SearchResponse,
        rest::messaging::EditBody,
        rest::messaging::MessageResponse,
        rest::channels::CreateChannelBody,
        rest::channels::ChannelResponse,
        rest::channels::MemberResponse,
        rest::health::HealthResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and sessions"),
        (name = "messaging", description = "Send, search, export, edit, delete"),
        (name = "channels", description = "Channel membership"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;

/// Create the main application router with all routes.
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        .merge(websocket::create_websocket_routes().with_state(arc_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
