//! Web server module.
//!
//! Declarative routing over the four endpoints:
//! - `GET /health` liveness probe
//! - `POST /token` participant token minting
//! - `POST /rooms` room token minting
//! - `POST /livekit/webhook` webhook receiver
//!
//! Cross-origin requests are allowed from any origin.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use handlers::{
    create_room, create_token, health, livekit_webhook, AppState, ErrorResponse,
    RoomRequest, RoomResponse, TokenRequest, TokenResponse, MISSING_FIELDS_MESSAGE,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/token", post(create_token))
        .route("/rooms", post(create_room))
        .route("/livekit/webhook", post(livekit_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
