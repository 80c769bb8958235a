//! HTTP endpoint handlers.
//!
//! These handlers are thin by design - they validate the request shape,
//! delegate the cryptographic work to the minter/verifier boundary, and
//! relay the result. Nothing is stored between requests.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::token::TokenMinter;
use crate::webhook::{WebhookVerifier, WEBHOOK_CONTENT_TYPE};

/// Error message returned when a token request is missing fields.
pub const MISSING_FIELDS_MESSAGE: &str = "roomName and participantName are required";

/// Shared application state.
///
/// Cloned per request; everything inside is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub minter: TokenMinter,
    pub verifier: WebhookVerifier,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let minter = TokenMinter::new(
            &config.livekit_api_key,
            &config.livekit_api_secret,
            config.token_ttl_secs,
        );
        let verifier =
            WebhookVerifier::new(&config.livekit_api_key, &config.livekit_api_secret);
        Self {
            config: Arc::new(config),
            minter,
            verifier,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Liveness probe. Always 200 with an empty body.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// Token Issuance
// =============================================================================

/// Token request body.
///
/// Both fields are optional at the deserialization layer so that a missing
/// field reaches the handler's own validation instead of a framework error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: &'static str,
}

/// Mint a token letting `participantName` join `roomName`.
pub async fn create_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Response {
    let (Some(room_name), Some(participant_name)) =
        (request.room_name, request.participant_name)
    else {
        warn!("token_request_missing_fields");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error_message: MISSING_FIELDS_MESSAGE,
            }),
        )
            .into_response();
    };

    match state.minter.mint(&participant_name, &room_name) {
        Ok(token) => {
            info!(room = %room_name, participant = %participant_name, "token_minted");
            (StatusCode::OK, Json(TokenResponse { token })).into_response()
        }
        Err(e) => {
            error!(error = %e, "token_mint_failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// =============================================================================
// Room Creation
// =============================================================================

/// Room request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_name: String,
}

#[derive(Serialize)]
pub struct RoomResponse {
    pub rooms: String,
}

/// "Create" a room by minting a grant named after the room itself.
///
/// No room resource exists server-side; the room comes into being when the
/// first holder of a token for it connects to the media server.
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<RoomRequest>,
) -> Response {
    match state.minter.mint(&request.room_name, &request.room_name) {
        Ok(token) => {
            info!(room = %request.room_name, "room_token_minted");
            (StatusCode::OK, Json(RoomResponse { rooms: token })).into_response()
        }
        Err(e) => {
            error!(error = %e, "room_token_mint_failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// =============================================================================
// LiveKit Webhook
// =============================================================================

/// Receive a LiveKit webhook delivery.
///
/// Verification failures are logged and swallowed: the sender always gets
/// 200 "ok", so LiveKit never retries against this server. Intentional,
/// matches the deployed behavior this server replaces.
pub async fn livekit_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if content_type != Some(WEBHOOK_CONTENT_TYPE) {
        warn!(content_type = ?content_type, "webhook_unexpected_content_type");
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.verifier.verify(&body, auth_header) {
        Ok(event) => {
            info!(
                event = %event.event,
                id = %event.id,
                room = ?event.room.as_ref().map(|r| &r.name),
                participant = ?event.participant.as_ref().map(|p| &p.identity),
                "webhook_received"
            );
        }
        Err(e) => {
            error!(error = %e, "webhook_verification_failed");
        }
    }

    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::router;
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};
    use sha2::{Digest, Sha256};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_server() -> TestServer {
        let state = AppState::new(Config {
            livekit_api_key: "devkey".to_string(),
            livekit_api_secret: "secret".to_string(),
            port: 0,
            token_ttl_secs: 3600,
        });
        TestServer::new(router(state)).unwrap()
    }

    /// Sign a webhook body the way a LiveKit server does.
    fn sign_webhook(body: &[u8]) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 600;
        let claims = json!({
            "iss": "devkey",
            "exp": exp,
            "sha256": BASE64.encode(Sha256::digest(body)),
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_200_with_empty_body() {
        let server = test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_health_under_concurrent_repeated_calls() {
        let server = test_server();
        for _ in 0..10 {
            let (a, b, c) = tokio::join!(
                async { server.get("/health").await },
                async { server.get("/health").await },
                async { server.get("/health").await },
            );
            a.assert_status_ok();
            b.assert_status_ok();
            c.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn test_token_with_valid_request() {
        let server = test_server();
        let response = server
            .post("/token")
            .json(&json!({"roomName": "room1", "participantName": "alice"}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let token = body["token"].as_str().unwrap();
        assert!(!token.is_empty());
        // Three dot-separated JWT segments.
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_token_missing_participant_name() {
        let server = test_server();
        let response = server
            .post("/token")
            .json(&json!({"roomName": "room1"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(
            body["errorMessage"],
            "roomName and participantName are required"
        );
    }

    #[tokio::test]
    async fn test_token_missing_room_name() {
        let server = test_server();
        let response = server
            .post("/token")
            .json(&json!({"participantName": "alice"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(
            body["errorMessage"],
            "roomName and participantName are required"
        );
    }

    #[tokio::test]
    async fn test_rooms_returns_token_under_rooms_key() {
        let server = test_server();
        let response = server
            .post("/rooms")
            .json(&json!({"roomName": "room1"}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let token = body["rooms"].as_str().unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_valid_delivery_returns_ok() {
        let server = test_server();
        let body = br#"{"event":"room_started","id":"EV_1","room":{"name":"room1"}}"#;
        let response = server
            .post("/livekit/webhook")
            .add_header(header::AUTHORIZATION, sign_webhook(body))
            .content_type(WEBHOOK_CONTENT_TYPE)
            .bytes(body.to_vec().into())
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_webhook_garbage_still_returns_ok() {
        let server = test_server();
        let response = server
            .post("/livekit/webhook")
            .add_header(header::AUTHORIZATION, "not-a-jwt")
            .content_type(WEBHOOK_CONTENT_TYPE)
            .bytes(b"garbage body".to_vec().into())
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_webhook_missing_auth_still_returns_ok() {
        let server = test_server();
        let response = server
            .post("/livekit/webhook")
            .content_type(WEBHOOK_CONTENT_TYPE)
            .bytes(b"{}".to_vec().into())
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_webhook_wrong_content_type_still_returns_ok() {
        let server = test_server();
        let response = server
            .post("/livekit/webhook")
            .content_type("text/plain")
            .bytes(b"whatever".to_vec().into())
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }
}
