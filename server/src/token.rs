//! Access token minting.
//!
//! LiveKit access tokens are HS256 JWTs signed with the API secret. The API
//! key travels as the `iss` claim, the participant identity as `sub`, and the
//! room permissions as a camelCase `video` grant object.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Room permissions embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Room the token is scoped to
    pub room: String,
    /// Whether the holder may join the room
    pub room_join: bool,
}

/// Claim set of a minted access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// API key of the signing server
    pub iss: String,
    /// Participant identity
    pub sub: String,
    /// Participant display name
    pub name: String,
    /// Not valid before (Unix seconds)
    pub nbf: u64,
    /// Expiration (Unix seconds)
    pub exp: u64,
    /// Room grant
    pub video: VideoGrant,
}

/// Token minting failure.
#[derive(Debug, Error)]
pub enum MintError {
    #[error("system clock is before the Unix epoch")]
    Clock,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs room-join grants with a fixed credential pair.
///
/// This is the whole boundary to the token format: `mint(identity, room)`
/// returns an opaque signed string and nothing else leaks out.
#[derive(Clone)]
pub struct TokenMinter {
    api_key: String,
    encoding_key: EncodingKey,
    ttl_secs: u64,
}

impl TokenMinter {
    /// Create a minter for the given credential pair.
    pub fn new(api_key: &str, api_secret: &str, ttl_secs: u64) -> Self {
        Self {
            api_key: api_key.to_string(),
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Mint a token that lets `identity` join `room`.
    ///
    /// The identity doubles as the display name.
    pub fn mint(&self, identity: &str, room: &str) -> Result<String, MintError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| MintError::Clock)?
            .as_secs();

        let claims = AccessTokenClaims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            name: identity.to_string(),
            nbf: now,
            exp: now + self.ttl_secs,
            video: VideoGrant {
                room: room.to_string(),
                room_join: true,
            },
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }
}
