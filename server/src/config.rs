//! Configuration module for environment variable parsing.
//!
//! All configuration comes from environment variables with development
//! defaults matching the LiveKit dev server credentials.

use std::env;

/// Application configuration loaded from environment variables.
///
/// The credential pair is process-wide and read-only. It is loaded once at
/// startup and shared behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// LiveKit API key (the `iss` claim of every token this server signs)
    pub livekit_api_key: String,

    /// LiveKit API secret used for token signing and webhook verification
    pub livekit_api_secret: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Lifetime in seconds of minted access tokens
    pub token_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            livekit_api_key: env::var("LIVEKIT_API_KEY")
                .unwrap_or_else(|_| "devkey".to_string()),

            livekit_api_secret: env::var("LIVEKIT_API_SECRET")
                .unwrap_or_else(|_| "secret".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6080),

            token_ttl_secs: env::var("LIVEKIT_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(21600), // 6 hours, LiveKit's default
        }
    }
}
