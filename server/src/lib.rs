//! LiveKit token server.
//!
//! A minimal HTTP backend for a LiveKit deployment:
//! - mints signed access tokens that let participants join rooms
//! - receives and verifies LiveKit's webhook notifications
//!
//! ## Architecture
//!
//! ```text
//! Client → HTTP endpoint → TokenMinter / WebhookVerifier → HTTP response
//! ```
//!
//! Stateless, request-per-call. The only shared state is the immutable
//! credential pair loaded at startup.

pub mod config;
pub mod token;
pub mod web;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use token::{AccessTokenClaims, MintError, TokenMinter, VideoGrant};
pub use web::AppState;
pub use webhook::{VerifyError, WebhookEvent, WebhookVerifier};
