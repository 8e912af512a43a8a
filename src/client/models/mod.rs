//! Market data API models
//!
//! Domain types returned by the CoinMarketCap API, organized by endpoint.

mod info;
mod token;

pub use info::{ProjectUrls, TokenInfo, handle_from_url};
pub use token::{Quote, Quotes, Token, logo_url};

use serde::Deserialize;

/// Standard response envelope status block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Standard response envelope: `{status, data}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: ApiStatus,
    pub data: Option<T>,
}
