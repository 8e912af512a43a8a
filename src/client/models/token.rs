//! Catalog and quote models

use serde::{Deserialize, Serialize};

/// Base URL for 64px token logos
const LOGO_BASE_URL: &str = "https://s2.coinmarketcap.com/static/img/coins/64x64";

/// Build the logo URL for a provider token id.
pub fn logo_url(id: u64) -> String {
    format!("{}/{}.png", LOGO_BASE_URL, id)
}

/// A token as returned by the listings and quotes endpoints.
///
/// Snapshot of provider data at fetch time. `id` is unique within a
/// snapshot; `symbol` is not (the same ticker exists on several chains).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Provider-assigned id
    pub id: u64,

    /// Display name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// URL slug
    #[serde(default)]
    pub slug: String,

    /// Market-cap rank
    #[serde(default)]
    pub cmc_rank: Option<u32>,

    /// Number of trading pairs
    #[serde(default)]
    pub num_market_pairs: Option<u64>,

    /// Circulating supply
    #[serde(default)]
    pub circulating_supply: Option<f64>,

    /// Total supply
    #[serde(default)]
    pub total_supply: Option<f64>,

    /// Maximum supply (None for uncapped tokens)
    #[serde(default)]
    pub max_supply: Option<f64>,

    /// Quotes keyed by conversion currency
    #[serde(default)]
    pub quote: Quotes,
}

/// Quote map; only USD is requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quotes {
    #[serde(rename = "USD", default)]
    pub usd: Quote,
}

/// Market figures in one currency. Any field may be null upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub volume_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_dominance: Option<f64>,
    #[serde(default)]
    pub fully_diluted_market_cap: Option<f64>,
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
    #[serde(default)]
    pub percent_change_30d: Option<f64>,
    #[serde(default)]
    pub percent_change_60d: Option<f64>,
    #[serde(default)]
    pub percent_change_90d: Option<f64>,
}

impl Token {
    /// Minimal token with identity fields only.
    pub fn new(id: u64, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            slug: String::new(),
            cmc_rank: None,
            num_market_pairs: None,
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            quote: Quotes::default(),
        }
    }

    /// Logo URL for this token
    pub fn logo(&self) -> String {
        logo_url(self.id)
    }
}
