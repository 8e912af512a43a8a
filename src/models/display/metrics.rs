//! Token metrics display model

use serde::Serialize;
use tabled::Tabled;

use crate::metrics::TokenMetrics;
use crate::output::formatters::{format_count, format_percent, format_price, format_usd_compact};

/// Comparison row, one per token
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MetricsDisplay {
    #[tabled(rename = "SYMBOL")]
    pub symbol: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "MARKET CAP")]
    pub market_cap: String,

    #[tabled(rename = "FDV")]
    pub fdv: String,

    #[tabled(rename = "VOL 24H")]
    pub volume_24h: String,

    #[tabled(rename = "24H")]
    pub change_24h: String,

    #[tabled(rename = "7D")]
    pub change_7d: String,

    #[tabled(rename = "CIRC %")]
    pub circulating_percent: String,

    #[tabled(rename = "FOLLOWERS")]
    pub followers: String,
}

impl From<&TokenMetrics> for MetricsDisplay {
    fn from(m: &TokenMetrics) -> Self {
        Self {
            symbol: m.symbol.clone(),
            price: format_price(m.price),
            market_cap: format_usd_compact(m.market_cap),
            fdv: format_usd_compact(m.fully_diluted_market_cap),
            volume_24h: format_usd_compact(m.volume_24h),
            change_24h: format_percent(m.percent_change_24h),
            change_7d: format_percent(m.percent_change_7d),
            circulating_percent: format!("{:.1}%", m.circulating_supply_percent),
            followers: followers_label(m.twitter_followers, m.twitter_suspended),
        }
    }
}

pub(crate) fn followers_label(count: u64, suspended: bool) -> String {
    if suspended {
        "suspended".to_string()
    } else if count == 0 {
        "--".to_string()
    } else {
        format_count(count)
    }
}
