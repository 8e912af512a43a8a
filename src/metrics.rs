//! Token comparison metrics
//!
//! Joins latest quotes, project metadata and follower readings into one
//! record per token.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use log::debug;
use serde::Serialize;

use crate::cache::FollowerReading;
use crate::client::{MarketDataApi, Token, TokenInfo};
use crate::error::Result;
use crate::social::Enricher;

/// Enriched comparison record for one token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub logo: String,
    pub rank: Option<u32>,

    pub price: f64,
    pub market_cap: f64,
    pub fully_diluted_market_cap: f64,
    pub circulating_market_cap: f64,
    pub volume_24h: f64,
    pub volume_change_24h: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub percent_change_30d: f64,
    pub percent_change_60d: f64,
    pub percent_change_90d: f64,
    pub total_supply: f64,
    pub circulating_supply: f64,
    pub max_supply: Option<f64>,
    pub circulating_supply_percent: f64,
    pub dominance: f64,
    pub turnover: f64,
    pub market_pairs: u64,

    pub twitter_followers: u64,
    pub twitter_suspended: bool,
    pub twitter_username: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub reddit: Option<String>,
    pub github: Option<String>,
}

impl TokenMetrics {
    /// Build the record from a quote, optional metadata and a follower reading.
    pub fn build(token: &Token, info: Option<&TokenInfo>, followers: FollowerReading) -> Self {
        let usd = &token.quote.usd;
        let raw_market_cap = nonzero(usd.market_cap);
        let raw_fdv = nonzero(usd.fully_diluted_market_cap);

        // Each cap stands in for the other when one is missing
        let market_cap = raw_market_cap.or(raw_fdv).unwrap_or(0.0);
        let fully_diluted_market_cap = raw_fdv.or(raw_market_cap).unwrap_or(0.0);

        let volume_24h = usd.volume_24h.unwrap_or(0.0);
        let circulating_supply = token.circulating_supply.unwrap_or(0.0);
        let total_supply = token.total_supply.unwrap_or(0.0);

        let first = |urls: &[String]| urls.first().cloned();

        Self {
            id: token.id,
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            logo: info
                .and_then(|i| i.logo.clone())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| token.logo()),
            rank: token.cmc_rank,

            price: usd.price.unwrap_or(0.0),
            market_cap,
            fully_diluted_market_cap,
            circulating_market_cap: usd.market_cap.unwrap_or(0.0),
            volume_24h,
            volume_change_24h: usd.volume_change_24h.unwrap_or(0.0),
            percent_change_1h: usd.percent_change_1h.unwrap_or(0.0),
            percent_change_24h: usd.percent_change_24h.unwrap_or(0.0),
            percent_change_7d: usd.percent_change_7d.unwrap_or(0.0),
            percent_change_30d: usd.percent_change_30d.unwrap_or(0.0),
            percent_change_60d: usd.percent_change_60d.unwrap_or(0.0),
            percent_change_90d: usd.percent_change_90d.unwrap_or(0.0),
            total_supply,
            circulating_supply,
            max_supply: token.max_supply,
            circulating_supply_percent: supply_percent(
                circulating_supply,
                token.max_supply,
                total_supply,
            ),
            dominance: usd.market_cap_dominance.unwrap_or(0.0),
            turnover: if market_cap > 0.0 {
                volume_24h / market_cap
            } else {
                0.0
            },
            market_pairs: token.num_market_pairs.unwrap_or(0),

            twitter_followers: followers.count,
            twitter_suspended: followers.suspended,
            twitter_username: info.and_then(TokenInfo::handle),
            website: info.and_then(|i| first(&i.urls.website)),
            twitter: info.and_then(|i| first(&i.urls.twitter)),
            telegram: info.and_then(|i| i.telegram().map(str::to_string)),
            reddit: info.and_then(|i| first(&i.urls.reddit)),
            github: info.and_then(|i| first(&i.urls.source_code)),
        }
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Circulating share of max supply, else of total supply, as a percentage
fn supply_percent(circulating: f64, max: Option<f64>, total: f64) -> f64 {
    let denominator = max.filter(|m| *m > 0.0).unwrap_or(total);
    if denominator > 0.0 {
        circulating / denominator * 100.0
    } else {
        0.0
    }
}

/// Builds [`TokenMetrics`] for requested ids
pub struct MetricsService {
    api: Arc<dyn MarketDataApi>,
    enricher: Arc<Enricher>,
}

impl MetricsService {
    pub fn new(api: Arc<dyn MarketDataApi>, enricher: Arc<Enricher>) -> Self {
        Self { api, enricher }
    }

    /// Metrics keyed by id. Ids unknown to the provider are omitted.
    ///
    /// Quote or metadata failures propagate; follower failures degrade to zero.
    pub async fn fetch_metrics(&self, ids: &[u64]) -> Result<BTreeMap<u64, TokenMetrics>> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let (quotes, info) = tokio::try_join!(self.api.quotes(ids), self.api.info(ids))?;
        debug!("Got {} quotes and {} info entries", quotes.len(), info.len());

        let builds = ids.iter().filter_map(|id| quotes.get(id)).map(|token| {
            let info = info.get(&token.id);
            async move {
                let followers = match info.and_then(TokenInfo::handle) {
                    Some(handle) => self.enricher.followers(&handle).await,
                    None => FollowerReading::default(),
                };
                (token.id, TokenMetrics::build(token, info, followers))
            }
        });

        Ok(join_all(builds).await.into_iter().collect())
    }
}
