//! Search result display model

use serde::Serialize;
use tabled::Tabled;

use crate::search::Scored;

/// One ranked search hit
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SearchResultDisplay {
    #[tabled(rename = "RANK")]
    pub rank: String,

    #[tabled(rename = "SYMBOL")]
    pub symbol: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "ID")]
    pub id: u64,

    #[tabled(rename = "SCORE")]
    pub score: String,

    #[tabled(skip)]
    pub logo: String,
}

impl From<&Scored<'_>> for SearchResultDisplay {
    fn from(scored: &Scored<'_>) -> Self {
        let token = scored.token;
        Self {
            rank: token
                .cmc_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "--".to_string()),
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            id: token.id,
            score: if scored.exact {
                "exact".to_string()
            } else {
                format!("{:.1}", scored.score)
            },
            logo: token.logo(),
        }
    }
}
