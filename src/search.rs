//! Fuzzy token search over the catalog
//!
//! A token is a candidate when its symbol or name contains the query,
//! case-insensitively. Candidates are ordered by a heuristic score that
//! weights symbol similarity twice as heavily as name similarity; an exact
//! symbol match always ranks first.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::client::Token;

/// Maximum number of results returned by [`rank`]
pub const MAX_RESULTS: usize = 50;

/// Score assigned to an exact (case-insensitive) symbol match
pub const EXACT_MATCH_SCORE: f64 = 1000.0;

const CONSECUTIVE_WEIGHT: f64 = 10.0;
const COVERAGE_WEIGHT: f64 = 20.0;
const PREFIX_BONUS: f64 = 50.0;
const SYMBOL_WEIGHT: f64 = 2.0;

/// Similarity of `text` to `query`, case-insensitive.
///
/// Sum of three parts:
/// - longest run of `query` starting from its first char found in `text`, x10
/// - fraction of distinct query chars present anywhere in `text`, x20
/// - 50 if `text` starts with `query`
pub fn match_score(text: &str, query: &str) -> f64 {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let query: Vec<char> = query.to_lowercase().chars().collect();
    if query.is_empty() {
        return 0.0;
    }

    let consecutive = longest_prefix_run(&text, &query);

    let present: HashSet<char> = text.iter().copied().collect();
    let distinct: HashSet<char> = query.iter().copied().collect();
    let covered = distinct.iter().filter(|c| present.contains(c)).count();
    let coverage = covered as f64 / query.len() as f64;

    let prefix = if text.starts_with(&query) {
        PREFIX_BONUS
    } else {
        0.0
    };

    consecutive as f64 * CONSECUTIVE_WEIGHT + coverage * COVERAGE_WEIGHT + prefix
}

// max over i of the number of leading query chars matching text[i..]
fn longest_prefix_run(text: &[char], query: &[char]) -> usize {
    (0..text.len())
        .map(|i| {
            text[i..]
                .iter()
                .zip(query)
                .take_while(|(t, q)| t == q)
                .count()
        })
        .max()
        .unwrap_or(0)
}

/// A ranked candidate
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub token: &'a Token,
    pub score: f64,
    pub exact: bool,
}

/// Score one token against a query, `None` if it is not a candidate.
pub fn score_token<'a>(token: &'a Token, query: &str) -> Option<Scored<'a>> {
    let query = query.to_lowercase();
    let symbol = token.symbol.to_lowercase();
    let name = token.name.to_lowercase();

    if !symbol.contains(&query) && !name.contains(&query) {
        return None;
    }

    if symbol == query {
        return Some(Scored {
            token,
            score: EXACT_MATCH_SCORE,
            exact: true,
        });
    }

    let score = SYMBOL_WEIGHT * match_score(&symbol, &query) + match_score(&name, &query);
    Some(Scored {
        token,
        score,
        exact: false,
    })
}

/// Rank catalog tokens for a query, best first, at most [`MAX_RESULTS`].
///
/// Sorting is stable: equal scores keep catalog order. A blank query
/// matches nothing.
pub fn rank_scored<'a>(tokens: &'a [Token], query: &str) -> Vec<Scored<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Scored<'a>> = tokens
        .iter()
        .filter_map(|t| score_token(t, query))
        .collect();

    scored.sort_by(|a, b| {
        b.exact
            .cmp(&a.exact)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });
    scored.truncate(MAX_RESULTS);
    scored
}

/// Ranked tokens without scores
pub fn rank<'a>(tokens: &'a [Token], query: &str) -> Vec<&'a Token> {
    rank_scored(tokens, query)
        .into_iter()
        .map(|s| s.token)
        .collect()
}

/// Search result as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub rank: Option<u32>,
    pub logo: String,
}

impl From<&Token> for SearchResult {
    fn from(token: &Token) -> Self {
        Self {
            id: token.id,
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            rank: token.cmc_rank,
            logo: token.logo(),
        }
    }
}

/// Search the catalog and project matches to [`SearchResult`]s
pub fn search(tokens: &[Token], query: &str) -> Vec<SearchResult> {
    rank(tokens, query).into_iter().map(SearchResult::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Token> {
        vec![
            Token::new(1, "BTC", "Bitcoin"),
            Token::new(1027, "ETH", "Ethereum"),
            Token::new(1321, "ETC", "Ethereum Classic"),
            Token::new(2, "ORB", "Orbit"),
            Token::new(3, "WETH", "Wrapped Ether"),
        ]
    }

    fn ids(results: &[&Token]) -> Vec<u64> {
        results.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_match_score_components() {
        // run 3, full coverage, prefix
        assert_eq!(match_score("bitcoin", "bit"), 30.0 + 20.0 + 50.0);
        // run 3, full coverage, no prefix
        assert_eq!(match_score("orbit", "bit"), 30.0 + 20.0);
        // no run from the first query char, half coverage
        assert_eq!(match_score("abc", "zb"), 10.0);
    }

    #[test]
    fn test_match_score_is_case_insensitive() {
        assert_eq!(match_score("BitCoin", "BIT"), match_score("bitcoin", "bit"));
    }

    #[test]
    fn test_match_score_coverage_uses_distinct_chars() {
        // {a} present out of 3 query chars
        let score = match_score("xa", "aaa");
        assert!((score - (10.0 + 20.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_prefix_beats_infix() {
        assert!(match_score("bitcoin", "bit") > match_score("orbit", "bit"));
    }

    #[test]
    fn test_exact_symbol_scores_fixed() {
        let token = Token::new(1027, "ETH", "Ethereum");
        let scored = score_token(&token, "eth").unwrap();
        assert!(scored.exact);
        assert_eq!(scored.score, EXACT_MATCH_SCORE);
    }

    #[test]
    fn test_non_candidate() {
        let token = Token::new(1, "BTC", "Bitcoin");
        assert!(score_token(&token, "eth").is_none());
    }

    #[test]
    fn test_two_letter_query() {
        let tokens = vec![Token::new(1, "BTC", "Bitcoin"), Token::new(1027, "ETH", "Ethereum")];
        assert_eq!(ids(&rank(&tokens, "et")), vec![1027]);
    }

    #[test]
    fn test_exact_symbol_ranks_first() {
        let tokens = catalog();
        let ranked = rank(&tokens, "eth");

        assert_eq!(ranked[0].symbol, "ETH");
        assert!(ranked.iter().any(|t| t.symbol == "WETH"));
        assert!(ranked.iter().any(|t| t.symbol == "ETC"));
    }

    #[test]
    fn test_exact_symbol_beats_long_name_match() {
        let long = "abcdefghijklmnopqrstuvwxyz0123";
        let tokens = vec![
            Token::new(1, format!("{}x", long), long.to_string()),
            Token::new(2, long.to_string(), "Other"),
        ];

        assert_eq!(ids(&rank(&tokens, long)), vec![2, 1]);
    }

    #[test]
    fn test_ranks_bitcoin_before_orbit() {
        let tokens = vec![Token::new(2, "ORB", "Orbit"), Token::new(1, "BTC", "Bitcoin")];
        assert_eq!(ids(&rank(&tokens, "bit")), vec![1, 2]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let tokens = vec![
            Token::new(10, "AAA", "Foo One"),
            Token::new(11, "BBB", "Foo Two"),
            Token::new(12, "CCC", "Foo Six"),
        ];

        assert_eq!(ids(&rank(&tokens, "foo")), vec![10, 11, 12]);
    }

    #[test]
    fn test_results_capped() {
        let tokens: Vec<Token> = (0..120)
            .map(|i| Token::new(i, format!("DOGE{}", i), format!("Dog Coin {}", i)))
            .collect();

        let ranked = rank(&tokens, "doge");
        assert_eq!(ranked.len(), MAX_RESULTS);
    }

    #[test]
    fn test_blank_query_is_empty() {
        let tokens = catalog();
        assert!(rank(&tokens, "").is_empty());
        assert!(rank(&tokens, "   ").is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let tokens = catalog();
        assert!(rank(&tokens, "zzzz").is_empty());
    }

    #[test]
    fn test_search_projects_results() {
        let mut token = Token::new(1027, "ETH", "Ethereum");
        token.cmc_rank = Some(2);

        let results = search(&[token], "ethereum");
        assert_eq!(
            results,
            vec![SearchResult {
                id: 1027,
                name: "Ethereum".into(),
                symbol: "ETH".into(),
                rank: Some(2),
                logo: "https://s2.coinmarketcap.com/static/img/coins/64x64/1027.png".into(),
            }]
        );
    }
}
