//! Token Types
//!
//! Tokens as listed by swap providers, plus the ordered registry used to merge
//! several provider lists into one universe.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contract address providers use for the chain's native coin
pub const MAIN_TOKEN_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// Contract that is never offered for swapping
pub const DOGE_ADDRESS: &str = "0x4206931337dc273a630d328dA6441786BfaD668f";

/// Token as returned by a provider's supported-token listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Contract address (empty for entries a provider lists without one)
    #[serde(default)]
    pub contract: String,
    #[serde(default)]
    pub symbol: String,
    /// Display name, used for sorting
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub decimals: u8,
    /// Provider specific fields (logo, network, price, ...) passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Token {
    pub fn new(
        contract: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            contract: contract.into(),
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            extra: HashMap::new(),
        }
    }

    /// Identity key: lowercased contract address
    pub fn key(&self) -> String {
        self.contract.to_lowercase()
    }

    pub fn has_contract(&self) -> bool {
        !self.contract.is_empty()
    }

    pub fn is_main_token(&self) -> bool {
        self.contract.eq_ignore_ascii_case(MAIN_TOKEN_ADDRESS)
    }

    pub fn is_excluded(&self) -> bool {
        self.contract.eq_ignore_ascii_case(DOGE_ADDRESS)
    }

    /// Short label for logs and telemetry: symbol, else contract
    pub fn label(&self) -> &str {
        if self.symbol.is_empty() {
            &self.contract
        } else {
            &self.symbol
        }
    }
}

/// Insertion-ordered, key-unique token container.
///
/// Keys are lowercased contracts. The first token inserted under a key wins;
/// later duplicates are dropped, which makes provider order the precedence rule.
#[derive(Debug, Default, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    index: HashMap<String, usize>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless excluded or already present. Returns true if stored.
    pub fn insert(&mut self, token: Token) -> bool {
        if token.is_excluded() {
            return false;
        }
        let key = token.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.tokens.len());
        self.tokens.push(token);
        true
    }

    /// Insert a whole provider list, returning how many were new
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> usize {
        tokens
            .into_iter()
            .map(|t| self.insert(t))
            .filter(|&added| added)
            .count()
    }

    pub fn get(&self, contract: &str) -> Option<&Token> {
        self.index
            .get(&contract.to_lowercase())
            .map(|&i| &self.tokens[i])
    }

    pub fn contains(&self, contract: &str) -> bool {
        self.index.contains_key(&contract.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Produce the sorted from/to views
    pub fn into_universe(self) -> TokenUniverse {
        TokenUniverse::from_tokens(self.tokens)
    }
}

/// Merged token lists offered to the caller
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUniverse {
    /// Tokens that can be sold: sorted set restricted to entries with a contract
    pub from_tokens: Vec<Token>,
    /// Tokens that can be bought: full sorted set
    pub to_tokens: Vec<Token>,
}

impl TokenUniverse {
    /// Sort by name (byte-wise, so case-sensitive) and derive both views
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        tokens.sort_by(|a, b| a.name.cmp(&b.name));
        let from_tokens = tokens.iter().filter(|t| t.has_contract()).cloned().collect();
        Self {
            from_tokens,
            to_tokens: tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.to_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_tokens.is_empty()
    }

    /// Look up by contract, then by symbol (both case-insensitive).
    /// A symbol listed by several tokens resolves to the first in name order.
    pub fn find(&self, query: &str) -> Option<&Token> {
        let query = query.trim();
        self.to_tokens
            .iter()
            .find(|t| t.has_contract() && t.contract.eq_ignore_ascii_case(query))
            .or_else(|| {
                self.to_tokens
                    .iter()
                    .find(|t| t.symbol.eq_ignore_ascii_case(query))
            })
    }
}
