//! Quote Types
//!
//! Requests sent to every provider and the quotes they return, plus the
//! ranking applied once all batches are merged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::str::FromStr;

use super::exchange_info::{exchange_info_for, ExchangeInfo};
use super::token::Token;

/// Parameters for a quote fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub from_token: Token,
    pub to_token: Token,
    /// Input amount as a decimal string, already validated by the caller
    pub from_amount: String,
}

impl QuoteRequest {
    pub fn new(from_token: Token, to_token: Token, from_amount: impl Into<String>) -> Self {
        Self {
            from_token,
            to_token,
            from_amount: from_amount.into(),
        }
    }
}

/// A priced swap proposal from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Tag of the provider that produced this quote (dispatch key)
    pub provider: String,
    /// Output amount as a decimal string
    pub amount: String,
    /// Provider-side exchange/venue id
    pub exchange: String,
    /// Display metadata, attached during ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_info: Option<ExchangeInfo>,
    /// Provider specific fields (rate, fees, route, ...) passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Quote {
    pub fn new(
        provider: impl Into<String>,
        amount: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            amount: amount.into(),
            exchange: exchange.into(),
            exchange_info: None,
            extra: HashMap::new(),
        }
    }

    /// Output amount as a decimal, plain or exponent form (`"1e-7"`).
    ///
    /// `None` when the string is not a number or does not fit a `Decimal`.
    pub fn amount_decimal(&self) -> Option<Decimal> {
        let amount = self.amount.trim();
        Decimal::from_str(amount)
            .or_else(|_| Decimal::from_scientific(amount))
            .ok()
    }

    /// Ordering key used by [`rank_quotes`]
    pub fn rank_key(&self) -> AmountRank {
        if let Some(amount) = self.amount_decimal() {
            return AmountRank::Exact(amount);
        }

        match Magnitude::parse(self.amount.trim()) {
            Some(magnitude) if magnitude.exponent > 0 => AmountRank::Beyond(magnitude),
            Some(_) => {
                tracing::debug!(
                    provider = %self.provider,
                    amount = %self.amount,
                    "Quote amount below decimal precision, ranking as zero"
                );
                AmountRank::Exact(Decimal::ZERO)
            }
            None => {
                tracing::debug!(
                    provider = %self.provider,
                    amount = %self.amount,
                    "Unparsable quote amount, ranking last"
                );
                AmountRank::Unparsable
            }
        }
    }
}

/// Comparable form of a quote amount.
///
/// Variant order is significant: anything unparsable sorts below every
/// number, and numbers too large for a `Decimal` sort above every one that fits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AmountRank {
    Unparsable,
    Exact(Decimal),
    Beyond(Magnitude),
}

/// Positive number kept as its significant digits and the position of the
/// leading digit relative to the decimal point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Magnitude {
    exponent: i64,
    digits: String,
}

impl Magnitude {
    /// Parse `int[.frac][e[+-]exp]` without precision limits
    fn parse(amount: &str) -> Option<Self> {
        let (mantissa, exponent) = match amount.split_once(['e', 'E']) {
            Some((mantissa, exp)) => (mantissa, exp.parse::<i64>().ok()?),
            None => (amount, 0),
        };
        let mantissa = mantissa.strip_prefix('+').unwrap_or(mantissa);
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let all = format!("{}{}", int, frac);
        let leading = all.len() - all.trim_start_matches('0').len();
        let digits = all[leading..].trim_end_matches('0').to_string();
        if digits.is_empty() {
            return None;
        }

        Some(Self {
            exponent: (int.len() as i64 - leading as i64).checked_add(exponent)?,
            digits,
        })
    }
}

/// Sort by output amount, largest first.
///
/// The sort is stable: quotes with equal amounts keep the order in which the
/// provider batches were concatenated.
pub fn rank_quotes(quotes: &mut [Quote]) {
    quotes.sort_by_cached_key(|q| Reverse(q.rank_key()));
}

/// Attach exchange display info to every quote
pub fn enrich_quotes(quotes: &mut [Quote]) {
    for quote in quotes.iter_mut() {
        quote.exchange_info = Some(exchange_info_for(&quote.exchange));
    }
}
