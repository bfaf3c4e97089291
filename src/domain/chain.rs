//! Chain identifiers
//!
//! Networks the aggregator can be built for. Three flagship EVM chains get a
//! dedicated base provider for the token universe; everything else falls back.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Network the aggregator (and every provider it wraps) is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
    Polygon,
    BinanceSmartChain,
    /// Any other network, kept under its canonical short name
    Other(String),
}

impl Chain {
    /// Short network name as used by providers ("ETH", "POL", "BSC", ...)
    pub fn name(&self) -> &str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Polygon => "POL",
            Chain::BinanceSmartChain => "BSC",
            Chain::Other(name) => name,
        }
    }

    /// Flagship chains share the same base token list provider
    pub fn is_flagship(&self) -> bool {
        matches!(
            self,
            Chain::Ethereum | Chain::Polygon | Chain::BinanceSmartChain
        )
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chain = match s.trim().to_uppercase().as_str() {
            "ETH" | "ETHEREUM" => Chain::Ethereum,
            "POL" | "MATIC" | "POLYGON" => Chain::Polygon,
            "BSC" | "BNB" => Chain::BinanceSmartChain,
            other => Chain::Other(other.to_string()),
        };
        Ok(chain)
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flagship_chains() {
        assert!(Chain::Ethereum.is_flagship());
        assert!(Chain::Polygon.is_flagship());
        assert!(Chain::BinanceSmartChain.is_flagship());
        assert!(!Chain::Other("ARB".to_string()).is_flagship());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("matic".parse::<Chain>().unwrap(), Chain::Polygon);
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!(
            "arb".parse::<Chain>().unwrap(),
            Chain::Other("ARB".to_string())
        );
    }

    #[test]
    fn test_serde_uses_short_name() {
        let json = serde_json::to_string(&Chain::BinanceSmartChain).unwrap();
        assert_eq!(json, "\"BSC\"");

        let chain: Chain = serde_json::from_str("\"OP\"").unwrap();
        assert_eq!(chain.name(), "OP");
    }
}
