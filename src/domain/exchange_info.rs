//! Exchange display metadata.
//!
//! Static lookup from the `exchange` id a provider puts on its quotes to the
//! information shown next to that quote. Unknown ids fall back to the default
//! entry named after the id itself.

use serde::{Deserialize, Serialize};

/// Display information attached to every ranked quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub name: String,
    pub partner_name: String,
    pub img: String,
}

impl ExchangeInfo {
    fn from_static(name: &str, partner_name: &str, img: &str) -> Self {
        Self {
            name: name.to_string(),
            partner_name: partner_name.to_string(),
            img: img.to_string(),
        }
    }

    /// Generic entry used for exchanges not in the table
    pub fn default_entry() -> Self {
        Self::from_static("", "", "swap/default-exchange.svg")
    }
}

/// Look up a known exchange id
pub fn known_exchange(exchange: &str) -> Option<ExchangeInfo> {
    let info = match exchange {
        "oneInch" | "ONE_INCH" => ExchangeInfo::from_static("1inch", "1inch Network", "swap/1inch.svg"),
        "zerox" | "ZERO_X" => ExchangeInfo::from_static("0x", "0x Protocol", "swap/0x.svg"),
        "paraswap" | "PARASWAP" => ExchangeInfo::from_static("ParaSwap", "ParaSwap", "swap/paraswap.svg"),
        "changelly" | "CHANGELLY" => ExchangeInfo::from_static("Changelly", "Changelly", "swap/changelly.svg"),
        "uniswap" | "UNISWAP" => ExchangeInfo::from_static("Uniswap", "Uniswap Labs", "swap/uniswap.svg"),
        "sushiswap" | "SUSHISWAP" => ExchangeInfo::from_static("SushiSwap", "Sushi", "swap/sushiswap.svg"),
        "curve" | "CURVE" => ExchangeInfo::from_static("Curve", "Curve Finance", "swap/curve.svg"),
        "balancer" | "BALANCER" => ExchangeInfo::from_static("Balancer", "Balancer Labs", "swap/balancer.svg"),
        "pancakeswap" | "PANCAKESWAP" => ExchangeInfo::from_static("PancakeSwap", "PancakeSwap", "swap/pancakeswap.svg"),
        "quickswap" | "QUICKSWAP" => ExchangeInfo::from_static("QuickSwap", "QuickSwap", "swap/quickswap.svg"),
        _ => return None,
    };
    Some(info)
}

/// Resolve display info for an exchange id, defaulting unknown ids.
///
/// The default is a fresh copy each time, so renaming it never leaks into
/// other quotes.
pub fn exchange_info_for(exchange: &str) -> ExchangeInfo {
    known_exchange(exchange).unwrap_or_else(|| ExchangeInfo {
        name: exchange.to_string(),
        ..ExchangeInfo::default_entry()
    })
}
