pub mod aggregator;

pub use aggregator::{
    AggregatorConfig, AggregatorError, SwapAggregator, DEFAULT_PROVIDER_TIMEOUT,
    FALLBACK_BASE_INDEX, FLAGSHIP_BASE_INDEX,
};
