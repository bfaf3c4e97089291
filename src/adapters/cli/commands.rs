//! CLI Command Definitions
//!
//! Argument structures for the swap aggregator binary. Handlers live in main.rs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// swap-aggregator - Multi-provider token swap aggregator
#[derive(Parser, Debug)]
#[command(
    name = "swap-aggregator",
    version = env!("CARGO_PKG_VERSION"),
    about = "Multi-provider token swap aggregator",
    long_about = "Merges token lists and quotes from several swap providers, ranks quotes \
                  by output amount and routes follow-up calls to the provider that quoted."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the merged token universe
    Tokens(TokensCmd),

    /// Fetch and rank quotes from every provider
    Quote(QuoteCmd),

    /// Show configured providers and their eligibility
    Providers(ProvidersCmd),
}

/// List tokens
#[derive(Parser, Debug)]
pub struct TokensCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/aggregator.toml")]
    pub config: PathBuf,

    /// Override the configured chain (e.g., ETH, POL, BSC)
    #[arg(long, value_name = "CHAIN")]
    pub chain: Option<String>,

    /// Show only tokens that can be sold (have a contract)
    #[arg(long)]
    pub from_only: bool,

    /// Maximum number of tokens to print
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Get ranked quotes
#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Token to sell, by symbol or contract address
    #[arg(value_name = "FROM")]
    pub from_token: String,

    /// Token to buy, by symbol or contract address
    #[arg(value_name = "TO")]
    pub to_token: String,

    /// Amount to sell, as a decimal string
    #[arg(value_name = "AMOUNT")]
    pub amount: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/aggregator.toml")]
    pub config: PathBuf,

    /// Override the configured chain (e.g., ETH, POL, BSC)
    #[arg(long, value_name = "CHAIN")]
    pub chain: Option<String>,

    /// Fail if any provider fails instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Wallet address for the telemetry session
    #[arg(long, value_name = "ADDRESS")]
    pub wallet: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Show providers
#[derive(Parser, Debug)]
pub struct ProvidersCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/aggregator.toml")]
    pub config: PathBuf,

    /// Override the configured chain (e.g., ETH, POL, BSC)
    #[arg(long, value_name = "CHAIN")]
    pub chain: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_app_parse_tokens() {
        let args = vec!["swap-aggregator", "tokens", "--config", "test.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Tokens(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("test.toml"));
                assert!(!cmd.from_only);
                assert!(cmd.limit.is_none());
            }
            _ => panic!("Expected Tokens command"),
        }
    }

    #[test]
    fn test_cli_app_parse_tokens_with_flags() {
        let args = vec!["swap-aggregator", "tokens", "--from-only", "-l", "5", "--json", "--chain", "bsc"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Tokens(cmd) => {
                assert!(cmd.from_only);
                assert!(cmd.json);
                assert_eq!(cmd.limit, Some(5));
                assert_eq!(cmd.chain.as_deref(), Some("bsc"));
            }
            _ => panic!("Expected Tokens command"),
        }
    }

    #[test]
    fn test_cli_app_parse_quote() {
        let args = vec!["swap-aggregator", "quote", "WETH", "DAI", "1.5"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Quote(cmd) => {
                assert_eq!(cmd.from_token, "WETH");
                assert_eq!(cmd.to_token, "DAI");
                assert_eq!(cmd.amount, "1.5");
                assert_eq!(cmd.config, PathBuf::from("config/aggregator.toml"));
                assert!(!cmd.strict);
                assert!(cmd.wallet.is_none());
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_app_parse_quote_strict() {
        let args = vec!["swap-aggregator", "quote", "WETH", "DAI", "1", "--strict"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Quote(cmd) => assert!(cmd.strict),
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_app_parse_providers() {
        let args = vec!["swap-aggregator", "providers", "--chain", "POL"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Providers(cmd) => assert_eq!(cmd.chain.as_deref(), Some("POL")),
            _ => panic!("Expected Providers command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["swap-aggregator", "providers", "--verbose"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.verbose);
        assert!(!app.debug);

        let args = vec!["swap-aggregator", "--debug", "tokens"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.debug);
    }

    #[test]
    fn test_quote_requires_amount() {
        let args = vec!["swap-aggregator", "quote", "WETH", "DAI"];
        assert!(CliApp::try_parse_from(args).is_err());
    }
}
