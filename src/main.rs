//! swap-aggregator - Multi-provider token swap aggregator
//!
//! Runs the aggregator over fixture providers described in a TOML config.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use swap_aggregator::adapters::cli::{CliApp, Command, ProvidersCmd, QuoteCmd, TokensCmd};
use swap_aggregator::adapters::{FixtureSet, SessionTraceConfig, SessionTraceEmitter, TracingEmitter};
use swap_aggregator::application::{AggregatorConfig, SwapAggregator};
use swap_aggregator::config::{load_config, Config};
use swap_aggregator::domain::{has_valid_decimals, Chain, QuoteRequest, Token};
use swap_aggregator::ports::EventEmitter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API keys go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config_path = match &app.command {
        Command::Tokens(cmd) => cmd.config.clone(),
        Command::Quote(cmd) => cmd.config.clone(),
        Command::Providers(cmd) => cmd.config.clone(),
    };

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Tokens(cmd) => tokens_command(cmd, &config).await,
        Command::Quote(cmd) => quote_command(cmd, &config).await,
        Command::Providers(cmd) => providers_command(cmd, &config).await,
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

/// Aggregator config from file, with CLI overrides applied
fn resolve_aggregator_config(config: &Config, chain: Option<&str>) -> AggregatorConfig {
    let mut aggregator = AggregatorConfig::from(config);
    if let Some(chain) = chain {
        aggregator.chain = chain.parse::<Chain>().unwrap_or_else(|never| match never {});
    }
    aggregator
}

fn load_providers(config: &Config) -> Result<FixtureSet> {
    if config.providers.is_empty() {
        bail!("No providers configured. Add [[providers]] entries to the config file.");
    }

    let paths = config.fixture_paths();
    let set = FixtureSet::load_all(&paths).context("Failed to load provider fixtures")?;
    Ok(set)
}

/// Build the aggregator, warning when a fixture id differs from its config entry
fn build_aggregator(
    config: &Config,
    aggregator_config: AggregatorConfig,
    emitter: Arc<dyn EventEmitter>,
) -> Result<SwapAggregator> {
    let fixtures = load_providers(config)?;
    let aggregator = SwapAggregator::from_factory(&fixtures, aggregator_config, emitter);

    for (entry, id) in config.providers.iter().zip(aggregator.provider_ids()) {
        if entry.id != id {
            tracing::warn!(
                configured = %entry.id,
                fixture = %id,
                "Fixture id differs from config entry, dispatch uses the fixture id"
            );
        }
    }
    Ok(aggregator)
}

/// Session trace emitter when telemetry is enabled and a wallet is known,
/// structured log lines otherwise
async fn build_emitter(
    config: &Config,
    wallet: Option<&str>,
    chain: &Chain,
) -> Result<(Arc<dyn EventEmitter>, Option<Arc<SessionTraceEmitter>>)> {
    let telemetry = &config.telemetry;
    let Some(wallet) = wallet.filter(|_| telemetry.enabled) else {
        return Ok((Arc::new(TracingEmitter), None));
    };

    let session = Arc::new(
        SessionTraceEmitter::new(SessionTraceConfig {
            endpoint: telemetry.endpoint.clone(),
            api_key: telemetry.get_api_key(),
            ..SessionTraceConfig::default()
        })
        .context("Failed to create telemetry client")?,
    );

    match session.initialize(wallet, chain.name()).await {
        Ok(_) => {
            let emitter: Arc<dyn EventEmitter> = session.clone();
            Ok((emitter, Some(session)))
        }
        Err(e) => {
            tracing::warn!("Telemetry unavailable ({}), falling back to log output", e);
            Ok((Arc::new(TracingEmitter), None))
        }
    }
}

async fn tokens_command(cmd: TokensCmd, config: &Config) -> Result<()> {
    let aggregator_config = resolve_aggregator_config(config, cmd.chain.as_deref());
    let aggregator = build_aggregator(config, aggregator_config, Arc::new(TracingEmitter))?;

    let universe = aggregator
        .get_all_tokens()
        .await
        .context("Failed to fetch token lists")?;

    let tokens = if cmd.from_only {
        &universe.from_tokens
    } else {
        &universe.to_tokens
    };
    let shown = &tokens[..cmd.limit.unwrap_or(tokens.len()).min(tokens.len())];

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    println!(
        "{} tokens on {} ({} sellable)",
        universe.len(),
        aggregator.chain(),
        universe.from_tokens.len()
    );
    for token in shown {
        println!(
            "  {:<10} {:<32} {:>3}  {}",
            token.symbol, token.name, token.decimals, token.contract
        );
    }
    Ok(())
}

async fn quote_command(cmd: QuoteCmd, config: &Config) -> Result<()> {
    let aggregator_config = resolve_aggregator_config(config, cmd.chain.as_deref())
        .with_quote_isolation(!cmd.strict && config.aggregator.isolate_quote_failures);
    let (emitter, session) =
        build_emitter(config, cmd.wallet.as_deref(), &aggregator_config.chain).await?;
    let aggregator = build_aggregator(config, aggregator_config, emitter)?;

    let universe = aggregator
        .get_all_tokens()
        .await
        .context("Failed to fetch token lists")?;
    let from_token = resolve_token(&universe.from_tokens, &cmd.from_token)?;
    let to_token = universe
        .find(&cmd.to_token)
        .cloned()
        .with_context(|| format!("Unknown token: {}", cmd.to_token))?;

    if !has_valid_decimals(&cmd.amount, from_token.decimals) {
        bail!(
            "{} supports at most {} decimals, got {}",
            from_token.label(),
            from_token.decimals,
            cmd.amount
        );
    }

    let request = QuoteRequest::new(from_token, to_token, cmd.amount.clone());
    let quotes = aggregator
        .get_all_quotes(&request)
        .await
        .context("Failed to fetch quotes")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&quotes)?);
    } else if quotes.is_empty() {
        println!(
            "No quotes for {} {} -> {}",
            cmd.amount,
            request.from_token.label(),
            request.to_token.label()
        );
    } else {
        println!(
            "Quotes for {} {} -> {}",
            cmd.amount,
            request.from_token.label(),
            request.to_token.label()
        );
        for (rank, quote) in quotes.iter().enumerate() {
            let venue = quote
                .exchange_info
                .as_ref()
                .map(|info| info.name.as_str())
                .unwrap_or(quote.exchange.as_str());
            println!(
                "  {:>2}. {:>24} {}  via {} ({})",
                rank + 1,
                quote.amount,
                request.to_token.label(),
                venue,
                quote.provider
            );
        }
    }

    aggregator.flush().await;
    if let Some(session) = session {
        if let Err(e) = session.finish().await {
            tracing::warn!("Failed to close telemetry session: {}", e);
        }
    }
    Ok(())
}

fn resolve_token(tokens: &[Token], query: &str) -> Result<Token> {
    let query = query.trim();
    tokens
        .iter()
        .find(|t| t.contract.eq_ignore_ascii_case(query))
        .or_else(|| tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(query)))
        .cloned()
        .with_context(|| format!("Unknown or unsellable token: {}", query))
}

async fn providers_command(cmd: ProvidersCmd, config: &Config) -> Result<()> {
    let aggregator_config = resolve_aggregator_config(config, cmd.chain.as_deref());
    let base_index = aggregator_config.base_index();
    let chain = aggregator_config.chain.clone();
    let aggregator = build_aggregator(config, aggregator_config, Arc::new(TracingEmitter))?;

    println!("Providers on {} (base index {})", chain, base_index);
    for (index, id) in aggregator.provider_ids().into_iter().enumerate() {
        let eligible = aggregator
            .provider(id)
            .map(|p| p.is_supported_network(&chain))
            .unwrap_or(false);
        let fixture = config
            .providers
            .get(index)
            .map(|entry| entry.fixture_path())
            .unwrap_or_default();

        println!(
            "  [{}] {:<12} {:<10} {}{}",
            index,
            id,
            if eligible { "eligible" } else { "skipped" },
            fixture.display(),
            if index == base_index { "  (base)" } else { "" }
        );
    }
    Ok(())
}
