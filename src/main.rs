use clap::Parser;
use market_quotes::cli::{Cli, Commands};
use market_quotes::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The API key usually lives in .env next to the dashboard
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    market_quotes::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            args.execute(&config).await?;
        }
        Commands::Fetch(args) => {
            tracing::debug!("Fetching quotes");
            args.execute(&config).await?;
        }
        Commands::Config => {
            let api_key = config.provider.api_key();
            println!("Current configuration:");
            println!("  Provider: {}", config.provider.base_url);
            println!(
                "  API key: {} ({}, {})",
                api_key,
                config.provider.api_key_env,
                if api_key.is_configured() {
                    "configured"
                } else {
                    "missing or placeholder"
                }
            );
            println!(
                "  Fetcher: delay={}s, rate limit policy={:?}, cooldown={}s",
                config.fetcher.request_delay_secs,
                config.fetcher.rate_limit_policy,
                config.fetcher.cooldown_secs
            );
            println!("  Symbol mappings: {}", config.symbol_map().len());
            println!(
                "  Server: {}:{} (timeout {}s)",
                config.server.host, config.server.port, config.server.request_timeout_secs
            );
        }
    }

    Ok(())
}
