//! Fetch command implementation
//!
//! Runs a single batch and prints it as JSON. Ctrl-c cancels the remaining
//! symbols and still prints what was fetched.

use crate::config::Config;
use crate::quote::{parse_symbol_list, Cancellation, QuoteFetcher};
use clap::Args;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Symbols to fetch, space or comma separated (e.g. RELIANCE TCS,INFY)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Pause between upstream requests in seconds (overrides config)
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl FetchArgs {
    /// Flatten comma-separated arguments into one symbol list
    fn symbol_list(&self) -> Vec<String> {
        self.symbols
            .iter()
            .flat_map(|arg| parse_symbol_list(arg))
            .collect()
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(delay) = self.delay_secs {
            config.fetcher.request_delay_secs = delay;
        }

        let symbols = self.symbol_list();
        if symbols.is_empty() {
            anyhow::bail!("No symbols given");
        }

        let fetcher = QuoteFetcher::from_config(&config)?;
        let api_key = config.provider.api_key();

        let cancel = Cancellation::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling remaining symbols");
                on_interrupt.cancel();
            }
        });

        let result = fetcher.fetch_quotes(&symbols, &api_key, &cancel).await;
        interrupt.abort();

        let batch = result.map_err(|e| {
            anyhow::anyhow!("{} (set {})", e, config.provider.api_key_env)
        })?;

        let output = if self.pretty {
            serde_json::to_string_pretty(&batch)?
        } else {
            serde_json::to_string(&batch)?
        };
        println!("{}", output);

        Ok(())
    }
}
