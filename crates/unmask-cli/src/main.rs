//! `unmask` - crawl a site and harvest the email addresses it exposes.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use unmask_browser::BrowserEngine;
use unmask_crawler::{retain_valid, Crawler, HickoryMxResolver, MailboxValidator, OutputSink};
use unmask_extract::{EmailExtractor, HttpFetcher};

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_directive = if verbose { "info,unmask=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting Unmask v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.resolve_config().context("invalid configuration")?;
    if cli.save_config {
        config.save().context("failed to save configuration")?;
    }

    // Everything that can fail on setup is acquired before the first fetch
    let mut sink = OutputSink::create(&config.output.path)?;
    let fetcher = Arc::new(HttpFetcher::new(&config.network)?);
    let validator = if config.validation.skip {
        None
    } else {
        let resolver = HickoryMxResolver::from_system_conf(config.validation.dns_timeout())?;
        Some(MailboxValidator::new(
            Arc::new(resolver),
            config.validation.clone(),
        ))
    };
    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser")?,
    );
    info!(user_agent = engine.user_agent(), "browser ready");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping crawl");
            interrupt.cancel();
        }
    });

    let extractor = EmailExtractor::new(fetcher, engine.clone());
    let crawler = Crawler::new(engine, extractor, config.crawl.clone(), cancel);
    let outcome = crawler.run(cli.url.clone()).await?;

    let harvested = outcome.emails.len();
    let emails = match &validator {
        Some(validator) => retain_valid(validator, outcome.emails).await,
        None => outcome.emails,
    };

    let written = sink.write_all(&emails)?;
    info!(
        pages = outcome.pages_visited,
        harvested,
        written,
        output = %sink.path().display(),
        "done"
    );
    Ok(())
}
