use clap::Parser;
use std::path::PathBuf;
use unmask_core::{AppConfig, ScopeMode};
use url::Url;

/// Command-line interface definition.
///
/// Flags left unset fall back to the config file, then to environment
/// overrides, then to built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "unmask",
    author,
    version,
    about = "Crawl a site and harvest email addresses, including obfuscated ones"
)]
pub struct Cli {
    /// The starting URL for the crawler
    pub url: Url,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Launch the browser with cookies disabled
    #[arg(long)]
    pub disable_cookies: bool,

    /// Append log output to this file instead of stderr
    #[arg(long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Output file for harvested addresses [default: emails.txt]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write every harvested address without validating it
    #[arg(long)]
    pub skip_validation: bool,

    /// Custom User-Agent for page and resource requests
    #[arg(long, value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Maximum crawling depth; the start page is depth 1 [default: 3]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: Option<u32>,

    /// 1 to stay on the start host, 2 to stay under the start path, 3 for unrestricted [default: 1]
    #[arg(long, value_name = "MODE")]
    pub domain_mode: Option<ScopeMode>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to the default location before crawling
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Load the configuration this invocation runs with: file, then
    /// environment, then command-line flags.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = AppConfig::load_from(path)?;
                config.apply_env(|key| std::env::var(key).ok());
                config
            }
            None => AppConfig::load_with_env()?,
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(depth) = self.max_depth {
            config.crawl.max_depth = depth;
        }
        if let Some(mode) = self.domain_mode {
            config.crawl.scope_mode = mode;
        }
        if self.disable_cookies {
            config.browser.disable_cookies = true;
        }
        if let Some(agent) = &self.user_agent {
            config.browser.user_agent = Some(agent.clone());
            config.network.user_agent.clone_from(agent);
        }
        if self.skip_validation {
            config.validation.skip = true;
        }
        if let Some(path) = &self.output {
            config.output.path.clone_from(path);
        }
    }
}
