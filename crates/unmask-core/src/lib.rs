//! Unmask Core - Foundation crate for the Unmask email harvester.
//!
//! This crate provides the shared data model, error handling and
//! configuration management that the other Unmask crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared types (`ScopeMode`, `FrontierNode`, `EmailSet`, `RawFragment`)
//!
//! # Example
//!
//! ```rust
//! use unmask_core::{AppConfig, EmailSet, ScopeMode};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.crawl.scope_mode, ScopeMode::HostOnly);
//!
//! let mut emails = EmailSet::new();
//! emails.insert("contact@example.com");
//! assert!(emails.contains("contact@example.com"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CrawlConfig, NetworkConfig, OutputConfig, ValidationConfig,
};
pub use error::{ConfigError, ConfigResult, Result, UnmaskError};
pub use types::{
    EmailSet, FragmentOrigin, FrontierNode, ObfuscationEncoding, RawFragment, ScopeMode,
};
