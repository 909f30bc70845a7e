//! Unmask Crawler - Depth-bounded email harvesting over a rendered site.
//!
//! This crate drives a crawl from a start URL: it renders each page through a
//! [`PageRenderer`](unmask_browser::PageRenderer), hands the HTML to the
//! [`EmailExtractor`](unmask_extract::EmailExtractor), follows in-scope links
//! until the depth limit, and finally validates and writes the collected
//! addresses.
//!
//! # Features
//!
//! - Depth-first traversal with a visited set and cooperative cancellation
//! - Three link scopes: same host, same host under a path, or anywhere
//! - Mailbox syntax, provider and MX-record validation
//! - Newline-delimited output file
//!
//! # Example
//!
//! ```rust,ignore
//! use unmask_crawler::{Crawler, OutputSink};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut sink = OutputSink::create(&config.output.path)?;
//! let crawler = Crawler::new(renderer, extractor, config.crawl.clone(), CancellationToken::new());
//!
//! let outcome = crawler.run(start_url).await?;
//! sink.write_all(&outcome.emails)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod links;
pub mod output;
pub mod traversal;
pub mod validate;

// Re-export commonly used types
pub use error::{CrawlError, Result};
pub use output::OutputSink;
pub use traversal::{CrawlOutcome, Crawler};
pub use validate::{
    retain_valid, AddressValidator, HickoryMxResolver, MailboxValidator, MxResolver, Rejection,
};
