//! Unmask Extract - Recovery of obfuscated email addresses from page markup.
//!
//! The text pipeline ([`extract_emails`]) decodes a fragment, solves rotation
//! ciphers, strips markup, rewrites spelled-out separators and matches the
//! address grammars. [`EmailExtractor`] runs it over every structural
//! harvester of a rendered page: `data-cfemail` attributes, embedded SVG
//! documents, `javascript:` links, plain links and the page body.
//!
//! # Example
//!
//! ```rust
//! use unmask_core::{FragmentOrigin, RawFragment};
//! use unmask_extract::extract_emails;
//!
//! let found = extract_emails(RawFragment::new(
//!     "Contact us at john DOT doe AT example DOT com",
//!     FragmentOrigin::Body,
//! ));
//! assert_eq!(found, vec!["john.doe@example.com"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cipher;
pub mod decoder;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod patterns;
pub mod pipeline;
pub mod tokens;

pub use error::{ExtractError, Result};
pub use fetch::{HttpFetcher, ResourceFetcher};
pub use harvest::PageScan;
pub use pipeline::{extract_emails, EmailExtractor};
