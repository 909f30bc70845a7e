//! Browser automation engine for JavaScript-heavy pages.
//!
//! Provides headless page rendering and an isolated tab for evaluating
//! `javascript:` link expressions, behind the [`PageRenderer`] and
//! [`ScriptEvaluator`] capabilities.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::{PageRenderer, ScriptEvaluator};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
