//! Deliverability checks applied to harvested addresses before output.

use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use unmask_core::{EmailSet, ValidationConfig};

/// Longest local part a mailbox may have.
const MAX_LOCAL_LEN: usize = 64;

/// Why an address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Not a bare `local@domain` mailbox
    #[error("not a mailbox address")]
    Syntax,

    /// Local part is empty or too long
    #[error("local part length {0} out of range")]
    LocalPartLength(usize),

    /// Local part too short for a provider that enforces a minimum
    #[error("local part too short for {domain}")]
    ProviderMinimum {
        /// The provider domain
        domain: String,
    },

    /// Domain publishes no MX record
    #[error("no MX record for {0}")]
    NoMailExchanger(String),

    /// The lookup itself failed or timed out
    #[error("MX lookup failed: {0}")]
    Lookup(String),
}

/// A syntactically valid `local@domain` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mailbox<'a> {
    /// The part before `@`
    pub local: &'a str,
    /// The part after `@`
    pub domain: &'a str,
}

/// Parse a bare mailbox: a dot-atom local part and a dotted domain.
pub fn parse_mailbox(address: &str) -> std::result::Result<Mailbox<'_>, Rejection> {
    let (local, domain) = address.split_once('@').ok_or(Rejection::Syntax)?;

    let local_ok = local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext));
    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    if local.is_empty() || !local_ok || !domain_ok {
        return Err(Rejection::Syntax);
    }
    Ok(Mailbox { local, domain })
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c)
}

/// Looks up mail exchangers for a domain.
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Exchange host names for `domain`; empty when none are published.
    async fn mail_exchangers(&self, domain: &str) -> std::result::Result<Vec<String>, String>;
}

/// [`MxResolver`] using the system DNS configuration.
pub struct HickoryMxResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryMxResolver {
    /// Build a resolver from the system configuration with the given query
    /// timeout.
    pub fn from_system_conf(timeout: Duration) -> Result<Self> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| CrawlError::Resolver(e.to_string()))?;
        opts.timeout = timeout;
        opts.attempts = 1;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

#[async_trait]
impl MxResolver for HickoryMxResolver {
    async fn mail_exchangers(&self, domain: &str) -> std::result::Result<Vec<String>, String> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => Ok(lookup.iter().map(|mx| mx.exchange().to_string()).collect()),
            Err(e) if matches!(e.kind(), hickory_resolver::error::ResolveErrorKind::NoRecordsFound { .. }) => {
                Ok(Vec::new())
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Decides whether a harvested address is worth keeping.
#[async_trait]
pub trait AddressValidator: Send + Sync {
    /// Accept or reject `address`.
    async fn validate(&self, address: &str) -> std::result::Result<(), Rejection>;
}

/// Mailbox syntax, length, provider and MX checks.
pub struct MailboxValidator {
    resolver: Arc<dyn MxResolver>,
    config: ValidationConfig,
}

impl MailboxValidator {
    /// Create a validator that consults `resolver` for MX records.
    pub fn new(resolver: Arc<dyn MxResolver>, config: ValidationConfig) -> Self {
        Self { resolver, config }
    }

    /// Checks that need no network access.
    pub fn check_offline<'a>(&self, address: &'a str) -> std::result::Result<Mailbox<'a>, Rejection> {
        let mailbox = parse_mailbox(address)?;

        let local_len = mailbox.local.len();
        if local_len == 0 || local_len > MAX_LOCAL_LEN {
            return Err(Rejection::LocalPartLength(local_len));
        }

        let strict = self
            .config
            .strict_provider_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(mailbox.domain));
        if strict && local_len < self.config.strict_provider_min_local_len {
            return Err(Rejection::ProviderMinimum {
                domain: mailbox.domain.to_ascii_lowercase(),
            });
        }

        Ok(mailbox)
    }
}

#[async_trait]
impl AddressValidator for MailboxValidator {
    async fn validate(&self, address: &str) -> std::result::Result<(), Rejection> {
        let mailbox = self.check_offline(address)?;

        let lookup = tokio::time::timeout(
            self.config.dns_timeout(),
            self.resolver.mail_exchangers(mailbox.domain),
        )
        .await
        .map_err(|_| Rejection::Lookup(format!("timed out resolving {}", mailbox.domain)))?
        .map_err(Rejection::Lookup)?;

        if lookup.is_empty() {
            return Err(Rejection::NoMailExchanger(mailbox.domain.to_string()));
        }
        Ok(())
    }
}

/// Keep only the addresses `validator` accepts.
pub async fn retain_valid(validator: &dyn AddressValidator, emails: EmailSet) -> EmailSet {
    let mut kept = EmailSet::new();
    for address in emails {
        match validator.validate(&address).await {
            Ok(()) => {
                kept.insert(address);
            }
            Err(reason) => debug!(%address, %reason, "discarding address"),
        }
    }
    kept
}
