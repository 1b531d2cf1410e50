//! Configuration validation.
//!
//! Serde covers syntax; this covers value ranges and cross-field rules.
//! Every problem is reported, not just the first one.

use std::fmt;

use crate::blockchain::name::is_valid_name;
use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.node.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "node.url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "node.url",
            message: format!("invalid URL '{}': {}", config.node.url, e),
        }),
    }

    if config.node.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "node.timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.transaction.expiration_ms <= 0 {
        errors.push(ValidationError {
            field: "transaction.expiration_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.transaction.permission.is_empty() || !is_valid_name(&config.transaction.permission) {
        errors.push(ValidationError {
            field: "transaction.permission",
            message: format!("'{}' is not a valid permission name", config.transaction.permission),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
