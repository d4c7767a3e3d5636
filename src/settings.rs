//! Trusted configuration consumed by the validator.
//!
//! Loading the configuration store is up to the host; these types only
//! describe its shape, e.g. in YAML:
//!
//! ```yaml
//! settings:
//!   shared-secret: "..."
//! ```
use serde::Deserialize;

use crate::Secret;

/// Root of the configuration store.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Validator settings.
    pub settings: Settings,
}

/// Validator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Secret shared with request signers.
    pub shared_secret: Secret,
}
