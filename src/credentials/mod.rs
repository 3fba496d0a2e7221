//! Provider credentials
//!
//! Credentials are gathered from explicit arguments, the environment or the
//! AWS credentials file (in that order), checked against the live provider,
//! and only then written to the config store.

pub mod file;
pub mod resolver;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::Configuration;

pub use resolver::{resolve, resolve_and_store, resolve_and_store_with_env};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// A validated (or about to be validated) set of SES credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
    #[serde(default = "default_region")]
    region: String,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Read credentials back from a provider namespace table
    ///
    /// Returns `None` unless both keys are present. A missing region falls
    /// back to [`DEFAULT_REGION`].
    pub fn from_table(table: &Configuration) -> Option<Self> {
        toml::Value::Table(table.clone()).try_into().ok()
    }

    /// The key-value form persisted in the config store
    pub fn to_table(&self) -> Configuration {
        let mut table = Configuration::new();
        table.insert("access_key".into(), self.access_key.clone().into());
        table.insert("secret_key".into(), self.secret_key.clone().into());
        table.insert("region".into(), self.region.clone().into());
        table
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

/// Inputs to credential resolution
///
/// Precedence, highest first:
/// 1. `access_key` / `secret_key` given here
/// 2. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`, consulted only when
///    both explicit keys are absent
/// 3. the `[default]` section of `credentials_file`, consulted only when
///    both keys are still absent
#[derive(Clone)]
pub struct CredentialSources {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: String,
    pub credentials_file: PathBuf,
}

impl CredentialSources {
    /// Sources with no explicit keys and the default region
    pub fn new(credentials_file: impl Into<PathBuf>) -> Self {
        Self {
            access_key: None,
            secret_key: None,
            region: default_region(),
            credentials_file: credentials_file.into(),
        }
    }

    pub fn with_keys(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

impl fmt::Debug for CredentialSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSources")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("region", &self.region)
            .field("credentials_file", &self.credentials_file)
            .finish()
    }
}
