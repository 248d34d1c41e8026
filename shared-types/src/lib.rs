#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The key/value pairs of one environment: `key -> raw value`.
pub type EnvConfig = BTreeMap<String, String>;

/// All environments of one application: `environment name -> EnvConfig`.
pub type AppConfig = BTreeMap<String, EnvConfig>;

/// The whole store: `application name -> AppConfig`.
pub type Store = BTreeMap<String, AppConfig>;

/// Identity of one environment block: the `(application, environment)` pair
/// that every backend maps to its native storage unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvKey {
    pub application: String,
    pub environment: String,
}

impl EnvKey {
    pub fn new(application: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            environment: environment.into(),
        }
    }

    /// Whether this key matches the given optional filters
    /// (an omitted filter is a wildcard).
    pub fn matches(&self, application: Option<&str>, environment: Option<&str>) -> bool {
        application.is_none_or(|a| a == self.application)
            && environment.is_none_or(|e| e == self.environment)
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.application, self.environment)
    }
}
