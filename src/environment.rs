//! Defines the environment the generator runs in.
//! The environment selects which configuration file is loaded.
//!
//! # Example:
//!
//! ```rust
//! use std::str::FromStr;
//! use model_seeder::environment::Environment;
//!
//! pub fn load(environment: &str) {
//!  let environment = Environment::from_str(environment).unwrap_or(Environment::Any(environment.to_string()));
//!  let config = environment.load_from_folder("config/seeder");
//! }
//! ```
use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_variant::to_variant_name;

use super::config::Config;
use crate::Result;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const MODEL_SEEDER_ENV: &str = "MODEL_SEEDER_ENV";
pub const APP_ENV: &str = "APP_ENV";

impl From<String> for Environment {
    fn from(env: String) -> Self {
        Self::from_str(&env).unwrap_or(Self::Any(env))
    }
}

/// Environment name from `MODEL_SEEDER_ENV`, then Laravel's `APP_ENV`.
#[must_use]
pub fn resolve_from_env() -> String {
    std::env::var(MODEL_SEEDER_ENV)
        .or_else(|_| std::env::var(APP_ENV))
        .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string())
}

/// Generator environment
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum Environment {
    #[serde(rename = "production")]
    Production,
    #[serde(rename = "development")]
    Development,
    #[serde(rename = "test")]
    Test,
    Any(String),
}

impl Environment {
    /// Load the configuration of this environment from the given folder
    ///
    /// # Errors
    ///
    /// Returns error if an error occurs during loading
    /// configuration file an parse into [`Config`] struct.
    pub fn load_from_folder<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        Config::from_folder(self, path.as_ref())
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any(s) => s.fmt(f),
            _ => to_variant_name(self).map_err(|_| std::fmt::Error)?.fmt(f),
        }
    }
}

impl FromStr for Environment {
    type Err = &'static str;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input {
            "production" => Ok(Self::Production),
            "development" | "local" => Ok(Self::Development),
            "test" | "testing" => Ok(Self::Test),
            s => Ok(Self::Any(s.to_string())),
        }
    }
}
