use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::DEFAULT_PHONE_PLACEHOLDER;
use crate::engine::SessionConfig;
use crate::models::{FormDefaults, MAX_CANDIDATES};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub directory: DirectorySettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub form: FormSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_timeout_secs() -> u64 { 10 }
fn default_search_limit() -> usize { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_entries: default_cache_entries(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_cache_entries() -> u64 { 256 }
fn default_cache_ttl_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
    #[serde(default = "default_phone_placeholder")]
    pub phone_placeholder: String,
    #[serde(default = "default_true")]
    pub enforce_phone_prefix: bool,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
            phone_placeholder: default_phone_placeholder(),
            enforce_phone_prefix: true,
            max_candidates: default_max_candidates(),
        }
    }
}

fn default_quiet_period_ms() -> u64 { 400 }
fn default_phone_placeholder() -> String { DEFAULT_PHONE_PLACEHOLDER.to_string() }
fn default_max_candidates() -> usize { MAX_CANDIDATES }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct FormSettings {
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_customer_type")]
    pub default_type: String,
    #[serde(default = "default_credit_limit")]
    pub default_credit_limit: String,
    #[serde(default)]
    pub show_initial_credit: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            default_type: default_customer_type(),
            default_credit_limit: default_credit_limit(),
            show_initial_credit: false,
        }
    }
}

fn default_city() -> String { "Mianwali".to_string() }
fn default_customer_type() -> String { "Permanent".to_string() }
fn default_credit_limit() -> String { "50000".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DEDUP__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., DEDUP__DIRECTORY__BASE_URL -> directory.base_url
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory.timeout_secs)
    }

    /// Session tunables derived from the matching and form sections
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            quiet_period: Duration::from_millis(self.matching.quiet_period_ms),
            phone_placeholder: self.matching.phone_placeholder.clone(),
            enforce_phone_prefix: self.matching.enforce_phone_prefix,
            max_candidates: self.matching.max_candidates.min(MAX_CANDIDATES),
            search_limit: self.directory.search_limit,
            form: FormDefaults {
                city: self.form.default_city.clone(),
                customer_type: self.form.default_type.clone(),
                credit_limit: self.form.default_credit_limit.clone(),
                show_initial_credit: self.form.show_initial_credit,
            },
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("DEDUP")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
