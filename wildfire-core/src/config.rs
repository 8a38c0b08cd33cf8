use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LANGUAGE_MODEL: &str = "gpt-3.5-turbo";

/// Configuration for a single upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Process-wide settings, loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP gateway listens on.
    pub bind: String,

    /// Origins allowed to call the gateway cross-origin.
    pub allowed_origins: Vec<String>,

    /// Applies to every upstream request, connect included.
    pub upstream_timeout_secs: u64,

    /// Chat model used for advisories.
    pub language_model: String,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            language_model: DEFAULT_LANGUAGE_MODEL.to_string(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load from disk, then layer environment overrides on top.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.upstream_timeout_secs == 0 {
            bail!("upstream_timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a stored key.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        for id in ProviderId::all() {
            if let Some(api_key) = get(id.api_key_env()) {
                self.upsert_provider_api_key(*id, api_key);
            }
        }

        if let Some(bind) = get("WILDFIRE_BIND") {
            self.bind = bind;
        }

        if let Some(origins) = get("WILDFIRE_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(model) = get("WILDFIRE_MODEL") {
            self.language_model = model;
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wildfire-risk", "wildfire")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
