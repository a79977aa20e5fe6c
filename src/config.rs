//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.stayadvisor.toml` files.

use crate::models::{QuestionGroup, BOOKED_NIGHTS_PER_MONTH};
use crate::questions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".stayadvisor.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Chat model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Estimate settings.
    #[serde(default)]
    pub estimate: EstimateConfig,

    /// Login settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Cities and their datasets.
    #[serde(default = "default_cities")]
    pub cities: Vec<CityConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            model: ModelConfig::default(),
            estimate: EstimateConfig::default(),
            auth: AuthConfig::default(),
            cities: default_cities(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default path for exported session reports.
    #[serde(default = "default_export")]
    pub export: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            export: default_export(),
            verbose: false,
        }
    }
}

fn default_export() -> String {
    "stayadvisor_session.md".to_string()
}

/// Which chat-completion API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    Openai,
    /// Ollama `/api/chat` endpoint.
    Ollama,
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API flavour.
    #[serde(default)]
    pub provider: Provider,

    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Usually left empty and supplied through `OPENAI_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Extra attempts after a transient failure.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            name: default_model(),
            api_url: default_api_url(),
            api_key: None,
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Local Ollama server.
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> usize {
    2
}

/// Revenue estimate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Booked nights per month used for monthly revenue.
    #[serde(default = "default_booked_nights")]
    pub booked_nights: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            booked_nights: default_booked_nights(),
        }
    }
}

fn default_booked_nights() -> f64 {
    BOOKED_NIGHTS_PER_MONTH
}

/// Login settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a login before the session starts.
    #[serde(default)]
    pub required: bool,

    /// Known users.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// One user allowed to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

/// A city and where its listings live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Display name.
    pub name: String,
    /// Path to the listings CSV.
    pub path: PathBuf,
    /// Currency symbol used in summaries and estimates.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Example questions offered in the terminal; built-in ones when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_questions: Vec<QuestionGroup>,
}

impl CityConfig {
    /// Configured example questions, or the built-in set for this city.
    pub fn example_questions(&self) -> Vec<QuestionGroup> {
        if self.example_questions.is_empty() {
            questions::defaults_for(&self.name)
        } else {
            self.example_questions.clone()
        }
    }
}

fn default_currency() -> String {
    "£".to_string()
}

fn default_cities() -> Vec<CityConfig> {
    vec![
        CityConfig {
            name: "London".to_string(),
            path: PathBuf::from("london_listings.csv"),
            currency: "£".to_string(),
            example_questions: Vec::new(),
        },
        CityConfig {
            name: "Paris".to_string(),
            path: PathBuf::from("paris_listings.csv"),
            currency: "€".to_string(),
            example_questions: Vec::new(),
        },
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Dataset paths are relative to the config file.
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for city in &mut self.cities {
            if city.path.is_relative() && !base.as_os_str().is_empty() {
                city.path = base.join(&city.path);
            }
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(provider) = args.provider {
            self.model.provider = provider;
            // Switching to Ollama without a URL means the local server.
            if provider == Provider::Ollama && self.model.api_url == default_api_url() {
                self.model.api_url = OLLAMA_DEFAULT_URL.to_string();
            }
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.api_url {
            self.model.api_url = url.clone();
        }
        if let Some(ref key) = args.api_key {
            self.model.api_key = Some(key.clone());
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(nights) = args.booked_nights {
            self.estimate.booked_nights = nights;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Look up a city by name, ignoring case.
    pub fn city(&self, name: &str) -> Option<&CityConfig> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check numeric settings that the file format cannot constrain.
    ///
    /// Run after `merge_with_args` so the effective values are checked.
    pub fn validate(&self) -> Result<(), String> {
        let nights = self.estimate.booked_nights;
        if !(nights.is_finite() && nights > 0.0 && nights <= 31.0) {
            return Err(format!(
                "estimate.booked_nights must be between 0 and 31, got {}",
                nights
            ));
        }

        if self.model.timeout_seconds == 0 {
            return Err("model.timeout_seconds must be at least 1".to_string());
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(format!(
                "model.temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            ));
        }

        if self.cities.is_empty() {
            return Err("at least one [[cities]] entry is required".to_string());
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
