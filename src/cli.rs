//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::Provider;
use clap::Parser;
use std::path::PathBuf;

/// StayAdvisor - LLM-powered short-term-rental investment advisor
///
/// Pick a city, inspect average prices by neighbourhood and room type,
/// estimate nightly price and monthly revenue, and chat with an AI
/// advisor that sees the same numbers.
///
/// Examples:
///   stayadvisor
///   stayadvisor --city London --summary
///   stayadvisor --city Paris --neighbourhood "Le Marais" --room-type "Entire home/apt"
///   stayadvisor --city London --message "Which area has the best ROI?"
///   stayadvisor --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// City to start with
    ///
    /// Must match one of the configured cities (case-insensitive).
    #[arg(long, value_name = "CITY")]
    pub city: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stayadvisor.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Chat API flavour (openai, ollama)
    #[arg(long, value_name = "PROVIDER", env = "STAYADVISOR_PROVIDER")]
    pub provider: Option<Provider>,

    /// Chat model to use
    #[arg(short, long, env = "STAYADVISOR_MODEL")]
    pub model: Option<String>,

    /// Base URL of the chat API
    #[arg(long, value_name = "URL", env = "STAYADVISOR_API_URL")]
    pub api_url: Option<String>,

    /// API key for OpenAI-compatible endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for LLM responses (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Booked nights per month assumed for revenue estimates
    #[arg(long, value_name = "NIGHTS")]
    pub booked_nights: Option<f64>,

    /// Neighbourhood for a price estimate (requires --room-type)
    #[arg(long, value_name = "NAME", requires = "room_type")]
    pub neighbourhood: Option<String>,

    /// Room type for a price estimate (requires --neighbourhood)
    #[arg(long, value_name = "TYPE", requires = "neighbourhood")]
    pub room_type: Option<String>,

    /// Ask a single question and exit instead of starting a chat
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Print the city summary and exit (no LLM call)
    #[arg(long)]
    pub summary: bool,

    /// Print the system prompt that would be sent and exit (no LLM call)
    #[arg(long)]
    pub dry_run: bool,

    /// Write the session report to this file on exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Report format for --export (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write listing locations as GeoJSON to this file
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .stayadvisor.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Print the SHA-256 hash of a password for [[auth.users]] and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}

/// Output format for exported reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the run needs the chat service at all.
    pub fn needs_chat(&self) -> bool {
        !(self.summary || self.dry_run) && (self.message.is_some() || self.is_interactive())
    }

    /// Interactive mode is the default when no one-shot action was requested.
    pub fn is_interactive(&self) -> bool {
        !self.summary
            && !self.dry_run
            && self.message.is_none()
            && self.neighbourhood.is_none()
            && self.map.is_none()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.hash_password.is_some() {
            return Ok(());
        }

        // One-shot actions operate on a city
        if !self.is_interactive() && self.city.is_none() {
            return Err("--city is required with --summary, --dry-run, --message, --map or an estimate".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(nights) = self.booked_nights {
            if !(nights.is_finite() && nights > 0.0 && nights <= 31.0) {
                return Err("Booked nights must be between 0 and 31".to_string());
            }
        }

        if let Some(ref message) = self.message {
            if message.trim().is_empty() {
                return Err("Message must not be empty".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `general.verbose` from the config file;
    /// `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            city: Some("London".to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "stayadvisor",
            "--city",
            "Paris",
            "--neighbourhood",
            "Le Marais",
            "--room-type",
            "Entire home/apt",
            "--provider",
            "ollama",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.city.as_deref(), Some("Paris"));
        assert_eq!(args.neighbourhood.as_deref(), Some("Le Marais"));
        assert_eq!(args.provider, Some(Provider::Ollama));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.is_interactive());
        assert!(!args.needs_chat());
    }

    #[test]
    fn test_estimate_flags_require_each_other() {
        let result = Args::try_parse_from(["stayadvisor", "--city", "Paris", "--neighbourhood", "Marais"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_interactive_by_default() {
        let args = Args::default();
        assert!(args.is_interactive());
        assert!(args.needs_chat());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_one_shot_requires_city() {
        let args = Args {
            summary: true,
            ..Args::default()
        };
        assert!(args.validate().is_err());

        let args = Args {
            summary: true,
            ..make_args()
        };
        assert!(args.validate().is_ok());
        assert!(!args.needs_chat());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let mut args = make_args();
        args.temperature = Some(3.0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.booked_nights = Some(0.0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.message = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_file_verbose_raises_log_level() {
        let config: crate::config::Config =
            toml::from_str("[general]\nverbose = true\n").unwrap();

        let args = make_args();
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let args = Args {
            quiet: true,
            ..make_args()
        };
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::ERROR);
    }
}
