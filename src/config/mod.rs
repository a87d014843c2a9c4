pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

/// Base URL the page used before it was configurable.
pub const DEFAULT_ENDPOINT_URL: &str = "https://your-backend-url";
pub const DEFAULT_TARGET_ID: &str = "pets";
pub const DEFAULT_DOCUMENT: &str = "index.html";
pub const DEFAULT_FALLBACK_NOTICE: &str = "Unable to load pets right now.";
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pet-list")]
#[command(about = "Fetch pets from the backend and render them into an HTML page")]
pub struct CliConfig {
    #[arg(long, env = "PETS_ENDPOINT_URL", default_value = DEFAULT_ENDPOINT_URL)]
    pub endpoint_url: String,

    #[arg(long, env = "PETS_DOCUMENT", default_value = DEFAULT_DOCUMENT)]
    pub document: String,

    #[arg(long, env = "PETS_TARGET_ID", default_value = DEFAULT_TARGET_ID)]
    pub target_id: String,

    #[arg(long, help = "Abort the request after this many seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, default_value = DEFAULT_FALLBACK_NOTICE)]
    pub fallback_notice: String,

    #[arg(long, help = "Leave the page untouched when rendering fails")]
    pub no_fallback: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Print the rendered markup instead of writing the document")]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn document_path(&self) -> &str {
        &self.document
    }

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn fallback_notice(&self) -> Option<&str> {
        if self.no_fallback {
            None
        } else {
            Some(&self.fallback_notice)
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint_url", &self.endpoint_url)?;
        validation::validate_path("document", &self.document)?;
        validation::validate_element_id("target_id", &self.target_id)?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("timeout_seconds", timeout, 1, MAX_TIMEOUT_SECONDS)?;
        }

        if !self.no_fallback {
            validation::validate_non_empty_string("fallback_notice", &self.fallback_notice)?;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_script() {
        let config = CliConfig::parse_from(["pet-list"]);

        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.target_id(), "pets");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.fallback_notice(), Some(DEFAULT_FALLBACK_NOTICE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = CliConfig::parse_from([
            "pet-list",
            "--endpoint-url",
            "http://localhost:5000",
            "--document",
            "public/index.html",
            "--timeout-seconds",
            "10",
            "--no-fallback",
            "--log-format",
            "json",
        ]);

        assert_eq!(config.endpoint_url(), "http://localhost:5000");
        assert_eq!(config.document_path(), "public/index.html");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.fallback_notice(), None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_timeout = CliConfig::parse_from(["pet-list", "--timeout-seconds", "0"]);
        let bad_target = CliConfig::parse_from(["pet-list", "--target-id", "my pets"]);
        let bad_url = CliConfig::parse_from(["pet-list", "--endpoint-url", "your-backend-url"]);

        assert!(bad_timeout.validate().is_err());
        assert!(bad_target.validate().is_err());
        assert!(bad_url.validate().is_err());
    }
}
