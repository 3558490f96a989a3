//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the bundled skeleton.
pub const TEMPLATE_VAR: &str = "TORCHGEN_TEMPLATE";
/// Environment variable selecting how errors are reported.
pub const FORMAT_VAR: &str = "TORCHGEN_FORMAT";

/// Error reading the environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value outside its allowed set.
    #[error("{var} must be one of {allowed}, got {value:?}")]
    Invalid {
        /// The variable.
        var: &'static str,
        /// The rejected value.
        value: String,
        /// Accepted values.
        allowed: &'static str,
    },
}

/// How failures are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One line per violation.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

impl FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::Invalid {
                var: FORMAT_VAR,
                value: s.to_string(),
                allowed: "text, json",
            }),
        }
    }
}

/// Settings the binary reads from its environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Skeleton to render instead of the bundled one.
    pub template: Option<PathBuf>,
    /// Error report format.
    pub format: ReportFormat,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unsupported value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.is_empty());

        let template = get(TEMPLATE_VAR).map(PathBuf::from);
        let format = get(FORMAT_VAR)
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self { template, format })
    }
}
