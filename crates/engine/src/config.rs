//! Render configuration.
//!
//! Deserializes from any serde format; every field is optional:
//!
//! ```toml
//! mode = "development"
//!
//! [resource]
//! format = "/static/{path}.{type}"
//! ```

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEVELOPMENT_RESOURCE_FORMAT: &str = "{path}.{type}";
const PRODUCTION_RESOURCE_FORMAT: &str = "{path}.min.{type}";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub resource: ResourceConfig,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceConfig {
    /// Output path template with `{path}` and `{type}` placeholders.
    pub format: Option<String>,
}

impl Config {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn development() -> Self {
        Self::new(Mode::Development)
    }

    pub fn with_resource_format(mut self, format: impl Into<String>) -> Self {
        self.resource.format = Some(format.into());
        self
    }

    /// The configured resource format, or the default for the current mode.
    pub fn resource_format(&self) -> &str {
        self.resource
            .format
            .as_deref()
            .unwrap_or(match self.mode {
                Mode::Development => DEVELOPMENT_RESOURCE_FORMAT,
                Mode::Production => PRODUCTION_RESOURCE_FORMAT,
            })
    }

    /// Builds the output path of a `resource` directive.
    ///
    /// Each placeholder is substituted once, `{path}` first.
    pub fn resource_path(&self, path: &str, kind: &str) -> String {
        self.resource_format()
            .replacen("{path}", path, 1)
            .replacen("{type}", kind, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode `{0}` (expected `development` or `production`)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Development => "development",
            Mode::Production => "production",
        })
    }
}
