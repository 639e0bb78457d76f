//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `statuspoll.toml` in the working directory, or at the path in
//! `STATUSPOLL_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use serde::Deserialize;

use statuspoll_adapter_http_reqwest::HttpConfig;
use statuspoll_app::parsers::ParserKind;
use statuspoll_domain::error::ValidationError;
use statuspoll_domain::resource::{ResourceList, rest_url};

const DEFAULT_PATH: &str = "statuspoll.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// HTTP transport settings.
    pub http: HttpConfig,
    /// Device pages, each polled by its own scheduler.
    pub pages: Vec<PageConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One device page: a parser variant and the resources it polls in order.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Label used in logs.
    pub name: String,
    /// Parser variant (`brightness` or `clock`).
    pub parser: String,
    /// Resources, polled in the listed order.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    /// Initial pause between poll cycles, in milliseconds.
    ///
    /// Parsers adjust it from the first response on.
    pub interval_ms: Option<u64>,
}

/// A status resource, given either as a full URL or as device REST parts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceConfig {
    Url(String),
    Rest {
        base: String,
        #[serde(default)]
        service: String,
        action: String,
    },
}

impl ResourceConfig {
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Rest {
                base,
                service,
                action,
            } => rest_url(base, service, action),
        }
    }
}

impl PageConfig {
    /// Resolve the configured parser name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownParser`] for unsupported names.
    pub fn parser_kind(&self) -> Result<ParserKind, ValidationError> {
        self.parser.parse()
    }

    /// Resource URLs in polling order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.resources.iter().map(ResourceConfig::url).collect()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.parser_kind()?;
        let resources = ResourceList::new(self.urls())?;
        if resources.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.interval_ms == Some(0) {
            return Err(ValidationError::ZeroInterval);
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from `statuspoll.toml` (or `$STATUSPOLL_CONFIG`),
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or fails
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STATUSPOLL_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STATUSPOLL_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("STATUSPOLL_HTTP_TIMEOUT_MS")
            && let Ok(timeout_ms) = val.parse()
        {
            self.http.timeout_ms = timeout_ms;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "http timeout must be non-zero".to_string(),
            ));
        }
        for page in &self.pages {
            page.validate().map_err(|source| ConfigError::Page {
                name: page.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "statuspolld=info,statuspoll_app=info,statuspoll_adapter_http_reqwest=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A page section is unusable.
    #[error("invalid page {name:?}")]
    Page {
        name: String,
        #[source]
        source: ValidationError,
    },
}
