//! Error types for the metadata pipeline
//!
//! Every failure is fatal to the run. Variants carry the entity name where
//! one is known so the diagnostic line can name the culprit.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Could not collect schema for entity '{entity}': {source}")]
    Collection {
        entity: String,
        #[source]
        source: Box<CodegenError>,
    },

    #[error("Could not resolve references for entity '{entity}': {reason}")]
    Resolution { entity: String, reason: String },

    #[error("Emission failed: {0}")]
    Emission(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodegenError {
    /// Build a resolution error for `entity`
    pub fn resolution(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a fetch failure as a collection error for `entity`
    pub fn collection(entity: impl Into<String>, source: CodegenError) -> Self {
        Self::Collection {
            entity: entity.into(),
            source: Box::new(source),
        }
    }

    /// Pipeline stage that produced this error, for the diagnostic line
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::Discovery(_) => "discovery",
            Self::Collection { .. } => "collection",
            Self::Resolution { .. } => "resolution",
            Self::Emission(_) => "emission",
            Self::Config(_) => "configuration",
            Self::Http { .. } | Self::Request(_) | Self::InvalidUrl { .. } | Self::Json(_) => {
                "fetch"
            }
            Self::Io(_) => "output",
        }
    }

    /// Process exit status for this error.
    ///
    /// | status | condition                                   |
    /// |--------|---------------------------------------------|
    /// | 2      | authentication failure                      |
    /// | 3      | profile document has no links container     |
    /// | 4      | a schema fetch failed                       |
    /// | 5      | an ALPS fetch or reference lookup failed    |
    /// | 6      | configuration could not be loaded           |
    /// | 1      | anything else                               |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Authentication(_) => 2,
            Self::Discovery(_) => 3,
            Self::Collection { .. } => 4,
            Self::Resolution { .. } => 5,
            Self::Config(_) => 6,
            _ => 1,
        }
    }
}
