//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (hal-codegen.toml)
//! - Environment variables (HAL_CODEGEN__*)
//!
//! ## Example config file (hal-codegen.toml):
//! ```toml
//! [server]
//! profile_url = "http://localhost:8080/api/profile"
//! timeout_secs = 30
//!
//! [auth]
//! strategy = "form_login"
//! login_url = "http://localhost:8080/login"
//! username = "admin"
//! password = "secret"
//!
//! [normalize]
//! suppress_additional_properties = true
//! strip_trivial_titles = true
//!
//! [resolve]
//! href_policy = "normalized"
//!
//! [output]
//! dir = "generated"
//! exclude = ["audits"]
//! ```

use config_crate::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::config::TypeMappings;
use crate::href::HrefPolicy;

/// Main configuration for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Upstream server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Schema normalization flags
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Reference resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Emission settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Upstream server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// URL of the HAL profile document
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// How the client authenticates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    /// OAuth2 resource-owner password grant, exchanged once at startup
    OauthPassword {
        token_url: String,
        client_id: String,
        #[serde(default)]
        client_secret: Option<String>,
        username: String,
        password: String,
    },
    /// Form login; the session cookie is kept for the run
    FormLogin {
        login_url: String,
        username: String,
        password: String,
    },
}

/// Discovery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Link relations that are never entities (`self` is always reserved)
    #[serde(default)]
    pub reserved: Vec<String>,
}

/// Normalization flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Force `additionalProperties: false` on every schema
    #[serde(default = "default_true")]
    pub suppress_additional_properties: bool,

    /// Drop titles of properties that carry no `$ref`
    #[serde(default = "default_true")]
    pub strip_trivial_titles: bool,
}

/// Reference resolution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub href_policy: HrefPolicy,
}

/// Emission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory generated files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Only emit these entities (empty = all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Never emit these entities
    #[serde(default)]
    pub exclude: Vec<String>,

    /// JSON-Schema to TypeScript type mappings
    #[serde(default)]
    pub types: TypeMappings,
}

// Default value functions
fn default_profile_url() -> String {
    "http://localhost:8080/api/profile".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("hal-codegen/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            profile_url: default_profile_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            suppress_additional_properties: true,
            strip_trivial_titles: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            include: Vec::new(),
            exclude: Vec::new(),
            types: TypeMappings::default(),
        }
    }
}

impl OutputConfig {
    /// Whether files should be emitted for `entity`
    pub fn emits(&self, entity: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|e| e == entity) {
            return false;
        }
        !self.exclude.iter().any(|e| e == entity)
    }
}

impl CodegenConfig {
    /// Load configuration, layering a specific file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_layers(config_path, None)
    }

    /// `env` replaces the process environment when given
    fn load_layers(
        config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "hal-codegen.toml",
            ".hal-codegen.toml",
            "config/hal-codegen.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "hal-codegen", "hal-codegen")
        {
            let xdg_config = config_dir.config_dir().join("hal-codegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // HAL_CODEGEN__SERVER__PROFILE_URL etc. Values stay strings so that
        // numeric secrets still deserialize into string fields.
        builder = builder.add_source(
            Environment::with_prefix("HAL_CODEGEN")
                .prefix_separator("__")
                .separator("__")
                .source(env),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
