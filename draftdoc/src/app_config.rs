//! Application configuration from draftdoc.toml
//!
//! Every field has a default, so the file is optional. Credentials are never
//! stored here; they come from the environment (see `gateway::ServiceAccountCredentials`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "draftdoc.toml";

/// Main configuration from draftdoc.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Boilerplate template file to use instead of the embedded one
    pub template_path: Option<PathBuf>,

    /// Remote document service settings
    pub gateway: GatewayConfig,
}

/// Endpoints and policy for the remote document service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// OAuth token endpoint (also the JWT audience)
    pub token_url: String,

    /// Base URL of the Docs API
    pub docs_api_url: String,

    /// Base URL of the Drive API
    pub drive_api_url: String,

    /// Prefix of document edit URLs
    pub document_url_base: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Delete the document when applying content fails
    pub delete_on_failure: bool,

    /// Link sharing granted after content is applied
    pub sharing: SharingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            docs_api_url: "https://docs.googleapis.com".to_string(),
            drive_api_url: "https://www.googleapis.com".to_string(),
            document_url_base: "https://docs.google.com/document/d".to_string(),
            timeout_secs: 30,
            delete_on_failure: false,
            sharing: SharingConfig::default(),
        }
    }
}

/// Link sharing policy
///
/// The default grants edit access to anyone holding the link, with no access
/// list and no expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Grant access to anyone with the link
    pub anyone_with_link: bool,

    /// Role granted to link holders
    pub role: ShareRole,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            anyone_with_link: true,
            role: ShareRole::Writer,
        }
    }
}

/// Access level granted by a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Reader,
    Commenter,
    Writer,
}

impl ShareRole {
    /// Role name used by the Drive permissions API
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Commenter => "commenter",
            Self::Writer => "writer",
        }
    }
}

impl AppConfig {
    /// Load configuration from a draftdoc.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Successfully loaded configuration
    /// * `Err(AppConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppConfigError> {
        let content = fs::read_to_string(&path).map_err(AppConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(AppConfigError::ParseError)?;

        Ok(config)
    }

    /// Load an explicit file, or draftdoc.toml if present, or defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, AppConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE_NAME).exists() => {
                log::info!("Using configuration from {}", CONFIG_FILE_NAME);
                Self::load(CONFIG_FILE_NAME)
            }
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a draftdoc.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AppConfigError> {
        let content = toml::to_string_pretty(self).map_err(AppConfigError::SerializeError)?;

        fs::write(&path, content).map_err(AppConfigError::IoError)?;

        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for AppConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppConfigError::IoError(e) => write!(f, "IO error: {}", e),
            AppConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            AppConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for AppConfigError {}
