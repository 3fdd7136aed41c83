//! Card configuration: an optional JSON file, then environment overrides.
//!
//! Every setting has a default, so the card starts with zero configuration
//! against the published spreadsheet endpoints.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::feeds::LinksSchema;
use crate::i18n::{TranslationTable, DEFAULT_LANGUAGE};
use crate::themes::{ThemeRegistry, DEFAULT_THEME};

/// Env var naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "DIGITAL_CARD_CONFIG";

const DEFAULT_PROFILE_URL: &str =
    "https://sheets.livepolls.app/api/spreadsheets/b13b7226-885d-49fd-901b-315e7e47e57c/main-gtnntg";
const DEFAULT_LINKS_URL: &str =
    "https://gist.githubusercontent.com/Zeroxel/30d571fe4d15914c5a45ccf9a26255af/raw/links.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Env: `DIGITAL_CARD_PROFILE_URL`
    pub profile_url: Url,

    /// Env: `DIGITAL_CARD_LINKS_URL`
    pub links_url: Url,

    /// Shape of the links feed.
    /// Env: `DIGITAL_CARD_LINKS_SCHEMA` (`sheets_markdown` / `localized_json`)
    pub links_schema: LinksSchema,

    /// Env: `DIGITAL_CARD_PROFILE_REFRESH_SECS`
    /// Default: 30
    pub profile_refresh_secs: u64,

    /// Env: `DIGITAL_CARD_LINKS_REFRESH_SECS`
    /// Default: 60
    pub links_refresh_secs: u64,

    pub request_timeout_secs: u64,

    /// Language used when nothing valid is saved.
    pub default_language: String,

    pub default_theme: String,

    /// Where the rendered page is written after every render.
    /// Env: `DIGITAL_CARD_OUTPUT`
    pub output: PathBuf,

    /// Directory holding `preferences.json`. Preferences are kept in memory
    /// only when unset.
    /// Env: `DIGITAL_CARD_DATA_DIR`
    pub data_dir: Option<PathBuf>,

    /// Daily log files are written here when set.
    /// Env: `DIGITAL_CARD_LOG_DIR`
    pub log_dir: Option<PathBuf>,
}

impl Default for CardConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            profile_url: Url::parse(DEFAULT_PROFILE_URL).expect("default profile URL is valid"),
            links_url: Url::parse(DEFAULT_LINKS_URL).expect("default links URL is valid"),
            links_schema: LinksSchema::LocalizedJson,
            profile_refresh_secs: 30,
            links_refresh_secs: 60,
            request_timeout_secs: 10,
            default_language: DEFAULT_LANGUAGE.to_string(),
            default_theme: DEFAULT_THEME.to_string(),
            output: PathBuf::from("digital-card.html"),
            data_dir: dirs::data_local_dir().map(|dir| dir.join("digital-card")),
            log_dir: None,
        }
    }
}

impl CardConfig {
    /// Reads the file named by `DIGITAL_CARD_CONFIG` if set, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `DIGITAL_CARD_*` overrides from `lookup`. Values that do not
    /// parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("DIGITAL_CARD_PROFILE_URL") {
            match Url::parse(&value) {
                Ok(url) => self.profile_url = url,
                Err(e) => tracing::warn!(
                    value = %value,
                    error = %e,
                    "Invalid DIGITAL_CARD_PROFILE_URL, using {}",
                    self.profile_url
                ),
            }
        }

        if let Some(value) = lookup("DIGITAL_CARD_LINKS_URL") {
            match Url::parse(&value) {
                Ok(url) => self.links_url = url,
                Err(e) => tracing::warn!(
                    value = %value,
                    error = %e,
                    "Invalid DIGITAL_CARD_LINKS_URL, using {}",
                    self.links_url
                ),
            }
        }

        if let Some(value) = lookup("DIGITAL_CARD_LINKS_SCHEMA") {
            match value.parse::<LinksSchema>() {
                Ok(schema) => self.links_schema = schema,
                Err(e) => tracing::warn!(
                    value = %value,
                    error = %e,
                    "Invalid DIGITAL_CARD_LINKS_SCHEMA, using default"
                ),
            }
        }

        if let Some(secs) = parse_secs(&lookup, "DIGITAL_CARD_PROFILE_REFRESH_SECS") {
            self.profile_refresh_secs = secs;
        }

        if let Some(secs) = parse_secs(&lookup, "DIGITAL_CARD_LINKS_REFRESH_SECS") {
            self.links_refresh_secs = secs;
        }

        if let Some(path) = lookup("DIGITAL_CARD_OUTPUT") {
            self.output = PathBuf::from(path);
        }

        if let Some(path) = lookup("DIGITAL_CARD_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("DIGITAL_CARD_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("profile_refresh_secs", self.profile_refresh_secs),
            ("links_refresh_secs", self.links_refresh_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        for (field, secs) in intervals {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least one second".to_string(),
                });
            }
        }

        if !TranslationTable::builtin().is_supported(&self.default_language) {
            return Err(ConfigError::Invalid {
                field: "default_language",
                reason: format!("unsupported language {}", self.default_language),
            });
        }
        if !ThemeRegistry::builtin().is_supported(&self.default_theme) {
            return Err(ConfigError::Invalid {
                field: "default_theme",
                reason: format!("unknown theme {}", self.default_theme),
            });
        }
        Ok(())
    }

    pub fn profile_refresh(&self) -> Duration {
        Duration::from_secs(self.profile_refresh_secs)
    }

    pub fn links_refresh(&self) -> Duration {
        Duration::from_secs(self.links_refresh_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let value = lookup(key)?;
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            tracing::warn!(value = %value, "Invalid {}, using default", key);
            None
        }
    }
}
