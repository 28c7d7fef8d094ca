//! Application configuration for TutorHub.
//!
//! User config lives at `~/.tutorhub/tutorhub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TutorHubError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tutorhub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tutorhub";

// ---------------------------------------------------------------------------
// Config structs (matching tutorhub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content/profile API settings.
    #[serde(default)]
    pub cms: CmsConfig,

    /// Blog rendering defaults.
    #[serde(default)]
    pub blog: BlogDefaults,

    /// Contact picker settings.
    #[serde(default)]
    pub contacts: ContactsConfig,
}

/// `[cms]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the headless CMS.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path (relative to `base_url`) of the page whose layout holds the blog.
    #[serde(default = "default_blog_path")]
    pub blog_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            blog_path: default_blog_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CmsConfig {
    /// Parse and validate `base_url`.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            TutorHubError::validation(format!("invalid cms.base_url '{}': {e}", self.base_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(TutorHubError::validation(format!(
                "cms.base_url must be http or https, got '{other}'"
            ))),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_blog_path() -> String {
    "api/pages?where[slug][equals]=blog&depth=2".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[blog]` section: display defaults for fields the CMS leaves blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDefaults {
    #[serde(default = "default_author")]
    pub default_author: String,

    #[serde(default = "default_cover_image")]
    pub default_cover_image: String,

    /// Reading speed used for the read-time estimate.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,

    /// Maximum excerpt length in characters.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for BlogDefaults {
    fn default() -> Self {
        Self {
            default_author: default_author(),
            default_cover_image: default_cover_image(),
            words_per_minute: default_words_per_minute(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_author() -> String {
    "TutorHub Team".into()
}
fn default_cover_image() -> String {
    "/images/blog/default-cover.jpg".into()
}
fn default_words_per_minute() -> u32 {
    200
}
fn default_excerpt_chars() -> usize {
    160
}

/// `[contacts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// How many recently created students to remember.
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,

    /// Where the recent-student cache is persisted. Defaults to the config dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_cache_file: Option<String>,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            recent_capacity: default_recent_capacity(),
            recent_cache_file: None,
        }
    }
}

impl ContactsConfig {
    /// Resolve the cache file path, falling back to `~/.tutorhub/recent-students.json`.
    pub fn recent_cache_path(&self) -> Result<PathBuf> {
        match &self.recent_cache_file {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("recent-students.json")),
        }
    }
}

fn default_recent_capacity() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tutorhub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TutorHubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tutorhub/tutorhub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TutorHubError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        TutorHubError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TutorHubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TutorHubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TutorHubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings that would make the normalizer or cache misbehave.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    config.cms.parsed_base_url()?;

    if config.blog.words_per_minute == 0 {
        return Err(TutorHubError::config("blog.words_per_minute must be > 0"));
    }
    if config.contacts.recent_capacity == 0 {
        return Err(TutorHubError::config("contacts.recent_capacity must be > 0"));
    }
    Ok(())
}
