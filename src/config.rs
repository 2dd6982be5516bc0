use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Generative API settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Backoff applied to each generator call
    #[serde(default)]
    pub retry: RetryConfig,
    /// Where saved recipes live
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Status message behavior
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Configuration for the generative content API
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// API key for authentication (can also be set via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the API (for proxies and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for the structured recipe request
    #[serde(default = "default_recipe_model")]
    pub recipe_model: String,
    /// Model used for the image request
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            recipe_model: default_recipe_model(),
            image_model: default_image_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    /// The configured key, falling back to the GOOGLE_API_KEY environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        non_blank(self.api_key.clone())
            .or_else(|| non_blank(std::env::var("GOOGLE_API_KEY").ok()))
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|key| !key.trim().is_empty())
}

/// Configuration for retry behavior around generator calls
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial delay between attempts in milliseconds (doubles each retry)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Ceiling for a single delay in milliseconds; 0 means uncapped
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Configuration for the saved-recipe archive
#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    /// JSON file holding every saved recipe
    #[serde(default = "default_archive_path")]
    pub path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: default_archive_path(),
        }
    }
}

/// Configuration for transient status messages
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// How long a message stays visible, in milliseconds
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: default_display_ms(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_recipe_model() -> String {
    "gemini-2.5-flash-preview-05-20".to_string()
}

fn default_image_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_archive_path() -> String {
    "culinary_recipes.json".to_string()
}

fn default_display_ms() -> u64 {
    3000
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CULINARY__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: CULINARY__GENERATOR__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: CULINARY__RETRY__MAX_ATTEMPTS
        .add_source(
            Environment::with_prefix("CULINARY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        assert_eq!(default_max_attempts(), 5);
        assert_eq!(default_initial_delay_ms(), 1000);
        assert_eq!(default_max_delay_ms(), 30_000);
        assert_eq!(default_display_ms(), 3000);
        assert_eq!(default_timeout_secs(), 60);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.archive.path, "culinary_recipes.json");
        assert!(config.generator.base_url.starts_with("https://"));
        assert!(config.generator.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [generator]
            api_key = "abc"
            recipe_model = "gemini-test"

            [retry]
            max_attempts = 3
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.generator.api_key.as_deref(), Some("abc"));
        assert_eq!(config.generator.recipe_model, "gemini-test");
        assert_eq!(config.generator.image_model, default_image_model());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.notifications.display_ms, 3000);
    }

    #[test]
    fn test_explicit_key_wins_over_environment() {
        let config = GeneratorConfig {
            api_key: Some("from-config".to_string()),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_blank_keys_are_ignored() {
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("abc".to_string())).as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_config_without_file() {
        // Every section has defaults, so an empty environment still loads
        let result = load_config();
        assert!(result.is_ok());
    }
}
