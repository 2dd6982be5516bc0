use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::notify::NotificationCenter;
use crate::providers::{GeminiClient, GenerationClient};
use crate::retry::RetryPolicy;
use crate::session::RecipeSession;
use crate::AppError;

/// Builder for configuring a [`RecipeSession`]
#[derive(Default)]
pub struct SessionBuilder {
    config: Option<AppConfig>,
    client: Option<Arc<dyn GenerationClient>>,
    api_key: Option<String>,
    base_url: Option<String>,
    recipe_model: Option<String>,
    image_model: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    display_for: Option<Duration>,
}

impl SessionBuilder {
    /// Start from a loaded configuration; explicit setters still win
    ///
    /// # Example
    /// ```
    /// use culinary_time_machine::{AppConfig, RecipeSession};
    ///
    /// let builder = RecipeSession::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a ready-made generation client instead of building a Gemini one
    pub fn client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API key for the generator
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    ///
    /// # Example
    /// ```
    /// use culinary_time_machine::RecipeSession;
    ///
    /// let builder = RecipeSession::builder().api_key("your-api-key");
    /// ```
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point the client at a different host (proxies, test servers)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model used for the recipe request
    pub fn recipe_model(mut self, model: impl Into<String>) -> Self {
        self.recipe_model = Some(model.into());
        self
    }

    /// Set the model used for the image request
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    /// Set a timeout for each HTTP request
    ///
    /// # Example
    /// ```
    /// use culinary_time_machine::RecipeSession;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeSession::builder().timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Override the backoff applied to each generator call
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// How long status messages stay visible
    pub fn notification_duration(mut self, duration: Duration) -> Self {
        self.display_for = Some(duration);
        self
    }

    /// Build the session
    ///
    /// # Errors
    /// Returns `AppError::BuilderError` if no client was given and no API key
    /// can be found in the builder, the configuration, or `GOOGLE_API_KEY`.
    pub fn build(self) -> Result<RecipeSession, AppError> {
        let mut config = self.config.unwrap_or_default();

        if let Some(key) = self.api_key {
            config.generator.api_key = Some(key);
        }
        if let Some(url) = self.base_url {
            config.generator.base_url = url;
        }
        if let Some(model) = self.recipe_model {
            config.generator.recipe_model = model;
        }
        if let Some(model) = self.image_model {
            config.generator.image_model = model;
        }
        if let Some(timeout) = self.timeout {
            config.generator.timeout_secs = timeout.as_secs().max(1);
        }

        let client = match self.client {
            Some(client) => client,
            None => {
                let gemini = GeminiClient::new(&config.generator)
                    .map_err(|e| AppError::BuilderError(e.to_string()))?;
                Arc::new(gemini) as Arc<dyn GenerationClient>
            }
        };

        let retry = self
            .retry
            .unwrap_or_else(|| RetryPolicy::from(&config.retry));
        let display_for = self
            .display_for
            .unwrap_or_else(|| Duration::from_millis(config.notifications.display_ms));

        Ok(RecipeSession::new(client)
            .with_retry_policy(retry)
            .with_notifications(NotificationCenter::new(display_for)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::providers::FakeClient;

    #[test]
    fn test_build_with_client() {
        let session = RecipeSession::builder()
            .client(Arc::new(FakeClient::new()))
            .build()
            .unwrap();
        assert_eq!(session.provider_name(), "fake");
        assert_eq!(session.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_build_with_api_key_uses_gemini() {
        let session = RecipeSession::builder()
            .api_key("test-key")
            .base_url("http://localhost:1")
            .build()
            .unwrap();
        assert_eq!(session.provider_name(), "google");
    }

    #[test]
    fn test_retry_comes_from_config() {
        let mut config = AppConfig::default();
        config.retry = RetryConfig {
            max_attempts: 2,
            initial_delay_ms: 50,
            max_delay_ms: 0,
        };

        let session = RecipeSession::builder()
            .config(config)
            .client(Arc::new(FakeClient::new()))
            .build()
            .unwrap();

        assert_eq!(
            session.retry_policy(),
            RetryPolicy::new(2, Duration::from_millis(50))
        );
    }

    #[test]
    fn test_explicit_retry_wins() {
        let policy = RetryPolicy::new(1, Duration::ZERO);
        let session = RecipeSession::builder()
            .client(Arc::new(FakeClient::new()))
            .retry_policy(policy)
            .build()
            .unwrap();
        assert_eq!(session.retry_policy(), policy);
    }
}
