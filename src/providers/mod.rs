mod fake;
mod google;
mod prompt;

pub use fake::FakeClient;
pub use google::{decode_image, decode_recipe, GeminiClient};
pub use prompt::{
    build_image_prompt, build_recipe_prompt, recipe_response_schema, RECIPE_FIELDS, RECIPE_PROMPT,
};

use crate::error::GenerationError;
use crate::model::{GeneratedImage, RecipeDraft};
use async_trait::async_trait;

/// One request/response round trip per step, no local state.
///
/// Retries are applied by the caller through [`crate::RetryPolicy`], never
/// inside an implementation.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Ask for a historical recipe built from the given ingredients
    async fn fetch_recipe(&self, ingredients: &[String]) -> Result<RecipeDraft, GenerationError>;

    /// Ask for a photograph of the named dish
    async fn fetch_image(&self, recipe_name: &str) -> Result<GeneratedImage, GenerationError>;
}
