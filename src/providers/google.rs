use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::model::{GeneratedImage, RecipeDraft};
use crate::providers::prompt::{build_image_prompt, build_recipe_prompt, recipe_response_schema};
use crate::providers::GenerationClient;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Google Gemini `generateContent` client for both the recipe and image steps
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    recipe_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        // Try config first, then fall back to environment variable
        let api_key = config.resolve_api_key().ok_or_else(|| {
            GenerationError::NotConfigured(
                "GOOGLE_API_KEY not found in config or environment".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::NotConfigured(e.to_string()))?;

        Ok(GeminiClient {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            recipe_model: config.recipe_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// POST a payload and return the parsed response body.
    ///
    /// Non-success statuses and API error envelopes become transport
    /// failures; a body that is not JSON at all is a decode failure.
    async fn generate_content(
        &self,
        model: &str,
        payload: &Value,
    ) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.as_str())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::transport(
                Some(status.as_u16()),
                format!("Gemini API error: {}", error_message(&body)),
            ));
        }

        let response_body: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Decode(format!("response is not JSON: {e}")))?;
        debug!("Gemini response from {}: {:?}", model, response_body);

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_code = error["code"].as_u64().and_then(|c| u16::try_from(c).ok());
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(GenerationError::transport(
                error_code,
                format!("Gemini API error: {error_message}"),
            ));
        }

        Ok(response_body)
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Decode the first candidate's text part as a [`RecipeDraft`]
pub fn decode_recipe(response_body: &Value) -> Result<RecipeDraft, GenerationError> {
    let text = response_body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            GenerationError::Decode("no text part in the first candidate".to_string())
        })?;

    serde_json::from_str(text)
        .map_err(|e| GenerationError::Decode(format!("recipe payload is invalid: {e}")))
}

/// Pull the first inline image out of the first candidate's parts
pub fn decode_image(response_body: &Value) -> Result<GeneratedImage, GenerationError> {
    let inline = response_body["candidates"][0]["content"]["parts"]
        .as_array()
        .and_then(|parts| parts.iter().find_map(|part| part.get("inlineData")))
        .ok_or_else(|| GenerationError::Decode("no inline image in response".to_string()))?;

    let data = inline["data"]
        .as_str()
        .filter(|data| !data.is_empty())
        .ok_or_else(|| GenerationError::Decode("inline image has no data".to_string()))?;
    let mime_type = inline["mimeType"].as_str().unwrap_or("image/png");

    Ok(GeneratedImage::new(mime_type, data))
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn fetch_recipe(&self, ingredients: &[String]) -> Result<RecipeDraft, GenerationError> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_recipe_prompt(ingredients) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": recipe_response_schema()
            }
        });

        let response_body = self.generate_content(&self.recipe_model, &payload).await?;
        decode_recipe(&response_body)
    }

    async fn fetch_image(&self, recipe_name: &str) -> Result<GeneratedImage, GenerationError> {
        let payload = json!({
            "contents": [{
                "parts": [{ "text": build_image_prompt(recipe_name) }]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"]
            }
        });

        let response_body = self.generate_content(&self.image_model, &payload).await?;
        decode_image(&response_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GeneratorConfig {
        GeneratorConfig {
            api_key: Some("test-key".to_string()),
            base_url: "https://example.invalid/".to_string(),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_provider_name() {
        let client = GeminiClient::new(&test_config()).unwrap();
        assert_eq!(client.provider_name(), "google");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.endpoint("gemini-x"),
            "https://example.invalid/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_decode_recipe_requires_text() {
        let body = json!({ "candidates": [] });
        assert!(matches!(decode_recipe(&body), Err(GenerationError::Decode(_))));
    }

    #[test]
    fn test_decode_image_skips_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your dish" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } }
                    ]
                }
            }]
        });
        let image = decode_image(&body).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "AAAA");
    }

    #[test]
    fn test_decode_image_without_inline_data() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Sorry, no picture" }] } }]
        });
        assert!(matches!(decode_image(&body), Err(GenerationError::Decode(_))));
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(error_message(body), "API key not valid");
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
