use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A generated historical recipe.
///
/// Every field is required when decoding: a response missing any of them is
/// rejected as a whole rather than kept as a partial draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub era: String,
    pub recipe_name: String,
    pub description: String,
    pub fun_fact: String,
    /// Quantities as written by the generator, not the user's ingredient list
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Inline image payload returned by the image endpoint, still base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    pub data: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        GeneratedImage {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Render as a `data:` URL suitable for an `<img src>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the base64 payload into raw image bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.trim())
    }
}

/// A draft the user chose to keep, stamped with its creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipe {
    /// Creation time in milliseconds since the Unix epoch; unique within an archive
    pub id: i64,
    #[serde(flatten)]
    pub draft: RecipeDraft,
    #[serde(default)]
    pub image: Option<GeneratedImage>,
}

impl SavedRecipe {
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.id)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
