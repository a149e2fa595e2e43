use serde::{Deserialize, Serialize};

use crate::error::{ArtError, Result};
use crate::models::common::MediaKind;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: Option<String>,
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
            model: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Reject empty prompts before anything touches the network.
    pub fn validate(&self) -> Result<&str> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(ArtError::ValidationError(
                "Please provide a prompt!".to_string(),
            ));
        }
        Ok(prompt)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Base64 encoded media payload.
    pub media_data: String,
    pub media_kind: MediaKind,
    pub prompt: String,
    pub enhanced_prompt: String,
    pub style: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_trimmed_prompt() {
        let request = GenerationRequest::new("  a garden with butterflies  ");
        assert_eq!(request.validate().unwrap(), "a garden with butterflies");
    }

    #[test]
    fn test_validate_rejects_empty_prompt() {
        let request = GenerationRequest::new("");
        assert!(matches!(
            request.validate(),
            Err(ArtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_whitespace_prompt() {
        let request = GenerationRequest::new("   \t\n ");
        assert!(matches!(
            request.validate(),
            Err(ArtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_deserializes_from_handler_body() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"prompt": "sunflowers", "style": "folk"}"#).unwrap();
        assert_eq!(request.prompt, "sunflowers");
        assert_eq!(request.style.as_deref(), Some("folk"));
        assert!(request.model.is_none());
    }
}
