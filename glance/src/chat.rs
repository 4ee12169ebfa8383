//! Chat-completion request and response types.
//!
//! These types serialize directly to the OpenAI Chat Completions wire format:
//!
//! ```json
//! { "model": "...", "messages": [{ "role": "user", "content": [
//!     { "type": "text", "text": "..." },
//!     { "type": "image_url", "image_url": { "url": "data:..." } } ] }] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::image::EncodedImage;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message.
    User,
}

/// A typed content part of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Image referenced by URL or data URL.
    ImageUrl {
        /// The image URL.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from a URL or data URL.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image URL payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL or `data:` URI.
    pub url: String,
}

/// A role-tagged message with ordered content parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl Message {
    /// Create a user message from content parts.
    #[must_use]
    pub const fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Build a single-turn vision request: one user message holding the
    /// prompt followed by the image.
    #[must_use]
    pub fn vision(
        model: impl Into<String>,
        prompt: impl Into<String>,
        image: &EncodedImage,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(vec![
                ContentPart::text(prompt),
                ContentPart::image_url(image.to_data_url()),
            ])],
        }
    }
}

/// Chat completion response.
///
/// Only `choices` is required. Everything else is kept as raw JSON, since
/// OpenAI-compatible servers differ in which fields they send and how.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Candidate responses.
    pub choices: Vec<Choice>,
    /// Remaining top-level fields (`id`, `model`, `usage`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One candidate response, as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Choice {
    /// The generated message; may be absent or `null`.
    #[serde(default)]
    pub message: Option<Value>,
    /// Remaining fields (`index`, `finish_reason`, `logprobs`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Choice {
    /// Text of the message content.
    ///
    /// Content given as an array of parts is joined from its `text` parts.
    #[must_use]
    pub fn content(&self) -> Option<String> {
        match self.message.as_ref()?.get("content")? {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => {
                let texts: Vec<&str> = parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect();
                (!texts.is_empty()).then(|| texts.concat())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;

    fn sample_image(len: usize) -> EncodedImage {
        let bytes: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        EncodedImage::from_bytes(&bytes, ImageFormat::Jpeg)
    }

    #[test]
    fn test_vision_request_shape() {
        for len in [0, 10, 4096] {
            let request =
                ChatRequest::vision("gemini-2.0-flash", "What is in this image?", &sample_image(len));

            assert_eq!(request.messages.len(), 1);
            let message = &request.messages[0];
            assert_eq!(message.role, Role::User);
            assert_eq!(message.content.len(), 2);
            assert!(matches!(message.content[0], ContentPart::Text { .. }));
            assert!(matches!(message.content[1], ContentPart::ImageUrl { .. }));
        }
    }

    #[test]
    fn test_vision_request_embeds_data_url() {
        let request = ChatRequest::vision("m", "p", &sample_image(10));
        assert_eq!(
            request.messages[0].content[1],
            ContentPart::image_url("data:image/jpeg;base64,AAECAwQFBgcICQ==")
        );
    }

    #[test]
    fn test_request_serialization() {
        let request =
            ChatRequest::vision("gemini-2.0-flash", "What is in this image?", &sample_image(10));
        let json = serde_json::to_value(&request).expect("serialization should succeed");

        assert_eq!(
            json,
            serde_json::json!({
                "model": "gemini-2.0-flash",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "What is in this image?" },
                        {
                            "type": "image_url",
                            "image_url": { "url": "data:image/jpeg;base64,AAECAwQFBgcICQ==" }
                        }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_minimal_response_deserialization() {
        let json = r#"{"choices":[{"message":{"content":"a cat"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("should parse");

        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].content().as_deref(), Some("a cat"));
        assert!(response.extra.is_empty());
    }

    #[test]
    fn test_full_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677858242,
            "model": "gemini-2.0-flash",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "A cat on a sofa." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 260, "completion_tokens": 6, "total_tokens": 266 }
        }"#;
        let response: ChatResponse = serde_json::from_str(json).expect("should parse");

        assert_eq!(response.extra["model"], "gemini-2.0-flash");
        assert_eq!(response.extra["usage"]["total_tokens"], 266);
        let choice = &response.choices[0];
        assert_eq!(choice.extra["index"], 0);
        assert_eq!(choice.extra["finish_reason"], "stop");
        assert_eq!(choice.content().as_deref(), Some("A cat on a sofa."));
    }

    #[test]
    fn test_null_usage_fields_accepted() {
        let json = r#"{"choices":[{"message":{"content":"a cat"}}],"usage":{"prompt_tokens":null}}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("should parse");

        assert_eq!(response.choices[0].content().as_deref(), Some("a cat"));
        assert!(response.extra["usage"]["prompt_tokens"].is_null());
    }

    #[test]
    fn test_null_message_accepted() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":null}]}"#).expect("should parse");

        assert_eq!(response.choices.len(), 1);
        assert!(response.choices[0].message.is_none());
        assert!(response.choices[0].content().is_none());
    }

    #[test]
    fn test_content_parts_array() {
        let json = r#"{"choices":[{"message":{"content":[{"type":"text","text":"a cat"}]}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("should parse");

        assert_eq!(response.choices[0].content().as_deref(), Some("a cat"));
    }

    #[test]
    fn test_unknown_choice_fields_kept() {
        let json = r#"{"choices":[{"message":{"content":"a cat","tool_calls":[]},"logprobs":null}]}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("should parse");
        let choice = &response.choices[0];

        assert!(choice.extra.contains_key("logprobs"));
        assert_eq!(
            choice.message.as_ref().map(|m| m["tool_calls"].clone()),
            Some(serde_json::json!([]))
        );
    }

    #[test]
    fn test_response_without_choices_is_rejected() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"id":"x"}"#).is_err());
    }
}
