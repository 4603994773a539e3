use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::BackendError;
use crate::llm::prompts::{build_chunk_prompt, SYSTEM_PROMPT};
use crate::models::{Chunk, RawCandidate};
use crate::registry::SpeakerRegistry;

/// Configuration for the Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            BackendError::ConfigError("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
        })
    }

    /// Create with custom settings.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
        }
    }
}

/// Anthropic API client acting as the remote classification backend.
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Classify one chunk into raw candidate records.
    ///
    /// The candidates come back untyped and in whatever field-name variants
    /// the model chose; the caller passes them through the normalizer. Line
    /// order within the chunk is preserved by contract.
    pub async fn classify_chunk(
        &self,
        chunk: &Chunk,
        registry: &SpeakerRegistry,
    ) -> Result<Vec<RawCandidate>, BackendError> {
        let prompt = build_chunk_prompt(chunk, registry);
        let submission = self.send_with_tool(SYSTEM_PROMPT, &prompt).await?;
        debug!(
            "Chunk {}: backend returned {} candidates",
            chunk.index,
            submission.segments.len()
        );
        Ok(submission.segments)
    }

    /// Send a message with tool use for structured output.
    async fn send_with_tool(
        &self,
        system: &str,
        user: &str,
    ) -> Result<SegmentSubmission, BackendError> {
        let tool = Tool {
            name: "submit_segments".to_string(),
            description: "Submit the parsed screenplay segments in original line order"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "segments": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "timecode": {
                                    "type": "string",
                                    "description": "Timestamp, or full segment marker including dashes"
                                },
                                "speaker": {
                                    "description": "Speaker name(s) in ALL CAPS, audio notation included",
                                    "anyOf": [
                                        {"type": "string"},
                                        {"type": "array", "items": {"type": "string"}}
                                    ]
                                },
                                "audio_type": {"type": "string"},
                                "scene_type": {"type": "string", "enum": ["INT", "EXT"]},
                                "location": {"type": "string"},
                                "text": {"type": "string"},
                                "type": {"type": "string"}
                            }
                        }
                    }
                },
                "required": ["segments"]
            }),
        };

        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![tool],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: "submit_segments".to_string(),
            }),
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError { status, message });
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        // Find the tool_use content block
        for content in &response.content {
            if content.content_type == "tool_use"
                && content.name.as_deref() == Some("submit_segments")
            {
                if let Some(input) = &content.input {
                    return serde_json::from_value(input.clone())
                        .map_err(|e| BackendError::ParseError(e.to_string()));
                }
            }
        }

        Err(BackendError::EmptyResponse)
    }
}

/// Tool submission payload: the parsed segments in order.
#[derive(Debug, Deserialize)]
struct SegmentSubmission {
    #[serde(default)]
    segments: Vec<RawCandidate>,
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpeakerField;

    #[test]
    fn test_parse_segment_submission() {
        let json = serde_json::json!({
            "segments": [
                {"timecode": "00:05:44", "speaker": "FERNANDO (MO)", "text": "Vstúpte."},
                {"timecode": "00:06:12----------", "text": ""},
                {"speaker": ["FUENSALIDA", "CHACÓN"], "audio_type": "VO", "text": "Avšak..list z Flámska sa zdržal."}
            ]
        });

        let submission: SegmentSubmission = serde_json::from_value(json).unwrap();

        assert_eq!(submission.segments.len(), 3);
        assert_eq!(
            submission.segments[0].speaker,
            Some(SpeakerField::One("FERNANDO (MO)".to_string()))
        );
        assert_eq!(
            submission.segments[1].timecode.as_deref(),
            Some("00:06:12----------")
        );
        assert_eq!(
            submission.segments[2].speaker,
            Some(SpeakerField::Many(vec![
                "FUENSALIDA".to_string(),
                "CHACÓN".to_string()
            ]))
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = AnthropicConfig::new("key".to_string(), "model".to_string());
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_tokens, 4096);
    }
}
