//! Anthropic Messages API provider.
//!
//! Differs from the OpenAI-compatible shape in three places: `x-api-key`
//! authentication, the `anthropic-version` header, and the system
//! instruction travelling as a top-level field.

use altitude_core::error::ProviderError;
use altitude_core::message::{Message, Role};
use altitude_core::provider::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: crate::http_client(),
        }
    }

    /// Point at a proxy or a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn body(request: &ProviderRequest) -> MessagesRequest<'_> {
        let mut system = Vec::new();
        let mut messages = Vec::new();
        for msg in &request.messages {
            match msg.role {
                Role::System => system.push(msg.content.as_str()),
                Role::User => messages.push(WireMessage {
                    role: "user",
                    content: &msg.content,
                }),
                Role::Assistant => messages.push(WireMessage {
                    role: "assistant",
                    content: &msg.content,
                }),
            }
        }

        MessagesRequest {
            model: &request.model,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        }
    }

    fn into_response(reply: MessagesReply) -> ProviderResponse {
        // Only text blocks carry the answer; thinking and tool blocks are skipped.
        let text = reply
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: reply.usage.input_tokens,
                completion_tokens: reply.usage.output_tokens,
                total_tokens: reply.usage.input_tokens + reply.usage.output_tokens,
            }),
            model: reply.model,
        }
    }
}

#[async_trait]
impl altitude_core::Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(provider = "anthropic", model = %request.model, "Sending messages request");

        let call = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&Self::body(&request));
        let response = crate::send_checked("anthropic", call).await?;
        let reply: MessagesReply = crate::decode("anthropic", response).await?;
        Ok(Self::into_response(reply))
    }
}

// --- Wire types (internal) ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    model: String,
    content: Vec<ContentBlock>,
    usage: ReplyUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ReplyUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use altitude_core::Provider;

    fn request(messages: Vec<Message>) -> ProviderRequest {
        ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages,
            temperature: 0.3,
            max_tokens: None,
        }
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = AnthropicProvider::new("sk-ant-test").with_base_url("http://localhost:9000/");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.base_url, "http://localhost:9000");
    }

    #[test]
    fn system_instructions_move_to_top_level() {
        let req = request(vec![
            Message::system("You refine ideas."),
            Message::system("Answer in JSON."),
            Message::user("I want to open a bakery"),
        ]);
        let body = serde_json::to_value(AnthropicProvider::body(&req)).unwrap();
        assert_eq!(body["system"], "You refine ideas.\n\nAnswer in JSON.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn no_system_field_without_system_messages() {
        let body = serde_json::to_value(AnthropicProvider::body(&request(vec![Message::user("hi")]))).unwrap();
        assert!(body.get("system").is_none());
    }

    #[test]
    fn reply_keeps_only_text_blocks() {
        let reply: MessagesReply = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "model": "claude-sonnet-4-20250514",
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "{\"refined_prompt\": \"Open a bakery\"}"}
                ],
                "usage": {"input_tokens": 10, "output_tokens": 5},
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();

        let response = AnthropicProvider::into_response(reply);
        assert_eq!(response.message.content, "{\"refined_prompt\": \"Open a bakery\"}");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }
}
