use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use resource_list_core::ports::{ClassificationProvider, PortError, PortResult};

/// Markers the provider uses when a key has run out of quota or is being throttled.
const QUOTA_MARKERS: [&str; 4] = ["insufficient_quota", "quota", "rate limit", "429"];

/// Maps a provider error message to a port error. Quota and rate-limit
/// failures are kept distinct so the classifier can back off.
pub(crate) fn classify_provider_error(message: String) -> PortError {
    let lowered = message.to_lowercase();
    if QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        PortError::QuotaExceeded(message)
    } else {
        PortError::Unexpected(message)
    }
}

pub struct OpenAiClassifierAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClassifierAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Builds a deterministic chat request that asks the model for a JSON object.
    pub(crate) fn build_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<CreateChatCompletionRequest, PortError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .max_tokens(200u32)
            .temperature(0.0)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl ClassificationProvider for OpenAiClassifierAdapter {
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String> {
        let request = self.build_request(system_prompt, user_prompt)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| classify_provider_error(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| PortError::Unexpected("Empty classification reply".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_and_rate_limit_errors_are_distinguished() {
        assert!(matches!(
            classify_provider_error("You exceeded your current quota (insufficient_quota)".into()),
            PortError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_provider_error("Rate limit reached for gpt-4o-mini".into()),
            PortError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_provider_error("invalid api key".into()),
            PortError::Unexpected(_)
        ));
    }

    #[test]
    fn requests_are_deterministic_json_completions() {
        let client = Client::with_config(OpenAIConfig::new().with_api_key("test-key"));
        let adapter = OpenAiClassifierAdapter::new(client, "gpt-4o-mini");
        let request = adapter
            .build_request("Reply with JSON.", "bots for tickets")
            .unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.0));
        assert!(matches!(request.response_format, Some(ResponseFormat::JsonObject)));
        assert_eq!(request.messages.len(), 2);
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(request.messages[1], ChatCompletionRequestMessage::User(_)));
    }
}
