//! OpenAI chat completion generator.

use super::Generator;
use crate::config::{GenerationSettings, OpenAISettings};
use crate::error::{LecternError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Generator backed by the OpenAI chat completions API.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a generator around an existing client.
    pub fn new(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }

    /// Create a generator from settings.
    pub fn from_settings(generation: &GenerationSettings, openai: &OpenAISettings) -> Result<Self> {
        Ok(Self::new(
            create_client(openai)?,
            &generation.model,
            generation.temperature,
        ))
    }

    /// Model name used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| LecternError::AnswerGenerationFailed(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| LecternError::AnswerGenerationFailed(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LecternError::AnswerGenerationFailed(format!("Chat completion error: {}", e))
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                LecternError::AnswerGenerationFailed("Empty response from LLM".to_string())
            })?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
