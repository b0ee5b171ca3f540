use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::LanguageModel;

/// OpenAI-compatible `/chat/completions` client (OpenRouter and friends)
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl ChatCompletionClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: String) -> Self {
        ChatCompletionClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            temperature: None,
        }
    }

    /// Read the API key from the environment variable `api_key_env`
    pub fn from_env(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_env: &str,
    ) -> Result<Self, ModelError> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| ModelError::MissingApiKey(api_key_env.to_string()))?;
        Ok(Self::new(base_url, model, api_key))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn request<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(system_prompt, user_prompt))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        handle_response(status, &text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pull the first choice's content out of a completion response
fn handle_response(status: StatusCode, text: &str) -> Result<String, ModelError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(text)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| text.to_string());
        return Err(ModelError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let resp: ChatResponse =
        serde_json::from_str(text).map_err(|e| ModelError::Parse(e.to_string()))?;
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
