use crate::{errors::InsightError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 800;

// --- Structured-response ("responses") request and response structures ---

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: Vec<ResponsesInput<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct ResponsesInput<'a> {
    role: &'a str,
    content: Vec<ResponsesPart<'a>>,
}

#[derive(Serialize)]
struct ResponsesPart<'a> {
    #[serde(rename = "type")]
    part_type: &'a str,
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct ResponsesReply {
    output_text: Option<String>,
}

// --- Chat-completion request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

/// Maps a non-success HTTP reply to an `InsightError`.
///
/// This is the single place where capability mismatches are told apart
/// from real failures. Endpoint versions that predate forced-JSON output
/// reject the `response_format` parameter with a 4xx naming it, and
/// versions that predate the structured route answer it with a 404.
/// Everything else (auth, rate limit, server errors) stays an API error
/// so the retry wrapper sees it.
fn classify_api_error(status: StatusCode, body: &str, structured_route: bool) -> InsightError {
    if structured_route && status == StatusCode::NOT_FOUND {
        return InsightError::UnsupportedResponseMode(format!(
            "structured response route not found: {body}"
        ));
    }
    if status.is_client_error() && body.contains("response_format") {
        return InsightError::UnsupportedResponseMode(body.to_string());
    }
    InsightError::AiApi(format!("{status}: {body}"))
}

// --- OpenAI-compatible provider implementation ---

/// A provider for an OpenAI-compatible API.
///
/// Both wire shapes post to the same base URL: the structured shape at
/// `/responses` and the conversational shape at `/chat/completions`.
/// The underlying client is stateless and may be reused across runs.
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: ReqwestClient,
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
}

impl OpenAiProvider {
    /// Creates a new `OpenAiProvider` rooted at `base_url`.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self, InsightError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(InsightError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, InsightError> {
        let mut request_builder = self.client.post(url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }
        request_builder
            .json(body)
            .send()
            .await
            .map_err(InsightError::AiRequest)
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InsightError> {
        let request_body = ResponsesRequest {
            model: self.model.as_deref(),
            input: vec![
                ResponsesInput {
                    role: "system",
                    content: vec![ResponsesPart {
                        part_type: "text",
                        text: system_prompt,
                    }],
                },
                ResponsesInput {
                    role: "user",
                    content: vec![ResponsesPart {
                        part_type: "text",
                        text: user_prompt,
                    }],
                },
            ],
            response_format: ResponseFormat::json_object(),
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let url = format!("{}/responses", self.base_url);
        debug!("--> Sending structured request to {url}");
        let response = self.post(&url, &request_body).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &error_text, true));
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .map_err(InsightError::AiDeserialization)?;

        Ok(reply.output_text.unwrap_or_else(|| "{}".to_string()))
    }

    async fn generate_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, InsightError> {
        let request_body = ChatRequest {
            model: self.model.as_deref(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            response_format: json_mode.then(ResponseFormat::json_object),
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("--> Sending chat request to {url} (json_mode: {json_mode})");
        let response = self.post(&url, &request_body).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &error_text, false));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(InsightError::AiDeserialization)?;

        let raw_response = chat_response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        Ok(raw_response)
    }
}
