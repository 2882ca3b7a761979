//! Chat-completions wire shape, used by the OpenAI-compatible providers.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, ProviderName};
use crate::error::{Error, Result};
use crate::providers::AnalysisResult;

pub const SYSTEM_PROMPT: &str = "You are an expert code auditor. Review this code \
for defects and security vulnerabilities, and describe each finding with its \
location and impact.";

const CHAT_MODEL: &str = "gpt-4";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

fn build_request(code: &str) -> ChatRequest {
    ChatRequest {
        model: CHAT_MODEL.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: code.to_string(),
            },
        ],
    }
}

/// Pulls the first completion's message text out of a successful response
/// body.
fn extract_analysis(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| Error::Parse("response contained no choices".to_string()))
}

pub async fn analyze(
    client: &Client,
    provider: ProviderName,
    config: &ProviderConfig,
    code: &str,
) -> Result<AnalysisResult> {
    let url = format!("{}/chat/completions", config.api_base);
    tracing::debug!("POST {} ({} bytes of code)", url, code.len());

    let response = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .json(&build_request(code))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Provider {
            provider,
            status,
            body,
        });
    }

    let body = response.text().await?;
    Ok(AnalysisResult::new(extract_analysis(&body)?, provider))
}
