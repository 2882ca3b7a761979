//! Prompt-completion wire shape for Ollama's generate endpoint. No chat
//! roles and no auth header; the instruction is folded into a single prompt.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, ProviderName};
use crate::error::{Error, Result};
use crate::providers::AnalysisResult;

const GENERATE_MODEL: &str = "codellama";

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

fn build_request(code: &str) -> GenerateRequest {
    GenerateRequest {
        model: GENERATE_MODEL.to_string(),
        prompt: format!(
            "Review the following code for defects and security vulnerabilities:\n{}",
            code
        ),
        stream: false,
    }
}

fn extract_analysis(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(response.response)
}

pub async fn analyze(
    client: &Client,
    provider: ProviderName,
    config: &ProviderConfig,
    code: &str,
) -> Result<AnalysisResult> {
    let url = format!("{}/api/generate", config.api_base);
    tracing::debug!("POST {} ({} bytes of code)", url, code.len());

    let response = client.post(&url).json(&build_request(code)).send().await?;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_disables_streaming_and_embeds_code() {
        let request = build_request("SELECT * FROM users");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "codellama");
        assert_eq!(json["stream"], false);
        assert!(json["prompt"]
            .as_str()
            .unwrap()
            .contains("SELECT * FROM users"));
    }

    #[test]
    fn extracts_response_text() {
        let body = r#"{"model": "codellama", "response": "Unbounded query.", "done": true}"#;
        assert_eq!(extract_analysis(body).unwrap(), "Unbounded query.");
    }

    #[test]
    fn missing_response_field_is_a_parse_error() {
        assert!(matches!(
            extract_analysis(r#"{"done": true}"#),
            Err(Error::Parse(_))
        ));
    }
}
