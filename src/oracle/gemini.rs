use super::{ChatMessage, Oracle, ResponseFormat, Role};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Gemini REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            temperature: 0.1,
            timeout_secs: 300,
        }
    }
}

/// Blocking HTTP client for Gemini's `generateContent` API.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("Gemini API key is empty".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config: GeminiConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, self.config.model)
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

/// Response body from `generateContent`
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn build_request(
    messages: &[ChatMessage],
    format: ResponseFormat,
    temperature: f32,
) -> GenerateContentRequest<'_> {
    let system_parts: Vec<Part<'_>> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| Part { text: &m.content })
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: Some(match m.role {
                Role::Assistant => "model",
                _ => "user",
            }),
            parts: vec![Part { text: &m.content }],
        })
        .collect();

    GenerateContentRequest {
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
        contents,
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: match format {
                ResponseFormat::Json => Some("application/json"),
                ResponseFormat::Text => None,
            },
        },
    }
}

fn response_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::OracleError("response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::OracleError("response candidate had no text".to_string()));
    }
    Ok(text)
}

impl Oracle for GeminiClient {
    fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
        let body = build_request(messages, format, self.config.temperature);
        debug!("POST {} ({} messages)", self.endpoint(), messages.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::OracleStatus { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| Error::OracleError(format!("unreadable response body: {}", e)))?;

        response_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_roles() {
        let messages = vec![
            ChatMessage::system("Extract endpoints."),
            ChatMessage::user("File: routes/users.js"),
            ChatMessage { role: Role::Assistant, content: "[]".to_string() },
        ];

        let body = serde_json::to_value(build_request(&messages, ResponseFormat::Json, 0.1)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Extract endpoints.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_text_request_omits_mime_type_and_system() {
        let messages = vec![ChatMessage::user("hello")];

        let body = serde_json::to_value(build_request(&messages, ResponseFormat::Text, 0.1)).unwrap();

        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"/**"},{"text":" */"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response_text(parsed).unwrap(), "/** */");
    }

    #[test]
    fn test_response_without_candidates_is_an_error() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();

        assert!(matches!(response_text(parsed), Err(Error::OracleError(_))));
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = GeminiClient::new(GeminiConfig::new("  ".to_string()));

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
