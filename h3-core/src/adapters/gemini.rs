//! Gemini support assistant
//!
//! Talks to the Generative Language REST API (`generateContent`). The
//! whole conversation is sent on each call; the API keeps no chat state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::ChatMessage;
use crate::ports::SupportAssistant;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Persona and house rules for the assistant
pub const SYSTEM_INSTRUCTION: &str = "You are \"Hura\", the AI support assistant for H3, a Halal Fintech Neobank application.
Your tone is professional, empathetic, and concise.

Key Knowledge:
- H3 follows Islamic finance principles: No Riba (interest), transparent fees, and ethical investing.
- You can explain Zakat (2.5% of qualifying wealth held for a lunar year).
- You help with app navigation: \"Pay\", \"Transfer\", \"Receive\", \"Settings\".

If a user asks about interest, explain that H3 does not offer interest-based accounts but offers profit-sharing compliant with Sharia.
Keep answers short and helpful for a mobile chat interface.";

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, `None` when empty
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini HTTP client
pub struct GeminiAssistant {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAssistant {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Assistant(format!(
                "Connection timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::Assistant("Unable to connect to Gemini servers".to_string())
        } else {
            Error::Assistant(format!("Gemini request failed: {}", error))
        }
    }
}

fn build_request<'a>(message: &'a str, history: &'a [ChatMessage]) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = history
        .iter()
        .map(|m| Content {
            role: Some(m.role.as_str()),
            parts: vec![Part { text: &m.text }],
        })
        .collect();
    contents.push(Content {
        role: Some("user"),
        parts: vec![Part { text: message }],
    });

    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION,
            }],
        },
        contents,
    }
}

#[async_trait]
impl SupportAssistant for GeminiAssistant {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_support_response(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<Option<String>> {
        let body = build_request(message, history);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        match response.status().as_u16() {
            200 => {}
            400 | 403 => {
                return Err(Error::Assistant(
                    "Gemini rejected the request. Check the configured API key.".to_string(),
                ))
            }
            429 => return Err(Error::Assistant("Gemini rate limit reached".to_string())),
            status => {
                return Err(Error::Assistant(format!("Gemini API error: HTTP {}", status)))
            }
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Assistant(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(data.text())
    }
}
