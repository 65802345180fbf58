//! Support service - the assistant chat conversation
//!
//! The conversation opens with a fixed greeting. Each user message is sent
//! with the history before it; whatever happens on the assistant side, a
//! model reply is appended so the conversation never stalls.

use std::sync::Arc;

use crate::domain::{ChatMessage, ChatRole};
use crate::ports::SupportAssistant;

pub const WELCOME_MESSAGE: &str =
    "Welcome to H3 Assistant. How may I assist you with your portfolio today?";

/// Reply when the assistant could not be reached
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting to the support server. Please try again later.";

/// Reply when the assistant answered with no text
pub const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, I couldn't process that request at the moment.";

/// How a reply was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Assistant,
    EmptyFallback,
    ErrorFallback,
}

pub struct SupportService {
    assistant: Option<Arc<dyn SupportAssistant>>,
    messages: Vec<ChatMessage>,
    last_error: Option<String>,
}

impl SupportService {
    /// `None` runs the chat offline: every reply is the connection
    /// fallback.
    pub fn new(assistant: Option<Arc<dyn SupportAssistant>>) -> Self {
        Self {
            assistant,
            messages: vec![ChatMessage::model(WELCOME_MESSAGE)],
            last_error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn assistant_name(&self) -> Option<&str> {
        self.assistant.as_deref().map(|a| a.name())
    }

    /// Error behind the most recent fallback reply, for logging
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start over from the greeting
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::model(WELCOME_MESSAGE)];
        self.last_error = None;
    }

    /// Send a user message and append the reply
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn send(&mut self, text: &str) -> Option<(&ChatMessage, ReplySource)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(text));
        self.last_error = None;

        let (reply, source) = match &self.assistant {
            None => {
                self.last_error = Some("No assistant configured".to_string());
                (CONNECTION_FALLBACK.to_string(), ReplySource::ErrorFallback)
            }
            Some(assistant) => match assistant.generate_support_response(text, &history).await {
                Ok(Some(reply)) => (reply, ReplySource::Assistant),
                Ok(None) => (EMPTY_REPLY_FALLBACK.to_string(), ReplySource::EmptyFallback),
                Err(e) => {
                    self.last_error = Some(e.to_string());
                    (CONNECTION_FALLBACK.to_string(), ReplySource::ErrorFallback)
                }
            },
        };

        self.messages.push(ChatMessage::model(reply));
        self.messages.last().map(|m| (m, source))
    }

    /// Number of exchanged messages, greeting excluded
    pub fn exchange_count(&self) -> usize {
        self.messages
            .iter()
            .skip(1)
            .filter(|m| m.role == ChatRole::User)
            .count()
    }
}
