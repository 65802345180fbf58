//! Support assistant port - conversational model behind the chat screen

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::ChatMessage;

#[async_trait]
pub trait SupportAssistant: Send + Sync {
    /// Assistant name (e.g., "gemini")
    fn name(&self) -> &str;

    /// Answer `message` given the prior conversation.
    ///
    /// `Ok(None)` means the model produced no text. Errors are transport
    /// or API failures; callers degrade both to a fixed reply.
    async fn generate_support_response(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<Option<String>>;
}
