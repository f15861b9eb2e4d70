use async_trait::async_trait;

use crate::{
    domain::ChatId,
    messaging::types::{InlineKeyboard, MessagingCapabilities},
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; the core never talks to the
/// platform SDK directly.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send verbatim text (no parse mode). Used for content chunks and
    /// user-authored bodies, which must not be interpreted as markup.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()>;

    /// Stop the client-side spinner on a pressed button.
    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;
}
