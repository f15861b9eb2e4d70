//! Telegram adapter (teloxide).
//!
//! Implements the `qtb-core` messaging and membership ports over the Telegram
//! Bot API, and serves the webhook endpoint (see [`router`]).

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Recipient},
};

use tokio::time::sleep;

pub mod router;

use qtb_core::{
    domain::{ChatId, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, InlineButton, InlineKeyboard, MessagingCapabilities},
    },
    ports::{MembershipPort, MembershipStatus},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// `@name` is a public channel username; anything else must be a numeric chat id.
pub fn channel_recipient(channel: &str) -> Result<Recipient> {
    let channel = channel.trim();
    if channel.starts_with('@') {
        return Ok(Recipient::ChannelUsername(channel.to_string()));
    }
    channel
        .parse::<i64>()
        .map(|id| Recipient::Id(teloxide::types::ChatId(id)))
        .map_err(|_| {
            Error::Config(format!(
                "CHANNEL_ID must be @username or a numeric id, got {channel:?}"
            ))
        })
}

pub fn membership_status(status: ChatMemberStatus) -> MembershipStatus {
    match status {
        ChatMemberStatus::Owner => MembershipStatus::Owner,
        ChatMemberStatus::Administrator => MembershipStatus::Moderator,
        ChatMemberStatus::Member => MembershipStatus::Member,
        ChatMemberStatus::Restricted => MembershipStatus::Restricted,
        ChatMemberStatus::Left => MembershipStatus::Left,
        ChatMemberStatus::Banned => MembershipStatus::Kicked,
    }
}

fn tg_button(button: InlineButton) -> Result<InlineKeyboardButton> {
    Ok(match button.action {
        ButtonAction::Callback(data) => InlineKeyboardButton::callback(button.label, data),
        ButtonAction::Url(url) => {
            let url = reqwest::Url::parse(&url)
                .map_err(|e| Error::Config(format!("invalid button url {url:?}: {e}")))?;
            InlineKeyboardButton::url(button.label, url)
        }
    })
}

pub fn tg_markup(keyboard: InlineKeyboard) -> Result<InlineKeyboardMarkup> {
    let rows = keyboard
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(tg_button).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), text.to_string())
                .disable_web_page_preview(true)
        })
        .await?;
        Ok(())
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .parse_mode(ParseMode::Html)
        })
        .await?;
        Ok(())
    }

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        let markup = tg_markup(keyboard)?;
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .parse_mode(ParseMode::Html)
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.with_retry(|| self.bot.answer_callback_query(callback_id.to_string()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MembershipPort for TelegramMessenger {
    async fn membership(&self, channel: &str, user_id: UserId) -> Result<MembershipStatus> {
        let recipient = channel_recipient(channel)?;
        let uid = u64::try_from(user_id.0)
            .map_err(|_| Error::External(format!("invalid telegram user id {user_id}")))?;
        let member = self
            .with_retry(|| {
                self.bot
                    .get_chat_member(recipient.clone(), teloxide::types::UserId(uid))
            })
            .await?;
        Ok(membership_status(member.kind.status()))
    }
}
