//! Inbound event classification.
//!
//! Turns a raw Telegram update (JSON) into one of the shapes the service
//! understands. Classification never fails: anything unrecognized is
//! [`Inbound::Ignored`].

use serde::Deserialize;

use crate::domain::{ChatId, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Callback(CallbackEvent),
    /// A button press with no chat or no payload. It still gets answered.
    CallbackAck(String),
    Message(MessageEvent),
    Ignored,
}

/// A button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackEvent {
    pub callback_id: Option<String>,
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub data: String,
}

/// A text message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub display_name: String,
    pub text: String,
}

#[derive(Deserialize)]
struct RawUpdate {
    message: Option<RawMessage>,
    callback_query: Option<RawCallback>,
}

#[derive(Deserialize)]
struct RawMessage {
    chat: RawChat,
    from: Option<RawUser>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawCallback {
    id: Option<String>,
    from: RawUser,
    data: Option<String>,
    message: Option<RawCallbackMessage>,
}

#[derive(Deserialize)]
struct RawCallbackMessage {
    chat: RawChat,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Deserialize)]
struct RawUser {
    id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

impl RawUser {
    fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match &self.username {
            Some(u) if !u.is_empty() => format!("@{u}"),
            _ => self.id.to_string(),
        }
    }
}

/// Classify a raw update body. Invalid JSON is ignored.
pub fn classify_bytes(body: &[u8]) -> Inbound {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(v) => classify(&v),
        Err(_) => Inbound::Ignored,
    }
}

pub fn classify(raw: &serde_json::Value) -> Inbound {
    let Ok(update) = RawUpdate::deserialize(raw) else {
        return Inbound::Ignored;
    };

    if let Some(cb) = update.callback_query {
        let (Some(data), Some(msg)) = (cb.data, cb.message) else {
            return cb.id.map_or(Inbound::Ignored, Inbound::CallbackAck);
        };
        return Inbound::Callback(CallbackEvent {
            callback_id: cb.id,
            chat_id: ChatId(msg.chat.id),
            user_id: UserId(cb.from.id),
            data,
        });
    }

    if let Some(msg) = update.message {
        let (Some(from), Some(text)) = (msg.from, msg.text) else {
            return Inbound::Ignored;
        };
        if text.trim().is_empty() {
            return Inbound::Ignored;
        }
        return Inbound::Message(MessageEvent {
            chat_id: ChatId(msg.chat.id),
            user_id: UserId(from.id),
            display_name: from.display_name(),
            text,
        });
    }

    Inbound::Ignored
}
