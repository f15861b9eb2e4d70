use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::ChatId,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* Telegram API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between calls per chat (Telegram 1 msg/sec style limits).
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(35), // ~28/sec
            per_chat_min_interval: Duration::from_millis(1050), // ~0.95/sec
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = self.next.max(now);
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that rate-limits outbound calls.
///
/// Best-effort defense against Telegram 429s when a surah is delivered as
/// several chunks into one chat or a broadcast sweeps many chats. Per-chat
/// limiters are created lazily and dropped once their slot has passed.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<ChatId, IntervalLimiter>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for the next global slot and, for chat-bound calls, the next slot
    /// in that chat.
    async fn pace(&self, chat_id: Option<ChatId>) {
        let mut wait = self.global.lock().await.reserve();
        if let Some(chat_id) = chat_id {
            let per_chat = self.cfg.per_chat_min_interval;
            let mut chats = self.per_chat.lock().await;
            let now = Instant::now();
            chats.retain(|_, lim| lim.next > now);
            let chat_wait = chats
                .entry(chat_id)
                .or_insert_with(|| IntervalLimiter::new(per_chat))
                .reserve();
            drop(chats);
            wait = wait.max(chat_wait);
        }
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        self.inner.capabilities()
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.pace(Some(chat_id)).await;
        self.inner.send_text(chat_id, text).await
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.pace(Some(chat_id)).await;
        self.inner.send_html(chat_id, html).await
    }

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.pace(Some(chat_id)).await;
        self.inner
            .send_html_with_keyboard(chat_id, html, keyboard)
            .await
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        // Not tied to a chat.
        self.pace(None).await;
        self.inner.answer_callback_query(callback_id).await
    }
}
