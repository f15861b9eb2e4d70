//! In-memory port fakes shared by the unit tests.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, JuzNumber, Language, SurahNumber, UserId},
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    ports::{
        AudioProbe, MembershipPort, MembershipStatus, ProbeOutcome, RegistryStore,
        ScriptureSource, TextUnit, Verse,
    },
    registry::Registry,
    Error, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text(ChatId, String),
    Html(ChatId, String),
    Keyboard(ChatId, String, InlineKeyboard),
}

impl Sent {
    pub fn chat(&self) -> ChatId {
        match self {
            Sent::Text(c, _) | Sent::Html(c, _) | Sent::Keyboard(c, _, _) => *c,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Sent::Text(_, t) | Sent::Html(_, t) | Sent::Keyboard(_, t, _) => t,
        }
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<Sent>>,
    answered: Mutex<Vec<String>>,
    failing: Mutex<HashSet<ChatId>>,
}

impl FakeMessenger {
    pub fn fail_chat(&self, chat_id: ChatId) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat() == chat_id)
            .collect()
    }

    pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.sent_to(chat_id)
            .iter()
            .map(|s| s.body().to_string())
            .collect()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) -> Result<()> {
        if self.failing.lock().unwrap().contains(&sent.chat()) {
            return Err(Error::External(format!("chat {} unreachable", sent.chat().0)));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.record(Sent::Text(chat_id, text.to_string()))
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.record(Sent::Html(chat_id, html.to_string()))
    }

    async fn send_html_with_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.record(Sent::Keyboard(chat_id, html.to_string(), keyboard))
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}

pub struct FakeMembership {
    status: Option<MembershipStatus>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeMembership {
    pub fn with(status: MembershipStatus) -> Self {
        Self {
            status: Some(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            status: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(status: MembershipStatus, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::with(status)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipPort for FakeMembership {
    async fn membership(&self, _channel: &str, _user_id: UserId) -> Result<MembershipStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.status
            .ok_or_else(|| Error::External("getChatMember failed".to_string()))
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    doc: Mutex<Registry>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    conflicts: AtomicUsize,
    puts: AtomicUsize,
}

impl FakeRegistry {
    pub fn with_users(users: &[(i64, Language)]) -> Self {
        let mut doc = Registry::new();
        for (id, lang) in users {
            doc.upsert(UserId(*id), *lang);
        }
        Self {
            doc: Mutex::new(doc),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// The next `n` writes report a conflict and store nothing.
    pub fn conflict_next_puts(&self, n: usize) {
        self.conflicts.store(n, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Registry {
        self.doc.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryStore for FakeRegistry {
    async fn get(&self) -> Result<Registry> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::RegistryUnavailable("read refused".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn put(&self, registry: &Registry) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::RegistryUnavailable("write refused".to_string()));
        }
        let pending = self.conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(Error::RegistryConflict);
        }
        *self.doc.lock().unwrap() = registry.clone();
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeScripture {
    verses: usize,
    verse_len: usize,
    fail: bool,
    surah_calls: Mutex<Vec<u16>>,
    juz_calls: Mutex<Vec<u8>>,
}

impl FakeScripture {
    pub fn with_verses(verses: usize, verse_len: usize) -> Self {
        Self {
            verses,
            verse_len,
            fail: false,
            surah_calls: Mutex::default(),
            juz_calls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_verses(0, 0)
        }
    }

    pub fn surah_calls(&self) -> Vec<u16> {
        self.surah_calls.lock().unwrap().clone()
    }

    pub fn juz_calls(&self) -> Vec<u8> {
        self.juz_calls.lock().unwrap().clone()
    }

    fn unit(&self, number: u16, surah_name: Option<&str>) -> Result<TextUnit> {
        if self.fail {
            return Err(Error::Upstream("status 503".to_string()));
        }
        let verses = (1..=self.verses)
            .map(|i| Verse {
                index: i as u32,
                text: "ا".repeat(self.verse_len),
                surah_name: surah_name.map(str::to_string),
            })
            .collect();
        Ok(TextUnit {
            number,
            display_name: Some("Al-Baqara".to_string()),
            verses,
        })
    }
}

#[async_trait]
impl ScriptureSource for FakeScripture {
    async fn surah(&self, number: SurahNumber) -> Result<TextUnit> {
        self.surah_calls.lock().unwrap().push(number.get());
        self.unit(number.get(), None)
    }

    async fn juz(&self, number: JuzNumber) -> Result<TextUnit> {
        self.juz_calls.lock().unwrap().push(number.get());
        self.unit(u16::from(number.get()), Some("Al-Baqara"))
    }
}

pub struct FakeProbe {
    outcome: Option<ProbeOutcome>,
    urls: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn found() -> Self {
        Self {
            outcome: Some(ProbeOutcome::Found),
            urls: Mutex::default(),
        }
    }

    pub fn missing(status: u16) -> Self {
        Self {
            outcome: Some(ProbeOutcome::Missing { status }),
            urls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: None,
            urls: Mutex::default(),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioProbe for FakeProbe {
    async fn probe(&self, url: &str) -> Result<ProbeOutcome> {
        self.urls.lock().unwrap().push(url.to_string());
        self.outcome
            .ok_or_else(|| Error::External("connection reset".to_string()))
    }
}
