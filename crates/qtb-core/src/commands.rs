//! Command parsing and routing.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    admin::{format_duration, BroadcastEngine, Diagnostics},
    content::{find_reciter, Recitation, RecitationFetcher, Reciter, ScriptureFetcher},
    domain::{ChatId, JuzNumber, Language, SurahNumber, UserId},
    i18n::{render, StatusView, Text},
    localization::Localizer,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    update::MessageEvent,
    Result,
};

/// Callback payload prefix for the language picker: `set_lang_<code>`.
pub const LANG_CALLBACK_PREFIX: &str = "set_lang_";

/// One parsed inbound text, valid for a single dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub display_name: String,
    pub raw_text: String,
    /// First token, case-folded, marker included (`/surah`), `@bot` suffix removed.
    pub command: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn parse(
        chat_id: ChatId,
        user_id: UserId,
        display_name: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        let mut tokens = raw_text.split_whitespace();
        // Telegram may send `/cmd@botname arg1 ...`
        let command = tokens
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();
        let args = tokens.map(str::to_string).collect();

        Self {
            chat_id,
            user_id,
            display_name: display_name.into(),
            raw_text,
            command,
            args,
        }
    }

    pub fn from_message(ev: &MessageEvent) -> Self {
        Self::parse(ev.chat_id, ev.user_id, ev.display_name.clone(), ev.text.clone())
    }

    /// Everything after the command token, with the user's casing and line
    /// breaks intact.
    pub fn body(&self) -> &str {
        let trimmed = self.raw_text.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(i) => trimmed[i..].trim(),
            None => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Language,
    Support,
    Surah,
    Juz,
    Recite(&'static Reciter),
    Status,
    Broadcast,
}

impl Command {
    /// Map a command token to a command. Admin-only commands resolve only
    /// for the admin; for anyone else they are as unknown as any other token.
    pub fn resolve(token: &str, is_admin: bool) -> Option<Self> {
        let name = token.strip_prefix('/')?;
        match name {
            "start" => Some(Command::Start),
            "language" => Some(Command::Language),
            "support" => Some(Command::Support),
            "surah" => Some(Command::Surah),
            "juz" => Some(Command::Juz),
            "status" if is_admin => Some(Command::Status),
            "broadcast" if is_admin => Some(Command::Broadcast),
            other => find_reciter(other).map(Command::Recite),
        }
    }
}

pub struct CommandRouter {
    messenger: Arc<dyn MessagingPort>,
    localizer: Arc<Localizer>,
    scripture: ScriptureFetcher,
    recitation: RecitationFetcher,
    broadcast: BroadcastEngine,
    diagnostics: Diagnostics,
    admin_id: Option<UserId>,
}

impl CommandRouter {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        localizer: Arc<Localizer>,
        scripture: ScriptureFetcher,
        recitation: RecitationFetcher,
        broadcast: BroadcastEngine,
        diagnostics: Diagnostics,
        admin_id: Option<UserId>,
    ) -> Self {
        Self {
            messenger,
            localizer,
            scripture,
            recitation,
            broadcast,
            diagnostics,
            admin_id,
        }
    }

    pub fn admin_id(&self) -> Option<UserId> {
        self.admin_id
    }

    /// Run an already-allowed request. Unknown commands get no reply.
    pub async fn dispatch(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let is_admin = self.admin_id == Some(req.user_id);
        let Some(cmd) = Command::resolve(&req.command, is_admin) else {
            return Ok(());
        };
        info!(user_id = %req.user_id, command = %req.command, "dispatching command");

        match cmd {
            Command::Start => self.start(req, lang).await,
            Command::Language => self.language(req, lang).await,
            Command::Support => self.support(req, lang).await,
            Command::Surah => self.surah(req, lang).await,
            Command::Juz => self.juz(req, lang).await,
            Command::Recite(reciter) => self.recite(req, lang, reciter).await,
            Command::Status => self.status(req, lang).await,
            Command::Broadcast => self.run_broadcast(req, lang).await,
        }
    }

    async fn reply(&self, chat_id: ChatId, lang: Language, text: Text<'_>) -> Result<()> {
        self.messenger
            .send_html(chat_id, &render(lang, &text))
            .await
    }

    async fn start(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        match self.localizer.register(req.user_id).await {
            Ok(lang) => self.reply(req.chat_id, lang, Text::Welcome).await,
            Err(e) => {
                warn!(user_id = %req.user_id, error = %e, "could not register user");
                self.reply(req.chat_id, lang, Text::Welcome).await?;
                self.reply(req.chat_id, lang, Text::PreferenceNotSaved).await
            }
        }
    }

    async fn language(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        self.messenger
            .send_html_with_keyboard(
                req.chat_id,
                &render(lang, &Text::LanguagePrompt),
                language_keyboard(),
            )
            .await
    }

    async fn support(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let message = req.body();
        if message.is_empty() {
            return self.reply(req.chat_id, lang, Text::SupportUsage).await;
        }
        let Some(admin) = self.admin_id else {
            warn!(user_id = %req.user_id, "support message dropped: no admin configured");
            return self.reply(req.chat_id, lang, Text::FetchFailed).await;
        };

        let admin_lang = self.localizer.resolve(admin).await;
        let notice = render(
            admin_lang,
            &Text::SupportNotice {
                name: &req.display_name,
                user_id: req.user_id,
                message,
            },
        );
        match self.messenger.send_html(ChatId::from(admin), &notice).await {
            Ok(()) => self.reply(req.chat_id, lang, Text::SupportSent).await,
            Err(e) => {
                error!(user_id = %req.user_id, error = %e, "could not forward support message");
                self.reply(req.chat_id, lang, Text::FetchFailed).await
            }
        }
    }

    async fn surah(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let Some(number) = req.args.first().and_then(|a| SurahNumber::parse(a)) else {
            return self.reply(req.chat_id, lang, Text::SurahUsage).await;
        };
        match self.scripture.surah(lang, number).await {
            Ok(chunks) => self.send_chunks(req.chat_id, &chunks).await,
            Err(e) => {
                error!(surah = number.get(), error = %e, "surah fetch failed");
                self.reply(req.chat_id, lang, Text::FetchFailed).await
            }
        }
    }

    async fn juz(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let Some(number) = req.args.first().and_then(|a| JuzNumber::parse(a)) else {
            return self.reply(req.chat_id, lang, Text::JuzUsage).await;
        };
        match self.scripture.juz(lang, number).await {
            Ok(chunks) => self.send_chunks(req.chat_id, &chunks).await,
            Err(e) => {
                error!(juz = number.get(), error = %e, "juz fetch failed");
                self.reply(req.chat_id, lang, Text::FetchFailed).await
            }
        }
    }

    async fn send_chunks(&self, chat_id: ChatId, chunks: &[String]) -> Result<()> {
        for chunk in chunks {
            self.messenger.send_text(chat_id, chunk).await?;
        }
        Ok(())
    }

    async fn recite(&self, req: &CommandRequest, lang: Language, reciter: &Reciter) -> Result<()> {
        let Some(surah) = req.args.first().and_then(|a| SurahNumber::parse(a)) else {
            return self
                .reply(
                    req.chat_id,
                    lang,
                    Text::ReciterUsage {
                        command: reciter.key,
                        reciter: reciter.display_name,
                    },
                )
                .await;
        };

        match self.recitation.fetch(reciter, surah).await {
            Recitation::Available { url } => {
                self.reply(
                    req.chat_id,
                    lang,
                    Text::AudioLink {
                        url: &url,
                        reciter: reciter.display_name,
                        surah,
                    },
                )
                .await
            }
            Recitation::NotFound { url } => {
                self.reply(req.chat_id, lang, Text::AudioNotFound { url: &url })
                    .await
            }
        }
    }

    async fn status(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let report = self.diagnostics.status().await;
        let uptime = format_duration(report.uptime);
        let breakdown = report.breakdown();
        let view = StatusView {
            version: report.version,
            uptime: &uptime,
            users: report.total_users(),
            breakdown: &breakdown,
            channel: report.channel.as_deref(),
        };
        self.reply(req.chat_id, lang, Text::Status(view)).await
    }

    async fn run_broadcast(&self, req: &CommandRequest, lang: Language) -> Result<()> {
        let message = req.body();
        if message.is_empty() {
            return self.reply(req.chat_id, lang, Text::BroadcastUsage).await;
        }

        let recipients = match self.broadcast.recipients().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "broadcast aborted: registry unavailable");
                return self
                    .reply(req.chat_id, lang, Text::RegistryUnavailable)
                    .await;
            }
        };

        if let Err(e) = self
            .reply(
                req.chat_id,
                lang,
                Text::BroadcastStarted {
                    total: recipients.len(),
                },
            )
            .await
        {
            warn!(error = %e, "could not confirm broadcast start to admin");
        }

        let report = self.broadcast.deliver(&recipients, message).await;
        self.reply(
            req.chat_id,
            lang,
            Text::BroadcastReport {
                sent: report.sent,
                failed: report.failed,
                total: report.total,
            },
        )
        .await
    }
}

/// Two languages per row, each button carrying `set_lang_<code>`.
pub fn language_keyboard() -> InlineKeyboard {
    InlineKeyboard::grid(
        Language::ALL
            .iter()
            .map(|l| {
                InlineButton::callback(
                    l.native_name(),
                    format!("{LANG_CALLBACK_PREFIX}{}", l.code()),
                )
            })
            .collect(),
        2,
    )
}

/// `set_lang_en` → `Some(Language::En)`.
pub fn parse_language_callback(data: &str) -> Option<Language> {
    data.strip_prefix(LANG_CALLBACK_PREFIX)
        .and_then(Language::from_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::ButtonAction;

    fn req(text: &str) -> CommandRequest {
        CommandRequest::parse(ChatId(1), UserId(2), "Amina", text)
    }

    #[test]
    fn parses_command_and_args() {
        let r = req("  /SURAH   2  extra");
        assert_eq!(r.command, "/surah");
        assert_eq!(r.args, vec!["2".to_string(), "extra".to_string()]);
    }

    #[test]
    fn strips_bot_mention_from_command() {
        assert_eq!(req("/juz@QuranBot 15").command, "/juz");
    }

    #[test]
    fn body_keeps_casing_and_line_breaks() {
        let r = req("/broadcast Ramadan Mubarak!\nSecond line");
        assert_eq!(r.body(), "Ramadan Mubarak!\nSecond line");
        assert_eq!(req("/support").body(), "");
        assert_eq!(req("/support   ").body(), "");
    }

    #[test]
    fn resolves_known_commands_and_reciters() {
        assert_eq!(Command::resolve("/start", false), Some(Command::Start));
        assert_eq!(Command::resolve("/juz", false), Some(Command::Juz));
        assert!(matches!(
            Command::resolve("/yasser", false),
            Some(Command::Recite(r)) if r.key == "yasser"
        ));
        assert_eq!(Command::resolve("/unknownreciter", false), None);
        assert_eq!(Command::resolve("start", false), None);
        assert_eq!(Command::resolve("", false), None);
    }

    #[test]
    fn admin_commands_hidden_from_everyone_else() {
        assert_eq!(Command::resolve("/status", false), None);
        assert_eq!(Command::resolve("/broadcast", false), None);
        assert_eq!(Command::resolve("/status", true), Some(Command::Status));
        assert_eq!(Command::resolve("/broadcast", true), Some(Command::Broadcast));
    }

    #[test]
    fn language_keyboard_is_two_by_two() {
        let kb = language_keyboard();
        assert_eq!(kb.rows.len(), 2);
        let data: Vec<_> = kb
            .buttons()
            .map(|b| match &b.action {
                ButtonAction::Callback(d) => d.clone(),
                ButtonAction::Url(u) => u.clone(),
            })
            .collect();
        assert_eq!(data, vec!["set_lang_am", "set_lang_en", "set_lang_ar", "set_lang_tr"]);
    }

    #[test]
    fn language_callback_parsing() {
        assert_eq!(parse_language_callback("set_lang_tr"), Some(Language::Tr));
        assert_eq!(parse_language_callback("set_lang_xx"), None);
        assert_eq!(parse_language_callback("other"), None);
    }
}
