//! Per-update orchestration: classify, localize, gate, route.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    admin::{BroadcastEngine, Diagnostics},
    commands::{parse_language_callback, CommandRequest, CommandRouter},
    config::Config,
    content::{RecitationFetcher, ScriptureFetcher},
    domain::ChatId,
    formatting::truncate_chars,
    gate::AccessGate,
    i18n::{render, Text},
    localization::Localizer,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    ports::{AudioProbe, MembershipPort, RegistryStore, ScriptureSource},
    update::{classify, CallbackEvent, Inbound, MessageEvent},
    Result,
};

const ALERT_DETAIL_MAX_CHARS: usize = 200;

/// Concrete implementations of every port the service needs.
pub struct Adapters {
    pub messenger: Arc<dyn MessagingPort>,
    pub membership: Arc<dyn MembershipPort>,
    pub scripture: Arc<dyn ScriptureSource>,
    pub audio_probe: Arc<dyn AudioProbe>,
    pub registry: Arc<dyn RegistryStore>,
}

pub struct BotService {
    messenger: Arc<dyn MessagingPort>,
    gate: AccessGate,
    localizer: Arc<Localizer>,
    router: CommandRouter,
    invite_url: Option<String>,
    alert_admin_on_error: bool,
}

impl BotService {
    pub fn new(cfg: &Config, adapters: Adapters) -> Self {
        let Adapters {
            messenger,
            membership,
            scripture,
            audio_probe,
            registry,
        } = adapters;

        let max_len = cfg
            .telegram_message_limit
            .min(messenger.capabilities().max_message_len);
        let localizer = Arc::new(Localizer::new(registry.clone()));
        let gate = AccessGate::new(
            cfg.admin_id,
            cfg.channel_id.clone(),
            membership,
            cfg.membership_timeout,
        );
        let router = CommandRouter::new(
            messenger.clone(),
            localizer.clone(),
            ScriptureFetcher::new(scripture, max_len),
            RecitationFetcher::new(audio_probe, cfg.audio_base_url.clone()),
            BroadcastEngine::new(registry.clone(), messenger.clone(), cfg.broadcast_interval),
            Diagnostics::new(registry, gate.channel().map(str::to_string)),
            cfg.admin_id,
        );

        Self {
            messenger,
            gate,
            localizer,
            router,
            invite_url: cfg.channel_invite_url.clone(),
            alert_admin_on_error: cfg.alert_admin_on_error,
        }
    }

    pub async fn handle_update(&self, raw: &serde_json::Value) -> Result<()> {
        self.handle(classify(raw)).await
    }

    pub async fn handle(&self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::Callback(ev) => self.on_callback(ev).await,
            Inbound::CallbackAck(id) => {
                self.answer_callback(&id).await;
                Ok(())
            }
            Inbound::Message(ev) => self.on_message(ev).await,
            Inbound::Ignored => {
                debug!("ignoring update without text or callback");
                Ok(())
            }
        }
    }

    /// Handle one update as an isolated task. Errors and panics stop here:
    /// they are logged and, if enabled, reported to the admin.
    pub async fn process(self: Arc<Self>, inbound: Inbound) {
        let svc = self.clone();
        let outcome = tokio::spawn(async move { svc.handle(inbound).await }).await;

        let detail = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                error!(error = %e, "update handling failed");
                e.to_string()
            }
            Err(join) if join.is_panic() => {
                let payload = join.into_panic();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(panic = %message, "update handler panicked");
                format!("panic: {message}")
            }
            Err(join) => {
                warn!(error = %join, "update handler cancelled");
                return;
            }
        };
        self.alert_admin(&detail).await;
    }

    pub async fn alert_admin(&self, detail: &str) {
        if !self.alert_admin_on_error {
            return;
        }
        let Some(admin) = self.router.admin_id() else {
            return;
        };
        let lang = self.localizer.resolve(admin).await;
        let detail = truncate_chars(detail, ALERT_DETAIL_MAX_CHARS);
        let text = render(lang, &Text::AdminAlert { detail: &detail });
        if let Err(e) = self.messenger.send_html(ChatId::from(admin), &text).await {
            warn!(error = %e, "could not alert admin");
        }
    }

    async fn answer_callback(&self, id: &str) {
        if let Err(e) = self.messenger.answer_callback_query(id).await {
            debug!(error = %e, "answerCallbackQuery failed");
        }
    }

    async fn on_callback(&self, ev: CallbackEvent) -> Result<()> {
        if let Some(id) = &ev.callback_id {
            self.answer_callback(id).await;
        }

        let Some(lang) = parse_language_callback(&ev.data) else {
            debug!(data = %ev.data, "ignoring unknown callback payload");
            return Ok(());
        };

        match self.localizer.persist(ev.user_id, lang).await {
            Ok(()) => {
                self.messenger
                    .send_html(ev.chat_id, &render(lang, &Text::LanguageSelected))
                    .await
            }
            Err(e) => {
                warn!(user_id = %ev.user_id, error = %e, "could not save language preference");
                self.messenger
                    .send_html(ev.chat_id, &render(lang, &Text::PreferenceNotSaved))
                    .await
            }
        }
    }

    async fn on_message(&self, ev: MessageEvent) -> Result<()> {
        let req = CommandRequest::from_message(&ev);
        let lang = self.localizer.resolve(ev.user_id).await;

        if !self.gate.allow(ev.user_id).await {
            debug!(user_id = %ev.user_id, "membership required");
            let text = render(lang, &Text::ForceJoin);
            return match &self.invite_url {
                Some(url) => {
                    let keyboard = InlineKeyboard::new(vec![vec![InlineButton::url(
                        render(lang, &Text::JoinButton),
                        url.clone(),
                    )]]);
                    self.messenger
                        .send_html_with_keyboard(ev.chat_id, &text, keyboard)
                        .await
                }
                None => self.messenger.send_html(ev.chat_id, &text).await,
            };
        }

        self.router.dispatch(&req, lang).await
    }
}
