use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use qtb_core::{config::Config, service::BotService, update::classify_bytes};

/// Header Telegram uses to echo the `secret_token` given to `setWebhook`.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BotService>,
    pub webhook_secret: Option<Arc<str>>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).post(webhook))
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Register the webhook (if configured) and serve until `shutdown` fires.
pub async fn run_webhook(
    cfg: Arc<Config>,
    bot: Bot,
    service: Arc<BotService>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "qtb started"),
        Err(e) => warn!(error = %e, "getMe failed; continuing"),
    }

    if let Some(url) = &cfg.webhook_url {
        let url = reqwest::Url::parse(url)?;
        let mut req = bot.set_webhook(url.clone());
        if let Some(secret) = &cfg.webhook_secret {
            req = req.secret_token(secret.clone());
        }
        req.await?;
        info!(%url, "webhook registered");
    }

    let state = AppState {
        service,
        webhook_secret: cfg.webhook_secret.as_deref().map(Arc::from),
    };

    let listener = TcpListener::bind(cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "listening for updates");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("webhook server stopped");
    Ok(())
}

async fn root() -> &'static str {
    "Quran bot is running."
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Acknowledge immediately; the update is handled on its own task.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(secret) = &state.webhook_secret {
        let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(secret.as_ref()) {
            warn!("rejected webhook call with missing or wrong secret");
            return (StatusCode::UNAUTHORIZED, "unauthorized");
        }
    }

    let inbound = classify_bytes(&body);
    tokio::spawn(state.service.clone().process(inbound));
    (StatusCode::OK, "ok")
}
