use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use qtb_core::{
    config::{load_dotenv, Config},
    domain::SurahNumber,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    ports::{RegistryStore, ScriptureSource},
    service::{Adapters, BotService},
};
use qtb_jsonbin::JsonBinStore;
use qtb_quran::{AlQuranClient, HttpAudioProbe};
use qtb_telegram::{router::run_webhook, TelegramMessenger};

#[derive(Debug, Parser)]
#[command(name = "qtb", version, about = "Quran Telegram bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Cmd {
    /// Serve the Telegram webhook (default)
    Serve,
    /// Verify the Telegram token, the registry bin and the text API, then exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    load_dotenv();
    qtb_core::logging::init("qtb")?;

    let cfg = Arc::new(Config::load()?);
    match cli.command.unwrap_or(Cmd::Serve) {
        Cmd::Serve => serve(cfg).await,
        Cmd::Check => check(&cfg).await,
    }
}

async fn serve(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let telegram = Arc::new(TelegramMessenger::new(bot.clone()));

    // Throttle outbound sends; the adapter itself still retries a 429 once.
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        telegram.clone(),
        ThrottleConfig::default(),
    ));

    let service = Arc::new(BotService::new(
        &cfg,
        Adapters {
            messenger,
            membership: telegram,
            scripture: Arc::new(AlQuranClient::from_config(&cfg)?),
            audio_probe: Arc::new(HttpAudioProbe::from_config(&cfg)?),
            registry: Arc::new(JsonBinStore::from_config(&cfg)?),
        },
    ));

    if cfg.admin_id.is_none() {
        warn!("ADMIN_ID not set; /status, /broadcast and support forwarding are disabled");
    }
    match &cfg.channel_id {
        Some(channel) => info!(%channel, "channel membership required"),
        None => info!("no CHANNEL_ID; bot is open to everyone"),
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "could not listen for ctrl-c"),
            }
        });
    }

    run_webhook(cfg, bot, service, shutdown).await
}

async fn check(cfg: &Config) -> anyhow::Result<()> {
    let mut failed = 0usize;

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    match bot.get_me().await {
        Ok(me) => println!("✅ Telegram: @{}", me.username()),
        Err(e) => {
            failed += 1;
            println!("❌ Telegram: {e}");
        }
    }

    match JsonBinStore::from_config(cfg)?.get().await {
        Ok(registry) => println!("✅ Registry: {} users", registry.len()),
        Err(e) => {
            failed += 1;
            println!("❌ Registry: {e}");
        }
    }

    let al_fatiha = SurahNumber::new(1).context("surah 1 is always valid")?;
    match AlQuranClient::from_config(cfg)?.surah(al_fatiha).await {
        Ok(unit) => println!(
            "✅ Quran API: surah 1 has {} verses",
            unit.verses.len()
        ),
        Err(e) => {
            failed += 1;
            println!("❌ Quran API: {e}");
        }
    }

    println!(
        "ℹ️ Admin: {}  Channel: {}  Webhook: {}",
        cfg.admin_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "not set".to_string()),
        cfg.channel_id.as_deref().unwrap_or("not set"),
        cfg.webhook_url.as_deref().unwrap_or("not set"),
    );

    if failed > 0 {
        anyhow::bail!("{failed} check(s) failed");
    }
    println!("All checks passed.");
    Ok(())
}
