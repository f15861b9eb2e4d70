use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, Result};

pub const DEFAULT_JSONBIN_BASE_URL: &str = "https://api.jsonbin.io/v3";
pub const DEFAULT_QURAN_API_BASE_URL: &str = "https://api.alquran.cloud/v1";
pub const DEFAULT_AUDIO_BASE_URL: &str = "https://download.quranicaudio.com/quran";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub admin_id: Option<UserId>,
    pub channel_id: Option<String>,
    pub channel_invite_url: Option<String>,
    pub telegram_message_limit: usize,

    // Registry document store
    pub jsonbin_api_key: String,
    pub jsonbin_bin_id: String,
    pub jsonbin_base_url: String,

    // Content providers
    pub quran_api_base_url: String,
    pub audio_base_url: String,

    // Timeouts
    pub http_timeout: Duration,
    pub probe_timeout: Duration,
    pub membership_timeout: Duration,

    // Broadcast
    pub broadcast_interval: Duration,

    // Webhook transport
    pub bind_addr: SocketAddr,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub alert_admin_on_error: bool,
}

impl Config {
    /// Load from the process environment (after `.env`, if present).
    pub fn load() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Used by tests to avoid touching the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env { lookup: &lookup };

        let telegram_bot_token = env
            .non_empty("TELEGRAM_TOKEN")
            .or_else(|| env.non_empty("TELEGRAM_BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_TOKEN environment variable is required".to_string())
            })?;

        let admin_id = match env.non_empty("ADMIN_ID") {
            Some(raw) => Some(UserId(raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("ADMIN_ID must be a numeric user id, got {raw:?}"))
            })?)),
            None => None,
        };

        let channel_id = env.non_empty("CHANNEL_ID").map(|s| s.trim().to_string());
        let channel_invite_url = env
            .non_empty("CHANNEL_INVITE_URL")
            .or_else(|| channel_id.as_deref().and_then(invite_url_for));
        let telegram_message_limit = env.usize("TELEGRAM_MESSAGE_LIMIT").unwrap_or(4096).max(1);

        let jsonbin_api_key = env.required("JSONBIN_API_KEY")?;
        let jsonbin_bin_id = env.required("JSONBIN_BIN_ID")?;
        let jsonbin_base_url = env
            .non_empty("JSONBIN_BASE_URL")
            .unwrap_or_else(|| DEFAULT_JSONBIN_BASE_URL.to_string());

        let quran_api_base_url = env
            .non_empty("QURAN_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_QURAN_API_BASE_URL.to_string());
        let audio_base_url = env
            .non_empty("AUDIO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_AUDIO_BASE_URL.to_string());

        let http_timeout = Duration::from_millis(env.u64("HTTP_TIMEOUT_MS").unwrap_or(10_000));
        let probe_timeout =
            Duration::from_millis(env.u64("AUDIO_PROBE_TIMEOUT_MS").unwrap_or(15_000));
        let membership_timeout =
            Duration::from_millis(env.u64("MEMBERSHIP_TIMEOUT_MS").unwrap_or(5_000));
        let broadcast_interval =
            Duration::from_millis(env.u64("BROADCAST_INTERVAL_MS").unwrap_or(50));

        let bind_addr = match env.non_empty("BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| Error::Config(format!("BIND_ADDR {raw:?} is invalid: {e}")))?,
            None => {
                let port = env.u64("PORT").and_then(|p| u16::try_from(p).ok());
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port.unwrap_or(8080)))
            }
        };

        let webhook_url = env.non_empty("WEBHOOK_URL");
        if let Some(url) = &webhook_url {
            if !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "WEBHOOK_URL must be an https:// URL, got {url:?}"
                )));
            }
        }
        let webhook_secret = env.non_empty("WEBHOOK_SECRET");
        let alert_admin_on_error = env.bool("ALERT_ADMIN_ON_ERROR").unwrap_or(true);

        Ok(Self {
            telegram_bot_token,
            admin_id,
            channel_id,
            channel_invite_url,
            telegram_message_limit,
            jsonbin_api_key,
            jsonbin_bin_id,
            jsonbin_base_url,
            quran_api_base_url,
            audio_base_url,
            http_timeout,
            probe_timeout,
            membership_timeout,
            broadcast_interval,
            bind_addr,
            webhook_url,
            webhook_secret,
            alert_admin_on_error,
        })
    }

    /// Build from a fixed set of pairs (tests, `qtb check`).
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(|k| map.get(k).cloned())
    }
}

/// Load `.env` into the process environment without overriding existing vars.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// `@channel` → `https://t.me/channel`. Numeric ids have no public link.
fn invite_url_for(channel: &str) -> Option<String> {
    let name = channel.trim().strip_prefix('@')?;
    if name.is_empty() {
        return None;
    }
    Some(format!("https://t.me/{name}"))
}

struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn non_empty(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|s| !s.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.non_empty(key)
            .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.non_empty(key).map(|s| {
            matches!(
                s.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn u64(&self, key: &str) -> Option<u64> {
        self.non_empty(key)
            .and_then(|s| s.trim().parse::<u64>().ok())
    }

    fn usize(&self, key: &str) -> Option<usize> {
        self.non_empty(key)
            .and_then(|s| s.trim().parse::<usize>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &[(&str, &str)] = &[
        ("TELEGRAM_TOKEN", "123:abc"),
        ("JSONBIN_API_KEY", "key"),
        ("JSONBIN_BIN_ID", "bin"),
    ];

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut v = BASE.to_vec();
        v.extend_from_slice(extra);
        v
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = Config::from_pairs(BASE).unwrap();
        assert_eq!(cfg.admin_id, None);
        assert_eq!(cfg.channel_id, None);
        assert_eq!(cfg.telegram_message_limit, 4096);
        assert_eq!(cfg.quran_api_base_url, DEFAULT_QURAN_API_BASE_URL);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert!(cfg.alert_admin_on_error);
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = Config::from_pairs(&[("JSONBIN_API_KEY", "k"), ("JSONBIN_BIN_ID", "b")])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn bad_admin_id_is_rejected() {
        let err = Config::from_pairs(&with(&[("ADMIN_ID", "not-a-number")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let cfg = Config::from_pairs(&with(&[("ADMIN_ID", " 42 ")])).unwrap();
        assert_eq!(cfg.admin_id, Some(UserId(42)));
    }

    #[test]
    fn invite_url_is_derived_from_channel_username() {
        let cfg = Config::from_pairs(&with(&[("CHANNEL_ID", "@QuranChannel")])).unwrap();
        assert_eq!(
            cfg.channel_invite_url.as_deref(),
            Some("https://t.me/QuranChannel")
        );

        let cfg = Config::from_pairs(&with(&[("CHANNEL_ID", "-1001234")])).unwrap();
        assert_eq!(cfg.channel_invite_url, None);
    }

    #[test]
    fn port_and_webhook_url_are_validated() {
        let cfg = Config::from_pairs(&with(&[("PORT", "3000")])).unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);

        let err = Config::from_pairs(&with(&[("WEBHOOK_URL", "http://example.com")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
