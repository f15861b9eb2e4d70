//! Admin-only operations: broadcast fan-out and status diagnostics.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    domain::{ChatId, Language, UserId},
    messaging::port::MessagingPort,
    ports::RegistryStore,
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
}

/// Sequential, rate-limited fan-out to every registered user.
///
/// One pass, one send at a time, a fixed pause between sends. A failed
/// delivery is counted and skipped; it never stops the loop.
pub struct BroadcastEngine {
    registry: Arc<dyn RegistryStore>,
    messenger: Arc<dyn MessagingPort>,
    interval: Duration,
}

impl BroadcastEngine {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        messenger: Arc<dyn MessagingPort>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            messenger,
            interval,
        }
    }

    /// Snapshot of recipients, read from the registry once per broadcast.
    pub async fn recipients(&self) -> Result<Vec<UserId>> {
        Ok(self.registry.get().await?.user_ids())
    }

    pub async fn broadcast(&self, message: &str) -> Result<BroadcastReport> {
        let recipients = self.recipients().await?;
        Ok(self.deliver(&recipients, message).await)
    }

    pub async fn deliver(&self, recipients: &[UserId], message: &str) -> BroadcastReport {
        let mut report = BroadcastReport {
            total: recipients.len(),
            ..Default::default()
        };

        for (i, user_id) in recipients.iter().enumerate() {
            if i > 0 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
            match self.messenger.send_text(ChatId::from(*user_id), message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(%user_id, error = %e, "broadcast delivery failed");
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            total = report.total,
            "broadcast finished"
        );
        report
    }
}

#[derive(Clone, Debug)]
pub struct StatusReport {
    pub version: &'static str,
    pub uptime: Duration,
    /// Per-language user counts; `None` when the registry is unreachable.
    pub users: Option<BTreeMap<Language, usize>>,
    pub channel: Option<String>,
}

impl StatusReport {
    pub fn total_users(&self) -> Option<usize> {
        self.users.as_ref().map(|m| m.values().sum())
    }

    /// `am 3 · en 1`
    pub fn breakdown(&self) -> String {
        self.users
            .as_ref()
            .map(|m| {
                m.iter()
                    .map(|(lang, n)| format!("{lang} {n}"))
                    .collect::<Vec<_>>()
                    .join(" · ")
            })
            .unwrap_or_default()
    }
}

pub struct Diagnostics {
    registry: Arc<dyn RegistryStore>,
    channel: Option<String>,
    started_at: DateTime<Utc>,
}

impl Diagnostics {
    pub fn new(registry: Arc<dyn RegistryStore>, channel: Option<String>) -> Self {
        Self {
            registry,
            channel,
            started_at: Utc::now(),
        }
    }

    pub async fn status(&self) -> StatusReport {
        let users = match self.registry.get().await {
            Ok(reg) => Some(reg.language_counts()),
            Err(e) => {
                warn!(error = %e, "status: registry unreachable");
                None
            }
        };
        let uptime = Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default();

        StatusReport {
            version: env!("CARGO_PKG_VERSION"),
            uptime,
            users,
            channel: self.channel.clone(),
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let seconds = d.as_secs();
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if days > 0 {
        return format!("{days}d {hours}h {mins}m");
    }
    if hours > 0 {
        return format!("{hours}h {mins}m {secs}s");
    }
    if mins > 0 {
        return format!("{mins}m {secs}s");
    }
    format!("{secs}s")
}
