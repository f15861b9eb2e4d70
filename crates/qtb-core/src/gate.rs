//! Access gate: channel membership check with an admin bypass.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{domain::UserId, ports::MembershipPort};

/// Decides whether a user may run normal commands.
///
/// Policy, in order:
/// 1. the configured admin is always allowed;
/// 2. with no gating channel configured everyone is allowed;
/// 3. otherwise the user must be owner, moderator or member of the channel.
///
/// Any membership query failure (error or timeout) denies. The gate never
/// sends messages; the caller presents the join affordance.
pub struct AccessGate {
    admin_id: Option<UserId>,
    channel: Option<String>,
    membership: Arc<dyn MembershipPort>,
    timeout: Duration,
}

impl AccessGate {
    pub fn new(
        admin_id: Option<UserId>,
        channel: Option<String>,
        membership: Arc<dyn MembershipPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            admin_id,
            channel: channel.filter(|c| !c.trim().is_empty()),
            membership,
            timeout,
        }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == Some(user_id)
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub async fn allow(&self, user_id: UserId) -> bool {
        if self.is_admin(user_id) {
            return true;
        }
        let Some(channel) = self.channel.as_deref() else {
            return true;
        };

        match tokio::time::timeout(self.timeout, self.membership.membership(channel, user_id)).await
        {
            Ok(Ok(status)) => {
                debug!(%user_id, ?status, "membership checked");
                status.grants_access()
            }
            Ok(Err(e)) => {
                warn!(%user_id, channel, error = %e, "membership check failed; denying");
                false
            }
            Err(_) => {
                warn!(%user_id, channel, timeout_ms = self.timeout.as_millis() as u64, "membership check timed out; denying");
                false
            }
        }
    }
}
