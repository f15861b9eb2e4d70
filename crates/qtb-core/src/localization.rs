//! Per-user language resolution and persistence on top of the registry.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::{Language, UserId},
    errors::Error,
    ports::RegistryStore,
    Result,
};

/// Resolves and persists a user's language against the registry store.
///
/// Writes are whole-document read-modify-write cycles. With a store that
/// cannot do conditional writes a concurrent writer may overwrite this
/// change (last writer wins); with one that can, a conflict is retried once.
pub struct Localizer {
    store: Arc<dyn RegistryStore>,
}

impl Localizer {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// The stored language, `None` when the user has no record.
    pub async fn lookup(&self, user_id: UserId) -> Result<Option<Language>> {
        let reg = self.store.get().await?;
        Ok(reg.get(user_id).map(|r| r.preferred_language))
    }

    /// Language to talk to `user_id` in. Registry failures fall back to the
    /// default language.
    pub async fn resolve(&self, user_id: UserId) -> Language {
        match self.lookup(user_id).await {
            Ok(lang) => lang.unwrap_or_default(),
            Err(e) => {
                warn!(%user_id, error = %e, "registry read failed; using default language");
                Language::default()
            }
        }
    }

    /// Store `language` as the user's preference.
    pub async fn persist(&self, user_id: UserId, language: Language) -> Result<()> {
        self.update(user_id, |_| Some(language)).await?;
        info!(%user_id, %language, "language preference saved");
        Ok(())
    }

    /// Make sure the user has a record, creating one with the default
    /// language if absent. Returns the user's effective language.
    pub async fn register(&self, user_id: UserId) -> Result<Language> {
        self.update(user_id, |current| match current {
            Some(_) => None,
            None => Some(Language::default()),
        })
        .await
    }

    async fn update<F>(&self, user_id: UserId, decide: F) -> Result<Language>
    where
        F: Fn(Option<Language>) -> Option<Language> + Send + Sync,
    {
        match self.update_once(user_id, &decide).await {
            Err(Error::RegistryConflict) => {
                warn!(%user_id, "registry write conflict; retrying once");
                self.update_once(user_id, &decide).await
            }
            other => other,
        }
    }

    async fn update_once<F>(&self, user_id: UserId, decide: &F) -> Result<Language>
    where
        F: Fn(Option<Language>) -> Option<Language> + Send + Sync,
    {
        let mut reg = self.store.get().await?;
        let current = reg.get(user_id).map(|r| r.preferred_language);
        let Some(next) = decide(current) else {
            return Ok(current.unwrap_or_default());
        };
        if reg.upsert(user_id, next) {
            self.store.put(&reg).await?;
        }
        Ok(next)
    }
}
