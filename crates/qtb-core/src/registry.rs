//! The durable user registry: one JSON document mapping stringified user ids
//! to their language preference.
//!
//! The document is always fetched and rewritten in full; see
//! [`crate::localization`] for the read-modify-write path.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{Language, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub preferred_language: Language,
}

/// Stored shape: `{"users": {"<id>": {"id": <id>, "preferred_language": "en"}}}`.
///
/// Keys are unique by construction (map keyed by the stringified id). A
/// `BTreeMap` keeps iteration order deterministic for broadcasts. Unknown
/// top-level fields are carried through a rewrite untouched. Records that
/// don't parse are skipped, so the next rewrite drops them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default, deserialize_with = "lenient_users")]
    users: BTreeMap<String, UserRecord>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: UserId) -> Option<&UserRecord> {
        self.users.get(&key(user_id))
    }

    /// Absent users resolve to the default language.
    pub fn language_of(&self, user_id: UserId) -> Language {
        self.get(user_id)
            .map(|r| r.preferred_language)
            .unwrap_or_default()
    }

    /// Insert or overwrite the user's record. Returns `true` if the document changed.
    pub fn upsert(&mut self, user_id: UserId, language: Language) -> bool {
        let record = UserRecord {
            id: user_id,
            preferred_language: language,
        };
        self.users.insert(key(user_id), record) != Some(record)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Registered user ids in stable (key) order.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.users.values().map(|r| r.id).collect()
    }

    pub fn language_counts(&self) -> BTreeMap<Language, usize> {
        let mut out = BTreeMap::new();
        for r in self.users.values() {
            *out.entry(r.preferred_language).or_insert(0) += 1;
        }
        out
    }
}

fn key(user_id: UserId) -> String {
    user_id.0.to_string()
}

fn lenient_users<'de, D>(de: D) -> Result<BTreeMap<String, UserRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(de)?.unwrap_or_default();
    let mut users = BTreeMap::new();
    for (k, v) in raw {
        match UserRecord::deserialize(v) {
            Ok(record) => {
                users.insert(k, record);
            }
            Err(e) => warn!(key = %k, error = %e, "skipping malformed registry record"),
        }
    }
    Ok(users)
}
