//! Ports (traits) for everything outside the core: the membership query,
//! the text/audio content providers and the registry document store.
//!
//! The messaging port lives in [`crate::messaging::port`].

use async_trait::async_trait;

use crate::{
    domain::{JuzNumber, SurahNumber, UserId},
    registry::Registry,
    Result,
};

/// A user's status in the gating channel, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipStatus {
    Owner,
    Moderator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MembershipStatus {
    pub fn grants_access(self) -> bool {
        matches!(
            self,
            MembershipStatus::Owner | MembershipStatus::Moderator | MembershipStatus::Member
        )
    }
}

#[async_trait]
pub trait MembershipPort: Send + Sync {
    async fn membership(&self, channel: &str, user_id: UserId) -> Result<MembershipStatus>;
}

/// One surah or juz as returned by the text provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextUnit {
    pub number: u16,
    pub display_name: Option<String>,
    pub verses: Vec<Verse>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verse {
    /// Verse number within its surah.
    pub index: u32,
    pub text: String,
    /// Name of the surah this verse belongs to (juz payloads span several).
    pub surah_name: Option<String>,
}

#[async_trait]
pub trait ScriptureSource: Send + Sync {
    async fn surah(&self, number: SurahNumber) -> Result<TextUnit>;
    async fn juz(&self, number: JuzNumber) -> Result<TextUnit>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found,
    Missing { status: u16 },
}

/// Lightweight existence check against an asset URL.
#[async_trait]
pub trait AudioProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ProbeOutcome>;
}

/// Whole-document registry storage.
///
/// `get` failures surface as `Error::RegistryUnavailable`. Stores that can do
/// conditional writes return `Error::RegistryConflict` from `put` when the
/// document changed since it was last read; stores that cannot simply
/// overwrite (last writer wins).
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn get(&self) -> Result<Registry>;
    async fn put(&self, registry: &Registry) -> Result<()>;
}
