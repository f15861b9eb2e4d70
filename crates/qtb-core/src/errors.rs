/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can decide, per category, whether to recover locally or surface the
/// failure at the dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// The registry document could not be read or written.
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// A conditional registry write lost against a concurrent writer.
    #[error("registry write conflict")]
    RegistryConflict,

    /// Text/audio content provider failure (timeout, status, payload shape).
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn is_registry(&self) -> bool {
        matches!(self, Error::RegistryUnavailable(_) | Error::RegistryConflict)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
