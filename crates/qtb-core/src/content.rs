//! Content fetchers: surah/juz text and recitation links.
//!
//! Upstream calls go through [`ScriptureSource`] and [`AudioProbe`]; this
//! module owns rendering, chunking and URL assembly.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::{JuzNumber, Language, SurahNumber},
    errors::Error,
    formatting::split_message,
    i18n::{render, Text},
    ports::{AudioProbe, ProbeOutcome, ScriptureSource, TextUnit},
    Result,
};

/// A reciter the bot can link audio for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reciter {
    /// Command name without the leading `/`.
    pub key: &'static str,
    pub display_name: &'static str,
    /// Directory name on the audio host.
    pub identifier: &'static str,
}

pub const RECITERS: &[Reciter] = &[
    Reciter {
        key: "abdulbasit",
        display_name: "Abdul Basit Abdus Samad",
        identifier: "abdul_basit_murattal",
    },
    Reciter {
        key: "yasser",
        display_name: "Yasser Al-Dosari",
        identifier: "yasser_ad-dussary",
    },
];

pub fn find_reciter(key: &str) -> Option<&'static Reciter> {
    RECITERS.iter().find(|r| r.key == key)
}

pub struct ScriptureFetcher {
    source: Arc<dyn ScriptureSource>,
    max_message_len: usize,
}

impl ScriptureFetcher {
    pub fn new(source: Arc<dyn ScriptureSource>, max_message_len: usize) -> Self {
        Self {
            source,
            max_message_len,
        }
    }

    /// Rendered surah, split into sendable chunks.
    pub async fn surah(&self, lang: Language, number: SurahNumber) -> Result<Vec<String>> {
        let unit = non_empty(self.source.surah(number).await?)?;
        info!(surah = number.get(), verses = unit.verses.len(), "surah fetched");
        Ok(split_message(
            &render_surah(lang, number, &unit),
            self.max_message_len,
        ))
    }

    pub async fn juz(&self, lang: Language, number: JuzNumber) -> Result<Vec<String>> {
        let unit = non_empty(self.source.juz(number).await?)?;
        info!(juz = number.get(), verses = unit.verses.len(), "juz fetched");
        Ok(split_message(
            &render_juz(lang, number, &unit),
            self.max_message_len,
        ))
    }
}

fn non_empty(unit: TextUnit) -> Result<TextUnit> {
    if unit.verses.is_empty() {
        return Err(Error::Upstream(format!(
            "unit {} came back without verses",
            unit.number
        )));
    }
    Ok(unit)
}

pub fn render_surah(lang: Language, number: SurahNumber, unit: &TextUnit) -> String {
    let name = unit.display_name.as_deref().unwrap_or_default();
    let mut out = render(lang, &Text::SurahHeader { number, name });
    out.push_str("\n\n");
    for v in &unit.verses {
        out.push_str(&format!("{}. {}\n", v.index, v.text));
    }
    out
}

/// Juz text with a separator line whenever the containing surah changes.
pub fn render_juz(lang: Language, number: JuzNumber, unit: &TextUnit) -> String {
    let mut out = render(lang, &Text::JuzHeader { number });
    out.push_str("\n\n");
    let mut current: Option<&str> = None;
    for v in &unit.verses {
        if let Some(name) = v.surah_name.as_deref() {
            if current != Some(name) {
                current = Some(name);
                out.push_str(&format!("\n--- {name} ---\n"));
            }
        }
        out.push_str(&format!("{}. {}\n", v.index, v.text));
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recitation {
    Available { url: String },
    NotFound { url: String },
}

pub struct RecitationFetcher {
    probe: Arc<dyn AudioProbe>,
    audio_base_url: String,
}

impl RecitationFetcher {
    pub fn new(probe: Arc<dyn AudioProbe>, audio_base_url: impl Into<String>) -> Self {
        Self {
            probe,
            audio_base_url: audio_base_url.into(),
        }
    }

    /// `{base}/{identifier}/{NNN}.mp3`
    pub fn audio_url(&self, reciter: &Reciter, surah: SurahNumber) -> String {
        format!(
            "{}/{}/{}.mp3",
            self.audio_base_url.trim_end_matches('/'),
            reciter.identifier,
            surah.padded()
        )
    }

    /// Probe the asset before advertising it. Anything but a confirmed hit
    /// is reported as not found, with the URL that was tried.
    pub async fn fetch(&self, reciter: &Reciter, surah: SurahNumber) -> Recitation {
        let url = self.audio_url(reciter, surah);
        match self.probe.probe(&url).await {
            Ok(ProbeOutcome::Found) => Recitation::Available { url },
            Ok(ProbeOutcome::Missing { status }) => {
                warn!(reciter = reciter.key, %url, status, "audio asset missing");
                Recitation::NotFound { url }
            }
            Err(e) => {
                warn!(reciter = reciter.key, %url, error = %e, "audio probe failed");
                Recitation::NotFound { url }
            }
        }
    }
}
