//! Content provider adapters: verse text from the alquran.cloud API and the
//! existence probe for recitation audio files.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use tracing::debug;

use qtb_core::{
    config::Config,
    domain::{JuzNumber, SurahNumber},
    errors::Error,
    ports::{AudioProbe, ProbeOutcome, ScriptureSource, TextUnit, Verse},
    Result,
};

/// Some audio hosts refuse requests without a browser-like agent.
const PROBE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: u16,
    #[serde(default)]
    status: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahPayload {
    number: u16,
    english_name: Option<String>,
    #[serde(default)]
    ayahs: Vec<SurahAyah>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahAyah {
    number_in_surah: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
struct JuzPayload {
    number: u16,
    #[serde(default)]
    ayahs: Vec<JuzAyah>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JuzAyah {
    number_in_surah: u32,
    text: String,
    surah: Option<SurahRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahRef {
    english_name: Option<String>,
    name: Option<String>,
}

impl SurahRef {
    fn display(self) -> Option<String> {
        self.english_name.or(self.name)
    }
}

#[derive(Clone, Debug)]
pub struct AlQuranClient {
    http: reqwest::Client,
    base_url: String,
}

impl AlQuranClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("quran http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.quran_api_base_url.clone(), cfg.http_timeout)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, resource: &str) -> Result<T> {
        let url = format!("{}/{resource}", self.base_url);
        debug!(%url, "fetching scripture");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("quran api request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("quran api {resource}: {status}")));
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("quran api json error: {e}")))?;

        if envelope.code != 200 {
            return Err(Error::Upstream(format!(
                "quran api {resource}: code {} {}",
                envelope.code, envelope.status
            )));
        }
        envelope
            .data
            .ok_or_else(|| Error::Upstream(format!("quran api {resource}: missing data")))
    }
}

#[async_trait]
impl ScriptureSource for AlQuranClient {
    async fn surah(&self, number: SurahNumber) -> Result<TextUnit> {
        let p: SurahPayload = self.fetch(&format!("surah/{}", number.get())).await?;
        Ok(TextUnit {
            number: p.number,
            display_name: p.english_name,
            verses: p
                .ayahs
                .into_iter()
                .map(|a| Verse {
                    index: a.number_in_surah,
                    text: a.text,
                    surah_name: None,
                })
                .collect(),
        })
    }

    async fn juz(&self, number: JuzNumber) -> Result<TextUnit> {
        let p: JuzPayload = self.fetch(&format!("juz/{}", number.get())).await?;
        Ok(TextUnit {
            number: p.number,
            display_name: None,
            verses: p
                .ayahs
                .into_iter()
                .map(|a| Verse {
                    index: a.number_in_surah,
                    text: a.text,
                    surah_name: a.surah.and_then(SurahRef::display),
                })
                .collect(),
        })
    }
}

/// Checks that an audio file exists without downloading it.
///
/// Sends `HEAD` first. Hosts that reject `HEAD` get a single-byte ranged
/// `GET` instead.
#[derive(Clone, Debug)]
pub struct HttpAudioProbe {
    http: reqwest::Client,
}

impl HttpAudioProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(PROBE_USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("audio probe http client: {e}")))?;
        Ok(Self { http })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.probe_timeout)
    }

    fn outcome(status: StatusCode) -> ProbeOutcome {
        match status {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => ProbeOutcome::Found,
            other => ProbeOutcome::Missing {
                status: other.as_u16(),
            },
        }
    }
}

#[async_trait]
impl AudioProbe for HttpAudioProbe {
    async fn probe(&self, url: &str) -> Result<ProbeOutcome> {
        let map_err = |e: reqwest::Error| Error::Upstream(format!("audio probe error: {e}"));

        let status = self.http.head(url).send().await.map_err(map_err)?.status();
        if !matches!(
            status,
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            debug!(%url, %status, "audio probe");
            return Ok(Self::outcome(status));
        }

        let status = self
            .http
            .get(url)
            .header(header::RANGE, "bytes=0-0")
            .send()
            .await
            .map_err(map_err)?
            .status();
        debug!(%url, %status, "audio probe (ranged GET)");
        Ok(Self::outcome(status))
    }
}
