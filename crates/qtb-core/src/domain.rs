use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl From<UserId> for ChatId {
    /// Private chats share the user's id.
    fn from(u: UserId) -> Self {
        ChatId(u.0)
    }
}

/// Interface language a user can pick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    #[default]
    Am,
    En,
    Ar,
    Tr,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Am, Language::En, Language::Ar, Language::Tr];

    pub fn code(self) -> &'static str {
        match self {
            Language::Am => "am",
            Language::En => "en",
            Language::Ar => "ar",
            Language::Tr => "tr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "am" => Some(Language::Am),
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            "tr" => Some(Language::Tr),
            _ => None,
        }
    }

    /// Label shown on the language picker, in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::Am => "አማርኛ",
            Language::En => "English",
            Language::Ar => "العربية",
            Language::Tr => "Türkçe",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    /// Unknown codes in a stored document fall back to the default language
    /// instead of failing the whole registry read.
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(d)?;
        Ok(Language::from_code(&code).unwrap_or_default())
    }
}

/// A surah number, validated to 1..=114.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurahNumber(u16);

impl SurahNumber {
    pub const MAX: u16 = 114;

    pub fn new(n: u16) -> Option<Self> {
        (1..=Self::MAX).contains(&n).then_some(Self(n))
    }

    /// Parse a user-supplied argument. Non-numeric or out-of-range input is `None`.
    pub fn parse(arg: &str) -> Option<Self> {
        arg.trim().parse::<u16>().ok().and_then(Self::new)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Zero-padded to three digits, as used by audio asset paths.
    pub fn padded(self) -> String {
        format!("{:03}", self.0)
    }
}

impl fmt::Display for SurahNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A juz number, validated to 1..=30.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JuzNumber(u8);

impl JuzNumber {
    pub const MAX: u8 = 30;

    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn parse(arg: &str) -> Option<Self> {
        arg.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for JuzNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_are_case_insensitive() {
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code(" tr "), Some(Language::Tr));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn surah_and_juz_bounds() {
        assert!(SurahNumber::parse("0").is_none());
        assert_eq!(SurahNumber::parse("1").map(SurahNumber::get), Some(1));
        assert_eq!(SurahNumber::parse("114").map(SurahNumber::get), Some(114));
        assert!(SurahNumber::parse("115").is_none());
        assert!(SurahNumber::parse("-2").is_none());
        assert!(SurahNumber::parse("two").is_none());

        assert!(JuzNumber::parse("0").is_none());
        assert_eq!(JuzNumber::parse("30").map(JuzNumber::get), Some(30));
        assert!(JuzNumber::parse("31").is_none());
        assert!(JuzNumber::parse("300").is_none());
    }

    #[test]
    fn surah_is_zero_padded_for_asset_paths() {
        assert_eq!(SurahNumber::new(2).unwrap().padded(), "002");
        assert_eq!(SurahNumber::new(114).unwrap().padded(), "114");
    }

    #[test]
    fn unknown_stored_language_falls_back_to_default() {
        let lang: Language = serde_json::from_str("\"xx\"").unwrap();
        assert_eq!(lang, Language::Am);
        assert_eq!(serde_json::to_string(&Language::Ar).unwrap(), "\"ar\"");
    }
}
