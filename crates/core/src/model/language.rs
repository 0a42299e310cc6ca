use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages a question can be translated into.
///
/// German is the exam language; the others are translation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
    Ru,
    Uk,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::De, Language::En, Language::Ru, Language::Uk];

    /// Resolve a stored language code, falling back to German for unknown or
    /// missing codes.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(Self::parse).unwrap_or(Language::De)
    }

    /// Strict lookup by ISO 639-1 code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "de" => Some(Self::De),
            "en" => Some(Self::En),
            "ru" => Some(Self::Ru),
            "uk" => Some(Self::Uk),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Ru => "ru",
            Self::Uk => "uk",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::De => "German",
            Self::En => "English",
            Self::Ru => "Russian",
            Self::Uk => "Ukrainian",
        }
    }

    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::De => "🇩🇪",
            Self::En => "🇬🇧",
            Self::Ru => "🇷🇺",
            Self::Uk => "🇺🇦",
        }
    }
}

impl Default for Language {
    /// The preferred translation language for new installs.
    fn default() -> Self {
        Self::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
