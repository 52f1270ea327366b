//! Output language for labels, number formatting and prompts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the report and the LLM prompts are available in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French
    #[default]
    French,
    /// English
    English,
}

impl Language {
    /// Get ISO 639-1 language code
    pub fn code(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// Get language name for display
    pub fn name(self) -> &'static str {
        match self {
            Language::French => "French",
            Language::English => "English",
        }
    }

    /// Parse from ISO 639-1 code or common name
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "french" | "français" | "francais" | "fr-fr" => Some(Language::French),
            "en" | "english" | "en-us" | "en-gb" => Some(Language::English),
            _ => None,
        }
    }

    /// Suffix for amounts above one billion
    pub(crate) fn billion_suffix(self) -> &'static str {
        match self {
            Language::French => "Md",
            Language::English => "B",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| format!("unsupported language: {s} (expected fr or en)"))
    }
}
