//! Supported conversation languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the assistant can listen and reply in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Bengali,
    Telugu,
    Marathi,
    Tamil,
    Gujarati,
    Kannada,
    Malayalam,
}

impl Language {
    /// Every supported language, in picker order
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Hindi,
        Language::Bengali,
        Language::Telugu,
        Language::Marathi,
        Language::Tamil,
        Language::Gujarati,
        Language::Kannada,
        Language::Malayalam,
    ];

    /// Tag sent to the collaborator API
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Bengali => "bn",
            Language::Telugu => "te",
            Language::Marathi => "mr",
            Language::Tamil => "ta",
            Language::Gujarati => "gu",
            Language::Kannada => "kn",
            Language::Malayalam => "ml",
        }
    }

    /// Label shown in the language picker
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "हिंदी (Hindi)",
            Language::Bengali => "বাংলা (Bengali)",
            Language::Telugu => "తెలుగు (Telugu)",
            Language::Marathi => "मराठी (Marathi)",
            Language::Tamil => "தமிழ் (Tamil)",
            Language::Gujarati => "ગુજરાતી (Gujarati)",
            Language::Kannada => "ಕನ್ನಡ (Kannada)",
            Language::Malayalam => "മലയാളം (Malayalam)",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a language tag is not one we support
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language tag `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        // Servers sometimes send region-qualified tags such as "hi-IN"
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == primary)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!("ta".parse::<Language>(), Ok(Language::Tamil));
        assert_eq!(" HI ".parse::<Language>(), Ok(Language::Hindi));
        assert_eq!("kn-IN".parse::<Language>(), Ok(Language::Kannada));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            "fr".parse::<Language>(),
            Err(UnknownLanguage("fr".to_string()))
        );
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_codes_round_trip_through_serde() {
        let json = serde_json::to_string(&Language::Bengali).unwrap();
        assert_eq!(json, "\"bn\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::Bengali);
    }

    #[test]
    fn test_all_codes_unique() {
        let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }
}
