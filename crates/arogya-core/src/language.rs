//! Language selection and code normalization.
//!
//! The backend speaks region-qualified BCP-47 codes (`hi-IN`, `ta-IN`).
//! User-facing inputs and detection results arrive in looser forms (bare
//! codes, language names, mixed case), so everything is funneled through
//! [`normalize_language_code`] before it reaches a request or the UI
//! selector.

/// Default response language when nothing better is known.
pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// Known code/name aliases mapped to their region-qualified form.
const LANGUAGE_CODE_MAP: &[(&str, &str)] = &[
    ("en", "en-IN"),
    ("en-in", "en-IN"),
    ("english", "en-IN"),
    ("hi", "hi-IN"),
    ("hi-in", "hi-IN"),
    ("hindi", "hi-IN"),
    ("ta", "ta-IN"),
    ("ta-in", "ta-IN"),
    ("tamil", "ta-IN"),
    ("bn", "bn-IN"),
    ("bn-in", "bn-IN"),
    ("bengali", "bn-IN"),
    ("te", "te-IN"),
    ("te-in", "te-IN"),
    ("telugu", "te-IN"),
    ("mr", "mr-IN"),
    ("mr-in", "mr-IN"),
    ("marathi", "mr-IN"),
];

/// The response-language selector.
///
/// `Auto` lets the backend detect the language; `Locked` forces a specific
/// region-qualified code on every chat request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageSelector {
    #[default]
    Auto,
    Locked(String),
}

impl LanguageSelector {
    /// Parses a user-supplied selector value ("auto" or a language code).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Locked(normalize_language_code(Some(trimmed), DEFAULT_LANGUAGE))
        }
    }

    /// Returns the explicit language lock for the chat request, if any.
    pub fn lock(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Locked(code) => Some(code),
        }
    }

    /// Recognition-language hint: the locked code, or the default when auto.
    pub fn recognition_hint(&self) -> &str {
        self.lock().unwrap_or(DEFAULT_LANGUAGE)
    }
}

impl std::fmt::Display for LanguageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Locked(code) => f.write_str(code),
        }
    }
}

/// Normalizes a language code against the alias table.
///
/// Unknown region-qualified codes pass through with the separator and case
/// normalized (e.g. `kn-in` -> `kn-IN`); anything else falls back.
pub fn normalize_language_code(code: Option<&str>, fallback: &str) -> String {
    let raw = code.unwrap_or("").trim();
    if raw.is_empty() {
        return fallback.to_string();
    }
    let lowered = raw.to_lowercase();
    if lowered == "auto" {
        return fallback.to_string();
    }
    if let Some((_, mapped)) = LANGUAGE_CODE_MAP.iter().find(|(key, _)| *key == lowered) {
        return (*mapped).to_string();
    }
    if let Some((lang, region)) = raw.split_once('-') {
        return format!("{}-{}", lang.to_lowercase(), region.to_uppercase());
    }
    fallback.to_string()
}
