//! Supported language codes.
//!
//! The set is fixed at compile time and mirrors the provider's codes,
//! including region-qualified Chinese variants.

use std::collections::BTreeMap;

/// Supported languages as (code, English label), sorted by code.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("hi", "Hindi"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("th", "Thai"),
    ("tl", "Filipino"),
    ("tr", "Turkish"),
    ("vi", "Vietnamese"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
];

/// Whether `code` is a supported language. Matching is exact.
pub fn is_supported(code: &str) -> bool {
    label(code).is_some()
}

/// English label for a supported language code.
pub fn label(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|idx| SUPPORTED_LANGUAGES[idx].1)
}

/// All supported languages as a code → label map.
pub fn all() -> BTreeMap<&'static str, &'static str> {
    SUPPORTED_LANGUAGES.iter().copied().collect()
}
