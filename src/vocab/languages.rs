//! Language codes shown to the crews.

use once_cell::sync::Lazy;
use regex::Regex;

/// Display names for the languages the app offers.
pub const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese (Simplified)"),
    ("ja", "Japanese"),
    ("it", "Italian"),
    ("ko", "Korean"),
];

static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})?$").unwrap());

/// Display name for `code`, or the code itself when it is not in the table.
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// `en`, `pt-BR`, `zh-Hans` and the like.
pub fn is_valid_language_code(code: &str) -> bool {
    LANGUAGE_CODE.is_match(code)
}
