//! Language utilities for the translate operation
//!
//! Target languages may be given as ISO 639-1 (2-letter) or ISO 639-2
//! (3-letter) codes; these are expanded to English language names before
//! they reach a prompt. Anything else is treated as a language name already.

use isolang::Language;

use crate::prompts::DEFAULT_TARGET_LANGUAGE;

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"), // French
        "ger" => Some("deu"), // German
        "dut" => Some("nld"), // Dutch
        "gre" => Some("ell"), // Greek
        "chi" => Some("zho"), // Chinese
        "cze" => Some("ces"), // Czech
        "ice" => Some("isl"), // Icelandic
        "alb" => Some("sqi"), // Albanian
        "arm" => Some("hye"), // Armenian
        "baq" => Some("eus"), // Basque
        "bur" => Some("mya"), // Burmese
        "per" => Some("fas"), // Persian
        "geo" => Some("kat"), // Georgian
        "may" => Some("msa"), // Malay
        "mac" => Some("mkd"), // Macedonian
        "rum" => Some("ron"), // Romanian
        "slo" => Some("slk"), // Slovak
        "wel" => Some("cym"), // Welsh
        _ => None,
    }
}

/// Look up a language by ISO 639-1 or ISO 639-2 code
pub fn language_from_code(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = bibliographic_to_terminology(&normalized_code).unwrap_or(normalized_code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Option<String> {
    language_from_code(code).map(|lang| lang.to_name().to_string())
}

/// Resolve the language a translation should target
///
/// Blank input yields the default target language, recognised ISO codes yield
/// the language name, and any other text is kept as written.
pub fn resolve_target_language(requested: &str) -> String {
    let requested = requested.trim();

    if requested.is_empty() {
        return DEFAULT_TARGET_LANGUAGE.to_string();
    }

    get_language_name(requested).unwrap_or_else(|| requested.to_string())
}
