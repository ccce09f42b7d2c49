use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Codes are accepted as ISO 639-1 (2-letter), ISO 639-2/T or 639-2/B
/// (3-letter), optionally followed by a script or region subtag
/// (`zh-Hans`, `pt_BR`).
/// Map a ISO 639-2/B code to its ISO 639-2/T form
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Split a tag like `zh-Hans` into its lowercased primary code and subtag
fn split_tag(code: &str) -> (String, Option<String>) {
    let normalized = code.trim().to_lowercase();
    match normalized.split_once(['-', '_']) {
        Some((primary, subtag)) => (primary.to_string(), Some(subtag.to_string())),
        None => (normalized, None),
    }
}

/// Resolve a language code to its ISO record
pub fn lookup_language(code: &str) -> Result<Language> {
    let (primary, _) = split_tag(code);

    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => {
            let part2t = bibliographic_to_terminology(&primary).unwrap_or(&primary);
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Get the English language name used in prompts
///
/// Chinese script and region subtags are spelled out because the written
/// form differs.
pub fn get_language_name(code: &str) -> Result<String> {
    let language = lookup_language(code)?;
    let (_, subtag) = split_tag(code);

    if language == Language::Zho {
        match subtag.as_deref() {
            Some("hans") | Some("cn") | Some("sg") => return Ok("Simplified Chinese".to_string()),
            Some("hant") | Some("tw") | Some("hk") | Some("mo") => return Ok("Traditional Chinese".to_string()),
            _ => {}
        }
    }

    Ok(language.to_name().to_string())
}
