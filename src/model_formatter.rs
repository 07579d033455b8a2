//! Short display names for Claude models
//!
//! Table output shows `Sonnet 4` instead of `claude-sonnet-4-20250514`.
//! Provider prefixes are dropped first, so `anthropic/claude-3-5-haiku-20241022`
//! becomes `Haiku 3.5`.

use deckstat_pricing::normalize_model_name;

const FAMILIES: [(&str, &str); 3] = [("opus", "Opus"), ("sonnet", "Sonnet"), ("haiku", "Haiku")];

/// Format a model name for display
///
/// Unknown families are returned unchanged.
///
/// # Examples
///
/// ```
/// use deckstat::model_formatter::format_model_name;
///
/// assert_eq!(format_model_name("claude-opus-4-1-20250805", false), "Opus 4.1");
/// assert_eq!(format_model_name("claude-3-5-sonnet-20241022", false), "Sonnet 3.5");
/// assert_eq!(format_model_name("claude-opus-4-20250514", true), "claude-opus-4-20250514");
/// ```
pub fn format_model_name(model_name: &str, use_full_name: bool) -> String {
    if use_full_name {
        return model_name.to_string();
    }

    let bare = normalize_model_name(model_name).to_lowercase();
    let Some((_, family)) = FAMILIES.iter().find(|(key, _)| bare.contains(key)) else {
        return model_name.to_string();
    };

    match model_version(&bare) {
        Some(version) => format!("{family} {version}"),
        None => (*family).to_string(),
    }
}

/// Format each model and join with `separator`
pub fn format_model_list(models: &[String], use_full_name: bool, separator: &str) -> String {
    models
        .iter()
        .map(|m| format_model_name(m, use_full_name))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Version from the numeric segments, ignoring the 8-digit release date
fn model_version(bare: &str) -> Option<String> {
    let numbers: Vec<&str> = bare
        .split('-')
        .filter(|part| !part.is_empty() && part.len() < 8)
        .filter(|part| part.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .take(2)
        .collect();

    match numbers.as_slice() {
        [] => None,
        [major] => Some((*major).to_string()),
        [major, _] if major.contains('.') => Some((*major).to_string()),
        [major, minor] => Some(format!("{major}.{minor}")),
        _ => None,
    }
}
