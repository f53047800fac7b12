//! Display labels for scanner condition and language codes.

pub const DEFAULT_CONDITION: &str = "Near Mint";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Map a scanner condition code to its storefront label.
///
/// Unknown values pass through trimmed; empty values take the default.
pub fn condition_label(raw: &str) -> String {
    let raw = raw.trim();
    let key = raw.to_ascii_lowercase().replace([' ', '-'], "_");
    let label = match key.as_str() {
        "" => DEFAULT_CONDITION,
        "mint" | "m" => "Mint",
        "near_mint" | "nm" => "Near Mint",
        "excellent" | "ex" => "Excellent",
        "good" | "gd" => "Good",
        "lightly_played" | "lp" => "Lightly Played",
        "moderately_played" | "mp" => "Moderately Played",
        "played" | "pl" => "Played",
        "heavily_played" | "hp" => "Heavily Played",
        "damaged" | "dmg" | "poor" => "Damaged",
        _ => return raw.to_string(),
    };
    label.to_string()
}

/// Map a scanner language code to its storefront label.
pub fn language_label(raw: &str) -> String {
    let raw = raw.trim();
    let label = match raw.to_ascii_lowercase().as_str() {
        "" => DEFAULT_LANGUAGE,
        "en" => "English",
        "es" | "sp" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ja" | "jp" => "Japanese",
        "ko" | "kr" => "Korean",
        "ru" => "Russian",
        "zhs" | "cs" => "Simplified Chinese",
        "zht" | "ct" => "Traditional Chinese",
        "he" => "Hebrew",
        "la" => "Latin",
        "grc" => "Ancient Greek",
        "ar" => "Arabic",
        "sa" => "Sanskrit",
        "ph" => "Phyrexian",
        _ => return raw.to_string(),
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_codes_map_to_labels() {
        assert_eq!(condition_label("near_mint"), "Near Mint");
        assert_eq!(condition_label(" LP "), "Lightly Played");
        assert_eq!(language_label("ja"), "Japanese");
    }

    #[test]
    fn empty_takes_default_and_unknown_passes_through() {
        assert_eq!(condition_label(""), DEFAULT_CONDITION);
        assert_eq!(language_label("  "), DEFAULT_LANGUAGE);
        assert_eq!(condition_label("Signed"), "Signed");
        assert_eq!(language_label("Klingon"), "Klingon");
    }
}
