//! Line items as scraped from a saved order page, before catalog resolution.

use std::fmt;
use std::num::NonZeroU32;

use rust_decimal::Decimal;

/// Physical print variant of a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Finish {
    #[default]
    Normal,
    Foil,
    Etched,
}

impl Finish {
    /// Label written to the output CSV.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Finish::Normal => "Normal",
            Finish::Foil => "Foil",
            Finish::Etched => "Etched",
        }
    }

    /// Parses a catalog finish code (`nonfoil`, `foil`, `etched`).
    #[must_use]
    pub fn from_catalog_code(code: &str) -> Option<Self> {
        match code {
            "nonfoil" => Some(Finish::Normal),
            "foil" => Some(Finish::Foil),
            "etched" => Some(Finish::Etched),
            _ => None,
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card grading in the import target's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Mint,
    NearMint,
    LightlyPlayed,
    ModeratelyPlayed,
    HeavilyPlayed,
    Damaged,
}

impl Condition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Mint => "M",
            Condition::NearMint => "NM",
            Condition::LightlyPlayed => "LP",
            Condition::ModeratelyPlayed => "MP",
            Condition::HeavilyPlayed => "HP",
            Condition::Damaged => "D",
        }
    }

    /// Maps a marketplace grading value onto the target vocabulary.
    ///
    /// Accepts the numeric grade ids (`1`..`7`), the marketplace's own
    /// abbreviations (`MT`, `NM`, `EX`, `GD`, `LP`, `PL`, `PO`), and values
    /// already in the target vocabulary. Note that `LP` is read as the
    /// marketplace's "Light Played", which is one grade below `EX`.
    #[must_use]
    pub fn from_marketplace(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1" | "MT" | "M" | "MINT" => Some(Condition::Mint),
            "2" | "NM" | "NEAR MINT" => Some(Condition::NearMint),
            "3" | "EX" | "EXCELLENT" => Some(Condition::LightlyPlayed),
            // Marketplace LP is "Light Played" (grade 5), one step below the target's LP.
            "4" | "5" | "GD" | "GOOD" | "LP" | "LIGHT PLAYED" | "MP" => {
                Some(Condition::ModeratelyPlayed)
            }
            "6" | "PL" | "PLAYED" | "HP" => Some(Condition::HeavilyPlayed),
            "7" | "PO" | "POOR" | "D" => Some(Condition::Damaged),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchased article as it appears on the order page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLineItem {
    /// Marketplace product id; primary catalog lookup key.
    pub product_id: String,
    /// Name exactly as shown on the page.
    pub display_name: String,
    /// `display_name` with any trailing set hint removed.
    pub name: String,
    pub set_hint: Option<String>,
    /// Catalog-style language code (`en`, `de`, `zhs`, ...).
    pub language: Option<String>,
    pub finish: Finish,
    pub condition: Option<Condition>,
    pub quantity: NonZeroU32,
    /// Unit price in EUR. Never negative.
    pub unit_price_eur: Option<Decimal>,
}

/// Splits a trailing parenthesised set/edition hint off a product name.
///
/// `"Lightning Bolt (M10)"` → `("Lightning Bolt", Some("M10"))`. Names
/// without a trailing group, or with an empty one, are returned unchanged.
#[must_use]
pub fn split_set_hint(display_name: &str) -> (&str, Option<&str>) {
    let trimmed = display_name.trim();
    if let Some(without_close) = trimmed.strip_suffix(')') {
        if let Some(open) = without_close.rfind('(') {
            let hint = without_close[open + 1..].trim();
            let name = without_close[..open].trim_end();
            if !hint.is_empty() && !name.is_empty() {
                return (name, Some(hint));
            }
        }
    }
    (trimmed, None)
}

/// Marketplace language names and numeric ids, with their catalog codes.
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("1", "english", "en"),
    ("2", "french", "fr"),
    ("3", "german", "de"),
    ("4", "spanish", "es"),
    ("5", "italian", "it"),
    ("6", "s-chinese", "zhs"),
    ("7", "japanese", "ja"),
    ("8", "portuguese", "pt"),
    ("9", "russian", "ru"),
    ("10", "korean", "ko"),
    ("11", "t-chinese", "zht"),
];

/// Normalizes a language marker into a catalog language code.
///
/// Accepts marketplace language ids, English language names, and catalog
/// codes. Returns `None` for anything unrecognised.
#[must_use]
pub fn normalize_language(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    let lower = match lower.as_str() {
        "simplified chinese" | "chinese simplified" => "s-chinese",
        "traditional chinese" | "chinese traditional" => "t-chinese",
        "deutsch" => "german",
        other => other,
    };
    LANGUAGES
        .iter()
        .find(|(id, name, code)| lower == *id || lower == *name || lower == *code)
        .map(|(_, _, code)| (*code).to_string())
}
