//! Keyword-based wine category inference.
//!
//! Used to backfill `wineCategory` on records created before categories
//! existed. Categories are checked in a fixed priority order so that names
//! matching several keyword sets (a Chardonnay labelled "sparkling", an
//! orange wine from a "Blanc" estate) resolve toward the rarer category.

use crate::models::WineCategory;

const NATURAL_KEYWORDS: &[&str] = &[
    "natural",
    "nature",
    "orange",
    "amphora",
    "skin contact",
    "내츄럴",
    "오렌지",
    "뱅 나뛰렐",
    "vin naturel",
    "bio",
    "biodynamic",
];

const SPARKLING_KEYWORDS: &[&str] = &[
    "champagne",
    "prosecco",
    "cava",
    "cremant",
    "sparkling",
    "샴페인",
    "스파클링",
    "brut",
    "spumante",
    "sekt",
];

const ROSE_KEYWORDS: &[&str] = &["rosé", "rose", "로제", "rosato"];

const WHITE_KEYWORDS: &[&str] = &[
    "blanc",
    "blanco",
    "bianco",
    "white",
    "화이트",
    "블랑",
    "chardonnay",
    "sauvignon blanc",
    "riesling",
    "pinot grigio",
    "pinot gris",
];

const RED_KEYWORDS: &[&str] = &[
    "rouge",
    "rosso",
    "tinto",
    "red",
    "레드",
    "루즈",
    "cabernet",
    "merlot",
    "pinot noir",
    "syrah",
    "shiraz",
    "malbec",
];

/// Categories in evaluation order with their keyword sets.
const PRIORITY: [(WineCategory, &[&str]); 5] = [
    (WineCategory::Natural, NATURAL_KEYWORDS),
    (WineCategory::Sparkling, SPARKLING_KEYWORDS),
    (WineCategory::Rose, ROSE_KEYWORDS),
    (WineCategory::White, WHITE_KEYWORDS),
    (WineCategory::Red, RED_KEYWORDS),
];

/// Declared types honored by the final fallback.
const FALLBACK_TYPES: [WineCategory; 4] = [
    WineCategory::Red,
    WineCategory::White,
    WineCategory::Rose,
    WineCategory::Sparkling,
];

/// Infer a category from a wine's name and declared type.
///
/// Returns the first category (Natural, Sparkling, Rosé, White, Red) whose
/// keywords appear in the name or whose label equals the declared type.
/// Falls back to the declared type, then to `Red`.
pub fn infer_category(name: &str, declared_type: &str) -> WineCategory {
    let name = name.to_lowercase();
    let declared = declared_type.trim();

    for (category, keywords) in PRIORITY {
        if keywords.iter().any(|k| name.contains(k)) || declared == category.label() {
            return category;
        }
    }

    FALLBACK_TYPES
        .into_iter()
        .find(|c| declared == c.label())
        .unwrap_or(WineCategory::Red)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rose_from_name() {
        assert_eq!(infer_category("Domaine X Rosé", ""), WineCategory::Rose);
    }

    #[test]
    fn test_natural_keyword_beats_declared_type() {
        assert_eq!(
            infer_category("Chateau Blanc Natural Orange", "Red"),
            WineCategory::Natural
        );
    }

    #[test]
    fn test_unknown_defaults_to_red() {
        assert_eq!(infer_category("Unknown Wine", ""), WineCategory::Red);
    }

    #[test]
    fn test_brut_is_sparkling() {
        assert_eq!(
            infer_category("Veuve Something Brut", ""),
            WineCategory::Sparkling
        );
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert_eq!(infer_category("CHAMPAGNE POL", ""), WineCategory::Sparkling);
        assert_eq!(infer_category("Cloudy Bay RIESLING", ""), WineCategory::White);
    }

    #[test]
    fn test_sparkling_beats_white_grape() {
        assert_eq!(
            infer_category("Chardonnay Sparkling", ""),
            WineCategory::Sparkling
        );
    }

    #[test]
    fn test_korean_keywords() {
        assert_eq!(infer_category("마제스틱 화이트", ""), WineCategory::White);
        assert_eq!(infer_category("몬테스 레드", ""), WineCategory::Red);
        assert_eq!(infer_category("프로방스 로제", ""), WineCategory::Rose);
    }

    #[test]
    fn test_declared_type_used_when_name_is_silent() {
        assert_eq!(infer_category("Mystery 2020", "White"), WineCategory::White);
        assert_eq!(infer_category("Mystery 2020", "Sparkling"), WineCategory::Sparkling);
        assert_eq!(infer_category("Mystery 2020", "Rosé"), WineCategory::Rose);
    }

    #[test]
    fn test_declared_type_priority_follows_category_order() {
        // "Merlot" is a Red keyword, but White is evaluated first and the
        // declared type matches it.
        assert_eq!(infer_category("Merlot Blend", "White"), WineCategory::White);
    }

    #[test]
    fn test_unrecognized_declared_type_falls_back_to_red() {
        assert_eq!(infer_category("Mystery 2020", "Dessert"), WineCategory::Red);
        assert_eq!(infer_category("Mystery 2020", "white"), WineCategory::Red);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let inputs = [
            ("Domaine X Rosé", ""),
            ("Chateau Blanc Natural Orange", "Red"),
            ("Unknown Wine", ""),
        ];
        for (name, ty) in inputs {
            assert_eq!(infer_category(name, ty), infer_category(name, ty));
        }
    }
}
