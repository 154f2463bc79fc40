//! Theme synthesis: an ordered palette in, ten contrast-safe roles out.

use serde::{Deserialize, Serialize};

use crate::color::{hex_to_hsl_triplet, relative_luminance};

/// The ten semantic theme roles, each an `"H S% L%"` triplet.
///
/// Always fully populated. Only `primary` and `primary-foreground` depend on
/// the extracted palette; the neutral roles are fixed offsets from a neutral
/// base so the theme stays legible no matter how saturated or dark the brand
/// color is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ThemeColors {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub primary_foreground: String,
    pub muted: String,
    pub muted_foreground: String,
    pub border: String,
    pub input: String,
    pub card: String,
    pub card_foreground: String,
}

/// Neutral slate used when the palette is empty: #1e293b.
const NEUTRAL_PRIMARY: &str = "217 33% 17%";

const LIGHT_FOREGROUND: &str = "0 0% 98%";
const DARK_FOREGROUND: &str = "224 71% 4%";

/// Primaries darker than this get the near-white foreground.
const PRIMARY_LUMINANCE_THRESHOLD: f32 = 0.45;

pub fn synthesize_theme(palette: &[String]) -> ThemeColors {
    let brand = palette
        .first()
        .and_then(|hex| Some((hex_to_hsl_triplet(hex)?, relative_luminance(hex)?)));

    let (primary, primary_is_dark) = match brand {
        Some((triplet, luminance)) => (triplet, luminance < PRIMARY_LUMINANCE_THRESHOLD),
        None => (NEUTRAL_PRIMARY.to_string(), true),
    };

    let primary_foreground = if primary_is_dark {
        LIGHT_FOREGROUND
    } else {
        DARK_FOREGROUND
    };

    ThemeColors {
        background: "0 0% 100%".to_string(),
        foreground: DARK_FOREGROUND.to_string(),
        primary,
        primary_foreground: primary_foreground.to_string(),
        muted: "220 14% 96%".to_string(),
        muted_foreground: "220 9% 46%".to_string(),
        border: "220 13% 91%".to_string(),
        input: "220 13% 91%".to_string(),
        card: "0 0% 100%".to_string(),
        card_foreground: DARK_FOREGROUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_hsl_triplet(value: &str) {
        let parts: Vec<&str> = value.split_whitespace().collect();
        assert_eq!(parts.len(), 3, "expected 3 parts in {value:?}");
        assert!(parts[0].parse::<u32>().is_ok(), "bad hue in {value:?}");
        assert!(parts[1].ends_with('%'), "bad saturation in {value:?}");
        assert!(parts[2].ends_with('%'), "bad lightness in {value:?}");
    }

    fn all_roles(theme: &ThemeColors) -> [&str; 10] {
        [
            &theme.background,
            &theme.foreground,
            &theme.primary,
            &theme.primary_foreground,
            &theme.muted,
            &theme.muted_foreground,
            &theme.border,
            &theme.input,
            &theme.card,
            &theme.card_foreground,
        ]
    }

    #[test]
    fn empty_palette_still_populates_all_ten_roles() {
        let theme = synthesize_theme(&[]);
        for role in all_roles(&theme) {
            assert!(!role.is_empty());
            assert_hsl_triplet(role);
        }
        assert_eq!(theme.primary, NEUTRAL_PRIMARY);
        assert_eq!(theme.primary_foreground, LIGHT_FOREGROUND);
    }

    #[test]
    fn primary_comes_from_palette_head() {
        let theme = synthesize_theme(&["#3b82f6".to_string(), "#10b981".to_string()]);
        assert_eq!(theme.primary, "217 91% 60%");
    }

    #[test]
    fn dark_primary_gets_light_foreground() {
        let theme = synthesize_theme(&["#1e293b".to_string()]);
        assert_eq!(theme.primary_foreground, LIGHT_FOREGROUND);

        let theme = synthesize_theme(&["#3b82f6".to_string()]);
        assert_eq!(theme.primary_foreground, LIGHT_FOREGROUND);
    }

    #[test]
    fn light_primary_gets_dark_foreground() {
        let theme = synthesize_theme(&["#ffffff".to_string()]);
        assert_eq!(theme.primary_foreground, DARK_FOREGROUND);

        let theme = synthesize_theme(&["#ffff00".to_string()]);
        assert_eq!(theme.primary_foreground, DARK_FOREGROUND);
    }

    #[test]
    fn neutral_roles_ignore_brand_saturation() {
        let vivid = synthesize_theme(&["#ff0000".to_string()]);
        let dark = synthesize_theme(&["#000000".to_string()]);
        assert_eq!(vivid.background, dark.background);
        assert_eq!(vivid.muted, dark.muted);
        assert_eq!(vivid.border, dark.border);
        assert_eq!(vivid.card_foreground, dark.card_foreground);
        assert_eq!(vivid.background, "0 0% 100%");
    }

    #[test]
    fn unparseable_head_falls_back_to_neutral() {
        let theme = synthesize_theme(&["not-a-color".to_string()]);
        assert_eq!(theme.primary, NEUTRAL_PRIMARY);
    }

    #[test]
    fn serializes_kebab_case_role_names() {
        let theme = synthesize_theme(&[]);
        let json = serde_json::to_value(&theme).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        for key in [
            "background",
            "foreground",
            "primary",
            "primary-foreground",
            "muted",
            "muted-foreground",
            "border",
            "input",
            "card",
            "card-foreground",
        ] {
            assert!(obj.contains_key(key), "missing role {key}");
        }
    }
}
