//! Color parsing and conversion shared by every extraction signal.
//!
//! CSS color values arrive from the page in whatever form the stylesheet
//! author used; everything funnels through [`normalize`] into lowercase
//! `#rrggbb` hex before dedup, merging, and theme synthesis.

use palette::{FromColor, Hsl, Srgb};

/// Parses hex and rgb()/rgba() CSS color syntax into lowercase `#rrggbb`.
///
/// Accepts `#rrggbb` (passthrough), `#rgb` (nibble expansion), and
/// `rgb(r, g, b)` / `rgba(r, g, b, a)` with the alpha channel discarded.
/// Returns `None` for anything else: named colors, `hsl()`, `oklch()`,
/// wrong argument counts.
pub fn hex_from_css(value: &str) -> Option<String> {
    let v = value.trim();

    if let Some(body) = v.strip_prefix('#') {
        return match body.len() {
            6 if body.chars().all(|c| c.is_ascii_hexdigit()) => {
                Some(format!("#{}", body.to_ascii_lowercase()))
            }
            3 if body.chars().all(|c| c.is_ascii_hexdigit()) => {
                let expanded: String = body
                    .chars()
                    .flat_map(|c| [c, c])
                    .collect::<String>()
                    .to_ascii_lowercase();
                Some(format!("#{}", expanded))
            }
            _ => None,
        };
    }

    let lower = v.to_ascii_lowercase();
    let expected = if lower.starts_with("rgba(") {
        4
    } else if lower.starts_with("rgb(") {
        3
    } else {
        return None;
    };

    let args = function_args(&lower)?;
    if args.len() != expected {
        return None;
    }

    let r = parse_channel(&args[0])?;
    let g = parse_channel(&args[1])?;
    let b = parse_channel(&args[2])?;
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// Superset of [`hex_from_css`] that additionally parses `hsl()` / `hsla()`.
///
/// For every input accepted by `hex_from_css`, `normalize` returns the
/// identical value.
pub fn normalize(value: &str) -> Option<String> {
    if let Some(hex) = hex_from_css(value) {
        return Some(hex);
    }

    let lower = value.trim().to_ascii_lowercase();
    let expected = if lower.starts_with("hsla(") {
        4
    } else if lower.starts_with("hsl(") {
        3
    } else {
        return None;
    };

    let args = function_args(&lower)?;
    if args.len() != expected {
        return None;
    }

    let h = args[0]
        .trim()
        .trim_end_matches("deg")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())?
        .rem_euclid(360.0);
    let s = parse_percent(&args[1])?;
    let l = parse_percent(&args[2])?;

    let rgb: Srgb = Srgb::from_color(Hsl::new(h, s, l));
    let rgb = rgb.into_format::<u8>();
    Some(format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue))
}

/// Splits `name(a, b, c)` into its comma-separated arguments.
fn function_args(value: &str) -> Option<Vec<String>> {
    let open = value.find('(')?;
    let inner = value.get(open + 1..)?.strip_suffix(')')?;
    if inner.trim().is_empty() {
        return None;
    }
    Some(inner.split(',').map(|s| s.trim().to_string()).collect())
}

fn parse_channel(arg: &str) -> Option<u8> {
    let v = arg.trim().parse::<f32>().ok().filter(|v| v.is_finite())?;
    Some(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_percent(arg: &str) -> Option<f32> {
    let v = arg
        .trim()
        .strip_suffix('%')?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())?;
    Some((v / 100.0).clamp(0.0, 1.0))
}

/// Parses `#rrggbb` into raw channels. Case-insensitive.
pub fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let body = hex.trim().strip_prefix('#')?;
    if body.len() != 6 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&body[0..2], 16).ok()?;
    let g = u8::from_str_radix(&body[2..4], 16).ok()?;
    let b = u8::from_str_radix(&body[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Formats a hex color as the `"H S% L%"` triplet used by theme roles.
pub fn hex_to_hsl_triplet(hex: &str) -> Option<String> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    let hsl = Hsl::from_color(Srgb::new(r, g, b).into_format::<f32>());
    let h = (hsl.hue.into_positive_degrees().round() as u32) % 360;
    let s = (hsl.saturation * 100.0).round() as u32;
    let l = (hsl.lightness * 100.0).round() as u32;
    Some(format!("{} {}% {}%", h, s, l))
}

/// WCAG relative luminance of a hex color, in [0, 1].
pub fn relative_luminance(hex: &str) -> Option<f32> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    let lin = Srgb::new(r, g, b).into_format::<f32>().into_linear();
    Some(0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_hex_passes_through_lowercased() {
        assert_eq!(hex_from_css("#3B82F6").as_deref(), Some("#3b82f6"));
        assert_eq!(hex_from_css("#aabbcc").as_deref(), Some("#aabbcc"));
    }

    #[test]
    fn short_hex_nibble_expands() {
        assert_eq!(hex_from_css("#abc"), hex_from_css("#aabbcc"));
        assert_eq!(hex_from_css("#F00").as_deref(), Some("#ff0000"));
    }

    #[test]
    fn rgb_parses_with_and_without_whitespace() {
        assert_eq!(hex_from_css("rgb(255,0,0)").as_deref(), Some("#ff0000"));
        assert_eq!(
            hex_from_css("rgb( 59 , 130 , 246 )").as_deref(),
            Some("#3b82f6")
        );
    }

    #[test]
    fn rgba_discards_alpha() {
        assert_eq!(
            hex_from_css("rgba(16, 185, 129, 0.5)").as_deref(),
            Some("#10b981")
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(hex_from_css("rgb(255,0)").is_none());
        assert!(hex_from_css("rgb(255,0,0,1)").is_none());
        assert!(hex_from_css("rgba(255,0,0)").is_none());
    }

    #[test]
    fn rejects_everything_else() {
        assert!(hex_from_css("red").is_none());
        assert!(hex_from_css("hsl(0,100%,50%)").is_none());
        assert!(hex_from_css("oklch(0.7 0.1 200)").is_none());
        assert!(hex_from_css("#ab").is_none());
        assert!(hex_from_css("#abcde").is_none());
        assert!(hex_from_css("").is_none());
        assert!(hex_from_css("rgb()").is_none());
    }

    #[test]
    fn normalize_is_a_strict_superset_of_hex_from_css() {
        for input in [
            "#3B82F6",
            "#abc",
            "rgb(255, 0, 0)",
            "rgba(16,185,129,0.3)",
            "  #F59E0B  ",
        ] {
            let hex = hex_from_css(input);
            assert!(hex.is_some(), "hex_from_css should accept {input}");
            assert_eq!(normalize(input), hex, "normalize must agree on {input}");
        }
    }

    #[test]
    fn normalize_parses_hsl() {
        assert_eq!(normalize("hsl(0,100%,50%)").as_deref(), Some("#ff0000"));
        assert_eq!(normalize("hsl(120, 100%, 50%)").as_deref(), Some("#00ff00"));
        assert_eq!(
            normalize("hsla(240, 100%, 50%, 0.8)").as_deref(),
            Some("#0000ff")
        );
    }

    #[test]
    fn normalize_wraps_hue_and_handles_deg_suffix() {
        assert_eq!(normalize("hsl(360, 100%, 50%)"), normalize("hsl(0,100%,50%)"));
        assert_eq!(normalize("hsl(0deg, 100%, 50%)").as_deref(), Some("#ff0000"));
    }

    #[test]
    fn normalize_rejects_hsl_without_percent_signs() {
        assert!(normalize("hsl(0, 100, 50)").is_none());
        assert!(normalize("hsl(0, 100%)").is_none());
    }

    #[test]
    fn hsl_triplet_formats_hue_saturation_lightness() {
        assert_eq!(hex_to_hsl_triplet("#ff0000").as_deref(), Some("0 100% 50%"));
        assert_eq!(hex_to_hsl_triplet("#ffffff").as_deref(), Some("0 0% 100%"));
        assert_eq!(hex_to_hsl_triplet("#000000").as_deref(), Some("0 0% 0%"));
        assert!(hex_to_hsl_triplet("not-a-color").is_none());
    }

    #[test]
    fn luminance_orders_dark_and_light() {
        let white = relative_luminance("#ffffff").unwrap();
        let black = relative_luminance("#000000").unwrap();
        let blue = relative_luminance("#3b82f6").unwrap();
        assert!((white - 1.0).abs() < 1e-4);
        assert!(black.abs() < 1e-6);
        assert!(black < blue && blue < white);
    }
}
