//! Palette merging: strategy selection plus the two merge strategies.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::dom::DomColorMap;
use crate::extract::visual::VisualColor;

/// Which merge strategy actually ran, recorded on the extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    VisionFirst,
    FallbackDom,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::VisionFirst => write!(f, "vision-first"),
            MergeStrategy::FallbackDom => write!(f, "fallback-dom"),
        }
    }
}

/// The visual signal as a value: a failed extraction carries no colors but
/// is not an error either, it just forces the fallback strategy.
#[derive(Debug, Clone)]
pub enum VisualOutcome {
    Extracted(Vec<VisualColor>),
    Failed,
}

impl VisualOutcome {
    pub fn surviving(&self) -> &[VisualColor] {
        match self {
            VisualOutcome::Extracted(colors) => colors,
            VisualOutcome::Failed => &[],
        }
    }
}

/// Picks the merge strategy once per request: vision-first iff at least two
/// visual colors survived the grayscale filter and extraction did not fail.
pub fn select_strategy(visual: &VisualOutcome) -> MergeStrategy {
    match visual {
        VisualOutcome::Extracted(colors) if colors.len() >= 2 => MergeStrategy::VisionFirst,
        _ => MergeStrategy::FallbackDom,
    }
}

/// Screen-dominant colors lead; declared variables enrich from behind.
/// Declared palettes are frequently untouched framework defaults, so when
/// the rendered evidence is strong it outranks them.
pub fn merge_vision_first(
    style_colors: &[String],
    visual_colors: &[VisualColor],
    cap: usize,
) -> Vec<String> {
    dedup_cap(
        visual_colors
            .iter()
            .map(|v| v.hex.as_str())
            .chain(style_colors.iter().map(String::as_str)),
        cap,
    )
}

/// Declared variables lead; DOM-correlated colors enrich in category
/// confidence order. Used when the visual signal is too weak to trust.
pub fn merge_dom_fallback(
    style_colors: &[String],
    dom_colors: &DomColorMap,
    cap: usize,
) -> Vec<String> {
    dedup_cap(
        style_colors
            .iter()
            .map(String::as_str)
            .chain(dom_colors.confidence_order()),
        cap,
    )
}

fn dedup_cap<'a>(colors: impl Iterator<Item = &'a str>, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for hex in colors {
        let key = hex.to_ascii_lowercase();
        if !seen.insert(key.clone()) {
            continue;
        }
        out.push(key);
        if out.len() == cap {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual(entries: &[(&str, u32)]) -> Vec<VisualColor> {
        entries
            .iter()
            .map(|(hex, area)| VisualColor {
                hex: hex.to_string(),
                area: *area,
            })
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strategy_is_vision_first_iff_two_survivors() {
        let two = VisualOutcome::Extracted(visual(&[("#3b82f6", 1000), ("#10b981", 800)]));
        assert_eq!(select_strategy(&two), MergeStrategy::VisionFirst);

        let one = VisualOutcome::Extracted(visual(&[("#3b82f6", 1000)]));
        assert_eq!(select_strategy(&one), MergeStrategy::FallbackDom);

        let none = VisualOutcome::Extracted(vec![]);
        assert_eq!(select_strategy(&none), MergeStrategy::FallbackDom);

        assert_eq!(select_strategy(&VisualOutcome::Failed), MergeStrategy::FallbackDom);
    }

    #[test]
    fn failed_outcome_has_no_survivors() {
        assert!(VisualOutcome::Failed.surviving().is_empty());
    }

    #[test]
    fn strategy_labels_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&MergeStrategy::VisionFirst).unwrap(),
            r#""vision-first""#
        );
        assert_eq!(
            serde_json::to_string(&MergeStrategy::FallbackDom).unwrap(),
            r#""fallback-dom""#
        );
        assert_eq!(MergeStrategy::VisionFirst.to_string(), "vision-first");
        assert_eq!(MergeStrategy::FallbackDom.to_string(), "fallback-dom");
    }

    #[test]
    fn vision_first_puts_visual_evidence_ahead_of_declared() {
        let style = strings(&["#111111", "#3b82f6"]);
        let visual_colors = visual(&[("#3b82f6", 1000), ("#10b981", 800)]);
        let palette = merge_vision_first(&style, &visual_colors, 8);
        assert_eq!(palette, vec!["#3b82f6", "#10b981", "#111111"]);
    }

    #[test]
    fn dom_fallback_puts_declared_ahead_of_dom() {
        let style = strings(&["#3b82f6"]);
        let dom = DomColorMap {
            logo: strings(&["#10b981"]),
            cta: strings(&["#f59e0b"]),
            ..DomColorMap::default()
        };
        let palette = merge_dom_fallback(&style, &dom, 8);
        assert_eq!(palette, vec!["#3b82f6", "#10b981", "#f59e0b"]);
    }

    #[test]
    fn merge_dedups_case_insensitively() {
        let style = strings(&["#3B82F6"]);
        let visual_colors = visual(&[("#3b82f6", 900), ("#10b981", 100)]);
        let palette = merge_vision_first(&style, &visual_colors, 8);
        assert_eq!(palette, vec!["#3b82f6", "#10b981"]);
    }

    #[test]
    fn merge_never_exceeds_cap() {
        let style: Vec<String> = (0..6).map(|i| format!("#1111{:02x}", i)).collect();
        let visual_colors = visual(&[
            ("#aa0000", 9),
            ("#bb0000", 8),
            ("#cc0000", 7),
            ("#dd0000", 6),
            ("#ee0000", 5),
        ]);
        let palette = merge_vision_first(&style, &visual_colors, 8);
        assert_eq!(palette.len(), 8);
        assert_eq!(palette[0], "#aa0000");
    }
}
