//! Prioritization of declared style variables.

use std::collections::HashSet;

use serde::Deserialize;

use crate::color;

/// Custom properties read from the document root, in declaration order.
///
/// `found` is false both when the page declares none and when the in-page
/// inspection failed; the values are raw and unnormalized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleVariables {
    pub found: bool,
    #[serde(default)]
    pub colors: Vec<(String, String)>,
}

/// Variable-name substrings that signal brand relevance, most trusted first.
const PRIORITY_ORDER: [&str; 10] = [
    "primary",
    "secondary",
    "accent",
    "background",
    "foreground",
    "surface",
    "text",
    "border",
    "muted",
    "card",
];

fn priority_rank(name: &str) -> Option<usize> {
    let lower = name.to_ascii_lowercase();
    PRIORITY_ORDER.iter().position(|p| lower.contains(p))
}

/// Ranks, normalizes, and dedups declared variables into an ordered hex list.
///
/// Entries whose name matches a priority substring sort by priority index;
/// the rest follow in their original relative order. Unparseable values are
/// dropped, duplicates keep their first (highest-priority) occurrence, and
/// the result is capped at `max` entries.
pub fn prioritize_style_variables(vars: &StyleVariables, max: usize) -> Vec<String> {
    if !vars.found {
        return Vec::new();
    }

    let mut ordered: Vec<&(String, String)> = vars.colors.iter().collect();
    ordered.sort_by_key(|(name, _)| priority_rank(name).unwrap_or(usize::MAX));

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for (_, value) in ordered {
        let Some(hex) = color::normalize(value) else {
            continue;
        };
        if seen.insert(hex.clone()) {
            out.push(hex);
            if out.len() == max {
                break;
            }
        }
    }
    out
}
