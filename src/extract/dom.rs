//! Correlation of effective colors read from semantic DOM categories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color;

/// Raw CSS color strings per category, exactly as the page reported them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDomColors {
    pub logo: Vec<String>,
    pub cta: Vec<String>,
    pub navigation: Vec<String>,
    pub headings: Vec<String>,
    pub accent: Vec<String>,
}

/// Normalized, deduplicated hex colors for the five semantic categories.
///
/// An empty category is a legitimate outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomColorMap {
    pub logo: Vec<String>,
    pub cta: Vec<String>,
    pub navigation: Vec<String>,
    pub headings: Vec<String>,
    pub accent: Vec<String>,
}

impl DomColorMap {
    /// Categories flattened in descending brand confidence: logo, cta,
    /// navigation, headings, accent.
    pub fn confidence_order(&self) -> impl Iterator<Item = &str> {
        self.logo
            .iter()
            .chain(&self.cta)
            .chain(&self.navigation)
            .chain(&self.headings)
            .chain(&self.accent)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.confidence_order().next().is_none()
    }
}

/// Normalizes every category, dropping unparseable entries and capping each
/// at `cap` unique colors.
pub fn correlate_dom_colors(raw: &RawDomColors, cap: usize) -> DomColorMap {
    DomColorMap {
        logo: normalize_category(&raw.logo, cap),
        cta: normalize_category(&raw.cta, cap),
        navigation: normalize_category(&raw.navigation, cap),
        headings: normalize_category(&raw.headings, cap),
        accent: normalize_category(&raw.accent, cap),
    }
}

fn normalize_category(values: &[String], cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for value in values {
        let Some(hex) = color::normalize(value) else {
            continue;
        };
        if seen.insert(hex.clone()) {
            out.push(hex);
            if out.len() == cap {
                break;
            }
        }
    }
    out
}
