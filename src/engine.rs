//! Request orchestration: the linear extraction pipeline.
//!
//! Stage order for website targets: validate, render (one sandboxed helper
//! run covering navigation, style variables, DOM colors, screenshot), hue
//! binning + grayscale filter, strategy selection, merge, synthesize. The
//! only recoverable failure is the visual-extraction stage, which collapses
//! into the fallback-dom signal; everything else propagates unchanged.

use serde::{Deserialize, Serialize};

use crate::browser::{self, SecureBrowserOptions};
use crate::config::Config;
use crate::extract::dom::{correlate_dom_colors, DomColorMap};
use crate::extract::image::{decode_base64_image, fetch_image_bytes, read_image_file};
use crate::extract::style_vars::prioritize_style_variables;
use crate::extract::visual::{extract_hue_binned_colors, filter_grayscale, palette_from_image_bytes};
use crate::merge::{
    merge_dom_fallback, merge_vision_first, select_strategy, MergeStrategy, VisualOutcome,
};
use crate::theme::{synthesize_theme, ThemeColors};
use crate::validator::validate_target;
use crate::{BexError, Result};

/// Where the request's `data` payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractSource {
    File,
    Url,
    Base64,
    Website,
}

/// A validated request handed in by the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub source: ExtractSource,
    pub data: String,
}

/// The engine's only output: an ordered palette, a full theme, and, for
/// website extractions, the merge strategy that actually ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub palette: Vec<String>,
    pub suggested_theme: ThemeColors,
    #[serde(
        rename = "extractionSource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<MergeStrategy>,
}

/// Strategy selection plus merge as one pure step over the three signals.
pub fn merge_signals(
    style_colors: &[String],
    dom_colors: &DomColorMap,
    visual: &VisualOutcome,
    cap: usize,
) -> (Vec<String>, MergeStrategy) {
    let strategy = select_strategy(visual);
    let palette = match strategy {
        MergeStrategy::VisionFirst => merge_vision_first(style_colors, visual.surviving(), cap),
        MergeStrategy::FallbackDom => merge_dom_fallback(style_colors, dom_colors, cap),
    };
    (palette, strategy)
}

/// Stateless per-request engine; safe to share and invoke concurrently.
#[derive(Debug, Clone, Default)]
pub struct ThemeEngine {
    config: Config,
}

impl ThemeEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one extraction request to completion.
    pub async fn extract(&self, request: &ExtractRequest) -> Result<ExtractionResult> {
        match request.source {
            ExtractSource::Website => self.extract_website(&request.data).await,
            source => self.extract_image(source, &request.data).await,
        }
    }

    async fn extract_website(&self, raw_url: &str) -> Result<ExtractionResult> {
        let target = validate_target(raw_url).await?;

        // Scratch space for the screenshot; removed on every exit path when
        // the TempDir drops.
        let scratch = tempfile::tempdir()?;
        let screenshot_path = scratch.path().join("viewport.png");

        let options = self.browser_options();
        let signals = browser::capture_page(&target, &screenshot_path, &options).await?;

        let ex = &self.config.extraction;
        let style_colors = prioritize_style_variables(&signals.style_vars, ex.max_palette);
        let dom_colors =
            correlate_dom_colors(&signals.dom_colors, ex.max_dom_colors_per_category);

        let visual = match &signals.screenshot {
            Some(bytes) => match extract_hue_binned_colors(bytes, ex) {
                Ok(bins) => VisualOutcome::Extracted(filter_grayscale(&bins, ex)),
                Err(err) => {
                    tracing::debug!(error = %err, "visual extraction failed, using DOM fallback");
                    VisualOutcome::Failed
                }
            },
            None => VisualOutcome::Failed,
        };

        let (palette, strategy) = merge_signals(&style_colors, &dom_colors, &visual, ex.max_palette);
        let suggested_theme = synthesize_theme(&palette);

        tracing::info!(
            host = %target.hostname,
            strategy = %strategy,
            colors = palette.len(),
            "website extraction complete"
        );

        Ok(ExtractionResult {
            palette,
            suggested_theme,
            source: Some(strategy),
        })
    }

    async fn extract_image(&self, source: ExtractSource, data: &str) -> Result<ExtractionResult> {
        let bytes = match source {
            ExtractSource::File => read_image_file(data).await?,
            ExtractSource::Url => fetch_image_bytes(data, &self.config.fetch).await?,
            ExtractSource::Base64 => decode_base64_image(data)?,
            ExtractSource::Website => {
                return Err(BexError::request("website source is not an image input"))
            }
        };

        let palette = palette_from_image_bytes(&bytes, &self.config.extraction)?;
        let suggested_theme = synthesize_theme(&palette);

        tracing::info!(source = ?source, colors = palette.len(), "image extraction complete");

        Ok(ExtractionResult {
            palette,
            suggested_theme,
            source: None,
        })
    }

    fn browser_options(&self) -> SecureBrowserOptions {
        SecureBrowserOptions {
            viewport: self.config.viewport,
            navigation_timeout: self.config.timeouts.navigation,
            network_idle_timeout: self.config.timeouts.network_idle,
            process_timeout: self.config.timeouts.process,
            ..SecureBrowserOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::visual::VisualColor;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strong_visual_signal_selects_vision_first() {
        // Declared vars plus two filtered visual colors: the rendered
        // evidence leads and its strongest color heads the palette.
        let style = strings(&["#3b82f6", "#10b981"]);
        let visual = VisualOutcome::Extracted(vec![
            VisualColor {
                hex: "#3b82f6".to_string(),
                area: 1000,
            },
            VisualColor {
                hex: "#10b981".to_string(),
                area: 800,
            },
        ]);
        let (palette, strategy) = merge_signals(&style, &DomColorMap::default(), &visual, 8);
        assert_eq!(strategy, MergeStrategy::VisionFirst);
        assert_eq!(palette[0], "#3b82f6");
    }

    #[test]
    fn failed_visual_extraction_selects_dom_fallback() {
        let dom = DomColorMap {
            logo: strings(&["#3b82f6"]),
            cta: strings(&["#10b981"]),
            navigation: strings(&["#f59e0b"]),
            ..DomColorMap::default()
        };
        let (palette, strategy) = merge_signals(&[], &dom, &VisualOutcome::Failed, 8);
        assert_eq!(strategy, MergeStrategy::FallbackDom);
        assert_eq!(palette, vec!["#3b82f6", "#10b981", "#f59e0b"]);
    }

    #[test]
    fn single_visual_survivor_is_not_enough_for_vision_first() {
        let visual = VisualOutcome::Extracted(vec![VisualColor {
            hex: "#3b82f6".to_string(),
            area: 1000,
        }]);
        let (_, strategy) = merge_signals(&[], &DomColorMap::default(), &visual, 8);
        assert_eq!(strategy, MergeStrategy::FallbackDom);
    }

    #[tokio::test]
    async fn website_request_rejects_blocked_target_before_rendering() {
        let engine = ThemeEngine::default();
        let request = ExtractRequest {
            source: ExtractSource::Website,
            data: "http://169.254.169.254/latest/meta-data/".to_string(),
        };
        let err = engine.extract(&request).await.unwrap_err();
        assert!(matches!(err, BexError::HostNotAllowed));
    }

    #[tokio::test]
    async fn image_request_reports_missing_file() {
        let engine = ThemeEngine::default();
        let request = ExtractRequest {
            source: ExtractSource::File,
            data: "/nonexistent/brand.png".to_string(),
        };
        let err = engine.extract(&request).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn extraction_source_serializes_only_when_present() {
        let with = ExtractionResult {
            palette: strings(&["#3b82f6"]),
            suggested_theme: synthesize_theme(&strings(&["#3b82f6"])),
            source: Some(MergeStrategy::VisionFirst),
        };
        let json = serde_json::to_string(&with).unwrap();
        assert!(json.contains(r#""extractionSource":"vision-first""#));

        let without = ExtractionResult {
            source: None,
            ..with
        };
        let json = serde_json::to_string(&without).unwrap();
        assert!(!json.contains("extractionSource"));
        assert!(json.contains(r#""suggestedTheme""#));
    }

    #[test]
    fn request_wire_format_roundtrips() {
        let request: ExtractRequest =
            serde_json::from_str(r#"{"source":"website","data":"https://example.com"}"#).unwrap();
        assert_eq!(request.source, ExtractSource::Website);

        let request: ExtractRequest =
            serde_json::from_str(r#"{"source":"base64","data":"aGVsbG8="}"#).unwrap();
        assert_eq!(request.source, ExtractSource::Base64);
    }
}
