//! Brand Extraction Engine (BEX) Library
//!
//! Extracts brand color palettes from rendered websites and standalone
//! images, and synthesizes complete, contrast-safe UI themes from them.
//! Website targets are validated against SSRF (including DNS rebinding)
//! before a sandboxed headless browser, pinned to the resolved address,
//! renders the page.
//!
//! # Module Overview
//!
//! - [`validator`] - URL validation, DNS resolution, IP blocklist
//! - [`browser`] - Sandboxed headless rendering and in-page signal capture
//! - [`color`] - CSS color normalization and conversions
//! - [`extract`] - Style-variable, DOM, screenshot, and image extraction
//! - [`merge`] - Palette merge strategies and strategy selection
//! - [`theme`] - Theme synthesis (ten semantic roles)
//! - [`engine`] - Request orchestration
//! - [`config`] - Engine tunables
//!
//! # Example
//!
//! ```no_run
//! use bex_lib::{Config, ExtractRequest, ExtractSource, ThemeEngine};
//!
//! # async fn example() -> bex_lib::Result<()> {
//! let engine = ThemeEngine::new(Config::default());
//! let result = engine
//!     .extract(&ExtractRequest {
//!         source: ExtractSource::Website,
//!         data: "https://example.com".to_string(),
//!     })
//!     .await?;
//!
//! println!("palette: {:?}", result.palette);
//! println!("primary: {}", result.suggested_theme.primary);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod merge;
pub mod theme;
pub mod validator;
pub mod viewport;

pub use browser::{
    capture_page, PageSignals, SecureBrowserOptions, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_NETWORK_IDLE_TIMEOUT, DEFAULT_PROCESS_TIMEOUT,
};
pub use color::{hex_from_css, hex_to_hsl_triplet, normalize, relative_luminance};
pub use config::{Config, ExtractionConfig, FetchConfig, Timeouts};
pub use engine::{merge_signals, ExtractRequest, ExtractSource, ExtractionResult, ThemeEngine};
pub use error::{BexError, ErrorCategory, ErrorPayload, Result};
pub use extract::dom::{correlate_dom_colors, DomColorMap, RawDomColors};
pub use extract::image::{decode_base64_image, fetch_image_bytes, read_image_file};
pub use extract::style_vars::{prioritize_style_variables, StyleVariables};
pub use extract::visual::{
    extract_hue_binned_colors, filter_grayscale, palette_from_image_bytes, VisualColor,
};
pub use merge::{
    merge_dom_fallback, merge_vision_first, select_strategy, MergeStrategy, VisualOutcome,
};
pub use theme::{synthesize_theme, ThemeColors};
pub use validator::{validate_target, ValidatedTarget};
pub use viewport::Viewport;
