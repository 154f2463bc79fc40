//! Per-signal extraction stages: declared style variables, semantically
//! tagged DOM elements, screenshot hue analysis, and the image-only path.

pub mod dom;
pub mod image;
pub mod style_vars;
pub mod visual;
