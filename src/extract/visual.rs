//! Screenshot analysis: hue binning and the grayscale filter.
//!
//! Recovers brand colors that only exist in raster assets (a logo, a hero
//! image) by clustering sampled pixels into quantized hue bins weighted by
//! area. Large low-saturation regions (page backgrounds, text) would win on
//! area alone, so a separate grayscale filter strips them before strategy
//! selection.

use image::DynamicImage;
use palette::{FromColor, Hsl, Srgb};
use serde::Serialize;

use crate::color::parse_hex_rgb;
use crate::config::ExtractionConfig;
use crate::Result;

/// One dominant hue-bin representative and its pixel weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualColor {
    pub hex: String,
    pub area: u32,
}

/// Decodes an image and clusters its pixels into hue bins, ordered by
/// descending area. Decode failures propagate; the orchestrator treats them
/// the same as a too-weak visual signal.
pub fn extract_hue_binned_colors(
    bytes: &[u8],
    cfg: &ExtractionConfig,
) -> Result<Vec<VisualColor>> {
    let img = image::load_from_memory(bytes)?;
    Ok(hue_binned_from_image(&img, cfg))
}

#[derive(Clone, Copy, Default)]
struct HueBin {
    count: u32,
    hue_sum: f64,
    saturation_sum: f64,
    lightness_sum: f64,
}

/// Samples pixels on a stride grid and accumulates them into fixed-width
/// hue bins; each bin's representative is the mean H/S/L of its members.
pub fn hue_binned_from_image(img: &DynamicImage, cfg: &ExtractionConfig) -> Vec<VisualColor> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let bins = cfg.hue_bins.max(1) as usize;
    let bin_width = 360.0_f32 / bins as f32;
    let stride = cfg.sample_stride.max(1) as usize;

    let mut acc = vec![HueBin::default(); bins];

    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            let pixel = rgba.get_pixel(x, y).0;
            if pixel[3] < 128 {
                continue;
            }
            let hsl = Hsl::from_color(
                Srgb::new(pixel[0], pixel[1], pixel[2]).into_format::<f32>(),
            );
            let hue = hsl.hue.into_positive_degrees();
            let idx = ((hue / bin_width) as usize).min(bins - 1);
            let bin = &mut acc[idx];
            bin.count += 1;
            bin.hue_sum += hue as f64;
            bin.saturation_sum += hsl.saturation as f64;
            bin.lightness_sum += hsl.lightness as f64;
        }
    }

    let mut out: Vec<VisualColor> = acc
        .into_iter()
        .filter(|bin| bin.count > 0)
        .map(|bin| {
            let n = bin.count as f64;
            let mean = Hsl::new(
                (bin.hue_sum / n) as f32,
                (bin.saturation_sum / n) as f32,
                (bin.lightness_sum / n) as f32,
            );
            let rgb = Srgb::from_color(mean).into_format::<u8>();
            VisualColor {
                hex: format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue),
                area: bin.count,
            }
        })
        .collect();

    out.sort_by(|a, b| b.area.cmp(&a.area));
    out
}

/// Removes near-neutral entries: low saturation, near-black, or near-white.
pub fn filter_grayscale(colors: &[VisualColor], cfg: &ExtractionConfig) -> Vec<VisualColor> {
    colors
        .iter()
        .filter(|c| {
            let Some((r, g, b)) = parse_hex_rgb(&c.hex) else {
                return false;
            };
            let hsl = Hsl::from_color(Srgb::new(r, g, b).into_format::<f32>());
            hsl.saturation >= cfg.grayscale_saturation_cutoff
                && hsl.lightness >= cfg.min_lightness
                && hsl.lightness <= cfg.max_lightness
        })
        .cloned()
        .collect()
}

/// Full image-to-palette pipeline for the image-only extraction path:
/// hue bins, grayscale filter, capped ordered hex list.
pub fn palette_from_image_bytes(bytes: &[u8], cfg: &ExtractionConfig) -> Result<Vec<String>> {
    let bins = extract_hue_binned_colors(bytes, cfg)?;
    let filtered = filter_grayscale(&bins, cfg);
    Ok(filtered
        .into_iter()
        .take(cfg.max_palette)
        .map(|c| c.hex)
        .collect())
}
