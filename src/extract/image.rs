//! Byte acquisition for the image-only extraction path.
//!
//! Linked images go through the same URL validation as website targets, and
//! the HTTP client is pinned to the validated address, so the image path
//! cannot be used as an SSRF side door.

use std::net::SocketAddr;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::FetchConfig;
use crate::validator::validate_target;
use crate::{BexError, Result};

/// Reads an uploaded image from local disk.
pub async fn read_image_file(path: &str) -> Result<Vec<u8>> {
    let path = Path::new(path);
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BexError::request(format!(
            "File not found: {}",
            path.display()
        ))),
        Err(e) => Err(BexError::Io(e)),
    }
}

/// Fetches a linked image after full URL validation, with the client bound
/// to the resolved address and redirects disabled (a redirect would escape
/// the pinned host).
pub async fn fetch_image_bytes(raw_url: &str, cfg: &FetchConfig) -> Result<Vec<u8>> {
    let target = validate_target(raw_url).await?;

    let client = reqwest::Client::builder()
        .timeout(cfg.timeout)
        .redirect(reqwest::redirect::Policy::none())
        .resolve(&target.hostname, SocketAddr::new(target.resolved_ip, 0))
        .build()?;

    let response = client
        .get(target.url.clone())
        .send()
        .await?
        .error_for_status()?;

    if let Some(len) = response.content_length() {
        if len > cfg.max_image_bytes {
            return Err(BexError::request("Image too large"));
        }
    }

    let bytes = response.bytes().await?;
    if bytes.len() as u64 > cfg.max_image_bytes {
        return Err(BexError::request("Image too large"));
    }

    Ok(bytes.to_vec())
}

/// Decodes base64 image data, tolerating a `data:*;base64,` prefix and
/// embedded whitespace.
pub fn decode_base64_image(data: &str) -> Result<Vec<u8>> {
    let trimmed = data.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => trimmed,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| BexError::request(format!("Invalid base64 image data: {}", e)))
}
