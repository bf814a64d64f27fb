//! Label image normalization.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use vinmap_core::defaults::IMAGE_MEDIA_TYPE;
use vinmap_core::{Error, Result};

/// Base64 image ready to inline into a gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub media_type: String,
    /// Base64 without a data-URL prefix or whitespace.
    pub data: String,
}

impl ImagePayload {
    /// Accept raw base64 or a `data:<mime>;base64,` URL.
    ///
    /// The media type comes from the prefix when present, otherwise from the
    /// decoded magic bytes, otherwise `image/jpeg`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (declared, payload) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| Error::Validation("Image data URL is malformed".to_string()))?;
                let mut parts = header.split(';');
                let mime = parts.next().unwrap_or("").trim();
                if !parts.any(|p| p.trim() == "base64") {
                    return Err(Error::Validation(
                        "Image data URL must be base64 encoded".to_string(),
                    ));
                }
                let mime = (!mime.is_empty()).then(|| mime.to_string());
                (mime, data)
            }
            None => (None, raw),
        };

        let data: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        if data.is_empty() {
            return Err(Error::Validation("Image is required".to_string()));
        }

        let bytes = STANDARD
            .decode(&data)
            .map_err(|e| Error::Validation(format!("Image is not valid base64: {}", e)))?;

        let media_type = declared
            .or_else(|| sniff_media_type(&bytes))
            .unwrap_or_else(|| IMAGE_MEDIA_TYPE.to_string());

        Ok(Self { media_type, data })
    }
}

fn sniff_media_type(bytes: &[u8]) -> Option<String> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type().to_string())
}
