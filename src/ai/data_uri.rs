use crate::{Error, Result};
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};

/// Standard alphabet, accepting payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded image bytes plus the extension announced by the data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl GeneratedImage {
    pub fn content_type(&self) -> String {
        format!("image/{}", self.extension)
    }
}

/// Decodes `data:image/<ext>;base64,<payload>` into raw bytes.
pub fn decode_data_uri(uri: &str) -> Result<GeneratedImage> {
    let rest = uri
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| Error::InvalidImageFormat("missing data:image/ prefix".to_string()))?;

    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| Error::InvalidImageFormat("missing ;base64, marker".to_string()))?;

    if extension.is_empty()
        || !extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::InvalidImageFormat(format!(
            "unsupported image extension '{}'",
            extension
        )));
    }

    if payload.is_empty() {
        return Err(Error::InvalidImageFormat("empty image payload".to_string()));
    }

    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|e| Error::InvalidImageFormat(format!("failed to decode base64 image: {}", e)))?;

    Ok(GeneratedImage {
        bytes,
        extension: extension.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let image = decode_data_uri("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, vec![0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(image.content_type(), "image/png");
    }

    #[test]
    fn test_decode_jpeg() {
        let image = decode_data_uri("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(image.extension, "jpeg");
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_unpadded_payload_decodes() {
        let image = decode_data_uri("data:image/png;base64,iVBORw").unwrap();
        assert_eq!(image.bytes, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_extension_case_is_kept() {
        let image = decode_data_uri("data:image/PNG;base64,iVBORw==").unwrap();
        assert_eq!(image.extension, "PNG");
        assert_eq!(image.content_type(), "image/PNG");
    }

    #[test]
    fn test_plain_url_is_rejected() {
        let err = decode_data_uri("https://example.com/a.png").unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }

    #[test]
    fn test_missing_base64_marker_is_rejected() {
        let err = decode_data_uri("data:image/png,iVBORw==").unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }

    #[test]
    fn test_svg_plus_xml_extension_is_rejected() {
        let err = decode_data_uri("data:image/svg+xml;base64,PHN2Zz4=").unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let err = decode_data_uri("data:image/png;base64,").unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let err = decode_data_uri("data:image/png;base64,!!!invalid!!!").unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }
}
