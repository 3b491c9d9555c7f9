use crate::error::AppError;
use base64::Engine;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

const DATA_URI_TYPES: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// A base64 image ready for the oracle: prefix stripped, format verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub format: ImageFormat,
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

impl ImagePayload {
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            _ => "image/jpeg",
        }
    }
}

/// Drop a `data:image/{png,jpg,jpeg,webp};base64,` prefix if present.
pub fn strip_data_uri(raw: &str) -> &str {
    let trimmed = raw.trim();
    for kind in DATA_URI_TYPES {
        let prefix = format!("data:image/{};base64,", kind);
        if let Some(rest) = trimmed.strip_prefix(prefix.as_str()) {
            return rest;
        }
    }
    trimmed
}

pub fn decode(raw: &str) -> Result<ImagePayload, AppError> {
    let encoded = strip_data_uri(raw);
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;

    let format = image::guess_format(&bytes)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
        return Err(AppError::Input(format!(
            "Unsupported image format {:?}; expected JPEG, PNG or WebP",
            format
        )));
    }

    // Header parse only; the oracle does the full decode.
    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format).into_dimensions()?;

    Ok(ImagePayload {
        format,
        base64: encoded.to_string(),
        width,
        height,
    })
}

/// Encode raw image bytes the way a browser file reader would: as a data URI.
pub fn to_data_uri(bytes: &[u8]) -> Result<String, AppError> {
    let format = image::guess_format(bytes)?;
    let kind = match format {
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Jpeg => "jpeg",
        other => {
            return Err(AppError::Input(format!(
                "Unsupported image format {:?}; expected JPEG, PNG or WebP",
                other
            )))
        }
    };
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:image/{};base64,{}", kind, b64))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    pub(crate) fn sample_image(format: ImageFormat) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 3, Rgb([10, 200, 30]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn strips_every_supported_prefix() {
        for kind in DATA_URI_TYPES {
            let raw = format!("data:image/{};base64,QUJD", kind);
            assert_eq!(strip_data_uri(&raw), "QUJD");
        }
        assert_eq!(strip_data_uri("QUJD"), "QUJD");
        assert_eq!(strip_data_uri("data:image/gif;base64,QUJD"), "data:image/gif;base64,QUJD");
    }

    #[test]
    fn decodes_png_data_uri() {
        let uri = to_data_uri(&sample_image(ImageFormat::Png)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let payload = decode(&uri).unwrap();
        assert_eq!(payload.format, ImageFormat::Png);
        assert_eq!(payload.mime_type(), "image/png");
        assert_eq!((payload.width, payload.height), (4, 3));
        assert!(!payload.base64.starts_with("data:"));
    }

    #[test]
    fn decodes_bare_jpeg_base64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(sample_image(ImageFormat::Jpeg));
        let payload = decode(&b64).unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(decode("not base64!!"), Err(AppError::Input(_))));
    }

    #[test]
    fn rejects_unsupported_format() {
        let bmp = sample_image(ImageFormat::Bmp);
        let b64 = base64::engine::general_purpose::STANDARD.encode(bmp);
        assert!(matches!(decode(&b64), Err(AppError::Input(_))));
        assert!(to_data_uri(&sample_image(ImageFormat::Bmp)).is_err());
    }

    #[test]
    fn rejects_non_image_bytes() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        assert!(matches!(decode(&b64), Err(AppError::Input(_))));
    }
}
