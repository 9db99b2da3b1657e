use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{render::svg, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to encode visual code: {0}")]
pub struct EncodeError(pub String);

/// Turns a payload into an opaque image URI.
pub trait VisualCodeEncoder: Send + Sync {
    fn encode(&self, payload: &str) -> Result<String, EncodeError>;
}

/// Renders QR codes as base64 SVG data URIs, entirely in-process.
#[derive(Debug, Clone, Default)]
pub struct QrCodeEncoder;

const MIN_DIMENSION: u32 = 200;

impl VisualCodeEncoder for QrCodeEncoder {
    fn encode(&self, payload: &str) -> Result<String, EncodeError> {
        let code = QrCode::new(payload.as_bytes()).map_err(|e| EncodeError(e.to_string()))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
            .build();

        Ok(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(image.as_bytes())
        ))
    }
}
