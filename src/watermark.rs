//! Image watermarking.
//!
//! [`Watermarker::watermark`] downloads an image, draws the label on a
//! transparent layer (translucent plate, dark outline, bright fill) and
//! alpha-composites that layer over the original. Every failure, from the
//! download through decoding to encoding, comes back as
//! [`WatermarkOutcome::Failed`]; nothing escapes as an error.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::app::Result;
use crate::config::WatermarkConfig;
use crate::fetcher::Fetcher;
use crate::typeface::Typeface;

const PLATE: Rgba<u8> = Rgba([0, 0, 0, 100]);
const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 200]);
const FILL: Rgba<u8> = Rgba([255, 255, 255, 230]);

const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Label size relative to image width.
const WIDTH_DIVISOR: u32 = 25;
const MIN_FONT_PX: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkStyle {
    pub label: String,
    pub margin: i32,
    pub padding: u32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self::from(&WatermarkConfig::default())
    }
}

impl From<&WatermarkConfig> for WatermarkStyle {
    fn from(config: &WatermarkConfig) -> Self {
        Self {
            label: config.label.clone(),
            margin: config.margin,
            padding: config.padding,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WatermarkOutcome {
    /// PNG bytes of the watermarked image. Cloning shares the buffer.
    Applied(Bytes),
    Failed { reason: String },
}

impl WatermarkOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        WatermarkOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, WatermarkOutcome::Applied(_))
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            WatermarkOutcome::Applied(bytes) => Some(bytes),
            WatermarkOutcome::Failed { .. } => None,
        }
    }
}

pub struct Watermarker {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    typeface: Arc<Typeface>,
    style: WatermarkStyle,
}

impl Watermarker {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        typeface: Typeface,
        style: WatermarkStyle,
    ) -> Self {
        Self {
            fetcher,
            typeface: Arc::new(typeface),
            style,
        }
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    pub async fn watermark(&self, image_url: &str) -> WatermarkOutcome {
        let original = match self.fetcher.fetch(image_url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = image_url, error = %e, "Image download failed");
                return WatermarkOutcome::failed(format!("download failed: {e}"));
            }
        };

        let typeface = self.typeface.clone();
        let style = self.style.clone();
        let task =
            tokio::task::spawn_blocking(move || apply_watermark(&original, &typeface, &style));

        match task.await {
            Ok(Ok(bytes)) if !bytes.is_empty() => {
                tracing::debug!(url = image_url, size = bytes.len(), "Watermark applied");
                WatermarkOutcome::Applied(bytes)
            }
            Ok(Ok(_)) => WatermarkOutcome::failed("encoder produced no data"),
            Ok(Err(e)) => {
                tracing::warn!(url = image_url, error = %e, "Watermarking failed");
                WatermarkOutcome::failed(e.to_string())
            }
            Err(e) => {
                tracing::error!(url = image_url, error = %e, "Watermark task panicked");
                WatermarkOutcome::failed(format!("watermark task failed: {e}"))
            }
        }
    }
}

/// Decode `original`, composite the label layer over it and encode as PNG.
pub fn apply_watermark(
    original: &[u8],
    typeface: &Typeface,
    style: &WatermarkStyle,
) -> Result<Bytes> {
    let mut base = image::load_from_memory(original)?.to_rgba8();
    let layer = render_layer(base.width(), base.height(), typeface, style);

    image::imageops::overlay(&mut base, &layer, 0, 0);

    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(base).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(Bytes::from(buf))
}

pub fn font_px(width: u32) -> f32 {
    (width / WIDTH_DIVISOR).max(MIN_FONT_PX) as f32
}

/// Transparent layer holding only the label: plate, outline, fill.
fn render_layer(width: u32, height: u32, typeface: &Typeface, style: &WatermarkStyle) -> RgbaImage {
    let mut layer = RgbaImage::new(width, height);
    let px = font_px(width);
    let (text_w, text_h) = typeface.measure(&style.label, px);

    let x = style.margin;
    let y = (height as i32 - text_h as i32) / 2;
    let pad = style.padding;

    let plate = Rect::at(x - pad as i32, y - pad as i32)
        .of_size(text_w + 2 * pad + 1, text_h + 2 * pad + 1);
    draw_filled_rect_mut(&mut layer, plate, PLATE);

    for (dx, dy) in OUTLINE_OFFSETS {
        typeface.draw(&mut layer, OUTLINE, x + dx, y + dy, px, &style.label);
    }
    typeface.draw(&mut layer, FILL, x, y, px, &style.label);

    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MemebotError;
    use async_trait::async_trait;

    const BACKGROUND: Rgba<u8> = Rgba([200, 50, 50, 255]);

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, BACKGROUND);
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    struct StaticFetcher(std::result::Result<Vec<u8>, String>);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes> {
            match &self.0 {
                Ok(body) => Ok(Bytes::from(body.clone())),
                Err(msg) => Err(MemebotError::Other(msg.clone())),
            }
        }
    }

    fn watermarker(response: std::result::Result<Vec<u8>, String>) -> Watermarker {
        Watermarker::new(
            Arc::new(StaticFetcher(response)),
            Typeface::Builtin,
            WatermarkStyle::default(),
        )
    }

    #[test]
    fn test_font_px() {
        assert_eq!(font_px(1000), 40.0);
        assert_eq!(font_px(100), 8.0);
        assert_eq!(font_px(0), 8.0);
    }

    #[test]
    fn test_apply_preserves_dimensions_and_untouched_pixels() {
        let out = apply_watermark(&png(200, 100), &Typeface::Builtin, &WatermarkStyle::default())
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (200, 100));
        assert_eq!(*decoded.get_pixel(190, 90), BACKGROUND);
        assert_eq!(*decoded.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_apply_darkens_plate_region() {
        let out = apply_watermark(&png(200, 100), &Typeface::Builtin, &WatermarkStyle::default())
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();

        // inside the plate (margin 20, padding 5, label centred at y=46) but left of the text
        let plate_pixel = decoded.get_pixel(16, 43);
        assert!(plate_pixel[0] < BACKGROUND[0]);
        assert_eq!(plate_pixel[3], 255);
    }

    #[test]
    fn test_apply_draws_bright_label() {
        let out = apply_watermark(&png(200, 100), &Typeface::Builtin, &WatermarkStyle::default())
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();

        let brightest = decoded
            .enumerate_pixels()
            .filter(|(x, y, _)| *x < 80 && (40..60).contains(y))
            .map(|(_, _, p)| p[1])
            .max()
            .unwrap();
        assert!(brightest > 200, "label fill should be near white");
    }

    #[test]
    fn test_apply_output_is_png() {
        let out = apply_watermark(&png(64, 64), &Typeface::Builtin, &WatermarkStyle::default())
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_apply_tiny_image() {
        // label is larger than the image; drawing must clip, not fail
        let out = apply_watermark(&png(4, 4), &Typeface::Builtin, &WatermarkStyle::default());
        assert!(out.is_ok());
    }

    #[test]
    fn test_apply_rejects_undecodable_payload() {
        let style = WatermarkStyle::default();
        let result = apply_watermark(b"<html>404</html>", &Typeface::Builtin, &style);
        assert!(matches!(result, Err(MemebotError::Image(_))));
    }

    #[tokio::test]
    async fn test_watermark_download_failure_is_failure_value() {
        let outcome = watermarker(Err("connection refused".into()))
            .watermark("https://i.redd.it/missing.png")
            .await;

        assert!(!outcome.is_applied());
        assert!(outcome.bytes().is_none());
    }

    #[tokio::test]
    async fn test_watermark_undecodable_is_failure_value() {
        let outcome = watermarker(Ok(b"not an image".to_vec()))
            .watermark("https://i.redd.it/broken.png")
            .await;

        assert!(matches!(outcome, WatermarkOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_watermark_success_bytes_reusable() {
        let outcome = watermarker(Ok(png(120, 80)))
            .watermark("https://i.redd.it/ok.png")
            .await;

        let bytes = outcome.bytes().cloned().unwrap();
        let again = bytes.clone();
        assert!(image::load_from_memory(&bytes).is_ok());
        assert!(image::load_from_memory(&again).is_ok());
    }
}
