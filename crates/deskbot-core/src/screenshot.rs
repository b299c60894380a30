//! Screenshot pipeline: capture → downscale → JPEG.

use std::sync::Arc;

use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ExtendedColorType,
    ImageEncoder, RgbaImage,
};

use crate::{
    config::Settings, errors::Error, messaging::types::Photo, ports::ScreenCapture, Result,
};

pub const SCREENSHOT_FILE_NAME: &str = "ScreenShot.jpg";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenshotOptions {
    /// Bounding box for downscaling; `0` on either side disables resizing.
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            max_width: 1280,
            max_height: 720,
            jpeg_quality: 75,
        }
    }
}

impl From<&Settings> for ScreenshotOptions {
    fn from(s: &Settings) -> Self {
        Self {
            max_width: s.screenshot_max_width,
            max_height: s.screenshot_max_height,
            jpeg_quality: s.jpeg_quality,
        }
    }
}

/// Caption attached to every screenshot.
pub fn caption(user: &str) -> String {
    format!("From: {user}")
}

/// Downscale (never upscale) to fit the bounding box, keeping the aspect ratio.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if max_width == 0 || max_height == 0 {
        return img;
    }
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

/// Turn a raw capture into the photo attachment.
pub fn render(raw: RgbaImage, opts: ScreenshotOptions) -> Result<Photo> {
    let img = fit_within(
        DynamicImage::ImageRgba8(raw),
        opts.max_width,
        opts.max_height,
    );
    tracing::debug!(width = img.width(), height = img.height(), "encoding screenshot");

    Ok(Photo {
        file_name: SCREENSHOT_FILE_NAME.to_string(),
        bytes: encode_jpeg(&img, opts.jpeg_quality)?,
    })
}

/// Capture the primary display and render it on the blocking pool.
pub async fn capture(source: Arc<dyn ScreenCapture>, opts: ScreenshotOptions) -> Result<Photo> {
    tokio::task::spawn_blocking(move || {
        let raw = source.capture_primary()?;
        tracing::info!(width = raw.width(), height = raw.height(), "captured display");
        render(raw, opts)
    })
    .await
    .map_err(|e| Error::Capture(format!("capture task failed: {e}")))?
}
