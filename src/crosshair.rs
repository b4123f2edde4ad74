//! Crosshair bitmap construction
//!
//! Pipeline: load source image, optionally recolor its opaque pixels, fit it
//! into `size x size`, then scale alpha by the opacity setting. Without a
//! usable source image a plus-sign is drawn instead. Rendering never fails
//! from the caller's point of view; the worst case is a 40x40 red plus-sign.

use anyhow::{Result, bail};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::config::SettingsRecord;
use crate::constants::render;

/// Final RGBA bitmap (straight alpha) the overlay displays as-is
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBitmap {
    image: RgbaImage,
}

impl RenderedBitmap {
    /// Last-resort bitmap: 40x40 opaque red plus-sign
    pub fn fallback() -> Self {
        Self {
            image: draw_plus(render::FALLBACK_SIZE, Rgb::from(render::FALLBACK_RGB)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major RGBA bytes
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Inputs of one crosshair render
#[derive(Debug, Clone, Copy)]
pub struct CrosshairParams<'a> {
    pub image_path: Option<&'a Path>,
    pub size: u32,
    pub color: Rgb,
    pub opacity: f32,
    pub use_color_overlay: bool,
}

impl<'a> CrosshairParams<'a> {
    /// Params for `settings`, with the source path already resolved by the caller
    pub fn from_settings(settings: &SettingsRecord, image_path: Option<&'a Path>) -> Self {
        Self {
            image_path,
            size: settings.size,
            color: settings.rgb(),
            opacity: settings.opacity,
            use_color_overlay: settings.use_color_overlay,
        }
    }
}

/// Render the crosshair described by `params`
pub fn build(params: &CrosshairParams<'_>) -> RenderedBitmap {
    match try_build(params) {
        Ok(image) => {
            debug!(width = image.width(), height = image.height(), "Rendered crosshair");
            RenderedBitmap { image }
        }
        Err(e) => {
            warn!(error = %e, "Crosshair rendering failed, using fallback");
            RenderedBitmap::fallback()
        }
    }
}

fn try_build(params: &CrosshairParams<'_>) -> Result<RgbaImage> {
    if params.size == 0 {
        bail!("crosshair size must be non-zero");
    }

    let mut image = match params.image_path.and_then(load_source) {
        Some(mut source) => {
            if params.use_color_overlay {
                recolor(&mut source, params.color);
            }
            let fitted = fit_to_size(source, params.size);
            if fitted.width() == 0 || fitted.height() == 0 {
                bail!(
                    "resized crosshair is empty ({}x{})",
                    fitted.width(),
                    fitted.height()
                );
            }
            fitted
        }
        None => draw_plus(params.size, params.color),
    };

    if params.opacity < 1.0 {
        apply_opacity(&mut image, params.opacity);
    }

    Ok(image)
}

/// Decode `path`; `None` when it is missing or unreadable
fn load_source(path: &Path) -> Option<RgbaImage> {
    if !path.exists() {
        debug!(path = %path.display(), "Crosshair image not found, drawing plus-sign");
        return None;
    }
    match image::open(path) {
        Ok(decoded) => Some(decoded.into_rgba8()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to decode crosshair image, drawing plus-sign");
            None
        }
    }
}

/// Replace RGB of every pixel with alpha > 0, keeping alpha exactly
pub fn recolor(image: &mut RgbaImage, color: Rgb) {
    let [r, g, b] = color.channels();
    for px in image.chunks_exact_mut(4) {
        if px[3] > 0 {
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

/// Largest aspect-preserving fit inside `size x size`, bilinear filtering
fn fit_to_size(image: RgbaImage, size: u32) -> RgbaImage {
    if (image.width() == size && image.height() <= size)
        || (image.height() == size && image.width() <= size)
    {
        return image;
    }
    DynamicImage::ImageRgba8(image)
        .resize(size, size, FilterType::Triangle)
        .into_rgba8()
}

/// Centered plus-sign with 2px strokes spanning the whole canvas
pub fn draw_plus(size: u32, color: Rgb) -> RgbaImage {
    let [r, g, b] = color.channels();
    let ink = Rgba([r, g, b, u8::MAX]);
    let mut image = RgbaImage::new(size, size);

    let center = size / 2;
    let start = center.saturating_sub(render::LINE_THICKNESS / 2);
    let end = (start + render::LINE_THICKNESS).min(size);

    for along in 0..size {
        for across in start..end {
            image.put_pixel(across, along, ink);
            image.put_pixel(along, across, ink);
        }
    }
    image
}

/// Scale every pixel's alpha by `opacity` (clamped to 0.0..=1.0)
pub fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    for px in image.chunks_exact_mut(4) {
        px[3] = (px[3] as f32 * opacity).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GREEN: Rgb = Rgb::new(0, 255, 0);

    fn params(path: Option<&Path>, size: u32, opacity: f32, overlay: bool) -> CrosshairParams<'_> {
        CrosshairParams {
            image_path: path,
            size,
            color: GREEN,
            opacity,
            use_color_overlay: overlay,
        }
    }

    fn alpha_channel(image: &RgbaImage) -> Vec<u8> {
        image.pixels().map(|p| p.0[3]).collect()
    }

    #[test]
    fn test_recolor_preserves_alpha_exactly() {
        let mut image = RgbaImage::from_fn(4, 1, |x, _| match x {
            0 => Rgba([10, 20, 30, 0]),
            1 => Rgba([10, 20, 30, 1]),
            2 => Rgba([200, 100, 50, 128]),
            _ => Rgba([1, 2, 3, 255]),
        });
        let before = alpha_channel(&image);

        recolor(&mut image, GREEN);

        assert_eq!(alpha_channel(&image), before);
        assert_eq!(image.get_pixel(0, 0), &Rgba([10, 20, 30, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0, 255, 0, 1]));
        assert_eq!(image.get_pixel(2, 0), &Rgba([0, 255, 0, 128]));
        assert_eq!(image.get_pixel(3, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_plus_sign_geometry() {
        let image = draw_plus(40, GREEN);
        assert_eq!(image.dimensions(), (40, 40));

        // Strokes cover columns/rows 19 and 20 end to end
        for i in 0..40 {
            for line in [19, 20] {
                assert_eq!(image.get_pixel(line, i), &Rgba([0, 255, 0, 255]));
                assert_eq!(image.get_pixel(i, line), &Rgba([0, 255, 0, 255]));
            }
        }
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(18, 5).0[3], 0);
        assert_eq!(image.get_pixel(21, 39).0[3], 0);
    }

    #[test]
    fn test_missing_image_draws_plus_at_requested_size() {
        let bitmap = build(&params(Some(Path::new("/definitely/not/here.png")), 64, 1.0, true));
        assert_eq!((bitmap.width(), bitmap.height()), (64, 64));
        assert_eq!(bitmap.image().get_pixel(32, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_no_path_draws_plus() {
        let bitmap = build(&params(None, 10, 1.0, true));
        assert_eq!(bitmap.image(), &draw_plus(10, GREEN));
    }

    #[test]
    fn test_corrupt_image_falls_back_to_plus_with_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"this is not a png").unwrap();

        let bitmap = build(&params(Some(&path), 30, 1.0, false));
        assert_eq!(bitmap.image(), &draw_plus(30, GREEN));
    }

    #[test]
    fn test_zero_size_uses_fixed_fallback() {
        let bitmap = build(&params(None, 0, 1.0, true));
        assert_eq!(bitmap, RenderedBitmap::fallback());
        assert_eq!((bitmap.width(), bitmap.height()), (40, 40));
        assert_eq!(bitmap.image().get_pixel(20, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_loaded_image_is_recolored_with_alpha_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.png");
        let source = RgbaImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 { Rgba([9, 9, 9, 0]) } else { Rgba([50, 60, 70, 77]) }
        });
        source.save(&path).unwrap();

        // Same size as the source, so no resampling happens
        let bitmap = build(&params(Some(&path), 16, 1.0, true));

        assert_eq!(alpha_channel(bitmap.image()), alpha_channel(&source));
        for px in bitmap.image().pixels() {
            if px.0[3] > 0 {
                assert_eq!(&px.0[..3], &[0, 255, 0]);
            } else {
                assert_eq!(px.0[3], 0);
            }
        }
    }

    #[test]
    fn test_loaded_image_without_overlay_keeps_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let source = RgbaImage::from_pixel(8, 8, Rgba([12, 34, 56, 255]));
        source.save(&path).unwrap();

        let bitmap = build(&params(Some(&path), 8, 1.0, false));
        assert_eq!(bitmap.image(), &source);
    }

    #[test]
    fn test_resize_preserves_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255])).save(&path).unwrap();

        let bitmap = build(&params(Some(&path), 10, 1.0, true));
        assert_eq!((bitmap.width(), bitmap.height()), (10, 5));

        let bigger = build(&params(Some(&path), 80, 1.0, true));
        assert_eq!((bigger.width(), bigger.height()), (80, 40));
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let half = build(&params(None, 20, 0.5, true));
        assert_eq!(half.image().get_pixel(10, 0).0[3], 128);
        assert_eq!(half.image().get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_opacity_half_then_full_restores_alpha() {
        let original = draw_plus(20, GREEN);

        let half = build(&params(None, 20, 0.5, true));
        assert_ne!(alpha_channel(half.image()), alpha_channel(&original));

        let full = build(&params(None, 20, 1.0, true));
        assert_eq!(alpha_channel(full.image()), alpha_channel(&original));
    }

    #[test]
    fn test_apply_opacity_clamps() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 200]));
        apply_opacity(&mut image, -1.0);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);

        let mut image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 200]));
        apply_opacity(&mut image, 7.0);
        assert_eq!(image.get_pixel(0, 0).0[3], 200);
    }

    #[test]
    fn test_params_from_settings() {
        let settings = SettingsRecord {
            size: 33,
            color: "#0000FF".to_string(),
            opacity: 0.25,
            use_color_overlay: false,
            ..SettingsRecord::default()
        };
        let p = CrosshairParams::from_settings(&settings, None);
        assert_eq!(p.size, 33);
        assert_eq!(p.color, Rgb::new(0, 0, 255));
        assert_eq!(p.opacity, 0.25);
        assert!(!p.use_color_overlay);
        assert!(p.image_path.is_none());
    }
}
