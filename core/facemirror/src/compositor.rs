use image::{Rgba, RgbaImage};

use crate::crop::CropRegion;
use crate::error::FaceMirrorError;
use crate::geometry::{rotate_point, Point};

/// Fill for canvas pixels the rotated crop does not cover: transparent black,
/// the initial state of a fresh 2D canvas.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Draw the crop of `source` described by `region` onto its canvas, rotated
/// by `angle_degrees` about the canvas center.
///
/// Each output pixel center is mapped back through the inverse rotation. If
/// it lands inside the crop rectangle the source is sampled bilinearly,
/// otherwise the pixel is [`BACKGROUND`]. The rotation matches
/// [`rotate_point`], so a landmark rotated by the same angle stays on the
/// pixel it marked.
pub fn render_aligned(
    source: &RgbaImage,
    region: &CropRegion,
    angle_degrees: f64,
) -> Result<RgbaImage, FaceMirrorError> {
    let (width, height) = region.drawable_pixels()?;
    if source.width() == 0 || source.height() == 0 {
        return Err(FaceMirrorError::ZeroDimensions);
    }

    let center = region.canvas_center();
    let offset = region.canvas_offset();
    let mut out = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let canvas = rotate_point(
            Point::new(x as f64 + 0.5, y as f64 + 0.5),
            center,
            -angle_degrees,
        );
        let local = canvas - offset;
        if local.x < 0.0 || local.y < 0.0 || local.x >= region.width || local.y >= region.height {
            continue;
        }
        // Back to pixel-index space (centers at integer coordinates)
        let sx = local.x + region.origin_x - 0.5;
        let sy = local.y + region.origin_y - 0.5;
        *pixel = sample_bilinear(source, sx, sy);
    }

    Ok(out)
}

/// Bilinear sample at pixel-index coordinates, clamping to the image edge.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = (image.width() - 1) as f64;
    let max_y = (image.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let a = image.get_pixel(x0, y0).0;
    let b = image.get_pixel(x1, y0).0;
    let c = image.get_pixel(x0, y1).0;
    let d = image.get_pixel(x1, y1).0;

    let mut blended = [0u8; 4];
    for (i, channel) in blended.iter_mut().enumerate() {
        let top = a[i] as f64 * (1.0 - fx) + b[i] as f64 * fx;
        let bottom = c[i] as f64 * (1.0 - fx) + d[i] as f64 * fx;
        *channel = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(blended)
}

/// Build the left- and right-symmetry images from an aligned face.
///
/// The left image keeps columns `[0, width/2)` and replaces the right side
/// with their mirror image; the right image does the opposite. Mirroring is a
/// reflection about the vertical centerline, so column `x` is sourced from
/// column `width - 1 - x`. For odd widths the middle column is shared and
/// kept in both.
pub fn render_symmetry_pair(
    aligned: &RgbaImage,
) -> Result<(RgbaImage, RgbaImage), FaceMirrorError> {
    let (width, height) = aligned.dimensions();
    if width == 0 || height == 0 {
        return Err(FaceMirrorError::EmptyCanvas { width, height });
    }

    let half = width / 2;
    let mut left = aligned.clone();
    let mut right = aligned.clone();

    for y in 0..height {
        for d in 0..half {
            let outer_left = d;
            let outer_right = width - 1 - d;
            left.put_pixel(outer_right, y, *aligned.get_pixel(outer_left, y));
            right.put_pixel(outer_left, y, *aligned.get_pixel(outer_right, y));
        }
    }

    Ok((left, right))
}
