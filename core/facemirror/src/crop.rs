use serde::{Deserialize, Serialize};

use crate::error::FaceMirrorError;
use crate::face_detector::FaceDetection;
use crate::geometry::Point;

/// Margin added left of the face box (pixels).
pub const MARGIN_LEFT: f64 = 50.0;

/// Margin added right of the face box (pixels).
pub const MARGIN_RIGHT: f64 = 50.0;

/// Margin added above the face box for forehead and hair (pixels).
pub const MARGIN_TOP: f64 = 100.0;

/// Margin added below the face box for chin and neck (pixels).
pub const MARGIN_BOTTOM: f64 = 160.0;

/// Minimum canvas height / width ratio. Leaves room below the chin so a
/// rotated face is not clipped.
pub const PORTRAIT_ASPECT_FLOOR: f64 = 1.25;

/// Margins used to grow a face bounding box into a crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropMargins {
    /// Added left of the box.
    pub left: f64,
    /// Added right of the box.
    pub right: f64,
    /// Added above the box.
    pub top: f64,
    /// Added below the box.
    pub bottom: f64,
}

impl Default for CropMargins {
    fn default() -> Self {
        Self {
            left: MARGIN_LEFT,
            right: MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: MARGIN_BOTTOM,
        }
    }
}

/// A crop of the source image together with the canvas it is drawn onto.
///
/// The crop (`origin_*`, `width`, `height`) is in source-image pixels. The
/// canvas is at least as large as the crop; the crop is centered on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegion {
    /// Left edge of the crop in the source image.
    pub origin_x: f64,
    /// Top edge of the crop in the source image.
    pub origin_y: f64,
    /// Crop width.
    pub width: f64,
    /// Crop height.
    pub height: f64,
    /// Output canvas width.
    pub canvas_width: f64,
    /// Output canvas height.
    pub canvas_height: f64,
}

impl CropRegion {
    /// True when the crop or the canvas covers no whole pixel.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = self.canvas_pixels();
        !(self.width > 0.0 && self.height > 0.0) || w == 0 || h == 0
    }

    /// Where the crop's top-left corner lands on the canvas.
    pub fn canvas_offset(&self) -> Point {
        Point::new(
            (self.canvas_width - self.width) / 2.0,
            (self.canvas_height - self.height) / 2.0,
        )
    }

    /// Rotation pivot for both landmarks and pixels.
    pub fn canvas_center(&self) -> Point {
        Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    /// Canvas size in whole pixels. Fractional sizes are truncated, as a
    /// browser canvas does when given a fractional width or height.
    pub fn canvas_pixels(&self) -> (u32, u32) {
        (
            self.canvas_width.max(0.0).floor() as u32,
            self.canvas_height.max(0.0).floor() as u32,
        )
    }

    /// Canvas pixel size, or `DegenerateRegion` if nothing can be drawn.
    pub fn drawable_pixels(&self) -> Result<(u32, u32), FaceMirrorError> {
        if self.is_degenerate() {
            return Err(FaceMirrorError::DegenerateRegion {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.canvas_pixels())
    }
}

/// Plan the crop for `detection` with the default margins.
pub fn plan(detection: &FaceDetection, source_width: u32, source_height: u32) -> CropRegion {
    plan_with(detection, source_width, source_height, &CropMargins::default())
}

/// Plan the crop for `detection`, growing its box by `margins`.
///
/// The origin is clamped to the image, and the extent to what remains of the
/// image past the origin. The canvas keeps the crop width and is at least
/// [`PORTRAIT_ASPECT_FLOOR`] times as tall as it is wide. A box outside the
/// image yields a zero-area region; check [`CropRegion::is_degenerate`].
pub fn plan_with(
    detection: &FaceDetection,
    source_width: u32,
    source_height: u32,
    margins: &CropMargins,
) -> CropRegion {
    let (source_width, source_height) = (source_width as f64, source_height as f64);

    let origin_x = (detection.top_left.x - margins.left).max(0.0);
    let width = (source_width - origin_x)
        .min(detection.width() + margins.left + margins.right)
        .max(0.0);

    let origin_y = (detection.top_left.y - margins.top).max(0.0);
    let height = (source_height - origin_y)
        .min(detection.height() + margins.top + margins.bottom)
        .max(0.0);

    CropRegion {
        origin_x,
        origin_y,
        width,
        height,
        canvas_width: width,
        canvas_height: height.max(width * PORTRAIT_ASPECT_FLOOR),
    }
}

/// A rectangle chosen by hand in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Region for a hand-picked rectangle: clipped to the image, drawn onto a
/// canvas of exactly its own size.
pub fn manual_region(rect: &CropRect, source_width: u32, source_height: u32) -> CropRegion {
    let (source_width, source_height) = (source_width as f64, source_height as f64);

    let origin_x = rect.x.clamp(0.0, source_width);
    let origin_y = rect.y.clamp(0.0, source_height);
    let width = ((rect.x + rect.width).min(source_width) - origin_x).max(0.0);
    let height = ((rect.y + rect.height).min(source_height) - origin_y).max(0.0);

    CropRegion {
        origin_x,
        origin_y,
        width,
        height,
        canvas_width: width,
        canvas_height: height,
    }
}
