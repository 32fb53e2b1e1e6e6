//! Rotation search that levels the eyes and puts nose and mouth on one
//! vertical line.
//!
//! The cost of an angle is a weighted sum of four misalignment terms measured
//! after rotating the landmarks about the canvas center. The search is a grid
//! search: every whole degree in `[-coarse_limit, coarse_limit]`, then a finer
//! grid around the best coarse angle. Earlier angles win ties.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::FaceMirrorError;
use crate::face_detector::FaceLandmarks;
use crate::geometry::{midpoint, rotate_point, Point};

/// Weight of the vertical offset between the eyes.
pub const WEIGHT_EYES_LEVEL: f64 = 0.2;

/// Weight of the nose's horizontal offset from the eyes' midpoint.
pub const WEIGHT_NOSE_MIDLINE: f64 = 0.1;

/// Weight of the mouth's horizontal offset from the nose.
pub const WEIGHT_MOUTH_MIDLINE: f64 = 0.1;

/// Weight of the horizontal eye distance error.
pub const WEIGHT_EYES_DISTANCE: f64 = 0.6;

/// Expected horizontal eye distance as a fraction of the canvas width.
pub const EYES_DISTANCE_RATIO: f64 = 0.3;

/// Coarse phase covers every whole degree in `[-45, 45]`.
pub const COARSE_LIMIT_DEGREES: i32 = 45;

/// Fine phase covers the best coarse angle ± this many degrees.
pub const FINE_SPAN_DEGREES: f64 = 2.0;

/// Fine phase step.
pub const FINE_STEP_DEGREES: f64 = 0.1;

/// Largest accepted coarse limit and fine span.
pub const MAX_SEARCH_DEGREES: f64 = 180.0;

/// Smallest accepted positive fine step.
pub const MIN_FINE_STEP_DEGREES: f64 = 1e-3;

/// Weights of the alignment cost terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostWeights {
    /// See [`WEIGHT_EYES_LEVEL`].
    pub eyes_level: f64,
    /// See [`WEIGHT_NOSE_MIDLINE`].
    pub nose_midline: f64,
    /// See [`WEIGHT_MOUTH_MIDLINE`].
    pub mouth_midline: f64,
    /// See [`WEIGHT_EYES_DISTANCE`].
    pub eyes_distance: f64,
    /// See [`EYES_DISTANCE_RATIO`].
    pub eyes_distance_ratio: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            eyes_level: WEIGHT_EYES_LEVEL,
            nose_midline: WEIGHT_NOSE_MIDLINE,
            mouth_midline: WEIGHT_MOUTH_MIDLINE,
            eyes_distance: WEIGHT_EYES_DISTANCE,
            eyes_distance_ratio: EYES_DISTANCE_RATIO,
        }
    }
}

/// Grid used by [`find_best_angle_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AngleSearch {
    /// Coarse phase covers whole degrees in `[-coarse_limit, coarse_limit]`.
    pub coarse_limit: i32,
    /// Fine phase half-width around the coarse winner, in degrees.
    pub fine_span: f64,
    /// Fine phase step in degrees. Zero or negative skips the fine phase.
    pub fine_step: f64,
}

impl AngleSearch {
    /// Check the grid is bounded: `coarse_limit` in `[0, 180]`, a finite
    /// `fine_span` in `[0, 180]`, and a `fine_step` that is either at most
    /// zero (no fine phase) or at least [`MIN_FINE_STEP_DEGREES`].
    pub fn validate(&self) -> Result<(), FaceMirrorError> {
        if !(0.0..=MAX_SEARCH_DEGREES).contains(&(self.coarse_limit as f64)) {
            return Err(FaceMirrorError::InvalidSearch(format!(
                "coarse limit must be between 0 and {MAX_SEARCH_DEGREES}, got {}",
                self.coarse_limit
            )));
        }
        if !(0.0..=MAX_SEARCH_DEGREES).contains(&self.fine_span) {
            return Err(FaceMirrorError::InvalidSearch(format!(
                "fine span must be between 0 and {MAX_SEARCH_DEGREES}, got {}",
                self.fine_span
            )));
        }
        let step = self.fine_step;
        if step.is_nan() || (step > 0.0 && step < MIN_FINE_STEP_DEGREES) {
            return Err(FaceMirrorError::InvalidSearch(format!(
                "fine step must be at most 0 or at least {MIN_FINE_STEP_DEGREES}, got {}",
                self.fine_step
            )));
        }
        Ok(())
    }
}

impl Default for AngleSearch {
    fn default() -> Self {
        Self {
            coarse_limit: COARSE_LIMIT_DEGREES,
            fine_span: FINE_SPAN_DEGREES,
            fine_step: FINE_STEP_DEGREES,
        }
    }
}

/// Everything that tunes the alignment search.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Cost term weights.
    pub weights: CostWeights,
    /// Search grid.
    pub search: AngleSearch,
}

/// The chosen rotation and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentResult {
    /// Rotation to apply, same convention as [`rotate_point`].
    pub angle_degrees: f64,
    /// Cost at that rotation.
    pub cost: f64,
}

/// Misalignment of `landmarks` after rotating them by `angle_degrees` about
/// the center of a `canvas_width` × `canvas_height` canvas.
pub fn alignment_cost(
    landmarks: &FaceLandmarks,
    canvas_width: f64,
    canvas_height: f64,
    angle_degrees: f64,
    weights: &CostWeights,
) -> f64 {
    let center = Point::new(canvas_width / 2.0, canvas_height / 2.0);
    let rotated = landmarks.map(|p| rotate_point(p, center, angle_degrees));

    let eyes_center = midpoint(rotated.left_eye, rotated.right_eye);
    let eyes_level = (rotated.left_eye.y - rotated.right_eye.y).abs();
    let nose_midline = (rotated.nose_tip.x - eyes_center.x).abs();
    let mouth_midline = (rotated.mouth_center.x - rotated.nose_tip.x).abs();
    let eyes_distance = (rotated.left_eye.x - rotated.right_eye.x).abs();
    let eyes_distance_error = (eyes_distance - canvas_width * weights.eyes_distance_ratio).abs();

    weights.eyes_level * eyes_level
        + weights.nose_midline * nose_midline
        + weights.mouth_midline * mouth_midline
        + weights.eyes_distance * eyes_distance_error
}

/// Find the best rotation with the default weights and grid.
///
/// `landmarks` must already be in canvas coordinates (see [`crate::remap`]).
pub fn find_best_angle(
    landmarks: &FaceLandmarks,
    canvas_width: f64,
    canvas_height: f64,
) -> AlignmentResult {
    find_best_angle_with(
        landmarks,
        canvas_width,
        canvas_height,
        &AlignmentConfig::default(),
    )
}

/// Find the best rotation with explicit weights and grid.
///
/// A grid outside the bounds of [`AngleSearch::validate`] is clamped into
/// them, so the search always finishes.
pub fn find_best_angle_with(
    landmarks: &FaceLandmarks,
    canvas_width: f64,
    canvas_height: f64,
    config: &AlignmentConfig,
) -> AlignmentResult {
    let cost = |angle: f64| {
        alignment_cost(
            landmarks,
            canvas_width,
            canvas_height,
            angle,
            &config.weights,
        )
    };

    let limit = config
        .search
        .coarse_limit
        .unsigned_abs()
        .min(MAX_SEARCH_DEGREES as u32) as i32;
    let mut best = AlignmentResult {
        angle_degrees: 0.0,
        cost: f64::INFINITY,
    };
    for degree in -limit..=limit {
        let angle = degree as f64;
        let c = cost(angle);
        if c < best.cost {
            best = AlignmentResult {
                angle_degrees: angle,
                cost: c,
            };
        }
    }
    debug!(
        "coarse search: {:.1}° (cost {:.3})",
        best.angle_degrees, best.cost
    );

    // Offsets are generated from an integer index so the grid does not drift
    // and always contains the coarse angle itself.
    let coarse_angle = best.angle_degrees;
    let step = config.search.fine_step;
    if step > 0.0 {
        let step = step.max(MIN_FINE_STEP_DEGREES);
        let span = config.search.fine_span.clamp(0.0, MAX_SEARCH_DEGREES);
        // NaN span casts to zero: only the coarse angle is re-evaluated
        let steps = (span / step).round() as i64;
        for i in -steps..=steps {
            let angle = coarse_angle + i as f64 * step;
            let c = cost(angle);
            if c < best.cost {
                best = AlignmentResult {
                    angle_degrees: angle,
                    cost: c,
                };
            }
        }
    }
    debug!(
        "fine search: {:.2}° (cost {:.3})",
        best.angle_degrees, best.cost
    );

    best
}
