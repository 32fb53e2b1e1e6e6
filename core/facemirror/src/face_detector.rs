use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::FaceMirrorError;
use crate::geometry::Point;

/// One face reported by a landmark detector, in source-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    /// Top-left corner of the face bounding box.
    pub top_left: Point,
    /// Bottom-right corner of the face bounding box.
    pub bottom_right: Point,
    /// Landmarks in detector order: left eye, right eye, nose tip, mouth
    /// center. Detectors may append more points; they are ignored.
    pub landmarks: Vec<Point>,
    /// Detection confidence in `[0, 1]`.
    pub probability: f64,
}

impl FaceDetection {
    /// Bounding box width.
    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    /// Bounding box height.
    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    /// Horizontal center of the bounding box.
    pub fn center_x(&self) -> f64 {
        (self.top_left.x + self.bottom_right.x) / 2.0
    }

    /// The four named landmarks the aligner needs.
    pub fn face_landmarks(&self) -> Result<FaceLandmarks, FaceMirrorError> {
        FaceLandmarks::from_points(&self.landmarks)
    }
}

/// The four named landmarks, in whatever coordinate frame they were built in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    /// Center of the left eye.
    pub left_eye: Point,
    /// Center of the right eye.
    pub right_eye: Point,
    /// Tip of the nose.
    pub nose_tip: Point,
    /// Center of the mouth.
    pub mouth_center: Point,
}

impl FaceLandmarks {
    /// Take the first four points in detector order. Extra points are ignored.
    pub fn from_points(points: &[Point]) -> Result<Self, FaceMirrorError> {
        match points {
            [left_eye, right_eye, nose_tip, mouth_center, ..] => Ok(Self {
                left_eye: *left_eye,
                right_eye: *right_eye,
                nose_tip: *nose_tip,
                mouth_center: *mouth_center,
            }),
            _ => Err(FaceMirrorError::InsufficientLandmarks {
                found: points.len(),
            }),
        }
    }

    /// Apply `f` to every landmark.
    pub fn map(self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            left_eye: f(self.left_eye),
            right_eye: f(self.right_eye),
            nose_tip: f(self.nose_tip),
            mouth_center: f(self.mouth_center),
        }
    }
}

/// Pluggable landmark detection backend.
///
/// Implement this trait to connect a face landmark model (BlazeFace, ONNX,
/// dlib, ...) and pass it to [`crate::FaceMirror::detector`].
pub trait LandmarkDetector: Send + Sync {
    /// Detect faces in a decoded RGBA image. An empty vector means no face.
    fn detect(&self, image: &RgbaImage) -> Vec<FaceDetection>;
}

/// Pick the highest-probability detection. Ties keep the earliest one.
pub fn best_detection(detections: Vec<FaceDetection>) -> Option<FaceDetection> {
    detections.into_iter().reduce(|best, candidate| {
        if candidate.probability > best.probability {
            candidate
        } else {
            best
        }
    })
}
