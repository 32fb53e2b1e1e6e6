//! Face alignment and symmetry images from facial landmarks.
//!
//! Given a photo and the landmarks of one face (eyes, nose tip, mouth center
//! and a bounding box), this crate crops the face with generous margins,
//! finds the rotation that levels it, renders the rotated crop, and builds
//! two symmetry images: the left half mirrored onto the right, and the right
//! half mirrored onto the left.
//!
//! # Example
//!
//! ```no_run
//! use facemirror::{FaceDetection, FaceMirror, Point};
//!
//! let raw_bytes = std::fs::read("selfie.jpg").unwrap();
//! let face = FaceDetection {
//!     top_left: Point::new(180.0, 140.0),
//!     bottom_right: Point::new(420.0, 400.0),
//!     landmarks: vec![
//!         Point::new(250.0, 230.0),
//!         Point::new(350.0, 236.0),
//!         Point::new(301.0, 290.0),
//!         Point::new(302.0, 340.0),
//!     ],
//!     probability: 0.98,
//! };
//! let result = FaceMirror::new(raw_bytes)
//!     .unwrap()
//!     .detection(face)
//!     .process()
//!     .unwrap();
//! println!("rotated by {:?}", result.alignment);
//! ```
//!
//! The individual stages ([`plan`], [`remap`], [`find_best_angle`],
//! [`render_aligned`], [`render_symmetry_pair`]) are public for callers that
//! already hold a decoded raster.
#![warn(missing_docs)]

mod align;
mod compositor;
mod crop;
mod error;
/// Landmark detection traits and data types.
pub mod face_detector;
mod geometry;
mod pipeline;
mod remap;

pub use align::{
    alignment_cost, find_best_angle, find_best_angle_with, AlignmentConfig, AlignmentResult,
    AngleSearch, CostWeights, COARSE_LIMIT_DEGREES, EYES_DISTANCE_RATIO, FINE_SPAN_DEGREES,
    FINE_STEP_DEGREES, MAX_SEARCH_DEGREES, MIN_FINE_STEP_DEGREES, WEIGHT_EYES_DISTANCE,
    WEIGHT_EYES_LEVEL, WEIGHT_MOUTH_MIDLINE, WEIGHT_NOSE_MIDLINE,
};
pub use compositor::{render_aligned, render_symmetry_pair, BACKGROUND};
pub use crop::{
    manual_region, plan, plan_with, CropMargins, CropRect, CropRegion, MARGIN_BOTTOM,
    MARGIN_LEFT, MARGIN_RIGHT, MARGIN_TOP, PORTRAIT_ASPECT_FLOOR,
};
/// Error type returned by facemirror operations.
pub use error::FaceMirrorError;
pub use face_detector::{best_detection, FaceDetection, FaceLandmarks, LandmarkDetector};
pub use geometry::{midpoint, rotate_point, Point};
pub use remap::remap;

use image::RgbaImage;
use log::debug;

/// How the face is brought upright before mirroring.
#[derive(Debug, Clone, Default)]
pub enum AlignmentMode {
    /// Crop around the detected face and search for the leveling rotation.
    #[default]
    Search,

    /// Use a rectangle picked by hand; no detector, no rotation.
    ManualCrop(CropRect),
}

/// Output image format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG, flattened onto the matte colour.
    #[default]
    Jpeg,

    /// Lossless PNG with transparency kept.
    Png,
}

/// One encoded output image.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The encoded bytes.
    pub data: Vec<u8>,

    /// The format used.
    pub format: OutputFormat,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

/// Decoded results of one processing run.
#[derive(Debug, Clone)]
pub struct SymmetryRasters {
    /// The rotated, padded face crop.
    pub aligned: RgbaImage,

    /// Left half of `aligned` mirrored onto its right half.
    pub left: RgbaImage,

    /// Right half of `aligned` mirrored onto its left half.
    pub right: RgbaImage,

    /// The crop and canvas used.
    pub region: CropRegion,

    /// The chosen rotation; `None` for manual crops.
    pub alignment: Option<AlignmentResult>,

    /// The face that was aligned; `None` for manual crops.
    pub detection: Option<FaceDetection>,
}

/// Encoded results of one processing run.
#[derive(Debug, Clone)]
pub struct SymmetryPhotos {
    /// The rotated, padded face crop.
    pub aligned: EncodedImage,

    /// Left-symmetry image.
    pub left: EncodedImage,

    /// Right-symmetry image.
    pub right: EncodedImage,

    /// The crop and canvas used.
    pub region: CropRegion,

    /// The chosen rotation; `None` for manual crops.
    pub alignment: Option<AlignmentResult>,

    /// Size of the original input in bytes.
    pub original_size: usize,
}

/// Pre-configured output settings.
///
/// Presets only touch the output encoding; alignment settings are kept.
#[derive(Debug, Clone)]
pub enum Preset {
    /// JPEG at 0.92 quality on a black matte, matching what a browser
    /// produces when exporting a canvas as JPEG.
    Web,

    /// PNG with transparent background.
    Lossless,
}

/// JPEG quality used by [`Preset::Web`] and by default.
const WEB_JPEG_QUALITY: f32 = 0.92;

/// Builder that runs the full alignment and symmetry pipeline on one photo.
///
/// Decodes the input on construction. Every call to [`FaceMirror::render`] or
/// [`FaceMirror::process`] starts from scratch; nothing carries over between
/// photos.
pub struct FaceMirror {
    source: RgbaImage,
    original_size: usize,
    mode: AlignmentMode,
    detection: Option<FaceDetection>,
    detector: Option<Box<dyn LandmarkDetector>>,
    margins: CropMargins,
    alignment: AlignmentConfig,
    format: OutputFormat,
    quality: f32,
    matte: [u8; 3],
}

impl FaceMirror {
    /// Create a pipeline from raw image bytes (JPEG, PNG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, FaceMirrorError> {
        let format = pipeline::detect_format(&input)?;
        let decoded = pipeline::decode_image(&input, format)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(FaceMirrorError::ZeroDimensions);
        }
        debug!(
            "decoded {format:?} input {}x{}",
            decoded.width(),
            decoded.height()
        );

        Ok(Self::from_raster(decoded.to_rgba8()).with_original_size(input.len()))
    }

    /// Create a pipeline from an already decoded raster.
    pub fn from_raster(source: RgbaImage) -> Self {
        Self {
            source,
            original_size: 0,
            mode: AlignmentMode::default(),
            detection: None,
            detector: None,
            margins: CropMargins::default(),
            alignment: AlignmentConfig::default(),
            format: OutputFormat::default(),
            quality: WEB_JPEG_QUALITY,
            matte: [0, 0, 0],
        }
    }

    fn with_original_size(mut self, size: usize) -> Self {
        self.original_size = size;
        self
    }

    /// Apply an output preset.
    pub fn preset(mut self, preset: Preset) -> Self {
        match preset {
            Preset::Web => {
                self.format = OutputFormat::Jpeg;
                self.quality = WEB_JPEG_QUALITY;
                self.matte = [0, 0, 0];
            }
            Preset::Lossless => {
                self.format = OutputFormat::Png;
                self.quality = 1.0;
            }
        }
        self
    }

    /// Choose search-based alignment or a manual crop (default: search).
    pub fn mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use this face instead of running a detector.
    pub fn detection(mut self, detection: FaceDetection) -> Self {
        self.detection = Some(detection);
        self
    }

    /// Provide a landmark detector, used when no detection was given.
    ///
    /// ```no_run
    /// use facemirror::{FaceDetection, FaceMirror, LandmarkDetector};
    /// use image::RgbaImage;
    ///
    /// struct MyDetector;
    /// impl LandmarkDetector for MyDetector {
    ///     fn detect(&self, image: &RgbaImage) -> Vec<FaceDetection> {
    ///         // Run your model here
    ///         vec![]
    ///     }
    /// }
    ///
    /// let bytes = std::fs::read("selfie.jpg").unwrap();
    /// let result = FaceMirror::new(bytes).unwrap()
    ///     .detector(Box::new(MyDetector))
    ///     .process();
    /// ```
    pub fn detector(mut self, detector: Box<dyn LandmarkDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Set the crop margins around the face box (default: 50/50/100/160).
    pub fn margins(mut self, margins: CropMargins) -> Self {
        self.margins = margins;
        self
    }

    /// Set cost weights and search grid.
    pub fn alignment_config(mut self, config: AlignmentConfig) -> Self {
        self.alignment = config;
        self
    }

    /// Set the output format (default: JPEG).
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set JPEG quality from 0.0 to 1.0 (default: 0.92).
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Colour transparent pixels become in JPEG output (default: black).
    pub fn matte(mut self, matte: [u8; 3]) -> Self {
        self.matte = matte;
        self
    }

    /// Run the pipeline and return the decoded rasters.
    pub fn render(&self) -> Result<SymmetryRasters, FaceMirrorError> {
        self.alignment.search.validate()?;
        let rasters = pipeline::render_pipeline(
            &self.source,
            &self.mode,
            self.detection.as_ref(),
            self.detector.as_deref(),
            &self.margins,
            &self.alignment,
        )?;
        if let Some(alignment) = rasters.alignment {
            debug!(
                "aligned at {:.2}° (cost {:.3})",
                alignment.angle_degrees, alignment.cost
            );
        }
        Ok(rasters)
    }

    /// Run the pipeline and encode the three output images.
    pub fn process(&self) -> Result<SymmetryPhotos, FaceMirrorError> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(FaceMirrorError::InvalidQuality(self.quality));
        }
        let rasters = self.render()?;
        pipeline::encode_rasters(
            &rasters,
            &self.format,
            self.quality,
            self.matte,
            self.original_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        use image::codecs::png::PngEncoder;
        use image::ImageEncoder;
        use image::RgbImage;

        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new(&mut buffer);
        encoder
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buffer
    }

    fn face() -> FaceDetection {
        FaceDetection {
            top_left: Point::new(60.0, 110.0),
            bottom_right: Point::new(140.0, 200.0),
            landmarks: vec![
                Point::new(80.0, 140.0),
                Point::new(120.0, 143.0),
                Point::new(101.0, 165.0),
                Point::new(101.0, 185.0),
            ],
            probability: 0.9,
        }
    }

    #[test]
    fn builder_defaults_to_jpeg() {
        let png = make_test_png(200, 300);
        let result = FaceMirror::new(png.clone())
            .unwrap()
            .detection(face())
            .process()
            .unwrap();
        for image in [&result.aligned, &result.left, &result.right] {
            assert_eq!(image.data[0], 0xFF);
            assert_eq!(image.data[1], 0xD8);
            assert_eq!(image.format, OutputFormat::Jpeg);
        }
        assert_eq!(result.original_size, png.len());
        assert!(result.alignment.is_some());
    }

    #[test]
    fn all_outputs_share_dimensions() {
        let png = make_test_png(200, 300);
        let result = FaceMirror::new(png)
            .unwrap()
            .detection(face())
            .process()
            .unwrap();
        // width 80 + 100 = 180, height 90 + 260 = 350 clamped to 300 - 10 = 290
        assert_eq!((result.aligned.width, result.aligned.height), (180, 290));
        assert_eq!((result.left.width, result.left.height), (180, 290));
        assert_eq!((result.right.width, result.right.height), (180, 290));
    }

    #[test]
    fn preset_lossless_produces_png() {
        let png = make_test_png(200, 300);
        let result = FaceMirror::new(png)
            .unwrap()
            .detection(face())
            .preset(Preset::Lossless)
            .process()
            .unwrap();
        assert_eq!(&result.left.data[1..4], b"PNG");
    }

    #[test]
    fn preset_can_be_overridden() {
        let png = make_test_png(200, 300);
        let result = FaceMirror::new(png)
            .unwrap()
            .detection(face())
            .preset(Preset::Lossless)
            .format(OutputFormat::Jpeg)
            .process()
            .unwrap();
        assert_eq!(result.aligned.data[0], 0xFF);
    }

    #[test]
    fn invalid_quality_is_rejected() {
        let png = make_test_png(100, 100);
        let result = FaceMirror::new(png)
            .unwrap()
            .detection(face())
            .quality(1.5)
            .process();
        assert!(matches!(result, Err(FaceMirrorError::InvalidQuality(_))));
    }

    #[test]
    fn unbounded_search_is_rejected() {
        let png = make_test_png(200, 300);
        let config = AlignmentConfig {
            search: AngleSearch {
                coarse_limit: i32::MIN,
                ..AngleSearch::default()
            },
            ..AlignmentConfig::default()
        };
        let result = FaceMirror::new(png)
            .unwrap()
            .detection(face())
            .alignment_config(config)
            .process();
        assert!(matches!(result, Err(FaceMirrorError::InvalidSearch(_))));
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert!(FaceMirror::new(b"not an image".to_vec()).is_err());
    }

    #[test]
    fn insufficient_landmarks_surface_immediately() {
        let png = make_test_png(200, 300);
        let mut face = face();
        face.landmarks.truncate(2);
        let result = FaceMirror::new(png).unwrap().detection(face).render();
        assert!(matches!(
            result,
            Err(FaceMirrorError::InsufficientLandmarks { found: 2 })
        ));
    }

    #[test]
    fn render_is_repeatable() {
        let mirror = FaceMirror::from_raster(RgbaImage::from_fn(120, 160, |x, y| {
            image::Rgba([(x * 2) as u8, (y + 40) as u8, 7, 255])
        }))
        .detection(FaceDetection {
            top_left: Point::new(30.0, 40.0),
            bottom_right: Point::new(90.0, 110.0),
            landmarks: vec![
                Point::new(45.0, 60.0),
                Point::new(75.0, 64.0),
                Point::new(61.0, 80.0),
                Point::new(62.0, 95.0),
            ],
            probability: 0.8,
        });
        let a = mirror.render().unwrap();
        let b = mirror.render().unwrap();
        assert_eq!(a.aligned, b.aligned);
        assert_eq!(a.alignment, b.alignment);
    }
}
