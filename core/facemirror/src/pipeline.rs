use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, RgbImage, RgbaImage};
use log::debug;

use crate::align::{find_best_angle_with, AlignmentConfig};
use crate::compositor::{render_aligned, render_symmetry_pair};
use crate::crop::{manual_region, plan_with, CropMargins};
use crate::error::FaceMirrorError;
use crate::face_detector::{best_detection, FaceDetection, LandmarkDetector};
use crate::remap::remap;
use crate::{AlignmentMode, EncodedImage, OutputFormat, SymmetryPhotos, SymmetryRasters};

/// Decode input bytes of a known `format` into a `DynamicImage`.
pub(crate) fn decode_image(
    input: &[u8],
    format: ImageFormat,
) -> Result<DynamicImage, FaceMirrorError> {
    image::load_from_memory_with_format(input, format)
        .map_err(|e| FaceMirrorError::DecodeError(e.to_string()))
}

/// Detect the input image format from the raw bytes.
pub(crate) fn detect_format(input: &[u8]) -> Result<ImageFormat, FaceMirrorError> {
    image::guess_format(input).map_err(|e| FaceMirrorError::DecodeError(e.to_string()))
}

/// Composite the alpha channel onto an opaque `matte` colour.
pub(crate) fn flatten_alpha(image: &RgbaImage, matte: [u8; 3]) -> RgbImage {
    let mut rgb = RgbImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let blend = |c: u8, m: u8| (c as f32 * alpha + m as f32 * inv_alpha).round() as u8;
        rgb.put_pixel(
            x,
            y,
            image::Rgb([blend(r, matte[0]), blend(g, matte[1]), blend(b, matte[2])]),
        );
    }

    rgb
}

/// Encode a raster. JPEG has no alpha, so it is flattened onto `matte`
/// first; PNG keeps transparency.
pub(crate) fn encode_image(
    image: &RgbaImage,
    format: &OutputFormat,
    quality: f32,
    matte: [u8; 3],
) -> Result<EncodedImage, FaceMirrorError> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let rgb = flatten_alpha(image, matte);
            let quality_percent = ((quality * 100.0).round() as u8).max(1);
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality_percent);
            encoder
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| FaceMirrorError::EncodeError(e.to_string()))?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buffer);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| FaceMirrorError::EncodeError(e.to_string()))?;
        }
    }

    Ok(EncodedImage {
        data: buffer,
        format: format.clone(),
        width: image.width(),
        height: image.height(),
    })
}

/// Settle which face to align: an explicit detection wins, otherwise the
/// detector's most confident face.
fn resolve_detection(
    source: &RgbaImage,
    detection: Option<&FaceDetection>,
    detector: Option<&dyn LandmarkDetector>,
) -> Result<FaceDetection, FaceMirrorError> {
    if let Some(face) = detection {
        return Ok(face.clone());
    }
    let detector = detector.ok_or(FaceMirrorError::MissingDetector)?;
    let faces = detector.detect(source);
    debug!("detector returned {} face(s)", faces.len());
    best_detection(faces).ok_or(FaceMirrorError::NoFaceDetected)
}

/// Produce the aligned, left and right rasters from a decoded image.
///
/// Search mode: detect → plan → remap → search angle → render → mirror.
/// Manual crop mode: clip the rectangle → render unrotated → mirror.
pub(crate) fn render_pipeline(
    source: &RgbaImage,
    mode: &AlignmentMode,
    detection: Option<&FaceDetection>,
    detector: Option<&dyn LandmarkDetector>,
    margins: &CropMargins,
    config: &AlignmentConfig,
) -> Result<SymmetryRasters, FaceMirrorError> {
    let (source_width, source_height) = source.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(FaceMirrorError::ZeroDimensions);
    }

    let (region, alignment, face) = match mode {
        AlignmentMode::Search => {
            let face = resolve_detection(source, detection, detector)?;
            let landmarks = face.face_landmarks()?;
            let region = plan_with(&face, source_width, source_height, margins);
            region.drawable_pixels()?;
            debug!("planned crop {region:?}");

            let local = remap(&landmarks, &region);
            let alignment =
                find_best_angle_with(&local, region.canvas_width, region.canvas_height, config);
            (region, Some(alignment), Some(face))
        }
        AlignmentMode::ManualCrop(rect) => {
            let region = manual_region(rect, source_width, source_height);
            debug!("manual crop {region:?}");
            (region, None, None)
        }
    };

    let angle = alignment.map_or(0.0, |a| a.angle_degrees);
    let aligned = render_aligned(source, &region, angle)?;
    let (left, right) = render_symmetry_pair(&aligned)?;

    Ok(SymmetryRasters {
        aligned,
        left,
        right,
        region,
        alignment,
        detection: face,
    })
}

/// Encode all three rasters with the same settings.
pub(crate) fn encode_rasters(
    rasters: &SymmetryRasters,
    format: &OutputFormat,
    quality: f32,
    matte: [u8; 3],
    original_size: usize,
) -> Result<SymmetryPhotos, FaceMirrorError> {
    Ok(SymmetryPhotos {
        aligned: encode_image(&rasters.aligned, format, quality, matte)?,
        left: encode_image(&rasters.left, format, quality, matte)?,
        right: encode_image(&rasters.right, format, quality, matte)?,
        region: rasters.region,
        alignment: rasters.alignment,
        original_size,
    })
}
