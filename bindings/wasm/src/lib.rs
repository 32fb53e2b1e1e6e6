use facemirror::{
    AlignmentConfig, AlignmentMode, CropMargins, CropRect, FaceDetection, FaceMirror,
    FaceMirrorError, OutputFormat, Point, SymmetryPhotos,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Options for symmetry rendering, passed as a JavaScript object.
///
/// All fields are optional. When a `preset` is specified, its defaults apply
/// and individual fields override them.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MirrorOptions {
    pub preset: Option<String>,
    pub format: Option<String>,
    pub quality: Option<f32>,
    pub matte: Option<[u8; 3]>,
    pub margins: Option<CropMargins>,
    pub alignment: Option<AlignmentConfig>,
}

/// A face prediction in the shape a BlazeFace-style detector returns it:
/// corners and landmarks as `[x, y]` pairs.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub top_left: [f64; 2],
    pub bottom_right: [f64; 2],
    pub landmarks: Vec<[f64; 2]>,
    #[serde(default = "full_confidence")]
    pub probability: f64,
}

fn full_confidence() -> f64 {
    1.0
}

impl From<Prediction> for FaceDetection {
    fn from(p: Prediction) -> Self {
        FaceDetection {
            top_left: Point::from(p.top_left),
            bottom_right: Point::from(p.bottom_right),
            landmarks: p.landmarks.into_iter().map(Point::from).collect(),
            probability: p.probability,
        }
    }
}

fn format_to_str(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::Jpeg => "jpeg",
        OutputFormat::Png => "png",
    }
}

fn string_to_preset(preset: &str) -> Result<facemirror::Preset, JsValue> {
    match preset {
        "web" => Ok(facemirror::Preset::Web),
        "lossless" => Ok(facemirror::Preset::Lossless),
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown preset: {preset}"),
        )),
    }
}

fn string_to_format(format: &str) -> Result<OutputFormat, JsValue> {
    match format {
        "jpeg" => Ok(OutputFormat::Jpeg),
        "png" => Ok(OutputFormat::Png),
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown format: {format}"),
        )),
    }
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

/// Convert a `FaceMirrorError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: FaceMirrorError) -> JsValue {
    let code = match &e {
        FaceMirrorError::DecodeError(_) => "DECODE_ERROR",
        FaceMirrorError::ZeroDimensions => "ZERO_DIMENSIONS",
        FaceMirrorError::EncodeError(_) => "ENCODE_ERROR",
        FaceMirrorError::InvalidQuality(_) => "INVALID_QUALITY",
        FaceMirrorError::InvalidSearch(_) => "INVALID_SEARCH",
        FaceMirrorError::NoFaceDetected => "NO_FACE_DETECTED",
        FaceMirrorError::MissingDetector => "MISSING_DETECTOR",
        FaceMirrorError::InsufficientLandmarks { .. } => "INSUFFICIENT_LANDMARKS",
        FaceMirrorError::DegenerateRegion { .. } => "DEGENERATE_REGION",
        FaceMirrorError::EmptyCanvas { .. } => "EMPTY_CANVAS",
    };
    make_error(code, &e.to_string())
}

fn parse_value<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid {what}: {e}")))
}

fn parse_options(options: JsValue) -> Result<MirrorOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(MirrorOptions::default())
    } else {
        parse_value(options, "options")
    }
}

/// Apply parsed `MirrorOptions` to a `FaceMirror`, returning the configured
/// builder ready for processing.
fn apply_options(mut mirror: FaceMirror, opts: &MirrorOptions) -> Result<FaceMirror, JsValue> {
    if let Some(ref p) = opts.preset {
        mirror = mirror.preset(string_to_preset(p)?);
    }
    if let Some(ref fmt) = opts.format {
        mirror = mirror.format(string_to_format(fmt)?);
    }
    if let Some(q) = opts.quality {
        mirror = mirror.quality(q);
    }
    if let Some(matte) = opts.matte {
        mirror = mirror.matte(matte);
    }
    if let Some(margins) = opts.margins {
        mirror = mirror.margins(margins);
    }
    if let Some(config) = opts.alignment {
        mirror = mirror.alignment_config(config);
    }
    Ok(mirror)
}

fn build_image_object(image: &facemirror::EncodedImage) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let data = js_sys::Uint8Array::from(&image.data[..]);
    js_sys::Reflect::set(&obj, &"data".into(), &data)?;
    js_sys::Reflect::set(
        &obj,
        &"format".into(),
        &JsValue::from_str(format_to_str(&image.format)),
    )?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(image.width))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(image.height))?;
    Ok(JsValue::from(obj))
}

/// Build a plain JS object from a `SymmetryPhotos`.
fn build_result_object(photos: &SymmetryPhotos) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &"aligned".into(), &build_image_object(&photos.aligned)?)?;
    js_sys::Reflect::set(&obj, &"left".into(), &build_image_object(&photos.left)?)?;
    js_sys::Reflect::set(&obj, &"right".into(), &build_image_object(&photos.right)?)?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(photos.aligned.width))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(photos.aligned.height))?;
    js_sys::Reflect::set(
        &obj,
        &"originalSize".into(),
        &JsValue::from(photos.original_size as u32),
    )?;

    let (angle, cost) = match photos.alignment {
        Some(a) => (JsValue::from(a.angle_degrees), JsValue::from(a.cost)),
        None => (JsValue::from(0.0), JsValue::NULL),
    };
    js_sys::Reflect::set(&obj, &"angle".into(), &angle)?;
    js_sys::Reflect::set(&obj, &"cost".into(), &cost)?;

    let region = serde_wasm_bindgen::to_value(&photos.region)
        .map_err(|e| make_error("ENCODE_ERROR", &e.to_string()))?;
    js_sys::Reflect::set(&obj, &"region".into(), &region)?;

    Ok(JsValue::from(obj))
}

/// Level a face and build its left and right symmetry images.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param prediction - Face prediction with topLeft, bottomRight, landmarks
///   (at least left eye, right eye, nose, mouth as [x, y]) and probability
/// @param options - Optional object with fields: preset, format, quality,
///   matte, margins, alignment
#[wasm_bindgen(js_name = "processPhoto")]
pub fn process_photo(
    input: Vec<u8>,
    prediction: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let prediction: Prediction = parse_value(prediction, "prediction")?;

    let mirror = FaceMirror::new(input)
        .map_err(to_js_error)?
        .detection(prediction.into());
    let mirror = apply_options(mirror, &opts)?;

    let result = mirror.process().map_err(to_js_error)?;

    build_result_object(&result)
}

/// Build symmetry images from a hand-picked rectangle, without rotation.
///
/// @param input - Raw image bytes (JPEG, PNG, or WebP)
/// @param rect - Object with x, y, width, height in source pixels
/// @param options - Optional object, as for `processPhoto`
#[wasm_bindgen(js_name = "processManualCrop")]
pub fn process_manual_crop(
    input: Vec<u8>,
    rect: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let rect: CropRect = parse_value(rect, "rect")?;

    let mirror = FaceMirror::new(input)
        .map_err(to_js_error)?
        .mode(AlignmentMode::ManualCrop(rect));
    let mirror = apply_options(mirror, &opts)?;

    let result = mirror.process().map_err(to_js_error)?;

    build_result_object(&result)
}
