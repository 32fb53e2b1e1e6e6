use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceMirrorError {
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("quality must be between 0.0 and 1.0, got {0}")]
    InvalidQuality(f32),

    #[error("invalid angle search: {0}")]
    InvalidSearch(String),

    #[error("no face detected")]
    NoFaceDetected,

    #[error("search alignment needs a landmark detector or a detection")]
    MissingDetector,

    #[error("alignment needs 4 landmarks, got {found}")]
    InsufficientLandmarks { found: usize },

    #[error("crop region is degenerate ({width}x{height})")]
    DegenerateRegion { width: f64, height: f64 },

    #[error("cannot mirror an empty canvas ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
}
