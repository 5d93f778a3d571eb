use thiserror::Error;

/// Errors surfaced by coordinate conversions, camera construction and
/// reprojection.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid camera dimensions {width}x{height}")]
    InvalidCameraDimensions { width: u32, height: u32 },
    #[error("matrix is not a proper rotation (orthonormality residual {residual:.3e})")]
    InvalidRotationMatrix { residual: f64 },
    #[error("coordinate conversion failed: {0}")]
    ConversionError(String),
    #[error("expected a {expected} camera")]
    CameraModelMismatch { expected: &'static str },
    #[error("no rotation registered for image id {0}")]
    MissingRotation(i32),
    #[error("failed to load source image: {0}")]
    SourceLoadFailure(String),
    #[error("failed to write output image: {0}")]
    OutputWriteFailure(String),
}
