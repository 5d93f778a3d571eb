//! Spherical-to-pinhole resampling.
//!
//! [`resample`] fills a single pinhole patch by inverse-mapping every
//! destination pixel through a rotation into the source equirectangular
//! image; [`batch`] drives the resampler over an ordered list of image ids
//! and persists one patch per id.

/// Batch orchestration over image ids.
pub mod batch;
/// Single-patch resamplers.
pub mod resample;

pub use batch::{
    patch_filename, spherical_to_pinhole, spherical_to_pinhole_from_path, PatchOutcome,
    ProjectionMode,
};
pub use resample::{spherical_to_patch, spherical_to_tangent, ROTATION_TOL};
