//! Geometry primitives for spherical-to-pinhole reprojection.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Mat3`, ...),
//! - conversions between normalized points, bearing vectors and lon/lat,
//! - the cubic-face and tangent-plane rotation catalog,
//! - tagged pinhole/spherical camera descriptors,
//! - an RGB bitmap with interpolated sampling and file I/O.
//!
//! Reprojection pipeline (per destination pixel):
//! `pixel -> normalized point -> bearing -> rotate -> sphere pixel -> sample`

/// Bitmap container and interpolated sampling.
pub mod bitmap;
/// Camera descriptors and factories.
pub mod camera;
/// Coordinate and error-magnitude conversions.
pub mod convert;
/// Error kinds shared across the workspace.
pub mod error;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Cubic-face and tangent-plane rotations.
pub mod rotation;

pub use bitmap::{Bitmap, Pixel};
pub use camera::{pinhole_focal_length, Camera, CameraModel};
pub use convert::*;
pub use error::ProjectError;
pub use math::*;
pub use rotation::{
    cubic_rotations, ensure_rotation, rotation_residual, tangent_plane_rotation, CubeFace,
};
