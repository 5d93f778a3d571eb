//! Rotation catalog: the six cubic-face orientations and a parametrized
//! tangent-plane rotation builder.
//!
//! All rotations map bearings from the pinhole patch frame into the sphere
//! camera frame, `v_sphere = R · v_patch`, using the axis convention of
//! [`crate::convert`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::math::{Mat3, Real};

/// One of the six cubemap faces along the camera-local axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    /// +X, right (lon 90°).
    PosX,
    /// -X, left (lon -90°).
    NegX,
    /// +Y, down (lat -90°; y points down).
    PosY,
    /// -Y, up (lat 90°).
    NegY,
    /// +Z, front (identity).
    PosZ,
    /// -Z, back (lon 180°).
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Stable integer id, usable as an image id in batch runs.
    pub fn id(self) -> i32 {
        match self {
            CubeFace::PosX => 0,
            CubeFace::NegX => 1,
            CubeFace::PosY => 2,
            CubeFace::NegY => 3,
            CubeFace::PosZ => 4,
            CubeFace::NegZ => 5,
        }
    }

    /// Face centre in angular coordinates (lon, lat) in degrees.
    fn lon_lat(self) -> (Real, Real) {
        match self {
            CubeFace::PosX => (90.0, 0.0),
            CubeFace::NegX => (-90.0, 0.0),
            CubeFace::PosY => (0.0, -90.0),
            CubeFace::NegY => (0.0, 90.0),
            CubeFace::PosZ => (0.0, 0.0),
            CubeFace::NegZ => (180.0, 0.0),
        }
    }
}

/// The six cubic-face rotations, built once and shared process-wide.
///
/// Safe for concurrent read access; the table is never mutated after first
/// construction.
pub fn cubic_rotations() -> &'static BTreeMap<CubeFace, Mat3> {
    static TABLE: OnceLock<BTreeMap<CubeFace, Mat3>> = OnceLock::new();
    TABLE.get_or_init(|| {
        CubeFace::ALL
            .iter()
            .map(|&face| {
                let (lon, lat) = face.lon_lat();
                (face, tangent_plane_rotation(lon, lat, 0.0))
            })
            .collect()
    })
}

/// Rotation whose tangent-plane normal points at `(lon, lat)`, with an
/// in-plane roll `rot` about that normal. Angles in degrees.
///
/// Composition order is yaw → pitch → roll, `R = Ry(lon) · Rx(lat) · Rz(rot)`,
/// so that `R · ẑ` equals the unit direction of `(lon, lat)` and
/// `tangent_plane_rotation(0, 0, 0)` is the identity.
pub fn tangent_plane_rotation(lon: Real, lat: Real, rot: Real) -> Mat3 {
    let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), lon.to_radians());
    let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), lat.to_radians());
    let roll = Rotation3::from_axis_angle(&Vector3::z_axis(), rot.to_radians());
    (yaw * pitch * roll).into_inner()
}

/// Deviation of `m` from a proper rotation: the orthonormality residual
/// `‖m·mᵗ - I‖` plus the determinant deviation `|det(m) - 1|`.
pub fn rotation_residual(m: &Mat3) -> Real {
    let ortho = (m * m.transpose() - Mat3::identity()).norm();
    let det = (m.determinant() - 1.0).abs();
    ortho + det
}

/// Validate that `m` is orthonormal with determinant +1 within `tol`.
pub fn ensure_rotation(m: &Mat3, tol: Real) -> Result<(), ProjectError> {
    let residual = rotation_residual(m);
    if residual > tol {
        return Err(ProjectError::InvalidRotationMatrix { residual });
    }
    Ok(())
}
