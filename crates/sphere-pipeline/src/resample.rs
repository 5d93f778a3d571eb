//! Per-patch inverse-mapping resamplers.
//!
//! Both entry points walk every destination pixel of the output patch,
//! backward-project it through the pinhole camera, rotate the bearing into
//! the sphere frame and sample the source equirectangular image. They differ
//! only in how the rotated bearing becomes a source pixel: the full
//! spherical forward projection, or a gnomonic tangent-plane approximation.

use sphere_core::{
    bearing_vector_to_lon_lat, ensure_rotation, normalized_point_to_bearing_vector,
    tangent_plane_rotation, Bitmap, Camera, Mat3, ProjectError, Real, Vec2, Vec3,
};

/// Tolerance for the orthonormality check on input rotations.
pub const ROTATION_TOL: Real = 1e-6;

fn validate(
    sphere_camera: &Camera,
    sphere_bitmap: &Bitmap,
    rotation: &Mat3,
    pinhole_camera: &Camera,
) -> Result<(), ProjectError> {
    ensure_rotation(rotation, ROTATION_TOL)?;
    if !sphere_camera.is_spherical() {
        return Err(ProjectError::CameraModelMismatch {
            expected: "spherical",
        });
    }
    if pinhole_camera.is_spherical() {
        return Err(ProjectError::CameraModelMismatch {
            expected: "pinhole",
        });
    }
    if sphere_bitmap.width() != sphere_camera.width()
        || sphere_bitmap.height() != sphere_camera.height()
    {
        return Err(ProjectError::InvalidCameraDimensions {
            width: sphere_bitmap.width(),
            height: sphere_bitmap.height(),
        });
    }
    Ok(())
}

/// Resample one pinhole patch out of a spherical image through the full
/// spherical forward projection.
///
/// `rotation` maps bearings from the patch frame into the sphere frame.
/// Longitude sampling wraps modulo 360°; latitude clamps at the poles.
pub fn spherical_to_patch(
    sphere_camera: &Camera,
    sphere_bitmap: &Bitmap,
    rotation: &Mat3,
    pinhole_camera: &Camera,
) -> Result<Bitmap, ProjectError> {
    validate(sphere_camera, sphere_bitmap, rotation, pinhole_camera)?;
    let mut out = Bitmap::new(pinhole_camera.width(), pinhole_camera.height());
    for v in 0..out.height() {
        for u in 0..out.width() {
            let px = Vec2::new(u as Real + 0.5, v as Real + 0.5);
            let n = pinhole_camera.unproject_normalized(&px)?;
            let bearing = normalized_point_to_bearing_vector(&n)?;
            let rotated = rotation * bearing;
            let src = sphere_camera.project(&rotated)?;
            out.put_pixel(u, v, sphere_bitmap.sample_equirect(src.x - 0.5, src.y - 0.5));
        }
    }
    Ok(out)
}

/// Resample one pinhole patch using the tangent-plane (gnomonic)
/// approximation.
///
/// The rotated bearing is projected onto the plane tangent to the sphere at
/// the rotation's target direction, and the plane coordinates are mapped to
/// source pixels treating the equirectangular grid as locally flat at
/// uniform angular scale. Exact at the patch centre, increasingly distorted
/// toward the edges; intended for narrow fields of view. Destination pixels
/// whose bearing falls on or behind the tangent plane stay black.
pub fn spherical_to_tangent(
    sphere_camera: &Camera,
    sphere_bitmap: &Bitmap,
    rotation: &Mat3,
    pinhole_camera: &Camera,
) -> Result<Bitmap, ProjectError> {
    validate(sphere_camera, sphere_bitmap, rotation, pinhole_camera)?;

    let target = rotation * Vec3::z();
    let centre = bearing_vector_to_lon_lat(&target)?;
    // Roll-free tangent basis at the target direction; the in-plane part of
    // `rotation` is already carried by the rotated bearings.
    let basis = tangent_plane_rotation(centre.lon, centre.lat, 0.0);
    let e1 = basis.column(0).into_owned();
    let e2 = basis.column(1).into_owned();
    let centre_px = sphere_camera.lon_lat_to_pixel(&centre);
    let px_per_rad_x = sphere_camera.width() as Real / (2.0 * std::f64::consts::PI);
    let px_per_rad_y = sphere_camera.height() as Real / std::f64::consts::PI;

    let mut out = Bitmap::new(pinhole_camera.width(), pinhole_camera.height());
    for v in 0..out.height() {
        for u in 0..out.width() {
            let px = Vec2::new(u as Real + 0.5, v as Real + 0.5);
            let n = pinhole_camera.unproject_normalized(&px)?;
            let bearing = normalized_point_to_bearing_vector(&n)?;
            let rotated = rotation * bearing;
            let depth = rotated.dot(&target);
            if depth <= 0.0 {
                continue;
            }
            let gx = rotated.dot(&e1) / depth;
            let gy = rotated.dot(&e2) / depth;
            let src_x = centre_px.x + gx * px_per_rad_x;
            let src_y = centre_px.y + gy * px_per_rad_y;
            out.put_pixel(u, v, sphere_bitmap.sample_equirect(src_x - 0.5, src_y - 0.5));
        }
    }
    Ok(out)
}
