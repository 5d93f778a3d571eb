//! Conversions between normalized image points, unit bearing vectors and
//! angular (longitude/latitude) coordinates, plus error-magnitude scaling
//! between the image, camera and sphere planes.
//!
//! Axis convention used everywhere in this crate: x right, y down, z forward.
//! Longitude is `atan2(x, z)` in degrees (positive to the right of the
//! optical axis), latitude is `-asin(y)` in degrees (positive up). A sign or
//! composition-order change here silently mirrors every output patch, so the
//! convention is fixed once and shared by [`crate::rotation`] and
//! [`crate::camera`].

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::math::{Real, Vec2, Vec3};

/// Angular coordinates in degrees: `lon ∈ [-180, 180]`, `lat ∈ [-90, 90]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: Real,
    pub lat: Real,
}

impl LonLat {
    pub fn new(lon: Real, lat: Real) -> Self {
        Self { lon, lat }
    }
}

fn check_dims(width: u32, height: u32) -> Result<(), ProjectError> {
    if width == 0 || height == 0 {
        return Err(ProjectError::InvalidCameraDimensions { width, height });
    }
    Ok(())
}

/// Pixel-to-normalized scale factor: the mean of the per-axis focal lengths
/// of a 90°-fov pinhole camera with the given dimensions.
fn camera_plane_factor(width: u32, height: u32) -> Real {
    (width as Real + height as Real) / 4.0
}

/// Pixel-to-angular scale factor: the mean of the per-axis derivatives of
/// the equirectangular unprojection, in radians per pixel.
fn sphere_plane_factor(width: u32, height: u32) -> Real {
    let dlon = 2.0 * std::f64::consts::PI / width as Real;
    let dlat = std::f64::consts::PI / height as Real;
    (dlon + dlat) / 2.0
}

/// Normalize a pixel-space error magnitude to the camera (normalized) plane.
pub fn image_plane_to_camera_plane_error(
    width: u32,
    height: u32,
    image_error: Real,
) -> Result<Real, ProjectError> {
    check_dims(width, height)?;
    Ok(image_error / camera_plane_factor(width, height))
}

/// Convert a camera-plane error magnitude back to pixels.
pub fn camera_plane_to_image_plane_error(
    width: u32,
    height: u32,
    camera_error: Real,
) -> Result<Real, ProjectError> {
    check_dims(width, height)?;
    Ok(camera_error * camera_plane_factor(width, height))
}

/// Normalize a pixel-space error magnitude to the sphere (angular) plane,
/// in radians.
pub fn image_plane_to_sphere_plane_error(
    width: u32,
    height: u32,
    image_error: Real,
) -> Result<Real, ProjectError> {
    check_dims(width, height)?;
    Ok(image_error * sphere_plane_factor(width, height))
}

/// Convert a sphere-plane error magnitude (radians) back to pixels.
pub fn sphere_plane_to_image_plane_error(
    width: u32,
    height: u32,
    sphere_error: Real,
) -> Result<Real, ProjectError> {
    check_dims(width, height)?;
    Ok(sphere_error / sphere_plane_factor(width, height))
}

/// Embed a normalized point as `(x, y, 1)` and normalize to a unit bearing.
pub fn normalized_point_to_bearing_vector(p: &Vec2) -> Result<Vec3, ProjectError> {
    let v = Vec3::new(p.x, p.y, 1.0);
    let norm = v.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(ProjectError::ConversionError(format!(
            "cannot normalize point ({}, {})",
            p.x, p.y
        )));
    }
    Ok(v / norm)
}

/// Project a bearing vector back onto the z = 1 plane.
///
/// Fails for directions on or behind the camera plane (`v.z <= 0`), where
/// the pinhole unprojection is undefined.
pub fn bearing_vector_to_normalized_point(v: &Vec3) -> Result<Vec2, ProjectError> {
    if v.z <= 0.0 {
        return Err(ProjectError::ConversionError(format!(
            "bearing vector has non-positive z ({})",
            v.z
        )));
    }
    Ok(Vec2::new(v.x / v.z, v.y / v.z))
}

/// Angular coordinates of a direction vector. The vector need not be unit.
pub fn bearing_vector_to_lon_lat(v: &Vec3) -> Result<LonLat, ProjectError> {
    let norm = v.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(ProjectError::ConversionError(
            "cannot take angles of a zero or non-finite vector".into(),
        ));
    }
    let lon = v.x.atan2(v.z).to_degrees();
    let lat = -(v.y / norm).asin().to_degrees();
    Ok(LonLat::new(lon, lat))
}

/// Unit direction for the given angular coordinates.
pub fn lon_lat_to_bearing_vector(l: &LonLat) -> Vec3 {
    let lon = l.lon.to_radians();
    let lat = l.lat.to_radians();
    Vec3::new(
        lat.cos() * lon.sin(),
        -lat.sin(),
        lat.cos() * lon.cos(),
    )
}

/// Angular coordinates of a normalized image point.
pub fn normalized_point_to_lon_lat(p: &Vec2) -> Result<LonLat, ProjectError> {
    let bearing = normalized_point_to_bearing_vector(p)?;
    bearing_vector_to_lon_lat(&bearing)
}

/// Normalized image point for the given angular coordinates.
///
/// Fails when the direction lies on or behind the camera plane
/// (`|lon| >= 90°` at the equator, and correspondingly elsewhere).
pub fn lon_lat_to_normalized_point(l: &LonLat) -> Result<Vec2, ProjectError> {
    let bearing = lon_lat_to_bearing_vector(l);
    bearing_vector_to_normalized_point(&bearing)
}

/// Element-wise [`normalized_point_to_bearing_vector`].
pub fn normalized_points_to_bearing_vectors(
    points: &[Vec2],
) -> Result<Vec<Vec3>, ProjectError> {
    points.iter().map(normalized_point_to_bearing_vector).collect()
}

/// Element-wise [`bearing_vector_to_normalized_point`].
pub fn bearing_vectors_to_normalized_points(
    bearings: &[Vec3],
) -> Result<Vec<Vec2>, ProjectError> {
    bearings.iter().map(bearing_vector_to_normalized_point).collect()
}

/// Element-wise [`normalized_point_to_lon_lat`].
pub fn normalized_points_to_lon_lats(points: &[Vec2]) -> Result<Vec<LonLat>, ProjectError> {
    points.iter().map(normalized_point_to_lon_lat).collect()
}

/// Element-wise [`lon_lat_to_normalized_point`].
pub fn lon_lats_to_normalized_points(lonlats: &[LonLat]) -> Result<Vec<Vec2>, ProjectError> {
    lonlats.iter().map(lon_lat_to_normalized_point).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_roundtrip() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.3, -0.7),
            Vec2::new(-2.5, 1.25),
            Vec2::new(1e3, -1e3),
        ];
        for p in pts {
            let b = normalized_point_to_bearing_vector(&p).unwrap();
            assert!((b.norm() - 1.0).abs() < 1e-12);
            let q = bearing_vector_to_normalized_point(&b).unwrap();
            assert!((q - p).norm() < 1e-9, "roundtrip failed for {p:?}");
        }
    }

    #[test]
    fn bearing_behind_camera_rejected() {
        let v = Vec3::new(0.1, 0.2, -1.0);
        assert!(bearing_vector_to_normalized_point(&v).is_err());
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert!(bearing_vector_to_normalized_point(&v).is_err());
    }

    #[test]
    fn camera_plane_error_roundtrip() {
        for (w, h) in [(640u32, 480u32), (1000, 1000), (4096, 2048)] {
            let e = 2.5;
            let c = image_plane_to_camera_plane_error(w, h, e).unwrap();
            let back = camera_plane_to_image_plane_error(w, h, c).unwrap();
            assert!((back - e).abs() < 1e-9);
        }
    }

    #[test]
    fn sphere_plane_error_roundtrip() {
        let e = 1.5;
        let s = image_plane_to_sphere_plane_error(3600, 1800, e).unwrap();
        let back = sphere_plane_to_image_plane_error(3600, 1800, s).unwrap();
        assert!((back - e).abs() < 1e-9);
    }

    #[test]
    fn error_conversion_rejects_zero_dims() {
        assert!(image_plane_to_camera_plane_error(0, 480, 1.0).is_err());
        assert!(sphere_plane_to_image_plane_error(640, 0, 1.0).is_err());
    }

    #[test]
    fn lon_lat_convention() {
        // Optical axis.
        let l = bearing_vector_to_lon_lat(&Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!((l.lon).abs() < 1e-12 && (l.lat).abs() < 1e-12);
        // Right of the axis is positive longitude.
        let l = bearing_vector_to_lon_lat(&Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!((l.lon - 90.0).abs() < 1e-9);
        // Up (negative y) is positive latitude.
        let l = bearing_vector_to_lon_lat(&Vec3::new(0.0, -1.0, 0.0)).unwrap();
        assert!((l.lat - 90.0).abs() < 1e-9);
    }

    #[test]
    fn lon_lat_roundtrip_through_normalized_point() {
        let l = LonLat::new(30.0, -20.0);
        let p = lon_lat_to_normalized_point(&l).unwrap();
        let back = normalized_point_to_lon_lat(&p).unwrap();
        assert!((back.lon - l.lon).abs() < 1e-9);
        assert!((back.lat - l.lat).abs() < 1e-9);
    }

    #[test]
    fn batch_variants_preserve_order_and_length() {
        let pts = vec![Vec2::new(0.1, 0.2), Vec2::new(-0.3, 0.4), Vec2::new(0.0, 0.0)];
        let bearings = normalized_points_to_bearing_vectors(&pts).unwrap();
        assert_eq!(bearings.len(), pts.len());
        let back = bearing_vectors_to_normalized_points(&bearings).unwrap();
        for (p, q) in pts.iter().zip(back.iter()) {
            assert!((p - q).norm() < 1e-9);
        }
    }
}
