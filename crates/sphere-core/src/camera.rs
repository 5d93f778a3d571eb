//! Camera descriptors: a tagged pinhole/spherical type with forward and
//! backward projection.

use serde::{Deserialize, Serialize};

use crate::convert::{bearing_vector_to_lon_lat, lon_lat_to_bearing_vector, LonLat};
use crate::error::ProjectError;
use crate::math::{Real, Vec2, Vec3};

/// Projection model of a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CameraModel {
    /// Perspective projection with a single focal length and principal point.
    Pinhole { focal: Real, cx: Real, cy: Real },
    /// Equirectangular mapping: pixel x is linear in longitude over
    /// [-180°, 180°], pixel y is linear in latitude over [+90°, -90°].
    Spherical,
}

/// Immutable camera descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    width: u32,
    height: u32,
    model: CameraModel,
}

/// Focal length in pixels for a pinhole camera of the given height and
/// vertical field of view in degrees: `(height / 2) / tan(fov / 2)`.
pub fn pinhole_focal_length(height: u32, fov_deg: Real) -> Real {
    (height as Real / 2.0) / (fov_deg.to_radians() / 2.0).tan()
}

impl Camera {
    /// Pinhole camera with principal point at the image centre and focal
    /// length derived from the vertical field of view.
    pub fn pinhole(width: u32, height: u32, fov_deg: Real) -> Result<Self, ProjectError> {
        if width == 0 || height == 0 {
            return Err(ProjectError::InvalidCameraDimensions { width, height });
        }
        if !(fov_deg > 0.0 && fov_deg < 180.0) {
            return Err(ProjectError::ConversionError(format!(
                "field of view {fov_deg} out of range (0, 180)"
            )));
        }
        Ok(Self {
            width,
            height,
            model: CameraModel::Pinhole {
                focal: pinhole_focal_length(height, fov_deg),
                cx: width as Real / 2.0,
                cy: height as Real / 2.0,
            },
        })
    }

    /// Equirectangular spherical camera. Aspect ratio is the caller's
    /// responsibility (a full sphere wants width = 2 × height).
    pub fn spherical(width: u32, height: u32) -> Result<Self, ProjectError> {
        if width == 0 || height == 0 {
            return Err(ProjectError::InvalidCameraDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            model: CameraModel::Spherical,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn model(&self) -> &CameraModel {
        &self.model
    }

    pub fn is_spherical(&self) -> bool {
        matches!(self.model, CameraModel::Spherical)
    }

    /// Forward projection: bearing vector to pixel coordinates.
    ///
    /// Pinhole cameras reject directions on or behind the camera plane;
    /// the spherical mapping is total for nonzero vectors.
    pub fn project(&self, v: &Vec3) -> Result<Vec2, ProjectError> {
        match self.model {
            CameraModel::Pinhole { focal, cx, cy } => {
                if v.z <= 0.0 {
                    return Err(ProjectError::ConversionError(format!(
                        "bearing vector has non-positive z ({})",
                        v.z
                    )));
                }
                Ok(Vec2::new(focal * v.x / v.z + cx, focal * v.y / v.z + cy))
            }
            CameraModel::Spherical => {
                let l = bearing_vector_to_lon_lat(v)?;
                Ok(self.lon_lat_to_pixel(&l))
            }
        }
    }

    /// Backward projection: pixel coordinates to a unit bearing vector.
    pub fn unproject(&self, px: &Vec2) -> Result<Vec3, ProjectError> {
        match self.model {
            CameraModel::Pinhole { .. } => {
                let n = self.unproject_normalized(px)?;
                let v = Vec3::new(n.x, n.y, 1.0);
                Ok(v / v.norm())
            }
            CameraModel::Spherical => {
                let l = self.pixel_to_lon_lat(px);
                Ok(lon_lat_to_bearing_vector(&l))
            }
        }
    }

    /// Backward projection onto the normalized (z = 1) plane. Pinhole only.
    pub fn unproject_normalized(&self, px: &Vec2) -> Result<Vec2, ProjectError> {
        match self.model {
            CameraModel::Pinhole { focal, cx, cy } => {
                Ok(Vec2::new((px.x - cx) / focal, (px.y - cy) / focal))
            }
            CameraModel::Spherical => Err(ProjectError::CameraModelMismatch {
                expected: "pinhole",
            }),
        }
    }

    /// Equirectangular pixel for the given angular coordinates.
    pub fn lon_lat_to_pixel(&self, l: &LonLat) -> Vec2 {
        let x = (l.lon + 180.0) / 360.0 * self.width as Real;
        let y = (90.0 - l.lat) / 180.0 * self.height as Real;
        Vec2::new(x, y)
    }

    /// Angular coordinates at the given equirectangular pixel.
    pub fn pixel_to_lon_lat(&self, px: &Vec2) -> LonLat {
        let lon = px.x / self.width as Real * 360.0 - 180.0;
        let lat = 90.0 - px.y / self.height as Real * 180.0;
        LonLat::new(lon, lat)
    }
}
