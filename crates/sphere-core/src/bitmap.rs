//! RGB bitmap container with interpolated sampling and file I/O.

use std::path::Path;

use image::{ImageReader, Rgb, RgbImage};

use crate::error::ProjectError;
use crate::math::Real;

/// RGB pixel with channels in [0, 1].
pub type Pixel = [f32; 3];

/// Owned RGB image with a flat row-major f32 buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Bitmap {
    /// Black bitmap of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Pixel at integer coordinates. Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, px: Pixel) {
        let i = self.index(x, y);
        self.data[i..i + 3].copy_from_slice(&px);
    }

    /// Decode an image file into an RGB f32 bitmap.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let decoded = ImageReader::open(path)
            .map_err(|e| ProjectError::SourceLoadFailure(format!("{}: {e}", path.display())))?
            .decode()
            .map_err(|e| ProjectError::SourceLoadFailure(format!("{}: {e}", path.display())))?;
        let rgb = decoded.to_rgb32f();
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            data: rgb.into_raw(),
        })
    }

    /// Encode as 8-bit RGB and write to `path`; the format follows the file
    /// extension.
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let mut out = RgbImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.pixel(x, y);
                out.put_pixel(
                    x,
                    y,
                    Rgb(p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)),
                );
            }
        }
        out.save(path)
            .map_err(|e| ProjectError::OutputWriteFailure(format!("{}: {e}", path.display())))
    }

    fn lerp2(&self, x0: u32, x1: u32, y0: u32, y1: u32, fx: Real, fy: Real) -> Pixel {
        let a = self.pixel(x0, y0);
        let b = self.pixel(x1, y0);
        let c = self.pixel(x0, y1);
        let d = self.pixel(x1, y1);
        let (fx, fy) = (fx as f32, fy as f32);
        let w00 = (1.0 - fx) * (1.0 - fy);
        let w10 = fx * (1.0 - fy);
        let w01 = (1.0 - fx) * fy;
        let w11 = fx * fy;
        [
            a[0] * w00 + b[0] * w10 + c[0] * w01 + d[0] * w11,
            a[1] * w00 + b[1] * w10 + c[1] * w01 + d[1] * w11,
            a[2] * w00 + b[2] * w10 + c[2] * w01 + d[2] * w11,
        ]
    }

    /// Bilinear sample at continuous coordinates with texel centres at
    /// integer positions; both axes clamp to the image border.
    pub fn sample_bilinear(&self, x: Real, y: Real) -> Pixel {
        let max_x = (self.width - 1) as Real;
        let max_y = (self.height - 1) as Real;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        self.lerp2(x0, x1, y0, y1, x - x0 as Real, y - y0 as Real)
    }

    /// Bilinear sample for equirectangular content: the x axis (longitude)
    /// wraps modulo the image width, interpolating across the seam; the
    /// y axis (latitude) clamps at the poles.
    pub fn sample_equirect(&self, x: Real, y: Real) -> Pixel {
        let w = self.width as Real;
        let x = x.rem_euclid(w);
        let y = y.clamp(0.0, (self.height - 1) as Real);
        let x0 = x.floor() as u32 % self.width;
        let x1 = (x0 + 1) % self.width;
        let y0 = y.floor() as u32;
        let y1 = (y0 + 1).min(self.height - 1);
        self.lerp2(x0, x1, y0, y1, x - x.floor(), y - y0 as Real)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut bmp = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (x + y * width) as f32 / (width * height) as f32;
                bmp.put_pixel(x, y, [v, v * 0.5, 1.0 - v]);
            }
        }
        bmp
    }

    #[test]
    fn bilinear_interpolates_between_texels() {
        let mut bmp = Bitmap::new(2, 1);
        bmp.put_pixel(0, 0, [0.0, 0.0, 0.0]);
        bmp.put_pixel(1, 0, [1.0, 1.0, 1.0]);
        let p = bmp.sample_bilinear(0.5, 0.0);
        assert!((p[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bilinear_clamps_outside() {
        let bmp = gradient(4, 4);
        assert_eq!(bmp.sample_bilinear(-10.0, -10.0), bmp.pixel(0, 0));
        assert_eq!(bmp.sample_bilinear(100.0, 100.0), bmp.pixel(3, 3));
    }

    #[test]
    fn equirect_wraps_longitude() {
        let bmp = gradient(360, 180);
        for (a, b) in [(359.9, -0.1), (0.25, 360.25), (-5.5, 354.5)] {
            let pa = bmp.sample_equirect(a, 40.0);
            let pb = bmp.sample_equirect(b, 40.0);
            for c in 0..3 {
                assert!((pa[c] - pb[c]).abs() < 1e-6, "mismatch at x={a} vs x={b}");
            }
        }
    }

    #[test]
    fn equirect_interpolates_across_seam() {
        let mut bmp = Bitmap::new(4, 1);
        bmp.put_pixel(3, 0, [1.0, 0.0, 0.0]);
        bmp.put_pixel(0, 0, [0.0, 1.0, 0.0]);
        // Halfway between the last and the first column.
        let p = bmp.sample_equirect(3.5, 0.0);
        assert!((p[0] - 0.5).abs() < 1e-6);
        assert!((p[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn equirect_clamps_latitude() {
        let bmp = gradient(8, 4);
        assert_eq!(bmp.sample_equirect(2.0, -3.0), bmp.sample_equirect(2.0, 0.0));
        assert_eq!(bmp.sample_equirect(2.0, 99.0), bmp.sample_equirect(2.0, 3.0));
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let bmp = gradient(16, 8);
        bmp.save(&path).unwrap();
        let back = Bitmap::load(&path).unwrap();
        assert_eq!(back.width(), 16);
        assert_eq!(back.height(), 8);
        // 8-bit quantization on the way out.
        for (a, b) in bmp.data.iter().zip(back.data.iter()) {
            assert!((a - b).abs() < 1.0 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn load_missing_file_fails() {
        let err = Bitmap::load(Path::new("/nonexistent/sphere.png")).unwrap_err();
        assert!(matches!(err, ProjectError::SourceLoadFailure(_)));
    }
}
