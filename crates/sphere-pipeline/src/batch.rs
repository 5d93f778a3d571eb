//! Batch projection: one pinhole patch per requested image id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use sphere_core::{Bitmap, Camera, Mat3, ProjectError};

use crate::resample::{spherical_to_patch, spherical_to_tangent};

/// Which resampler a batch run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Gnomonic tangent-plane approximation (the default; narrow fovs).
    Tangent,
    /// Full spherical forward projection.
    FullSpherical,
}

/// Per-id result of a batch run.
#[derive(Debug)]
pub struct PatchOutcome {
    pub image_id: i32,
    pub result: Result<PathBuf, ProjectError>,
}

/// Deterministic output filename for an image id.
pub fn patch_filename(image_id: i32) -> String {
    format!("pinhole_{image_id}.png")
}

fn project_one(
    sphere_camera: &Camera,
    sphere_bitmap: &Bitmap,
    pinhole_camera: &Camera,
    output_dir: &Path,
    image_id: i32,
    rotations: &HashMap<i32, Mat3>,
    mode: ProjectionMode,
) -> Result<PathBuf, ProjectError> {
    let rotation = rotations
        .get(&image_id)
        .ok_or(ProjectError::MissingRotation(image_id))?;
    let patch = match mode {
        ProjectionMode::Tangent => {
            spherical_to_tangent(sphere_camera, sphere_bitmap, rotation, pinhole_camera)?
        }
        ProjectionMode::FullSpherical => {
            spherical_to_patch(sphere_camera, sphere_bitmap, rotation, pinhole_camera)?
        }
    };
    let path = output_dir.join(patch_filename(image_id));
    patch.save(&path)?;
    debug!("wrote patch for image {image_id} to {}", path.display());
    Ok(path)
}

/// Produce one pinhole patch per id, in the order the ids are given.
///
/// Each id reads the shared source bitmap and rotation table and writes its
/// own output file, so items run on independent rayon workers. One id's
/// failure is recorded in its [`PatchOutcome`] and never aborts the rest.
pub fn spherical_to_pinhole(
    sphere_camera: &Camera,
    sphere_bitmap: &Bitmap,
    pinhole_camera: &Camera,
    output_dir: &Path,
    image_ids: &[i32],
    rotations: &HashMap<i32, Mat3>,
    mode: ProjectionMode,
) -> Vec<PatchOutcome> {
    let outcomes: Vec<PatchOutcome> = image_ids
        .par_iter()
        .map(|&image_id| PatchOutcome {
            image_id,
            result: project_one(
                sphere_camera,
                sphere_bitmap,
                pinhole_camera,
                output_dir,
                image_id,
                rotations,
                mode,
            ),
        })
        .collect();
    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(
        "projected {ok}/{} patches into {}",
        outcomes.len(),
        output_dir.display()
    );
    outcomes
}

/// Like [`spherical_to_pinhole`] but loads the source image from disk; the
/// sphere camera is sized from the decoded bitmap.
pub fn spherical_to_pinhole_from_path(
    sphere_path: &Path,
    pinhole_camera: &Camera,
    output_dir: &Path,
    image_ids: &[i32],
    rotations: &HashMap<i32, Mat3>,
    mode: ProjectionMode,
) -> Result<Vec<PatchOutcome>, ProjectError> {
    let sphere_bitmap = Bitmap::load(sphere_path)?;
    let sphere_camera = Camera::spherical(sphere_bitmap.width(), sphere_bitmap.height())?;
    Ok(spherical_to_pinhole(
        &sphere_camera,
        &sphere_bitmap,
        pinhole_camera,
        output_dir,
        image_ids,
        rotations,
        mode,
    ))
}
