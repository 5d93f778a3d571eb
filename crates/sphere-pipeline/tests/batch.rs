//! Integration tests for the batch projector.

use std::collections::HashMap;

use sphere_core::{cubic_rotations, Bitmap, Camera, CubeFace, Mat3, ProjectError};
use sphere_pipeline::{
    patch_filename, spherical_to_pinhole, spherical_to_pinhole_from_path, ProjectionMode,
};

fn sphere_fixture(width: u32, height: u32) -> (Camera, Bitmap) {
    let camera = Camera::spherical(width, height).unwrap();
    let mut bmp = Bitmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            bmp.put_pixel(
                x,
                y,
                [
                    x as f32 / width as f32,
                    y as f32 / height as f32,
                    0.25,
                ],
            );
        }
    }
    (camera, bmp)
}

fn cubemap_rotations() -> HashMap<i32, Mat3> {
    cubic_rotations()
        .iter()
        .map(|(&face, &r)| (face.id(), r))
        .collect()
}

#[test]
fn batch_preserves_input_order() {
    let (camera, bmp) = sphere_fixture(64, 32);
    let pinhole = Camera::pinhole(8, 8, 90.0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let ids = [CubeFace::PosZ.id(), CubeFace::PosX.id(), CubeFace::NegY.id()];
    let rotations = cubemap_rotations();

    let outcomes = spherical_to_pinhole(
        &camera,
        &bmp,
        &pinhole,
        dir.path(),
        &ids,
        &rotations,
        ProjectionMode::FullSpherical,
    );

    assert_eq!(outcomes.len(), 3);
    for (outcome, &id) in outcomes.iter().zip(ids.iter()) {
        assert_eq!(outcome.image_id, id);
        let path = outcome.result.as_ref().expect("patch should be written");
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), patch_filename(id));
        assert!(path.exists());
        let written = Bitmap::load(path).unwrap();
        assert_eq!(written.width(), 8);
        assert_eq!(written.height(), 8);
    }
}

#[test]
fn missing_rotation_fails_one_id_only() {
    let (camera, bmp) = sphere_fixture(64, 32);
    let pinhole = Camera::pinhole(8, 8, 90.0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let ids = [0, 1, 2];
    let mut rotations = cubemap_rotations();
    rotations.remove(&1);

    let outcomes = spherical_to_pinhole(
        &camera,
        &bmp,
        &pinhole,
        dir.path(),
        &ids,
        &rotations,
        ProjectionMode::Tangent,
    );

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(ProjectError::MissingRotation(1))
    ));
    assert!(outcomes[2].result.is_ok());
    assert!(dir.path().join(patch_filename(0)).exists());
    assert!(!dir.path().join(patch_filename(1)).exists());
    assert!(dir.path().join(patch_filename(2)).exists());
}

#[test]
fn unwritable_output_dir_is_reported_per_id() {
    let (camera, bmp) = sphere_fixture(64, 32);
    let pinhole = Camera::pinhole(8, 8, 90.0).unwrap();
    let outcomes = spherical_to_pinhole(
        &camera,
        &bmp,
        &pinhole,
        std::path::Path::new("/nonexistent/output/dir"),
        &[0],
        &cubemap_rotations(),
        ProjectionMode::Tangent,
    );
    assert!(matches!(
        outcomes[0].result,
        Err(ProjectError::OutputWriteFailure(_))
    ));
}

#[test]
fn batch_from_path_loads_and_projects() {
    let (_, bmp) = sphere_fixture(64, 32);
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("sphere.png");
    bmp.save(&src).unwrap();

    let pinhole = Camera::pinhole(8, 8, 90.0).unwrap();
    let outcomes = spherical_to_pinhole_from_path(
        &src,
        &pinhole,
        dir.path(),
        &[CubeFace::PosZ.id()],
        &cubemap_rotations(),
        ProjectionMode::FullSpherical,
    )
    .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());

    let err = spherical_to_pinhole_from_path(
        &dir.path().join("missing.png"),
        &pinhole,
        dir.path(),
        &[0],
        &cubemap_rotations(),
        ProjectionMode::Tangent,
    )
    .unwrap_err();
    assert!(matches!(err, ProjectError::SourceLoadFailure(_)));
}
