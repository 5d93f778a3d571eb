use std::collections::HashMap;
use std::{error::Error, fs, path::Path, path::PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use sphere_core::{cubic_rotations, Camera, Mat3};
use sphere_pipeline::{spherical_to_pinhole_from_path, PatchOutcome, ProjectionMode};

/// Project an equirectangular panorama into perspective pinhole patches.
#[derive(Debug, Parser)]
#[command(author, version, about = "Spherical-to-pinhole batch projector")]
struct Args {
    /// Path to the source equirectangular image.
    #[arg(long)]
    input: PathBuf,

    /// Directory the output patches are written into.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output patch width in pixels.
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Output patch height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Vertical field of view of the patches, in degrees.
    #[arg(long, default_value_t = 45.0)]
    fov: f64,

    /// JSON file mapping image id to a row-major 3x3 rotation matrix.
    #[arg(long, conflicts_with = "cubemap")]
    rotations: Option<PathBuf>,

    /// Use the six cubic-face rotations instead of a rotations file.
    #[arg(long)]
    cubemap: bool,

    /// Use the full spherical projection instead of the tangent-plane
    /// approximation.
    #[arg(long)]
    full_sphere: bool,
}

/// Rotation set as stored on disk: image id -> row-major 3x3 matrix.
#[derive(Debug, Serialize, Deserialize)]
struct RotationFile(HashMap<i32, [[f64; 3]; 3]>);

#[derive(Debug, Serialize)]
struct ItemReport {
    image_id: i32,
    path: Option<PathBuf>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    items: Vec<ItemReport>,
    succeeded: usize,
    failed: usize,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn load_rotations(args: &Args) -> Result<(Vec<i32>, HashMap<i32, Mat3>), Box<dyn Error>> {
    if args.cubemap {
        let rotations: HashMap<i32, Mat3> = cubic_rotations()
            .iter()
            .map(|(&face, &r)| (face.id(), r))
            .collect();
        let mut ids: Vec<i32> = rotations.keys().copied().collect();
        ids.sort_unstable();
        return Ok((ids, rotations));
    }
    let path = args
        .rotations
        .as_ref()
        .ok_or("either --rotations or --cubemap is required")?;
    let file: RotationFile = load_json_file(path)?;
    let rotations: HashMap<i32, Mat3> = file
        .0
        .into_iter()
        .map(|(id, rows)| {
            (
                id,
                Mat3::new(
                    rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2],
                    rows[2][0], rows[2][1], rows[2][2],
                ),
            )
        })
        .collect();
    let mut ids: Vec<i32> = rotations.keys().copied().collect();
    ids.sort_unstable();
    Ok((ids, rotations))
}

fn to_report(outcomes: Vec<PatchOutcome>) -> BatchReport {
    let items: Vec<ItemReport> = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok(path) => ItemReport {
                image_id: o.image_id,
                path: Some(path),
                error: None,
            },
            Err(e) => ItemReport {
                image_id: o.image_id,
                path: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    let succeeded = items.iter().filter(|i| i.error.is_none()).count();
    let failed = items.len() - succeeded;
    BatchReport {
        items,
        succeeded,
        failed,
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (ids, rotations) = load_rotations(&args)?;
    let pinhole = Camera::pinhole(args.width, args.height, args.fov)?;
    fs::create_dir_all(&args.out_dir)?;

    let mode = if args.full_sphere {
        ProjectionMode::FullSpherical
    } else {
        ProjectionMode::Tangent
    };
    let outcomes = spherical_to_pinhole_from_path(
        &args.input,
        &pinhole,
        &args.out_dir,
        &ids,
        &rotations,
        mode,
    )?;

    let report = to_report(outcomes);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.succeeded == 0 {
        return Err("no patch could be produced".into());
    }
    Ok(())
}
