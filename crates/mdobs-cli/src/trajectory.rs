use crate::error::{CliError, Result};
use anyhow::{anyhow, bail};
use mdobs::core::models::Real;
use mdobs::workflows::replay::TrajectoryFrame;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One line of the trajectory CSV: `step,time,atom,x,y,z[,vx,vy,vz]`.
#[derive(Debug, Deserialize)]
struct TrajectoryRow {
    step: i64,
    time: f64,
    atom: usize,
    x: Real,
    y: Real,
    z: Real,
    vx: Option<Real>,
    vy: Option<Real>,
    vz: Option<Real>,
}

impl TrajectoryRow {
    fn velocity(&self) -> Option<Vector3<Real>> {
        match (self.vx, self.vy, self.vz) {
            (Some(x), Some(y), Some(z)) => Some(Vector3::new(x, y, z)),
            _ => None,
        }
    }
}

struct FrameBuilder {
    step: i64,
    time: f64,
    positions: Vec<Point3<Real>>,
    velocities: Vec<Vector3<Real>>,
    missing_velocities: usize,
}

impl FrameBuilder {
    fn new(row: &TrajectoryRow) -> Self {
        Self {
            step: row.step,
            time: row.time,
            positions: Vec::new(),
            velocities: Vec::new(),
            missing_velocities: 0,
        }
    }

    fn push(&mut self, row: &TrajectoryRow) -> anyhow::Result<()> {
        if row.atom != self.positions.len() {
            bail!(
                "step {}: expected atom {} but found atom {}",
                self.step,
                self.positions.len(),
                row.atom
            );
        }
        self.positions.push(Point3::new(row.x, row.y, row.z));
        match row.velocity() {
            Some(v) => self.velocities.push(v),
            None => self.missing_velocities += 1,
        }
        Ok(())
    }

    fn finish(self) -> anyhow::Result<TrajectoryFrame> {
        let velocities = match (self.velocities.len(), self.missing_velocities) {
            (_, 0) => Some(self.velocities),
            (0, _) => None,
            (present, missing) => bail!(
                "step {}: velocities given for {} atoms but missing for {}",
                self.step,
                present,
                missing
            ),
        };
        Ok(TrajectoryFrame {
            step: self.step,
            time: self.time,
            positions: self.positions,
            velocities,
        })
    }
}

/// Reads every frame of a trajectory CSV.
///
/// Rows are grouped into frames by consecutive step values. Within a frame atoms must
/// appear in index order starting at 0, and every frame must hold the same number of
/// atoms. Steps must increase from frame to frame.
pub fn read_frames<R: Read>(reader: R) -> anyhow::Result<Vec<TrajectoryFrame>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut frames: Vec<TrajectoryFrame> = Vec::new();
    let mut current: Option<FrameBuilder> = None;

    for (line, record) in csv_reader.deserialize::<TrajectoryRow>().enumerate() {
        let row = record.map_err(|e| anyhow!("row {}: {}", line + 1, e))?;
        let mut builder = match current.take() {
            Some(builder) if builder.step == row.step => builder,
            Some(builder) => {
                if row.step <= builder.step {
                    bail!(
                        "row {}: step {} does not follow step {}",
                        line + 1,
                        row.step,
                        builder.step
                    );
                }
                frames.push(finish_checked(builder, frames.first())?);
                FrameBuilder::new(&row)
            }
            None => FrameBuilder::new(&row),
        };
        builder.push(&row)?;
        current = Some(builder);
    }
    if let Some(builder) = current {
        frames.push(finish_checked(builder, frames.first())?);
    }

    debug!(frames = frames.len(), "Parsed trajectory.");
    Ok(frames)
}

fn finish_checked(
    builder: FrameBuilder,
    first: Option<&TrajectoryFrame>,
) -> anyhow::Result<TrajectoryFrame> {
    let frame = builder.finish()?;
    if let Some(first) = first {
        if first.positions.len() != frame.positions.len() {
            bail!(
                "step {}: frame has {} atoms but the first frame has {}",
                frame.step,
                frame.positions.len(),
                first.positions.len()
            );
        }
    }
    Ok(frame)
}

pub fn load(path: &Path) -> Result<Vec<TrajectoryFrame>> {
    info!("Loading trajectory from {:?}", path);
    let file = File::open(path)?;
    read_frames(file).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e,
    })
}
