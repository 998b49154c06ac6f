use super::frame::EnergyFrame;
use crate::core::observables::registry::ObservableDescriptor;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error while writing energy frame: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error while writing energy frame: {0}")]
    Csv(#[from] csv::Error),

    #[error("Frame carries {found} energies but the header declared {expected}")]
    Layout { expected: usize, found: usize },

    #[error("Frame committed before the header was written")]
    MissingHeader,
}

/// The serialization collaborator: receives the energy-file header once and then one
/// frame per write.
pub trait FrameSink {
    /// Declares the observables every later frame carries, in slot order.
    fn write_header(&mut self, descriptors: &[ObservableDescriptor]) -> Result<(), SinkError>;

    /// Makes one frame durable. An error leaves the caller's accumulators untouched.
    fn commit(&mut self, frame: &EnergyFrame) -> Result<(), SinkError>;
}

/// Writes frames as CSV rows: `time,step,dt,nsteps,nsum,<name (unit)>...,blocks`.
///
/// Frames without an energy block leave the value columns empty. Block payloads are
/// not representable in CSV; only their number is recorded.
pub struct CsvFrameSink<W: Write> {
    writer: csv::Writer<W>,
    columns: Option<usize>,
}

impl CsvFrameSink<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> CsvFrameSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            columns: None,
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> FrameSink for CsvFrameSink<W> {
    fn write_header(&mut self, descriptors: &[ObservableDescriptor]) -> Result<(), SinkError> {
        let mut record = vec![
            "time".to_string(),
            "step".to_string(),
            "dt".to_string(),
            "nsteps".to_string(),
            "nsum".to_string(),
        ];
        record.extend(
            descriptors
                .iter()
                .map(|d| format!("{} ({})", d.name, d.unit)),
        );
        record.push("blocks".to_string());
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        self.columns = Some(descriptors.len());
        Ok(())
    }

    fn commit(&mut self, frame: &EnergyFrame) -> Result<(), SinkError> {
        let expected = self.columns.ok_or(SinkError::MissingHeader)?;
        if frame.has_energies() && frame.energies.len() != expected {
            return Err(SinkError::Layout {
                expected,
                found: frame.energies.len(),
            });
        }

        let mut record = Vec::with_capacity(expected + 6);
        record.push(frame.time.to_string());
        record.push(frame.step.to_string());
        record.push(frame.dt.to_string());
        record.push(frame.nsteps.to_string());
        record.push(frame.nsum.to_string());
        if frame.has_energies() {
            record.extend(frame.energies.iter().map(f64::to_string));
        } else {
            record.extend(std::iter::repeat_n(String::new(), expected));
        }
        record.push(frame.blocks.len().to_string());

        self.writer.write_record(&record)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every committed frame in memory.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    pub names: Vec<String>,
    pub frames: Vec<EnergyFrame>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the named observable in every frame that carried energies.
    pub fn series(&self, name: &str) -> Vec<f64> {
        let Some(column) = self.names.iter().position(|n| n == name) else {
            return Vec::new();
        };
        self.frames
            .iter()
            .filter(|f| f.has_energies())
            .map(|f| f.energies[column])
            .collect()
    }
}

impl FrameSink for FrameRecorder {
    fn write_header(&mut self, descriptors: &[ObservableDescriptor]) -> Result<(), SinkError> {
        self.names = descriptors.iter().map(|d| d.name.clone()).collect();
        Ok(())
    }

    fn commit(&mut self, frame: &EnergyFrame) -> Result<(), SinkError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observables::registry::{ObservableMode, ObservableRegistry};
    use crate::engine::frame::{BlockId, FrameBlock};

    fn descriptors() -> Vec<ObservableDescriptor> {
        let mut registry = ObservableRegistry::new();
        registry
            .register("Potential", "kJ/mol", ObservableMode::SummedAveraged)
            .unwrap();
        registry
            .register("Radius-Gyration", "nm", ObservableMode::Instantaneous)
            .unwrap();
        registry.descriptors().to_vec()
    }

    fn frame(step: i64, energies: Vec<f64>) -> EnergyFrame {
        EnergyFrame {
            time: step as f64 * 0.002,
            step,
            dt: 0.002,
            nsteps: 10,
            nsum: 10,
            energies,
            blocks: Vec::new(),
        }
    }

    #[test]
    fn csv_sink_writes_header_and_rows() {
        let mut sink = CsvFrameSink::from_writer(Vec::new());
        sink.write_header(&descriptors()).unwrap();
        sink.commit(&frame(10, vec![-1.5, 0.25])).unwrap();

        let mut restraint_only = frame(20, Vec::new());
        restraint_only.blocks.push(FrameBlock::new(BlockId::DistanceRestraints, vec![]));
        sink.commit(&restraint_only).unwrap();

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "time,step,dt,nsteps,nsum,Potential (kJ/mol),Radius-Gyration (nm),blocks"
        );
        assert_eq!(lines[1], "0.02,10,0.002,10,10,-1.5,0.25,0");
        assert_eq!(lines[2], "0.04,20,0.002,10,10,,,1");
    }

    #[test]
    fn csv_sink_rejects_mismatched_frames() {
        let mut sink = CsvFrameSink::from_writer(Vec::new());
        assert!(matches!(
            sink.commit(&frame(0, vec![1.0])),
            Err(SinkError::MissingHeader)
        ));
        sink.write_header(&descriptors()).unwrap();
        assert!(matches!(
            sink.commit(&frame(0, vec![1.0])),
            Err(SinkError::Layout {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn csv_sink_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energy.csv");
        let mut sink = CsvFrameSink::create(&path).unwrap();
        sink.write_header(&descriptors()).unwrap();
        sink.commit(&frame(0, vec![2.0, 3.0])).unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn recorder_extracts_series_by_name() {
        let mut recorder = FrameRecorder::new();
        recorder.write_header(&descriptors()).unwrap();
        recorder.commit(&frame(0, vec![1.0, 2.0])).unwrap();
        recorder.commit(&frame(5, Vec::new())).unwrap();
        recorder.commit(&frame(10, vec![3.0, 4.0])).unwrap();
        assert_eq!(recorder.series("Radius-Gyration"), vec![2.0, 4.0]);
        assert!(recorder.series("Missing").is_empty());
        assert_eq!(recorder.frames.len(), 3);
    }
}
