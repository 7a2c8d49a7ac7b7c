//! Output persistence.
//!
//! The sink owns the output location: it persists one rendered frame plus a
//! JSON metadata sidecar per `(model, sample_index)` and supports clearing
//! all prior contents. Clearing is idempotent; an empty or absent location
//! clears to an empty location without error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::RenderedFrame;

/// Metadata persisted next to each rendered frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMeta {
    pub seed: u64,
    pub model: String,
    pub sample_index: usize,
    /// All sampled parameters, from
    /// [`SceneSample::parameter_record`](crate::scene::SceneSample::parameter_record).
    pub parameters: serde_json::Value,
}

/// Output sink for finished samples.
pub trait OutputSink {
    fn persist(
        &self,
        model: &str,
        sample_index: usize,
        frame: &RenderedFrame,
        meta: &SampleMeta,
    ) -> io::Result<()>;

    /// Remove all prior contents. Must be idempotent.
    fn clear(&self) -> io::Result<()>;
}

/// Filesystem sink writing `<root>/<model>/<index>.rgba32f` raw frames and
/// `<index>.json` metadata sidecars.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn persist(
        &self,
        model: &str,
        sample_index: usize,
        frame: &RenderedFrame,
        meta: &SampleMeta,
    ) -> io::Result<()> {
        let dir = self.root.join(model);
        fs::create_dir_all(&dir)?;

        let stem = format!("{sample_index:05}");
        let mut bytes = Vec::with_capacity(frame.image.rgba.len() * 4 + 8);
        bytes.extend_from_slice(&frame.image.width.to_le_bytes());
        bytes.extend_from_slice(&frame.image.height.to_le_bytes());
        for v in &frame.image.rgba {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        // The frame appears under its final name only after the sidecar
        // exists; an interrupted persist never leaves a frame without
        // metadata.
        let frame_path = dir.join(format!("{stem}.rgba32f"));
        let staging_path = dir.join(format!("{stem}.rgba32f.partial"));
        fs::write(&staging_path, bytes)?;

        let json = serde_json::to_vec_pretty(meta)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(dir.join(format!("{stem}.json")), json)?;

        fs::rename(staging_path, frame_path)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::create_dir_all(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ImageBuffer, RenderedFrame};

    fn frame() -> RenderedFrame {
        RenderedFrame {
            image: ImageBuffer::new(2, 2),
            normals: None,
        }
    }

    #[test]
    fn clear_is_idempotent_on_absent_and_empty_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("out"));
        // Absent.
        sink.clear().unwrap();
        assert!(sink.root().exists());
        // Empty.
        sink.clear().unwrap();
        sink.clear().unwrap();
        assert!(sink.root().read_dir().unwrap().next().is_none());
    }

    #[test]
    fn clear_removes_prior_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("out"));
        let meta = SampleMeta {
            seed: 1,
            model: "m".into(),
            sample_index: 0,
            parameters: serde_json::json!({}),
        };
        sink.clear().unwrap();
        sink.persist("m", 0, &frame(), &meta).unwrap();
        assert!(sink.root().join("m/00000.rgba32f").exists());
        assert!(sink.root().join("m/00000.json").exists());
        sink.clear().unwrap();
        assert!(sink.root().read_dir().unwrap().next().is_none());
    }

    #[test]
    fn persist_leaves_no_staging_files() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("out"));
        let meta = SampleMeta {
            seed: 2,
            model: "m".into(),
            sample_index: 1,
            parameters: serde_json::json!({}),
        };
        sink.persist("m", 1, &frame(), &meta).unwrap();

        let mut names: Vec<String> = sink
            .root()
            .join("m")
            .read_dir()
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["00001.json", "00001.rgba32f"]);
    }
}
