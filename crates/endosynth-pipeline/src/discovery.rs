//! Anatomy model discovery.
//!
//! Model files are selected by a typed [`ModelFilter`] and loaded through an
//! injectable [`MeshLoader`]. Matching file names are sorted before
//! loading, so the model index used for seed derivation is stable across
//! platforms and directory iteration orders.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use endosynth_core::Mesh;

/// A discovered anatomy model: an immutable mesh plus its identifying name.
#[derive(Debug, Clone)]
pub struct AnatomyModel {
    pub name: String,
    pub mesh: Arc<Mesh>,
}

/// Predicate over model file names.
#[derive(Debug, Clone)]
pub struct ModelFilter {
    include: String,
}

impl ModelFilter {
    /// Match file names containing `include`. Platform metadata files
    /// (`._` AppleDouble prefixes) are always excluded.
    pub fn new(include: impl Into<String>) -> Self {
        Self {
            include: include.into(),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        !file_name.starts_with("._") && file_name.contains(&self.include)
    }
}

/// External mesh file loading.
pub trait MeshLoader {
    fn load(&self, path: &Path) -> Result<Mesh>;
}

/// Enumerate, filter, sort and load anatomy models from `dir`.
///
/// A missing or unreadable directory is fatal; the batch must not start on a
/// partial model set.
pub fn discover_models(
    dir: &Path,
    filter: &ModelFilter,
    loader: &dyn MeshLoader,
) -> Result<Vec<AnatomyModel>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("scanning model directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_file() && filter.matches(&name) {
            paths.push((name, entry.path()));
        }
    }
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let mut models = Vec::with_capacity(paths.len());
    for (file_name, path) in paths {
        let mesh = loader
            .load(&path)
            .with_context(|| format!("loading anatomy model {file_name}"))?;
        let name = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name);
        models.push(AnatomyModel {
            name,
            mesh: Arc::new(mesh),
        });
    }

    info!("discovered {} anatomy models in {}", models.len(), dir.display());
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_excludes_metadata_files() {
        let f = ModelFilter::new("bladder");
        assert!(f.matches("bladder_01.ply"));
        assert!(!f.matches("._bladder_01.ply"));
        assert!(!f.matches("kidney_01.ply"));
    }
}
