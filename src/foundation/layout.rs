use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::MintResult;

/// Every on-disk location used by a project, derived from a single root directory.
///
/// ```text
/// <root>/config/layers.json
/// <root>/config/collection.json
/// <root>/traits/<layer>/<value>.<ext>
/// <root>/output/specimens.json
/// <root>/output/media/<filename>.{mp4,png}
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `config/` directory.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Layer configuration document.
    pub fn layers_path(&self) -> PathBuf {
        self.config_dir().join("layers.json")
    }

    /// Collection configuration document.
    pub fn collection_path(&self) -> PathBuf {
        self.config_dir().join("collection.json")
    }

    /// Root of the per-layer trait asset directories.
    pub fn traits_dir(&self) -> PathBuf {
        self.root.join("traits")
    }

    /// `output/` directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Persisted specimen list produced by generation.
    pub fn specimens_path(&self) -> PathBuf {
        self.output_dir().join("specimens.json")
    }

    /// Rendered videos and thumbnails.
    pub fn media_dir(&self) -> PathBuf {
        self.output_dir().join("media")
    }

    /// Render narrative log.
    pub fn render_log_path(&self) -> PathBuf {
        self.output_dir().join("render_log.txt")
    }

    /// Permanent render failure log.
    pub fn failure_log_path(&self) -> PathBuf {
        self.output_dir().join("render_failures.txt")
    }

    /// Trait frequency summary.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir().join("trait_summary.txt")
    }

    /// Per-specimen metadata documents.
    pub fn metadata_dir(&self) -> PathBuf {
        self.output_dir().join("metadata")
    }

    /// Combined metadata document.
    pub fn master_metadata_path(&self) -> PathBuf {
        self.output_dir().join("master_metadata.json")
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MintResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
