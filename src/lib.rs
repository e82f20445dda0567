//! traitmint generates collections of layered trait combinations and renders each one into a
//! short composited video with `ffmpeg`.
//!
//! The pipeline is stage-oriented:
//!
//! - Load a [`LayerSet`] and a [`CollectionConfig`]
//! - Run [`generate_collection`] to draw unique, band-constrained [`Specimen`]s and mark rare
//!   variants
//! - Feed the list to a [`Renderer`] backed by an [`Encoder`] (normally [`FfmpegEncoder`])
//! - Emit [`TraitSummary`] and marketplace metadata with [`write_metadata`]
#![forbid(unsafe_code)]

/// Layer and collection configuration.
pub mod config;
/// Encoder seam and the `ffmpeg` implementation.
pub mod encode;
/// Errors and on-disk layout.
pub mod foundation;
/// Weighted sampling, composition, dedup, rare variants.
pub mod generate;
/// Asset resolution, filter graphs, render orchestration.
pub mod render;
/// Summary and metadata reports.
pub mod report;
/// Specimen model and persistence.
pub mod specimen;

pub use crate::config::collection::CollectionConfig;
pub use crate::config::layers::{ConfigWarning, LayerConfig, LayerSet, TraitOption};
pub use crate::encode::ffmpeg::{EncodeConfig, Encoder, FfmpegEncoder};
pub use crate::foundation::error::{MintError, MintResult};
pub use crate::foundation::layout::ProjectLayout;
pub use crate::generate::session::{Exhaustion, GenerationOutcome, GenerationStats};
pub use crate::generate::{GenerationReport, generate_collection};
pub use crate::render::graph::FilterGraph;
pub use crate::render::logs::RenderLogs;
pub use crate::render::orchestrator::{
    RenderFailure, RenderOpts, RenderOutcome, RenderReport, Renderer,
};
pub use crate::report::metadata::write_metadata;
pub use crate::report::summary::TraitSummary;
pub use crate::specimen::model::{SelectedTrait, Specimen};
pub use crate::specimen::store::{load_specimens, save_specimens};
