//! Specimen rendering.
//!
//! A render turns one [`Specimen`](crate::specimen::model::Specimen) into an mp4 and a png:
//!
//! 1. [`assets::resolve_assets`] maps traits to asset files, dropping missing ones.
//! 2. [`graph::FilterGraph`] stacks the survivors bottom-up into one output stream.
//! 3. [`orchestrator::Renderer`] drives an [`Encoder`](crate::encode::ffmpeg::Encoder) with
//!    bounded retries and records progress in [`logs::RenderLogs`].

pub mod assets;
pub mod graph;
pub mod logs;
pub mod orchestrator;
