use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::layers::LayerSet;
use crate::encode::ffmpeg::Encoder;
use crate::foundation::error::{MintError, MintResult};
use crate::foundation::layout::ensure_parent_dir;
use crate::render::assets::{AssetRef, resolve_assets};
use crate::render::graph::{FilterGraph, GraphParams};
use crate::render::logs::RenderLogs;
use crate::specimen::model::Specimen;

/// Encoder attempts per specimen before it is recorded as a permanent failure.
pub const MAX_RENDER_ATTEMPTS: u32 = 3;

/// Output locations for one specimen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPaths {
    /// Final video, `{filename}.mp4`.
    pub video: PathBuf,
    /// Thumbnail, `{filename}.png`.
    pub thumbnail: PathBuf,
    /// Encoder target; renamed to `video` only after a successful encode.
    pub partial_video: PathBuf,
    /// Thumbnail target; renamed to `thumbnail` on success.
    pub partial_thumbnail: PathBuf,
}

impl RenderPaths {
    /// Paths for `specimen` under `media_dir`.
    pub fn new(media_dir: &Path, specimen: &Specimen) -> Self {
        Self {
            video: media_dir.join(specimen.video_name()),
            thumbnail: media_dir.join(specimen.thumbnail_name()),
            partial_video: media_dir.join(format!("{}.part.mp4", specimen.filename)),
            partial_thumbnail: media_dir.join(format!("{}.part.png", specimen.filename)),
        }
    }
}

/// Everything needed to encode one specimen.
#[derive(Clone, Debug)]
pub struct RenderJob {
    /// Specimen filename.
    pub filename: String,
    /// Resolved assets, bottom layer first.
    pub assets: Vec<AssetRef>,
    /// Compositing graph over `assets`.
    pub graph: FilterGraph,
    /// Output locations.
    pub paths: RenderPaths,
}

/// Why a specimen produced no video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderFailure {
    /// None of its trait assets exist.
    NoUsableTraits,
    /// The output directory could not be created.
    OutputDir(String),
    /// Every encoder attempt failed.
    EncoderExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },
}

/// Per-specimen render result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The video already existed; nothing was invoked.
    Skipped,
    /// A video was produced.
    Rendered {
        /// Encoder attempts used (1..=3).
        attempts: u32,
        /// Whether the thumbnail was produced as well.
        thumbnail: bool,
    },
    /// Permanent failure, also recorded in the failure log.
    Failed(RenderFailure),
}

/// Outcomes of a render run, in specimen order.
#[derive(Clone, Debug, Default)]
pub struct RenderReport {
    /// `(filename, outcome)` pairs.
    pub outcomes: Vec<(String, RenderOutcome)>,
}

impl RenderReport {
    /// Specimens that produced a video in this run.
    pub fn rendered(&self) -> usize {
        self.count(|o| matches!(o, RenderOutcome::Rendered { .. }))
    }

    /// Specimens skipped because their video already existed.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RenderOutcome::Skipped))
    }

    /// Specimens that failed permanently.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RenderOutcome::Failed(_)))
    }

    /// Outcome for `filename`, if it was part of the run.
    pub fn outcome(&self, filename: &str) -> Option<&RenderOutcome> {
        self.outcomes
            .iter()
            .find(|(f, _)| f == filename)
            .map(|(_, o)| o)
    }

    fn count(&self, pred: impl Fn(&RenderOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Scheduling controls for [`Renderer::run`].
#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Render only the first `limit` specimens.
    pub limit: Option<usize>,
    /// Render specimens concurrently on a rayon pool.
    pub parallel: bool,
    /// Worker count for the pool (parallel mode only).
    pub threads: Option<usize>,
}

/// Turns specimens into videos and thumbnails through an [`Encoder`].
pub struct Renderer<'a, E: Encoder> {
    layers: &'a LayerSet,
    traits_dir: PathBuf,
    media_dir: PathBuf,
    params: GraphParams,
    encoder: &'a E,
    logs: &'a RenderLogs,
}

impl<'a, E: Encoder> Renderer<'a, E> {
    /// Renderer reading assets from `traits_dir` and writing into `media_dir`.
    pub fn new(
        layers: &'a LayerSet,
        traits_dir: impl Into<PathBuf>,
        media_dir: impl Into<PathBuf>,
        params: GraphParams,
        encoder: &'a E,
        logs: &'a RenderLogs,
    ) -> Self {
        Self {
            layers,
            traits_dir: traits_dir.into(),
            media_dir: media_dir.into(),
            params,
            encoder,
            logs,
        }
    }

    /// Render `specimens` in list order.
    ///
    /// Failures are local to a specimen; only setup errors (media directory, thread pool)
    /// abort the run.
    #[tracing::instrument(skip_all, fields(count = specimens.len()))]
    pub fn run(&self, specimens: &[Specimen], opts: &RenderOpts) -> MintResult<RenderReport> {
        std::fs::create_dir_all(&self.media_dir).map_err(|e| {
            MintError::render(format!(
                "create media directory '{}': {e}",
                self.media_dir.display()
            ))
        })?;

        let take = opts.limit.unwrap_or(specimens.len()).min(specimens.len());
        let mut seen = HashSet::new();
        let queue: Vec<&Specimen> = specimens[..take]
            .iter()
            .filter(|s| {
                let first = seen.insert(s.filename.as_str());
                if !first {
                    self.logs.narrative.line(format!(
                        "duplicate specimen '{}' in list, rendering first occurrence only",
                        s.filename
                    ));
                }
                first
            })
            .collect();

        let total = queue.len();
        let outcomes = if opts.parallel {
            let pool = build_thread_pool(opts.threads)?;
            pool.install(|| {
                queue
                    .par_iter()
                    .map(|s| (s.filename.clone(), self.render_one(s)))
                    .collect::<Vec<_>>()
            })
        } else {
            queue
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    tracing::info!("rendering {} ({}/{})", s.filename, i + 1, total);
                    (s.filename.clone(), self.render_one(s))
                })
                .collect()
        };

        let report = RenderReport { outcomes };
        tracing::info!(
            rendered = report.rendered(),
            skipped = report.skipped(),
            failed = report.failed(),
            "render complete"
        );
        Ok(report)
    }

    /// Render a single specimen, recording its narrative and any permanent failure.
    pub fn render_one(&self, specimen: &Specimen) -> RenderOutcome {
        let paths = RenderPaths::new(&self.media_dir, specimen);
        if paths.video.exists() {
            self.logs.narrative.line(format!(
                "skipped {} (already exists)",
                specimen.video_name()
            ));
            return RenderOutcome::Skipped;
        }

        if let Err(err) = ensure_parent_dir(&paths.partial_video) {
            self.logs
                .failures
                .line(format!("{}: {err}", specimen.filename));
            tracing::error!(specimen = %specimen.filename, "{err}");
            return RenderOutcome::Failed(RenderFailure::OutputDir(err.to_string()));
        }

        match self.prepare(specimen, paths) {
            Ok(job) => self.execute(&job),
            Err(failure) => {
                self.logs
                    .failures
                    .line(format!("{}: no usable traits", specimen.filename));
                tracing::warn!(specimen = %specimen.filename, "no usable traits");
                RenderOutcome::Failed(failure)
            }
        }
    }

    /// Resolve assets and build the compositing graph.
    pub fn prepare(&self, specimen: &Specimen, paths: RenderPaths) -> Result<RenderJob, RenderFailure> {
        let resolved = resolve_assets(self.layers, &self.traits_dir, specimen);
        for missing in &resolved.missing {
            self.logs
                .narrative
                .line(format!("missing trait asset: {}", missing.display()));
            tracing::warn!(specimen = %specimen.filename, path = %missing.display(), "missing trait asset");
        }
        if resolved.assets.is_empty() {
            return Err(RenderFailure::NoUsableTraits);
        }

        let graph = FilterGraph::build(&resolved.assets, self.params)
            .map_err(|_| RenderFailure::NoUsableTraits)?;
        self.logs
            .narrative
            .line(format!("{} filter graph:\n{graph}", specimen.filename));
        tracing::debug!(specimen = %specimen.filename, %graph, "filter graph");

        Ok(RenderJob {
            filename: specimen.filename.clone(),
            assets: resolved.assets,
            graph,
            paths,
        })
    }

    fn execute(&self, job: &RenderJob) -> RenderOutcome {
        let video_name = format!("{}.mp4", job.filename);
        let mut last_error = String::new();

        for attempt in 1..=MAX_RENDER_ATTEMPTS {
            remove_if_present(&job.paths.partial_video);
            let result = self
                .encoder
                .encode_video(&job.graph, &job.paths.partial_video)
                .and_then(|()| promote(&job.paths.partial_video, &job.paths.video));

            match result {
                Ok(()) => {
                    let thumbnail = self.thumbnail(job);
                    self.logs
                        .narrative
                        .line(format!("{video_name} rendered successfully"));
                    return RenderOutcome::Rendered { attempts: attempt, thumbnail };
                }
                Err(err) => {
                    remove_if_present(&job.paths.partial_video);
                    last_error = err.to_string();
                    if attempt < MAX_RENDER_ATTEMPTS {
                        self.logs
                            .narrative
                            .line(format!("retry {video_name} (attempt {attempt}): {err}"));
                        tracing::warn!(specimen = %job.filename, attempt, "encode failed, retrying: {err}");
                    }
                }
            }
        }

        self.logs.failures.line(format!(
            "{video_name}: encoder failed after {MAX_RENDER_ATTEMPTS} attempts: {last_error}"
        ));
        tracing::error!(specimen = %job.filename, "encode failed permanently: {last_error}");
        RenderOutcome::Failed(RenderFailure::EncoderExhausted {
            attempts: MAX_RENDER_ATTEMPTS,
            last_error,
        })
    }

    fn thumbnail(&self, job: &RenderJob) -> bool {
        let thumb_name = format!("{}.png", job.filename);
        let result = self
            .encoder
            .extract_thumbnail(&job.paths.video, &job.paths.partial_thumbnail)
            .and_then(|()| promote(&job.paths.partial_thumbnail, &job.paths.thumbnail));

        match result {
            Ok(()) => {
                self.logs
                    .narrative
                    .line(format!("thumbnail generated: {thumb_name}"));
                true
            }
            Err(err) => {
                remove_if_present(&job.paths.partial_thumbnail);
                self.logs
                    .narrative
                    .line(format!("thumbnail failed: {thumb_name}: {err}"));
                tracing::warn!(specimen = %job.filename, "thumbnail failed: {err}");
                false
            }
        }
    }
}

fn promote(partial: &Path, dest: &Path) -> MintResult<()> {
    std::fs::rename(partial, dest).map_err(|e| {
        MintError::render(format!(
            "move '{}' into place as '{}': {e}",
            partial.display(),
            dest.display()
        ))
    })
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "failed to remove partial output: {e}"),
    }
}

fn build_thread_pool(threads: Option<usize>) -> MintResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MintError::config(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MintError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
