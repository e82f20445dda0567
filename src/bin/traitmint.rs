use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use traitmint::encode::ffmpeg::is_ffmpeg_on_path;
use traitmint::{
    CollectionConfig, EncodeConfig, FfmpegEncoder, LayerSet, ProjectLayout, RenderLogs,
    RenderOpts, Renderer, TraitSummary,
};

/// Characters of a log printed by `traitmint logs`.
const LOG_PREVIEW_CHARS: usize = 3000;

#[derive(Parser, Debug)]
#[command(name = "traitmint", version)]
struct Cli {
    /// Project root holding `config/`, `traits/` and `output/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Debug-level logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the specimen list.
    Generate,
    /// Render videos and thumbnails (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Write per-specimen and master metadata.
    Metadata(MetadataArgs),
    /// Write and print the trait-frequency summary.
    Summary,
    /// Print the start of one of the run logs.
    Logs {
        #[arg(value_enum)]
        which: LogKind,
    },
    /// Generate, render, then write metadata and the summary.
    All(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render only the first N specimens.
    #[arg(long)]
    limit: Option<usize>,

    /// Render specimens concurrently.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (defaults to the core count).
    #[arg(long)]
    threads: Option<usize>,

    /// Per-invocation encoder timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Parser, Debug)]
struct MetadataArgs {
    /// Write metadata for the first N specimens only.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogKind {
    Render,
    Failures,
    Summary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let layout = ProjectLayout::new(cli.root);
    match cli.cmd {
        Command::Generate => cmd_generate(&layout),
        Command::Render(args) => cmd_render(&layout, &args),
        Command::Metadata(args) => cmd_metadata(&layout, args.limit),
        Command::Summary => cmd_summary(&layout),
        Command::Logs { which } => cmd_logs(&layout, which),
        Command::All(args) => {
            cmd_generate(&layout)?;
            cmd_render(&layout, &args)?;
            cmd_metadata(&layout, args.limit)?;
            cmd_summary(&layout)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(layout: &ProjectLayout) -> anyhow::Result<(LayerSet, CollectionConfig)> {
    let layers = LayerSet::from_path(&layout.layers_path())?;
    let collection = CollectionConfig::from_path(&layout.collection_path())?;
    Ok((layers, collection))
}

fn cmd_generate(layout: &ProjectLayout) -> anyhow::Result<()> {
    let (layers, collection) = load_config(layout)?;
    let report = traitmint::generate_collection(
        &layers,
        &collection,
        &layout.traits_dir(),
        &mut rand::rngs::OsRng,
    )?;

    for w in &report.warnings {
        eprintln!("warning: {w}");
    }

    let outcome = &report.outcome;
    traitmint::save_specimens(&layout.specimens_path(), &outcome.specimens)?;

    if let Some(reason) = outcome.exhausted {
        let s = &outcome.stats;
        eprintln!(
            "warning: generation stopped early ({reason}): {} of {} specimens after {} attempts \
             ({} composition failures, {} outside trait band, {} duplicates)",
            outcome.specimens.len(),
            collection.nfts_to_generate,
            s.attempts,
            s.composition_failures,
            s.out_of_band,
            s.duplicates
        );
    }
    eprintln!(
        "generated {} specimens ({} rare) -> {}",
        outcome.specimens.len(),
        report.rare_indices.len(),
        layout.specimens_path().display()
    );
    Ok(())
}

fn cmd_render(layout: &ProjectLayout, args: &RenderArgs) -> anyhow::Result<()> {
    let layers = LayerSet::from_path(&layout.layers_path())?;
    let specimens = traitmint::load_specimens(&layout.specimens_path())?;

    anyhow::ensure!(
        is_ffmpeg_on_path(),
        "ffmpeg not found on PATH; install it to render specimens"
    );

    let mut cfg = EncodeConfig::default();
    if let Some(secs) = args.timeout_secs {
        cfg.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    let encoder = FfmpegEncoder::new(cfg)?;
    let logs = RenderLogs::create(layout.render_log_path(), layout.failure_log_path())?;

    let renderer = Renderer::new(
        &layers,
        layout.traits_dir(),
        layout.media_dir(),
        encoder.config().graph_params(),
        &encoder,
        &logs,
    );
    let report = renderer.run(
        &specimens,
        &RenderOpts {
            limit: args.limit,
            parallel: args.parallel,
            threads: args.threads,
        },
    )?;

    eprintln!(
        "rendered {}, skipped {}, failed {} (see {})",
        report.rendered(),
        report.skipped(),
        report.failed(),
        layout.failure_log_path().display()
    );
    Ok(())
}

fn cmd_metadata(layout: &ProjectLayout, limit: Option<usize>) -> anyhow::Result<()> {
    let collection = CollectionConfig::from_path(&layout.collection_path())?;
    let specimens = traitmint::load_specimens(&layout.specimens_path())?;
    let written = traitmint::write_metadata(
        &specimens,
        &collection,
        &layout.metadata_dir(),
        &layout.master_metadata_path(),
        limit,
    )?;
    eprintln!(
        "wrote metadata for {written} specimens -> {}",
        layout.metadata_dir().display()
    );
    Ok(())
}

fn cmd_summary(layout: &ProjectLayout) -> anyhow::Result<()> {
    let (layers, collection) = load_config(layout)?;
    let specimens = traitmint::load_specimens(&layout.specimens_path())?;
    let summary = TraitSummary::build(
        &layers,
        &collection.bonus_layer,
        &specimens,
        chrono::Utc::now(),
    );
    summary.write_to(&layout.summary_path())?;
    print!("{summary}");
    Ok(())
}

fn cmd_logs(layout: &ProjectLayout, which: LogKind) -> anyhow::Result<()> {
    let path = match which {
        LogKind::Render => layout.render_log_path(),
        LogKind::Failures => layout.failure_log_path(),
        LogKind::Summary => layout.summary_path(),
    };
    if !path.exists() {
        eprintln!("no log at {}", path.display());
        return Ok(());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("read log '{}'", path.display()))?;
    let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    print!("{preview}");
    if preview.len() < text.len() {
        println!(
            "\n... truncated after {LOG_PREVIEW_CHARS} characters, full log at {}",
            path.display()
        );
    }
    Ok(())
}
