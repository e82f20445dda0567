use super::*;
use crate::config::layers::{LayerConfig, TraitOption};
use crate::specimen::model::SelectedTrait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Writes placeholder files and fails the first `fail_first` video encodes.
#[derive(Default)]
struct ScriptedEncoder {
    fail_first: usize,
    fail_thumbnails: bool,
    videos: AtomicUsize,
    thumbnails: AtomicUsize,
    targets: Mutex<Vec<PathBuf>>,
}

impl Encoder for ScriptedEncoder {
    fn encode_video(&self, _graph: &FilterGraph, out: &Path) -> MintResult<()> {
        let n = self.videos.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(out.to_path_buf());
        if n < self.fail_first {
            // Leave a truncated file behind like a crashed encoder would.
            std::fs::write(out, b"partial").unwrap();
            return Err(MintError::encode(format!("scripted failure {}", n + 1)));
        }
        std::fs::write(out, b"video").unwrap();
        Ok(())
    }

    fn extract_thumbnail(&self, _video: &Path, out: &Path) -> MintResult<()> {
        self.thumbnails.fetch_add(1, Ordering::SeqCst);
        if self.fail_thumbnails {
            return Err(MintError::encode("no frame"));
        }
        std::fs::write(out, b"png").unwrap();
        Ok(())
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    layers: LayerSet,
    logs: RenderLogs,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let layers = LayerSet::new(vec![
            LayerConfig {
                name: "Background".to_string(),
                order: 0,
                required: true,
                rarity: 0,
                trait_type: None,
                animated: false,
                asset_type: None,
                traits: vec![TraitOption::new("Blue", 100)],
            },
            LayerConfig {
                name: "Sparkles".to_string(),
                order: 1,
                required: false,
                rarity: 50,
                trait_type: None,
                animated: true,
                asset_type: None,
                traits: vec![TraitOption::new("Gold", 100)],
            },
        ])
        .unwrap();
        for rel in ["Background/Blue.png", "Sparkles/Gold.mov"] {
            let p = dir.path().join("traits").join(rel);
            std::fs::create_dir_all(p.parent().unwrap()).unwrap();
            std::fs::write(p, b"asset").unwrap();
        }
        let logs = RenderLogs::create(
            dir.path().join("render_log.txt"),
            dir.path().join("render_failures.txt"),
        )
        .unwrap();
        Self { dir, layers, logs }
    }

    fn media(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    fn renderer<'a>(&'a self, enc: &'a ScriptedEncoder) -> Renderer<'a, ScriptedEncoder> {
        Renderer::new(
            &self.layers,
            self.dir.path().join("traits"),
            self.media(),
            GraphParams {
                width: 1080,
                height: 1080,
                fps: 24,
            },
            enc,
            &self.logs,
        )
    }

    fn narrative(&self) -> String {
        std::fs::read_to_string(self.logs.narrative.path()).unwrap()
    }

    fn failures(&self) -> String {
        std::fs::read_to_string(self.logs.failures.path()).unwrap()
    }
}

fn specimen(id: u64, traits: &[(&str, &str)]) -> Specimen {
    Specimen {
        id,
        filename: format!("duck #{id}"),
        traits: traits
            .iter()
            .map(|(l, v)| SelectedTrait::new(*l, *l, *v))
            .collect(),
        rare: false,
    }
}

#[test]
fn successful_render_promotes_video_and_thumbnail() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let s = specimen(1, &[("Background", "Blue"), ("Sparkles", "Gold")]);

    let outcome = fx.renderer(&enc).render_one(&s);
    assert_eq!(
        outcome,
        RenderOutcome::Rendered {
            attempts: 1,
            thumbnail: true
        }
    );
    assert!(fx.media().join("duck #1.mp4").is_file());
    assert!(fx.media().join("duck #1.png").is_file());
    assert!(!fx.media().join("duck #1.part.mp4").exists());
    assert!(!fx.media().join("duck #1.part.png").exists());

    // The encoder only ever writes to the partial path.
    let targets = enc.targets.lock().unwrap();
    assert_eq!(*targets, vec![fx.media().join("duck #1.part.mp4")]);

    let log = fx.narrative();
    assert!(log.contains("[0:v] setpts=PTS-STARTPTS"), "{log}");
    assert!(log.contains("thumbnail generated: duck #1.png"), "{log}");
    assert!(log.contains("duck #1.mp4 rendered successfully"), "{log}");
    assert!(fx.failures().is_empty());
}

#[test]
fn existing_video_is_skipped_without_invoking_encoder() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.media()).unwrap();
    std::fs::write(fx.media().join("duck #1.mp4"), b"old").unwrap();
    let enc = ScriptedEncoder::default();

    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));
    assert_eq!(outcome, RenderOutcome::Skipped);
    assert_eq!(enc.videos.load(Ordering::SeqCst), 0);
    assert_eq!(enc.thumbnails.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read(fx.media().join("duck #1.mp4")).unwrap(), b"old");
    assert!(fx.narrative().contains("skipped duck #1.mp4 (already exists)"));
}

#[test]
fn transient_failures_are_retried() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder {
        fail_first: 2,
        ..ScriptedEncoder::default()
    };
    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));
    assert_eq!(
        outcome,
        RenderOutcome::Rendered {
            attempts: 3,
            thumbnail: true
        }
    );
    assert_eq!(std::fs::read(fx.media().join("duck #1.mp4")).unwrap(), b"video");
    let log = fx.narrative();
    assert!(log.contains("retry duck #1.mp4 (attempt 1)"), "{log}");
    assert!(log.contains("retry duck #1.mp4 (attempt 2)"), "{log}");
    assert!(fx.failures().is_empty());
}

#[test]
fn three_failures_are_permanent_and_leave_no_output() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder {
        fail_first: usize::MAX,
        ..ScriptedEncoder::default()
    };
    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));

    match outcome {
        RenderOutcome::Failed(RenderFailure::EncoderExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, MAX_RENDER_ATTEMPTS);
            assert!(last_error.contains("scripted failure 3"), "{last_error}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(enc.videos.load(Ordering::SeqCst), 3);
    assert_eq!(enc.thumbnails.load(Ordering::SeqCst), 0);
    assert!(!fx.media().join("duck #1.mp4").exists());
    assert!(!fx.media().join("duck #1.part.mp4").exists());

    let failures = fx.failures();
    assert_eq!(failures.lines().count(), 1);
    assert!(failures.contains("duck #1.mp4: encoder failed after 3 attempts"));
}

#[test]
fn thumbnail_failure_does_not_fail_the_render() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder {
        fail_thumbnails: true,
        ..ScriptedEncoder::default()
    };
    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));
    assert_eq!(
        outcome,
        RenderOutcome::Rendered {
            attempts: 1,
            thumbnail: false
        }
    );
    assert!(fx.media().join("duck #1.mp4").is_file());
    assert!(!fx.media().join("duck #1.png").exists());
    assert!(fx.narrative().contains("thumbnail failed: duck #1.png"));
    assert!(fx.failures().is_empty());
}

#[test]
fn specimen_without_assets_is_a_failure() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Plaid"), ("Hat", "Cap")]));
    assert_eq!(outcome, RenderOutcome::Failed(RenderFailure::NoUsableTraits));
    assert_eq!(enc.videos.load(Ordering::SeqCst), 0);
    assert!(fx.failures().contains("duck #1: no usable traits"));
    let log = fx.narrative();
    assert!(log.contains("missing trait asset"), "{log}");
    assert!(log.contains("Plaid.png"), "{log}");
}

#[test]
fn missing_assets_are_dropped_from_the_graph() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let s = specimen(1, &[("Background", "Blue"), ("Hat", "Cap")]);
    let paths = RenderPaths::new(&fx.media(), &s);
    let job = fx.renderer(&enc).prepare(&s, paths).unwrap();
    assert_eq!(job.assets.len(), 1);
    assert_eq!(job.assets[0].layer, "Background");
    assert!(fx.narrative().contains("Cap.png"));
}

#[test]
fn run_honors_limit_and_dedupes_filenames() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let list = vec![
        specimen(1, &[("Background", "Blue")]),
        specimen(1, &[("Background", "Blue")]),
        specimen(2, &[("Background", "Blue")]),
        specimen(3, &[("Background", "Blue")]),
    ];
    let report = fx
        .renderer(&enc)
        .run(
            &list,
            &RenderOpts {
                limit: Some(3),
                ..RenderOpts::default()
            },
        )
        .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.rendered(), 2);
    assert!(report.outcome("duck #3").is_none());
    assert_eq!(enc.videos.load(Ordering::SeqCst), 2);
    assert!(fx.narrative().contains("duplicate specimen 'duck #1'"));
}

#[test]
fn second_run_is_a_no_op() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let list: Vec<_> = (1..=4)
        .map(|i| specimen(i, &[("Background", "Blue"), ("Sparkles", "Gold")]))
        .collect();
    let r = fx.renderer(&enc);

    let first = r.run(&list, &RenderOpts::default()).unwrap();
    assert_eq!(first.rendered(), 4);
    let calls = enc.videos.load(Ordering::SeqCst);

    let second = r.run(&list, &RenderOpts::default()).unwrap();
    assert_eq!(second.skipped(), 4);
    assert_eq!(enc.videos.load(Ordering::SeqCst), calls);
}

#[test]
fn parallel_run_renders_every_specimen() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let list: Vec<_> = (1..=12)
        .map(|i| specimen(i, &[("Background", "Blue")]))
        .collect();
    let report = fx
        .renderer(&enc)
        .run(
            &list,
            &RenderOpts {
                parallel: true,
                threads: Some(4),
                ..RenderOpts::default()
            },
        )
        .unwrap();

    assert_eq!(report.rendered(), 12);
    let names: Vec<_> = report.outcomes.iter().map(|(f, _)| f.clone()).collect();
    let expected: Vec<_> = (1..=12).map(|i| format!("duck #{i}")).collect();
    assert_eq!(names, expected);
    for i in 1..=12 {
        assert!(fx.media().join(format!("duck #{i}.mp4")).is_file());
    }
    let log = fx.narrative();
    for line in log.lines().filter(|l| l.ends_with("rendered successfully")) {
        assert!(line.starts_with("duck #"), "interleaved line: {line}");
    }
}

#[test]
fn zero_threads_is_rejected() {
    let fx = Fixture::new();
    let enc = ScriptedEncoder::default();
    let err = fx
        .renderer(&enc)
        .run(
            &[specimen(1, &[("Background", "Blue")])],
            &RenderOpts {
                parallel: true,
                threads: Some(0),
                ..RenderOpts::default()
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("threads"));
}

#[test]
fn render_one_creates_the_media_dir() {
    let fx = Fixture::new();
    assert!(!fx.media().exists());
    let enc = ScriptedEncoder::default();

    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));
    assert!(matches!(outcome, RenderOutcome::Rendered { attempts: 1, .. }));
    assert!(fx.media().is_dir());
    assert!(fx.media().join("duck #1.mp4").is_file());
}

#[test]
fn unusable_media_dir_fails_without_invoking_encoder() {
    let fx = Fixture::new();
    // A regular file where the media directory should be.
    std::fs::write(fx.media(), b"not a dir").unwrap();
    let enc = ScriptedEncoder::default();

    let outcome = fx
        .renderer(&enc)
        .render_one(&specimen(1, &[("Background", "Blue")]));
    assert!(matches!(
        outcome,
        RenderOutcome::Failed(RenderFailure::OutputDir(_))
    ));
    assert_eq!(enc.videos.load(Ordering::SeqCst), 0);
    assert!(fx.failures().starts_with("duck #1:"));
}
