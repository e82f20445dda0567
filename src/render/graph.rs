use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::foundation::error::{MintError, MintResult};
use crate::render::assets::AssetRef;

/// Label of the final composited stream.
pub const OUTPUT_LABEL: &str = "outv";

/// How the encoder should read an input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// A still image repeated for as long as the output needs frames.
    Looped,
    /// A video read at its natural timing.
    Natural,
}

/// One encoder input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphInput {
    /// File to read.
    pub path: PathBuf,
    /// Read mode.
    pub mode: InputMode,
}

/// A stream reference in a filter chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pad {
    /// Video stream of the n-th input file (`[n:v]`).
    Input(usize),
    /// Output of an earlier chain (`[label]`).
    Label(String),
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(i) => write!(f, "[{i}:v]"),
            Self::Label(l) => write!(f, "[{l}]"),
        }
    }
}

/// A single filter operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Rebase timestamps to start at zero.
    ResetTimestamps,
    /// Resize to a fixed frame size.
    Scale {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Resample to a fixed frame rate.
    Fps(u32),
    /// Draw the second input over the first.
    Overlay {
        /// Use straight alpha from the overlay source (animated, transparent inputs).
        straight_alpha: bool,
    },
    /// Pass through unchanged; used to rename the final stream.
    Copy,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetTimestamps => f.write_str("setpts=PTS-STARTPTS"),
            Self::Scale { width, height } => write!(f, "scale={width}:{height}"),
            Self::Fps(fps) => write!(f, "fps={fps}"),
            Self::Overlay { straight_alpha } => {
                f.write_str("overlay=format=auto")?;
                if *straight_alpha {
                    f.write_str(":alpha=straight")?;
                }
                Ok(())
            }
            Self::Copy => f.write_str("copy"),
        }
    }
}

/// Filters applied to one or more input pads, producing one labelled output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterChain {
    /// Input pads in order.
    pub inputs: Vec<Pad>,
    /// Filters applied in sequence.
    pub filters: Vec<Filter>,
    /// Output label.
    pub output: String,
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{pad}")?;
        }
        f.write_str(" ")?;
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{filter}")?;
        }
        write!(f, " [{}]", self.output)
    }
}

/// Output geometry and timing shared by every input chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphParams {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Frame rate animated inputs are resampled to.
    pub fps: u32,
}

/// Compositing graph for one specimen: inputs plus the filter chains that stack them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterGraph {
    /// Encoder inputs, index-aligned with `Pad::Input`.
    pub inputs: Vec<GraphInput>,
    /// Chains in evaluation order.
    pub chains: Vec<FilterChain>,
    /// Label of the final stream.
    pub output: String,
}

impl FilterGraph {
    /// Stack `assets` bottom-first: every asset becomes a normalized stream `t{i}`, each later
    /// stream is overlaid on the accumulator as `tmp{i}`, and the last accumulator is copied
    /// into [`OUTPUT_LABEL`].
    pub fn build(assets: &[AssetRef], params: GraphParams) -> MintResult<Self> {
        if assets.is_empty() {
            return Err(MintError::render("cannot build a filter graph with no inputs"));
        }

        let mut inputs = Vec::with_capacity(assets.len());
        let mut chains = Vec::with_capacity(assets.len() * 2 + 1);
        let mut acc: Option<String> = None;

        for (i, asset) in assets.iter().enumerate() {
            let label = format!("t{i}");
            let mut filters = vec![
                Filter::ResetTimestamps,
                Filter::Scale {
                    width: params.width,
                    height: params.height,
                },
            ];
            if asset.animated {
                filters.push(Filter::Fps(params.fps));
            }
            inputs.push(GraphInput {
                path: asset.path.clone(),
                mode: if asset.animated {
                    InputMode::Natural
                } else {
                    InputMode::Looped
                },
            });
            chains.push(FilterChain {
                inputs: vec![Pad::Input(i)],
                filters,
                output: label.clone(),
            });

            acc = Some(match acc {
                None => label,
                Some(below) => {
                    let merged = format!("tmp{i}");
                    chains.push(FilterChain {
                        inputs: vec![Pad::Label(below), Pad::Label(label)],
                        filters: vec![Filter::Overlay {
                            straight_alpha: asset.animated,
                        }],
                        output: merged.clone(),
                    });
                    merged
                }
            });
        }

        if let Some(last) = acc {
            chains.push(FilterChain {
                inputs: vec![Pad::Label(last)],
                filters: vec![Filter::Copy],
                output: OUTPUT_LABEL.to_string(),
            });
        }

        Ok(Self {
            inputs,
            chains,
            output: OUTPUT_LABEL.to_string(),
        })
    }

    /// `-loop 1 -i <still>` / `-i <video>` arguments, in input order.
    pub fn input_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.inputs.len() * 4);
        for input in &self.inputs {
            if input.mode == InputMode::Looped {
                args.push("-loop".into());
                args.push("1".into());
            }
            args.push("-i".into());
            args.push(input.path.clone().into_os_string());
        }
        args
    }

    /// `-map` argument selecting the final stream.
    pub fn map_arg(&self) -> String {
        format!("[{}]", self.output)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/graph.rs"]
mod tests;
