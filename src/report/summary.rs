use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::layers::LayerSet;
use crate::foundation::error::MintResult;
use crate::foundation::layout::ensure_parent_dir;
use crate::specimen::model::Specimen;

/// Usage count of one trait value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitCount {
    /// Trait value.
    pub value: String,
    /// Number of occurrences.
    pub count: usize,
}

/// Usage of one layer across the collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerUsage {
    /// Layer name.
    pub layer: String,
    /// Trait occurrences on this layer.
    pub count: usize,
    /// Configured traits in authoring order, including unused ones (count 0).
    pub configured: Vec<TraitCount>,
    /// Traits found in the data that the layer config does not list.
    pub unknown: Vec<TraitCount>,
}

impl LayerUsage {
    /// Configured traits nobody drew.
    pub fn unused(&self) -> impl Iterator<Item = &TraitCount> {
        self.configured.iter().filter(|t| t.count == 0)
    }
}

/// Trait-frequency report over a specimen list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitSummary {
    /// Report time.
    pub generated_at: DateTime<Utc>,
    /// Specimens covered.
    pub total: usize,
    /// Specimens carrying the rare flag.
    pub rare: usize,
    /// Configured layers in order, then the bonus layer, then layers seen only in data.
    pub layers: Vec<LayerUsage>,
}

impl TraitSummary {
    /// Tally `specimens` against the configured layers.
    pub fn build(
        layers: &LayerSet,
        bonus_layer: &str,
        specimens: &[Specimen],
        generated_at: DateTime<Utc>,
    ) -> Self {
        // layer -> value -> count; value order is first appearance.
        let mut tallies: Vec<(String, Vec<TraitCount>)> = Vec::new();
        for trait_ in specimens.iter().flat_map(|s| &s.traits) {
            let idx = match tallies.iter().position(|(l, _)| *l == trait_.layer) {
                Some(i) => i,
                None => {
                    tallies.push((trait_.layer.clone(), Vec::new()));
                    tallies.len() - 1
                }
            };
            let values = &mut tallies[idx].1;
            match values.iter_mut().find(|t| t.value == trait_.value) {
                Some(t) => t.count += 1,
                None => values.push(TraitCount {
                    value: trait_.value.clone(),
                    count: 1,
                }),
            }
        }

        let mut order: Vec<&str> = layers.layers().iter().map(|l| l.name.as_str()).collect();
        if !order.contains(&bonus_layer) {
            order.push(bonus_layer);
        }
        let extra: Vec<&str> = tallies
            .iter()
            .map(|(l, _)| l.as_str())
            .filter(|l| !order.contains(l))
            .collect();
        order.extend(extra);

        let usage = order
            .into_iter()
            .map(|name| {
                let seen: &[TraitCount] = tallies
                    .iter()
                    .find(|(l, _)| l == name)
                    .map(|(_, v)| v.as_slice())
                    .unwrap_or(&[]);
                let counts: BTreeMap<&str, usize> =
                    seen.iter().map(|t| (t.value.as_str(), t.count)).collect();

                let configured: Vec<TraitCount> = layers
                    .get(name)
                    .map(|l| l.traits.as_slice())
                    .unwrap_or(&[])
                    .iter()
                    .map(|opt| TraitCount {
                        value: opt.name.clone(),
                        count: counts.get(opt.name.as_str()).copied().unwrap_or(0),
                    })
                    .collect();
                let unknown: Vec<TraitCount> = seen
                    .iter()
                    .filter(|t| !configured.iter().any(|c| c.value == t.value))
                    .cloned()
                    .collect();

                LayerUsage {
                    layer: name.to_string(),
                    count: seen.iter().map(|t| t.count).sum(),
                    configured,
                    unknown,
                }
            })
            .collect();

        Self {
            generated_at,
            total: specimens.len(),
            rare: specimens.iter().filter(|s| s.rare).count(),
            layers: usage,
        }
    }

    /// Write the text rendering to `path`, replacing any earlier report.
    pub fn write_to(&self, path: &Path) -> MintResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, self.to_string())
            .with_context(|| format!("write trait summary '{}'", path.display()))?;
        Ok(())
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl fmt::Display for TraitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Trait summary ({})",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f)?;
        writeln!(f, "Total specimens: {}", self.total)?;
        writeln!(f, "Rare variants: {}", self.rare)?;
        writeln!(f)?;

        writeln!(f, "Layer usage:")?;
        for layer in &self.layers {
            writeln!(
                f,
                "  {}: {} ({:.2}%)",
                layer.layer,
                layer.count,
                percent(layer.count, self.total)
            )?;
        }

        writeln!(f)?;
        write!(f, "Trait frequencies by layer:")?;
        for layer in &self.layers {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "  [{}]", layer.layer)?;
            for t in &layer.configured {
                write!(
                    f,
                    "\n    {}: {} ({:.2}%)",
                    t.value,
                    t.count,
                    percent(t.count, layer.count)
                )?;
                if t.count == 0 {
                    write!(f, " unused")?;
                }
            }
            for t in &layer.unknown {
                write!(
                    f,
                    "\n    unknown trait: {} ({} occurrences, not in config)",
                    t.value, t.count
                )?;
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/summary.rs"]
mod tests;
