use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{MintError, MintResult};

/// A named trait value inside a layer, with its relative selection weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitOption {
    /// Trait value, also the asset file stem.
    pub name: String,
    /// Relative weight. Zero means the option can never be drawn.
    #[serde(default)]
    pub weight: u32,
}

impl TraitOption {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// One visual dimension of a specimen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Unique layer name; also the asset directory under `traits/`.
    pub name: String,
    /// Compositing and iteration order (ascending, bottom layer first).
    #[serde(default)]
    pub order: i32,
    /// Required layers are always included in a specimen.
    #[serde(default)]
    pub required: bool,
    /// Inclusion probability in percent for optional layers.
    #[serde(default)]
    pub rarity: u32,
    /// Attribute label; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<String>,
    /// Animated layers are read as video streams rather than looped stills.
    #[serde(default)]
    pub animated: bool,
    /// Asset file extension override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    /// Trait options in authoring order.
    #[serde(default)]
    pub traits: Vec<TraitOption>,
}

impl LayerConfig {
    /// Attribute label written into selected traits.
    pub fn trait_type(&self) -> &str {
        self.trait_type.as_deref().unwrap_or(&self.name)
    }

    /// File extension of this layer's assets.
    pub fn asset_extension(&self) -> &str {
        match self.asset_type.as_deref() {
            Some(ext) => ext,
            None if self.animated => "mov",
            None => "png",
        }
    }

    /// Options that can actually be drawn (weight > 0).
    pub fn eligible_traits(&self) -> impl Iterator<Item = &TraitOption> {
        self.traits.iter().filter(|t| t.weight > 0)
    }

    /// Sum of all option weights.
    pub fn total_weight(&self) -> u64 {
        self.traits.iter().map(|t| u64::from(t.weight)).sum()
    }

    /// Trailing pseudo-layer that holds the bonus trait. It has no options and is never
    /// drawn by the composer.
    pub fn bonus(name: &str) -> Self {
        Self {
            name: name.to_string(),
            order: i32::MAX,
            required: false,
            rarity: 0,
            trait_type: None,
            animated: false,
            asset_type: None,
            traits: Vec::new(),
        }
    }
}

/// Non-fatal configuration findings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A layer's weights do not sum to 100, so its distribution is skewed.
    WeightSum {
        /// Layer name.
        layer: String,
        /// Actual sum.
        sum: u64,
    },
    /// A required layer has no option with positive weight; every composition will fail.
    NoEligibleTraits {
        /// Layer name.
        layer: String,
    },
    /// The bonus asset used by rare variants is not on disk.
    MissingBonusAsset {
        /// Expected location.
        path: String,
    },
    /// More rare variants were requested than specimens exist.
    RareCountClamped {
        /// Requested count.
        requested: usize,
        /// Available specimens.
        available: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightSum { layer, sum } => {
                write!(f, "trait weights in layer '{layer}' sum to {sum}, not 100")
            }
            Self::NoEligibleTraits { layer } => {
                write!(f, "required layer '{layer}' has no trait with positive weight")
            }
            Self::MissingBonusAsset { path } => write!(f, "bonus asset missing at '{path}'"),
            Self::RareCountClamped {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} rare variants but only {available} specimens exist"
            ),
        }
    }
}

/// Validated, order-sorted layer model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSet {
    layers: Vec<LayerConfig>,
}

impl LayerSet {
    /// Sort layers by `order` (stable, so equal orders keep authoring order) and reject
    /// structurally invalid input.
    pub fn new(mut layers: Vec<LayerConfig>) -> MintResult<Self> {
        let mut seen = BTreeSet::new();
        for layer in &layers {
            if layer.name.trim().is_empty() {
                return Err(MintError::config("layer name must be non-empty"));
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(MintError::config(format!(
                    "duplicate layer name '{}'",
                    layer.name
                )));
            }
            if layer.rarity > 100 {
                return Err(MintError::config(format!(
                    "layer '{}' rarity must be within 0..=100, got {}",
                    layer.name, layer.rarity
                )));
            }
        }
        layers.sort_by_key(|l| l.order);
        Ok(Self { layers })
    }

    /// Read and validate `layers.json`.
    pub fn from_path(path: &Path) -> MintResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read layer config '{}'", path.display()))?;
        let layers: Vec<LayerConfig> = serde_json::from_str(&text).map_err(|e| {
            MintError::config(format!("parse layer config '{}': {e}", path.display()))
        })?;
        Self::new(layers)
    }

    /// Layers in ascending display order.
    pub fn layers(&self) -> &[LayerConfig] {
        &self.layers
    }

    /// Look up a configured layer by name.
    pub fn get(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Canonical stacking position of `name`; unknown layers sort after every configured one.
    pub fn position(&self, name: &str) -> usize {
        self.layers
            .iter()
            .position(|l| l.name == name)
            .unwrap_or(self.layers.len())
    }

    /// Reject a configured layer named like the bonus layer. Its draws would count as bonus
    /// traits, so rare variants could carry two and the layer would escape the trait band.
    pub fn check_bonus_layer(&self, bonus_layer: &str) -> MintResult<()> {
        if self.get(bonus_layer).is_some() {
            return Err(MintError::config(format!(
                "layer '{bonus_layer}' clashes with the bonus layer; rename it or set bonusLayer"
            )));
        }
        Ok(())
    }

    /// Soft checks. Generation proceeds regardless.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        for layer in &self.layers {
            let sum = layer.total_weight();
            if sum != 100 {
                out.push(ConfigWarning::WeightSum {
                    layer: layer.name.clone(),
                    sum,
                });
            }
            if layer.required && layer.eligible_traits().next().is_none() {
                out.push(ConfigWarning::NoEligibleTraits {
                    layer: layer.name.clone(),
                });
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/layers.rs"]
mod tests;
