use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{MintError, MintResult};

/// Default layer name reserved for rare-variant bonus traits.
pub const DEFAULT_BONUS_LAYER: &str = "Special";
/// Default bonus trait value appended to rare variants.
pub const DEFAULT_BONUS_VALUE: &str = "Golden Egg";

/// Collection-level generation settings (`config/collection.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    /// Number of specimens to generate.
    pub nfts_to_generate: usize,
    /// Number of rare variants to inject after generation.
    #[serde(default)]
    pub golden_eggs_to_inject: usize,
    /// Rare-variant injection toggle.
    #[serde(default)]
    pub include_golden_eggs: bool,
    /// Filename prefix; specimens are named `{prefix} #{id}`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// First specimen id.
    #[serde(default = "default_start_index")]
    pub start_index: u64,
    /// Lower bound (inclusive) on base trait count.
    #[serde(default = "default_min_traits")]
    pub min_traits: usize,
    /// Upper bound (inclusive) on base trait count.
    #[serde(default = "default_max_traits")]
    pub max_traits: usize,
    /// Ceiling on total composition attempts.
    #[serde(default = "default_max_retries")]
    pub max_retries: u64,
    /// Optional ceiling on duplicate-DNA rejections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duplicate_retries: Option<u64>,
    /// Layer name used for bonus traits.
    #[serde(default = "default_bonus_layer")]
    pub bonus_layer: String,
    /// Bonus trait value.
    #[serde(default = "default_bonus_value")]
    pub bonus_value: String,
    /// Collection name used in metadata.
    #[serde(default)]
    pub collection_name: String,
    /// Collection description used in metadata.
    #[serde(default)]
    pub description: String,
    /// Creator credited in metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

fn default_file_prefix() -> String {
    "duck".to_string()
}

fn default_start_index() -> u64 {
    1
}

fn default_min_traits() -> usize {
    3
}

fn default_max_traits() -> usize {
    8
}

fn default_max_retries() -> u64 {
    10_000
}

fn default_bonus_layer() -> String {
    DEFAULT_BONUS_LAYER.to_string()
}

fn default_bonus_value() -> String {
    DEFAULT_BONUS_VALUE.to_string()
}

impl CollectionConfig {
    /// Settings for `total` specimens with every other field at its default.
    pub fn with_total(total: usize) -> Self {
        Self {
            nfts_to_generate: total,
            golden_eggs_to_inject: 0,
            include_golden_eggs: false,
            file_prefix: default_file_prefix(),
            start_index: default_start_index(),
            min_traits: default_min_traits(),
            max_traits: default_max_traits(),
            max_retries: default_max_retries(),
            max_duplicate_retries: None,
            bonus_layer: default_bonus_layer(),
            bonus_value: default_bonus_value(),
            collection_name: String::new(),
            description: String::new(),
            creator: None,
        }
    }

    /// Read and validate `collection.json`.
    pub fn from_path(path: &Path) -> MintResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read collection config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            MintError::config(format!("parse collection config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural checks; fatal on failure.
    pub fn validate(&self) -> MintResult<()> {
        if self.nfts_to_generate == 0 {
            return Err(MintError::config("nftsToGenerate must be > 0"));
        }
        if self.min_traits > self.max_traits {
            return Err(MintError::config(format!(
                "minTraits ({}) must not exceed maxTraits ({})",
                self.min_traits, self.max_traits
            )));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(MintError::config(
                "filePrefix must not contain path separators",
            ));
        }
        if self.bonus_layer.trim().is_empty() || self.bonus_value.trim().is_empty() {
            return Err(MintError::config(
                "bonusLayer and bonusValue must be non-empty",
            ));
        }
        Ok(())
    }

    /// Display filename for specimen `id`.
    pub fn filename_for(&self, id: u64) -> String {
        format!("{} #{}", self.file_prefix, id)
    }

    /// Number of rare variants to inject, or zero when injection is disabled.
    pub fn rare_target(&self) -> usize {
        if self.include_golden_eggs {
            self.golden_eggs_to_inject
        } else {
            0
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/collection.rs"]
mod tests;
