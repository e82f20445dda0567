use serde::{Deserialize, Serialize};

/// One drawn trait of a specimen.
///
/// On disk a trait record may carry `layer`, `trait_type`, or both (older lists also carry a
/// `path`). Deserialization goes through [`RawTrait`] so every in-memory trait has both
/// fields populated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawTrait")]
pub struct SelectedTrait {
    /// Source layer name.
    pub layer: String,
    /// Attribute label.
    pub trait_type: String,
    /// Trait value.
    pub value: String,
}

impl SelectedTrait {
    /// Build a trait record.
    pub fn new(
        layer: impl Into<String>,
        trait_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            layer: layer.into(),
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawTrait {
    #[serde(default)]
    layer: Option<String>,
    #[serde(default)]
    trait_type: Option<String>,
    value: String,
}

impl From<RawTrait> for SelectedTrait {
    fn from(raw: RawTrait) -> Self {
        let layer = raw
            .layer
            .clone()
            .or_else(|| raw.trait_type.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let trait_type = raw.trait_type.unwrap_or_else(|| layer.clone());
        Self {
            layer,
            trait_type,
            value: raw.value,
        }
    }
}

/// One generated collection item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specimen {
    /// Sequential id.
    pub id: u64,
    /// `{prefix} #{id}`; stem of every artifact file.
    pub filename: String,
    /// Base traits in layer order, then at most one bonus trait.
    pub traits: Vec<SelectedTrait>,
    /// Set by the rare-variant injector.
    #[serde(rename = "goldenEgg", default)]
    pub rare: bool,
}

impl Specimen {
    /// Number of traits not on `bonus_layer`.
    pub fn base_trait_count(&self, bonus_layer: &str) -> usize {
        self.traits.iter().filter(|t| t.layer != bonus_layer).count()
    }

    /// Video artifact filename.
    pub fn video_name(&self) -> String {
        format!("{}.mp4", self.filename)
    }

    /// Thumbnail artifact filename.
    pub fn thumbnail_name(&self) -> String {
        format!("{}.png", self.filename)
    }
}
