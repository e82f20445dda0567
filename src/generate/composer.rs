use rand::Rng;

use crate::config::layers::{LayerConfig, LayerSet};
use crate::foundation::error::{MintError, MintResult};
use crate::generate::sampler::pick_weighted;
use crate::specimen::model::SelectedTrait;

/// Draws one trait combination per call.
#[derive(Clone, Debug)]
pub struct Composer<'a> {
    layers: &'a LayerSet,
    bonus: Option<LayerConfig>,
}

impl<'a> Composer<'a> {
    /// Composer over `layers`. A trailing pseudo-layer named `bonus_layer` is visited last
    /// unless the configuration already defines a layer with that name.
    pub fn new(layers: &'a LayerSet, bonus_layer: &str) -> Self {
        let bonus = layers
            .get(bonus_layer)
            .is_none()
            .then(|| LayerConfig::bonus(bonus_layer));
        Self { layers, bonus }
    }

    /// Layers in the order they are visited.
    pub fn visit_order(&self) -> impl Iterator<Item = &LayerConfig> {
        self.layers.layers().iter().chain(self.bonus.as_ref())
    }

    /// Compose one specimen's traits.
    ///
    /// Fails when a required layer has no option with positive weight.
    pub fn compose<R>(&self, rng: &mut R) -> MintResult<Vec<SelectedTrait>>
    where
        R: Rng + ?Sized,
    {
        let mut selected = Vec::with_capacity(self.layers.layers().len());
        for layer in self.visit_order() {
            let include = layer.required || rng.gen_range(0..100u32) < layer.rarity;
            if !include {
                continue;
            }

            let Some(option) = pick_weighted(&layer.traits, rng) else {
                if layer.required {
                    return Err(MintError::composition(format!(
                        "required layer '{}' has no valid traits",
                        layer.name
                    )));
                }
                continue;
            };

            selected.push(SelectedTrait::new(
                &layer.name,
                layer.trait_type(),
                &option.name,
            ));
        }
        Ok(selected)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/composer.rs"]
mod tests;
