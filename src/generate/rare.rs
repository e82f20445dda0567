use rand::Rng;

use crate::config::collection::CollectionConfig;
use crate::config::layers::ConfigWarning;
use crate::specimen::model::{SelectedTrait, Specimen};

/// Mark `count` distinct specimens, chosen uniformly without replacement, as rare variants.
///
/// Each chosen specimen gets exactly one extra bonus trait appended. DNA is not recomputed and
/// the trait-count band is not re-checked, so a rare variant may exceed `maxTraits`.
///
/// A `count` larger than the list is clamped and reported. Returns the chosen indices in
/// ascending order.
pub fn inject_rare_variants<R>(
    specimens: &mut [Specimen],
    count: usize,
    bonus: &SelectedTrait,
    rng: &mut R,
) -> (Vec<usize>, Option<ConfigWarning>)
where
    R: Rng + ?Sized,
{
    let mut warning = None;
    let amount = if count > specimens.len() {
        let w = ConfigWarning::RareCountClamped {
            requested: count,
            available: specimens.len(),
        };
        tracing::warn!("{w}");
        warning = Some(w);
        specimens.len()
    } else {
        count
    };

    let mut chosen = rand::seq::index::sample(rng, specimens.len(), amount).into_vec();
    chosen.sort_unstable();
    for &i in &chosen {
        let specimen = &mut specimens[i];
        specimen.traits.push(bonus.clone());
        specimen.rare = true;
    }
    (chosen, warning)
}

/// The bonus trait configured for a collection.
pub fn bonus_trait(collection: &CollectionConfig) -> SelectedTrait {
    SelectedTrait::new(
        &collection.bonus_layer,
        &collection.bonus_layer,
        &collection.bonus_value,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/generate/rare.rs"]
mod tests;
