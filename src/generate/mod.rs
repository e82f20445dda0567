//! Trait-combination generation.
//!
//! 1. [`composer::Composer`] draws one combination per layer pass.
//! 2. [`session::GenerationSession`] enforces the trait-count band and DNA uniqueness under
//!    bounded attempts.
//! 3. [`rare::inject_rare_variants`] appends the bonus trait to a random subset.

pub mod composer;
pub mod dna;
pub mod rare;
pub mod sampler;
pub mod session;

use std::path::Path;

use rand::Rng;

use crate::config::collection::CollectionConfig;
use crate::config::layers::{ConfigWarning, LayerSet};
use crate::foundation::error::MintResult;
use crate::generate::session::{GenerationOutcome, GenerationSession};

/// Everything a generation run produced.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Specimens, stats and exhaustion status.
    pub outcome: GenerationOutcome,
    /// Indices of specimens that became rare variants.
    pub rare_indices: Vec<usize>,
    /// Non-fatal findings gathered during the run.
    pub warnings: Vec<ConfigWarning>,
}

/// Run generation and rare-variant injection.
///
/// `traits_dir` is only consulted to warn about a missing bonus asset. Fails when a configured
/// layer shares the bonus layer's name.
#[tracing::instrument(skip_all)]
pub fn generate_collection<R>(
    layers: &LayerSet,
    collection: &CollectionConfig,
    traits_dir: &Path,
    rng: &mut R,
) -> MintResult<GenerationReport>
where
    R: Rng + ?Sized,
{
    layers.check_bonus_layer(&collection.bonus_layer)?;
    let mut warnings = layers.warnings();

    let bonus_path = traits_dir
        .join(&collection.bonus_layer)
        .join(format!("{}.png", collection.bonus_value));
    if !bonus_path.exists() {
        warnings.push(ConfigWarning::MissingBonusAsset {
            path: bonus_path.display().to_string(),
        });
    }
    for w in &warnings {
        tracing::warn!("{w}");
    }

    let mut outcome = GenerationSession::new(layers, collection).run(rng);

    let mut rare_indices = Vec::new();
    let target = collection.rare_target();
    if target > 0 {
        let bonus = rare::bonus_trait(collection);
        let (chosen, warning) =
            rare::inject_rare_variants(&mut outcome.specimens, target, &bonus, rng);
        rare_indices = chosen;
        warnings.extend(warning);
    }

    Ok(GenerationReport {
        outcome,
        rare_indices,
        warnings,
    })
}
