use std::collections::HashSet;

use rand::Rng;

use crate::config::collection::CollectionConfig;
use crate::config::layers::LayerSet;
use crate::generate::composer::Composer;
use crate::generate::dna::Dna;
use crate::specimen::model::Specimen;

/// Upper bound on up-front allocation for the seen set and accepted list.
const MAX_PREALLOCATED: usize = 1 << 16;

/// Why a generation run stopped before reaching its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exhaustion {
    /// Total composition attempts exceeded `maxRetries`.
    Attempts,
    /// Duplicate-DNA rejections exceeded `maxDuplicateRetries`.
    Duplicates,
}

impl std::fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attempts => f.write_str("attempt limit reached"),
            Self::Duplicates => f.write_str("duplicate limit reached"),
        }
    }
}

/// Rejection counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Composition attempts made, accepted or not.
    pub attempts: u64,
    /// Attempts where a required layer had nothing to draw.
    pub composition_failures: u64,
    /// Attempts rejected by the trait-count band.
    pub out_of_band: u64,
    /// Attempts rejected as duplicate DNA.
    pub duplicates: u64,
}

/// Result of [`GenerationSession::run`].
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    /// Accepted specimens, ids sequential from `startIndex`.
    pub specimens: Vec<Specimen>,
    /// Counters.
    pub stats: GenerationStats,
    /// Set when the run ended short of the requested total.
    pub exhausted: Option<Exhaustion>,
}

impl GenerationOutcome {
    /// `true` when every requested specimen was produced.
    pub fn is_complete(&self) -> bool {
        self.exhausted.is_none()
    }
}

/// Owns every piece of running generation state: the seen-DNA set, the accepted list and
/// the counters.
pub struct GenerationSession<'a> {
    collection: &'a CollectionConfig,
    composer: Composer<'a>,
    seen: HashSet<Dna>,
    accepted: Vec<Specimen>,
    stats: GenerationStats,
}

impl<'a> GenerationSession<'a> {
    /// New empty session.
    pub fn new(layers: &'a LayerSet, collection: &'a CollectionConfig) -> Self {
        // Never more specimens than attempts; the cap also bounds absurd requests.
        let capacity = collection
            .nfts_to_generate
            .min(usize::try_from(collection.max_retries).unwrap_or(usize::MAX))
            .min(MAX_PREALLOCATED);
        Self {
            collection,
            composer: Composer::new(layers, &collection.bonus_layer),
            seen: HashSet::with_capacity(capacity),
            accepted: Vec::with_capacity(capacity),
            stats: GenerationStats::default(),
        }
    }

    /// Compose until the target count is reached or a ceiling is exceeded.
    #[tracing::instrument(skip_all, fields(requested = self.collection.nfts_to_generate))]
    pub fn run<R>(mut self, rng: &mut R) -> GenerationOutcome
    where
        R: Rng + ?Sized,
    {
        let target = self.collection.nfts_to_generate;
        let mut exhausted = None;

        while self.accepted.len() < target {
            self.stats.attempts += 1;
            if self.stats.attempts > self.collection.max_retries {
                exhausted = Some(Exhaustion::Attempts);
                break;
            }
            if let Some(limit) = self.collection.max_duplicate_retries
                && self.stats.duplicates > limit
            {
                exhausted = Some(Exhaustion::Duplicates);
                break;
            }
            self.step(rng);
        }

        match exhausted {
            Some(reason) => tracing::warn!(
                generated = self.accepted.len(),
                requested = target,
                ?reason,
                attempts = self.stats.attempts,
                composition_failures = self.stats.composition_failures,
                out_of_band = self.stats.out_of_band,
                duplicates = self.stats.duplicates,
                "generation stopped early; too many constraints?"
            ),
            None => tracing::info!(generated = self.accepted.len(), "generation complete"),
        }

        GenerationOutcome {
            specimens: self.accepted,
            stats: self.stats,
            exhausted,
        }
    }

    fn step<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let id = self.collection.start_index + self.accepted.len() as u64;
        let traits = match self.composer.compose(rng) {
            Ok(traits) => traits,
            Err(err) => {
                tracing::debug!(id, "{err}");
                self.stats.composition_failures += 1;
                return;
            }
        };

        let bonus = self.collection.bonus_layer.as_str();
        let count = traits.iter().filter(|t| t.layer != bonus).count();
        if count < self.collection.min_traits || count > self.collection.max_traits {
            self.stats.out_of_band += 1;
            return;
        }

        let dna = Dna::of(&traits);
        if !self.seen.insert(dna) {
            tracing::debug!(id, %dna, "duplicate DNA, skipping");
            self.stats.duplicates += 1;
            return;
        }

        self.accepted.push(Specimen {
            id,
            filename: self.collection.filename_for(id),
            traits,
            rare: false,
        });
        if self.accepted.len() % 100 == 0 {
            tracing::info!(
                "generated {}/{}",
                self.accepted.len(),
                self.collection.nfts_to_generate
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/session.rs"]
mod tests;
