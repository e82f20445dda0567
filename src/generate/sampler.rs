use rand::Rng;

use crate::config::layers::TraitOption;

/// Draw one option with probability proportional to its weight.
///
/// Zero-weight options are excluded from the denominator. Returns `None` when no option has a
/// positive weight.
pub fn pick_weighted<'a, R>(options: &'a [TraitOption], rng: &mut R) -> Option<&'a TraitOption>
where
    R: Rng + ?Sized,
{
    let total: u64 = options.iter().map(|t| u64::from(t.weight)).sum();
    if total == 0 {
        return None;
    }

    // `gen_range` rejects out-of-zone samples, so there is no modulo bias.
    let draw = rng.gen_range(0..total);
    let mut acc = 0u64;
    let mut last = None;
    for option in options.iter().filter(|t| t.weight > 0) {
        acc += u64::from(option.weight);
        if draw < acc {
            return Some(option);
        }
        last = Some(option);
    }
    last
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
