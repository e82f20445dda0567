use std::fmt;

use sha2::Digest as _;

use crate::specimen::model::SelectedTrait;

/// SHA-256 content hash over an ordered trait list.
///
/// Only used as a set-membership key during generation; it is never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dna([u8; 32]);

impl Dna {
    /// Hash `layer:value` pairs joined by `|`, in the given order.
    pub fn of(traits: &[SelectedTrait]) -> Self {
        let mut hasher = sha2::Sha256::new();
        for (i, t) in traits.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(t.layer.as_bytes());
            hasher.update(b":");
            hasher.update(t.value.as_bytes());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dna({self})")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/dna.rs"]
mod tests;
