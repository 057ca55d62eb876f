//! Hash key over (provider, input) pairs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{ProviderId, TileInput};

/// Identity of an input opened through a given provider.
///
/// The hash is computed once at construction: providers and inputs are
/// immutable for the lifetime of the key.
#[derive(Debug, Clone)]
pub struct ReaderKey {
    provider: ProviderId,
    input: TileInput,
    hash: u64,
}

impl ReaderKey {
    pub fn new(provider: ProviderId, input: TileInput) -> Self {
        let hash = hash_of(&provider).wrapping_add(hash_of(&input).wrapping_mul(37));
        Self {
            provider,
            input,
            hash,
        }
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    pub fn input(&self) -> &TileInput {
        &self.input
    }
}

impl PartialEq for ReaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.provider == other.provider && self.input == other.input
    }
}

impl Eq for ReaderKey {}

impl Hash for ReaderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
