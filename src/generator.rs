//! Value Generator Module
//!
//! Produces fresh values for keys unseen by both the cache and the
//! persistent store. The contract is deliberately thin: a human-readable
//! composite string, with no uniqueness guarantee.

use rand::seq::IndexedRandom;

use crate::error::{CacheError, Result};

// == Word Tables ==
const ADJECTIVES: &[&str] = &[
    "ancient", "brave", "calm", "daring", "eager", "fierce", "gentle", "humble", "jolly",
    "keen", "lively", "mighty", "noble", "quiet", "rapid", "sly", "tidy", "vivid", "wise",
    "zesty",
];

const COLORS: &[&str] = &[
    "amber", "azure", "coral", "crimson", "emerald", "golden", "indigo", "ivory", "jade",
    "magenta", "olive", "russet", "scarlet", "silver", "teal", "violet",
];

const ANIMALS: &[&str] = &[
    "badger", "bison", "crane", "dolphin", "falcon", "gecko", "heron", "ibex", "jackal",
    "lynx", "marmot", "otter", "panther", "raven", "stoat", "tapir", "viper", "wombat",
];

// == Value Generator Trait ==
/// Source of fresh values for previously unseen keys.
pub trait ValueGenerator: Send + Sync {
    /// Produces a new opaque string value.
    ///
    /// Values are human-readable but carry no uniqueness or
    /// non-repetition guarantee.
    fn generate(&self) -> Result<String>;
}

// == Name Generator ==
/// Stock generator: an adjective-color-animal triple joined with `-`.
#[derive(Debug, Default)]
pub struct NameGenerator;

impl ValueGenerator for NameGenerator {
    fn generate(&self) -> Result<String> {
        let mut rng = rand::rng();

        let adjective = pick(ADJECTIVES, &mut rng)?;
        let color = pick(COLORS, &mut rng)?;
        let animal = pick(ANIMALS, &mut rng)?;

        Ok(format!("{}-{}-{}", adjective, color, animal))
    }
}

fn pick(words: &[&'static str], rng: &mut impl rand::Rng) -> Result<&'static str> {
    words
        .choose(rng)
        .copied()
        .ok_or_else(|| CacheError::GenerationFailure("empty word table".into()))
}
