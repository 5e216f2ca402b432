//! Generated character art, remembered per personality.

use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;

use crate::{enrichment::GeneratedImage, personality::PersonalityType};

/// Bounded cache of character art keyed by personality.
///
/// With the default capacity of one, switching personality drops the previous art, so
/// art is regenerated exactly when the mascot changes.
#[derive(Debug)]
pub struct ArtCache {
    entries: LruCache<PersonalityType, Arc<GeneratedImage>>,
    current: Option<PersonalityType>,
}

impl ArtCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            current: None,
        }
    }

    /// Record the active personality. Returns true when it changed.
    pub fn switch_to(&mut self, personality: PersonalityType) -> bool {
        if self.current == Some(personality) {
            return false;
        }
        if let Some(previous) = self.current.replace(personality) {
            if self.entries.cap().get() == 1 {
                self.invalidate(previous);
            }
        }
        true
    }

    pub fn current(&self) -> Option<PersonalityType> {
        self.current
    }

    pub fn get(&mut self, personality: PersonalityType) -> Option<Arc<GeneratedImage>> {
        self.entries.get(&personality).cloned()
    }

    pub fn insert(&mut self, personality: PersonalityType, image: Arc<GeneratedImage>) {
        self.entries.put(personality, image);
    }

    pub fn invalidate(&mut self, personality: PersonalityType) {
        self.entries.pop(&personality);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ArtCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(tag: &str) -> Arc<GeneratedImage> {
        Arc::new(GeneratedImage { png: tag.as_bytes().to_vec() })
    }

    #[test]
    fn switching_drops_previous_art_at_capacity_one() {
        let mut cache = ArtCache::default();
        assert!(cache.switch_to(PersonalityType::Sunny));
        cache.insert(PersonalityType::Sunny, art("sun"));

        assert!(!cache.switch_to(PersonalityType::Sunny));
        assert!(cache.get(PersonalityType::Sunny).is_some());

        assert!(cache.switch_to(PersonalityType::Rainy));
        assert!(cache.is_empty());
        assert_eq!(cache.current(), Some(PersonalityType::Rainy));
    }

    #[test]
    fn larger_capacity_keeps_recent_art() {
        let mut cache = ArtCache::new(NonZeroUsize::new(2).unwrap());
        cache.switch_to(PersonalityType::Sunny);
        cache.insert(PersonalityType::Sunny, art("sun"));
        cache.switch_to(PersonalityType::Rainy);
        cache.insert(PersonalityType::Rainy, art("rain"));
        cache.switch_to(PersonalityType::Sunny);

        assert_eq!(cache.get(PersonalityType::Sunny).unwrap().png, b"sun");

        cache.switch_to(PersonalityType::Cold);
        cache.insert(PersonalityType::Cold, art("cold"));
        // Rainy was least recently used
        assert!(cache.get(PersonalityType::Rainy).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn explicit_invalidation() {
        let mut cache = ArtCache::default();
        cache.switch_to(PersonalityType::Foggy);
        cache.insert(PersonalityType::Foggy, art("fog"));
        cache.invalidate(PersonalityType::Foggy);
        assert!(cache.get(PersonalityType::Foggy).is_none());
    }
}
