//! In-memory contact resolution cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::model::ContactInfo;
use crate::identity::{CacheKey, Identity};
use crate::tier::Resolution;

#[derive(Debug)]
struct Entry {
    generation: u64,
    info: ContactInfo,
}

/// Read-through cache of contact resolutions.
///
/// Entries are tagged with the ruleset generation they were resolved under.
/// An entry from an older generation is treated as a miss, so a ruleset change
/// can never be hidden by a stale entry, even for identities that were not
/// explicitly invalidated.
///
/// The cache is unbounded; entries only go away through
/// [`invalidate`](Self::invalidate) and [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct ContactCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl ContactCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached resolution for `identity`, or run `resolve` and cache it.
    ///
    /// `resolve` runs under the cache lock, so it must not call back into the
    /// cache.
    pub fn get_or_resolve(
        &self,
        identity: &Identity,
        generation: u64,
        resolve: impl FnOnce() -> Resolution,
    ) -> ContactInfo {
        let key = identity.cache_key();
        let mut entries = self.lock();

        if let Some(entry) = entries.get(&key)
            && entry.generation == generation
        {
            return entry.info.clone();
        }

        let info = ContactInfo::new(identity, resolve());
        debug!(key = %key, tier = %info.tier, generation, "Resolved contact");
        entries.insert(
            key,
            Entry {
                generation,
                info: info.clone(),
            },
        );
        info
    }

    /// Drop the entry for one identity. Returns `true` if there was one.
    pub fn invalidate(&self, identity: &Identity) -> bool {
        self.lock().remove(&identity.cache_key()).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached entries, including stale ones not yet replaced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Contact cache lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tier::{MatchReason, Ruleset, Tier};

    fn ruleset_with_alice() -> Ruleset {
        let mut ruleset = Ruleset::default();
        ruleset
            .rule_mut(Tier::Main)
            .insert(&Identity::new("Alice", None));
        ruleset
    }

    #[test]
    fn test_second_lookup_is_a_hit() {
        let cache = ContactCache::new();
        let ruleset = ruleset_with_alice();
        let alice = Identity::new("Alice", None);
        let mut calls = 0;

        let first = cache.get_or_resolve(&alice, 0, || {
            calls += 1;
            ruleset.resolve(&alice)
        });
        let second = cache.get_or_resolve(&alice, 0, || {
            calls += 1;
            ruleset.resolve(&alice)
        });

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(first.tier, Tier::Main);
        assert_eq!(first.matched_by, Some(MatchReason::Name));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_new_generation_is_a_miss() {
        let cache = ContactCache::new();
        let bob = Identity::new("Bob", None);

        let before = cache.get_or_resolve(&bob, 0, || Ruleset::default().resolve(&bob));
        assert!(before.is_uncategorized());

        let mut ruleset = Ruleset::default();
        ruleset.rule_mut(Tier::Casual).insert(&bob);
        let after = cache.get_or_resolve(&bob, 1, || ruleset.resolve(&bob));

        assert_eq!(after.tier, Tier::Casual);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ContactCache::new();
        let ruleset = Ruleset::default();
        let alice = Identity::new("Alice", None);
        let bob = Identity::new("Bob", Some("5550100"));

        cache.get_or_resolve(&alice, 0, || ruleset.resolve(&alice));
        cache.get_or_resolve(&bob, 0, || ruleset.resolve(&bob));
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&Identity::new(" ALICE ", None)));
        assert!(!cache.invalidate(&alice));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_phone_is_part_of_the_key() {
        let cache = ContactCache::new();
        let ruleset = Ruleset::default();

        let info = cache.get_or_resolve(&Identity::new("Bob", Some("+1 555 0100")), 0, || {
            ruleset.resolve(&Identity::new("Bob", None))
        });
        cache.get_or_resolve(&Identity::new("Bob", None), 0, || {
            ruleset.resolve(&Identity::new("Bob", None))
        });

        assert_eq!(info.phone.as_deref(), Some("+15550100"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let cache = Arc::new(ContactCache::new());
        let poisoner = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        let alice = Identity::new("Alice", None);
        let info = cache.get_or_resolve(&alice, 0, || Ruleset::default().resolve(&alice));
        assert_eq!(info.tier, Tier::NotImportant);
        assert_eq!(cache.len(), 1);
    }
}
