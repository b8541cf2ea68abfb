//! Memoisation of routing lookups keyed by rounded coordinates.
//!
//! Each key owns a [`OnceLock`] slot. The map lock is only held while the
//! slot is fetched or created; the lookup itself runs inside
//! [`OnceLock::get_or_init`], so concurrent callers asking for the same key
//! wait for a single in-flight computation and then share its value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use wayfarer_core::LatLng;

/// Decimal places kept when rounding coordinates into a key.
pub const KEY_PRECISION: i32 = 4;

/// Directed pair of rounded coordinates.
///
/// Coordinates are rounded to four decimal places (about 11 m), so nearby
/// requests share an entry. `A -> B` and `B -> A` are different keys.
///
/// # Examples
/// ```
/// use wayfarer_core::LatLng;
/// use wayfarer_routing::RouteKey;
///
/// let a = RouteKey::new(LatLng::new(13.08271, 80.27071), LatLng::new(0.0, 0.0));
/// let b = RouteKey::new(LatLng::new(13.08269, 80.27069), LatLng::new(0.0, 0.0));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    from: (i64, i64),
    to: (i64, i64),
}

impl RouteKey {
    /// Build the key for the route from `from` to `to`.
    #[must_use]
    pub fn new(from: LatLng, to: LatLng) -> Self {
        Self {
            from: round_pair(from),
            to: round_pair(to),
        }
    }
}

fn round_pair(point: LatLng) -> (i64, i64) {
    let scale = 10_f64.powi(KEY_PRECISION);
    (
        (point.lat * scale).round() as i64,
        (point.lng * scale).round() as i64,
    )
}

/// Insert-if-absent cache of values computed per [`RouteKey`].
///
/// Entries live as long as the cache; nothing is evicted.
#[derive(Debug)]
pub struct RouteCache<V> {
    slots: Mutex<HashMap<RouteKey, Arc<OnceLock<V>>>>,
}

impl<V> Default for RouteCache<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> RouteCache<V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `init` on a miss.
    ///
    /// At most one `init` runs per key; callers racing on a miss block until
    /// it finishes and receive clones of the same value.
    pub fn get_or_insert_with(&self, key: RouteKey, init: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.lock();
            Arc::clone(slots.entry(key).or_default())
        };
        slot.get_or_init(init).clone()
    }

    /// Return the cached value for `key` if one has been computed.
    #[must_use]
    pub fn get(&self, key: &RouteKey) -> Option<V> {
        let slot = self.lock().get(key).map(Arc::clone)?;
        slot.get().cloned()
    }

    /// Number of keys holding a computed value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns `true` when no value has been computed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RouteKey, Arc<OnceLock<V>>>> {
        // A panicking initialiser leaves its slot empty, so the map itself is
        // still consistent after poisoning.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[rstest]
    fn keys_are_directional() {
        let a = LatLng::new(1.0, 2.0);
        let b = LatLng::new(3.0, 4.0);
        assert_ne!(RouteKey::new(a, b), RouteKey::new(b, a));
    }

    #[rstest]
    fn keys_round_to_four_places() {
        let origin = LatLng::new(0.0, 0.0);
        assert_eq!(
            RouteKey::new(LatLng::new(51.500_04, -0.1), origin),
            RouteKey::new(LatLng::new(51.5, -0.1), origin)
        );
        assert_ne!(
            RouteKey::new(LatLng::new(51.500_06, -0.1), origin),
            RouteKey::new(LatLng::new(51.5, -0.1), origin)
        );
    }

    #[rstest]
    fn second_lookup_is_served_from_cache() {
        let cache = RouteCache::new();
        let key = RouteKey::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            7.5_f64
        };
        assert_eq!(cache.get_or_insert_with(key, compute), 7.5);
        assert_eq!(cache.get_or_insert_with(key, || 0.0), 7.5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&key), Some(7.5));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn concurrent_misses_share_one_computation() {
        let cache = RouteCache::new();
        let key = RouteKey::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        let calls = AtomicUsize::new(0);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache.get_or_insert_with(key, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        1_u32
                    })
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&key), Some(1));
    }

    #[rstest]
    fn empty_cache_reports_nothing() {
        let cache: RouteCache<u8> = RouteCache::new();
        assert!(cache.is_empty());
        let key = RouteKey::new(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.0));
        assert_eq!(cache.get(&key), None);
    }
}
