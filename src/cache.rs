use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cleaner::Cleaner;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::store::{EvictCallback, Store};
use crate::value::Value;

/// Builder for [`Cache`].
///
/// ```
/// use std::time::Duration;
/// use tlru::Cache;
///
/// let cache = Cache::builder(100)
///     .cycle_interval(Duration::from_secs(1))
///     .evict_callback(|key, _value| println!("removed {key}"))
///     .build();
/// # drop(cache);
/// ```
pub struct CacheBuilder {
    capacity: usize,
    cycle_interval: Option<Duration>,
    on_evict: Option<EvictCallback>,
}

impl CacheBuilder {
    pub fn new(capacity: usize) -> CacheBuilder {
        CacheBuilder {
            capacity,
            cycle_interval: None,
            on_evict: None,
        }
    }

    /// Enables the background cleaner with the given tick period.
    /// Without it, expired entries are only reclaimed lazily on access.
    pub fn cycle_interval(mut self, cycle: Duration) -> CacheBuilder {
        self.cycle_interval = Some(cycle);
        self
    }

    /// Called once per removed entry with the key and its last stored
    /// value, on every removal path: delete, capacity eviction, sweep,
    /// lazy expiry, and overwrite.
    ///
    /// The callback runs while the cache lock is held; calling back into
    /// the cache from it deadlocks.
    pub fn evict_callback<F>(mut self, on_evict: F) -> CacheBuilder
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.on_evict = Some(Arc::new(on_evict));
        self
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn build(self) -> Cache {
        let store = Arc::new(Mutex::new(Store::new(self.capacity, self.on_evict)));
        let cleaner = self
            .cycle_interval
            .map(|cycle| Cleaner::spawn(store.clone(), cycle));
        Cache {
            store,
            cleaner: Mutex::new(cleaner),
        }
    }
}

/// An in-process LRU cache with per-entry TTL and typed values.
///
/// Holds up to `capacity` entries; inserting past that evicts the least
/// recently used one. Entries carry a [`Value`] payload and an optional
/// expiry. Commands are strictly typed and serialize on one internal
/// lock, so a `Cache` can be shared freely across threads (wrap it in an
/// `Arc`, commands take `&self`).
///
/// Note: This cache is in-memory only.
pub struct Cache {
    store: Arc<Mutex<Store>>,
    cleaner: Mutex<Option<Cleaner>>,
}

impl Cache {
    /// A cache with no background cleaner and no eviction callback.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Cache {
        Cache::builder(capacity).build()
    }

    pub fn builder(capacity: usize) -> CacheBuilder {
        CacheBuilder::new(capacity)
    }

    /// Stores `value` under `key`, overwriting any previous entry (the
    /// callback fires for the replaced value).
    ///
    /// `ttl` is relative to now. A zero `ttl` inserts the entry already
    /// expired: every subsequent read misses and [`Cache::delete`]
    /// counts the key as absent.
    pub fn set(
        &self,
        ctx: &Context,
        key: &str,
        value: impl Into<Value>,
        ttl: Duration,
    ) -> Result<()> {
        ctx.ensure_live()?;
        let expires_at = Some(Instant::now() + ttl);
        self.store.lock().insert(key, value.into(), expires_at);
        Ok(())
    }

    /// Fetches the live value under `key`, refreshing its recency.
    /// An expired entry is removed in-line and reported as a miss.
    pub fn get(&self, ctx: &Context, key: &str) -> Result<Value> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        match store.lookup_live(key) {
            Some(handle) => {
                store.touch(handle);
                store.hits += 1;
                Ok(store.entry(handle).value.clone())
            }
            None => {
                store.misses += 1;
                Err(Error::KeyNotExist)
            }
        }
    }

    /// Stores `value` only if `key` is absent; returns whether the
    /// insert happened.
    ///
    /// A still-present expired entry counts as present and blocks the
    /// insert. It is reclaimed by the sweep, any read, or an
    /// unconditional [`Cache::set`].
    pub fn set_nx(
        &self,
        ctx: &Context,
        key: &str,
        value: impl Into<Value>,
        ttl: Duration,
    ) -> Result<bool> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        if store.lookup(key).is_some() {
            return Ok(false);
        }
        let expires_at = Some(Instant::now() + ttl);
        store.insert(key, value.into(), expires_at);
        Ok(true)
    }

    /// Writes `value` (with no expiry) and returns the previous string.
    ///
    /// On a miss the write still happens and `KeyNotExist` is returned.
    /// A non-string entry fails with a type mismatch and nothing is
    /// written.
    pub fn get_set(&self, ctx: &Context, key: &str, value: impl Into<Value>) -> Result<Value> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        match store.lookup_live(key) {
            Some(handle) => {
                let entry = store.entry(handle);
                if !matches!(entry.value, Value::Str(_)) {
                    return Err(Error::TypeMismatch("not a string"));
                }
                let old = entry.value.clone();
                store.insert(key, value.into(), None);
                Ok(old)
            }
            None => {
                store.insert(key, value.into(), None);
                Err(Error::KeyNotExist)
            }
        }
    }

    /// Removes `keys` and returns how many were live at the time.
    /// Expired-but-unswept entries are removed too (the callback fires)
    /// but do not count.
    pub fn delete(&self, ctx: &Context, keys: &[&str]) -> Result<usize> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        let mut live = 0;
        for key in keys {
            if let Some(entry) = store.remove(key) {
                if !entry.is_expired() {
                    live += 1;
                }
            }
        }
        Ok(live)
    }

    /// Pushes each value at the list head in argument order (the last
    /// argument ends up at the head) and returns the new length. A
    /// missing key is created as an empty list with no expiry.
    pub fn lpush(
        &self,
        ctx: &Context,
        key: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<usize> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        let handle = match store.lookup_live(key) {
            Some(handle) => handle,
            None => store.insert(key, Value::List(Vec::new()), None).0,
        };
        let len = {
            let items = match &mut store.entry_mut(handle).value {
                Value::List(items) => items,
                _ => return Err(Error::TypeMismatch("not a list")),
            };
            for value in values {
                items.insert(0, value.into());
            }
            items.len()
        };
        store.touch(handle);
        Ok(len)
    }

    /// Removes and returns the list head. An empty list stays in place
    /// (the key keeps its type) and pops report `KeyNotExist`.
    pub fn lpop(&self, ctx: &Context, key: &str) -> Result<Value> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        let handle = store.lookup_live(key).ok_or(Error::KeyNotExist)?;
        let head = {
            let items = match &mut store.entry_mut(handle).value {
                Value::List(items) => items,
                _ => return Err(Error::TypeMismatch("not a list")),
            };
            if items.is_empty() {
                return Err(Error::KeyNotExist);
            }
            items.remove(0)
        };
        store.touch(handle);
        Ok(head)
    }

    /// Adds values to the set (duplicates collapse) and returns the new
    /// cardinality. A missing key is created as an empty set with no
    /// expiry.
    pub fn sadd(
        &self,
        ctx: &Context,
        key: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<usize> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        let handle = match store.lookup_live(key) {
            Some(handle) => handle,
            None => store.insert(key, Value::Set(Vec::new()), None).0,
        };
        let cardinality = {
            let members = match &mut store.entry_mut(handle).value {
                Value::Set(members) => members,
                _ => return Err(Error::TypeMismatch("not a set")),
            };
            for value in values {
                let value = value.into();
                if !members.contains(&value) {
                    members.push(value);
                }
            }
            members.len()
        };
        store.touch(handle);
        Ok(cardinality)
    }

    /// Removes values from the set and returns how many were actually
    /// members. An emptied set keeps its key.
    pub fn srem(
        &self,
        ctx: &Context,
        key: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<usize> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        let handle = store.lookup_live(key).ok_or(Error::KeyNotExist)?;
        let removed = {
            let members = match &mut store.entry_mut(handle).value {
                Value::Set(members) => members,
                _ => return Err(Error::TypeMismatch("not a set")),
            };
            let mut removed = 0;
            for value in values {
                let value = value.into();
                if let Some(position) = members.iter().position(|m| *m == value) {
                    members.swap_remove(position);
                    removed += 1;
                }
            }
            removed
        };
        store.touch(handle);
        Ok(removed)
    }

    /// Adds `delta` to the integer under `key` and returns the new
    /// value, wrapping on overflow. A missing key is created as
    /// `delta` with no expiry.
    pub fn incr_by(&self, ctx: &Context, key: &str, delta: i64) -> Result<i64> {
        ctx.ensure_live()?;
        self.incr(key, delta)
    }

    /// `incr_by` with the sign flipped: a missing key is created as
    /// `-delta`.
    pub fn decr_by(&self, ctx: &Context, key: &str, delta: i64) -> Result<i64> {
        ctx.ensure_live()?;
        self.incr(key, delta.wrapping_neg())
    }

    fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut store = self.store.lock();
        match store.lookup_live(key) {
            Some(handle) => {
                let updated = match &mut store.entry_mut(handle).value {
                    Value::Int(n) => {
                        *n = n.wrapping_add(delta);
                        *n
                    }
                    _ => return Err(Error::TypeMismatch("not int64")),
                };
                store.touch(handle);
                Ok(updated)
            }
            None => {
                store.insert(key, Value::Int(delta), None);
                Ok(delta)
            }
        }
    }

    /// Adds `delta` to the float under `key` and returns the new value.
    /// NaN and infinities propagate. A missing key is created as
    /// `delta` with no expiry.
    pub fn incr_by_float(&self, ctx: &Context, key: &str, delta: f64) -> Result<f64> {
        ctx.ensure_live()?;
        let mut store = self.store.lock();
        match store.lookup_live(key) {
            Some(handle) => {
                let updated = match &mut store.entry_mut(handle).value {
                    Value::Float(x) => {
                        *x += delta;
                        *x
                    }
                    _ => return Err(Error::TypeMismatch("not float64")),
                };
                store.touch(handle);
                Ok(updated)
            }
            None => {
                store.insert(key, Value::Float(delta), None);
                Ok(delta)
            }
        }
    }

    /// Number of entries currently indexed, expired-but-unswept ones
    /// included.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    /// `get` hits so far.
    pub fn hits(&self) -> u64 {
        self.store.lock().hits
    }

    /// `get` misses so far.
    pub fn misses(&self) -> u64 {
        self.store.lock().misses
    }

    /// Removes every entry; each one fires the callback.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Stops the background cleaner, joining its thread before
    /// returning. Idempotent; also runs on drop.
    pub fn close(&self) {
        if let Some(cleaner) = self.cleaner.lock().take() {
            cleaner.stop();
        }
    }

    /// Internal insertion path: places `value` as-is with an optional
    /// absolute expiry, bypassing the typed command surface.
    #[doc(hidden)]
    pub fn add(&self, key: &str, value: Value, expires_at: Option<Instant>) {
        self.store.lock().insert(key, value, expires_at);
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.close();
    }
}
