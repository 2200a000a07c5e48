/*!
An in-process LRU cache with per-entry TTL and a typed, Redis-style
command surface.

A [`Cache`] holds up to a fixed number of entries. Each entry carries a
dynamically typed [`Value`] (string, integer, float, list, or set) and
an optional time-to-live. Inserting past capacity evicts the least
recently used entry; expired entries are reclaimed lazily on access and,
optionally, by a background cleaner.

Commands are strictly typed: an integer command against a float entry
fails with a type mismatch and leaves the entry (and its recency)
untouched. Every command threads a caller [`Context`] carrying
cancellation and a deadline, checked once at command entry.

Every removal path (explicit delete, capacity eviction, TTL sweep, lazy
expiry, overwrite) invokes the eviction callback exactly once with the
key and its last stored value.

```rust
use std::time::Duration;
use tlru::{Cache, Context, Value};

let cache = Cache::builder(100)
    .cycle_interval(Duration::from_secs(1))
    .build();
let ctx = Context::new();

cache.set(&ctx, "greeting", "hello", Duration::from_secs(60)).unwrap();
assert_eq!(cache.get(&ctx, "greeting").unwrap(), Value::from("hello"));

assert_eq!(cache.incr_by(&ctx, "visits", 1).unwrap(), 1);
assert_eq!(cache.lpush(&ctx, "log", ["a", "b"]).unwrap(), 2);

cache.close();
```

Note: This cache is in-memory only. Persistence, replication, and
network transport are out of scope.
*/

mod cache;
mod cleaner;
mod context;
mod error;
mod store;
mod value;

pub use crate::cache::{Cache, CacheBuilder};
pub use crate::context::Context;
pub use crate::error::{Error, Result};
pub use crate::value::Value;
