//! chained-multimap: A separately chained hash multimap with stable
//! entry indices and contiguous equal-key ranges.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build the multimap in layers so the chain-and-bucket
//!   machinery can be reasoned about (and property-tested) independently
//!   of the public container surface.
//! - Layers:
//!   - ChainTable<K, V, S>: the engine. A slot arena of entries threaded
//!     into one doubly linked chain per bucket; equal keys always occupy
//!     one contiguous run of their chain, so a group is found once and
//!     walked without touching the rest of the bucket. Exposes
//!     index-based access and the group operations the facades build on.
//!   - ChainedMultimap<K, V, S>: the map-flavored facade with the
//!     conventional container surface (insert/get/remove, iterators,
//!     Extend/FromIterator and friends).
//!   - ChainedMultiset<T, S>: a counted set, implemented as
//!     ChainedMultimap<T, (), S>.
//!
//! Constraints
//! - Duplicate keys are first-class: insert never overwrites, and every
//!   entry counts toward `len`.
//! - Bucket counts are powers of two (at least 8 once allocated); the
//!   bucket of a hash is a mask, never a modulo.
//! - Growth keeps `len <= bucket_count * max_load_factor` after every
//!   insert; the threshold defaults to 1.0 and is configurable.
//! - Iteration order is unspecified, except that the entries of one key
//!   are always adjacent.
//!
//! Index stability and reuse
//! - `insert` returns an `EntryIndex` into the slot arena. Rehashing
//!   relinks entries in place and never moves them, so indices (and
//!   `&K`/`&V` addresses) survive any number of rehashes.
//! - Removal pushes the slot onto a free list; a later insert may reuse
//!   it. A stale index held across a removal can therefore resolve to
//!   the new occupant: memory-safe, logically stale. Callers who need
//!   staleness detection must layer generations on top.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash and indexing always uses
//!   the stored hash; `K: Hash` is never invoked after insertion.
//!   Rehashes redistribute purely from stored hashes and regroup equal
//!   keys within each new chain via `K: Eq`.
//!
//! Notes and non-goals
//! - No internal synchronization; a map is used from one thread at a
//!   time and is Send/Sync exactly as its contents allow.
//! - No entry API and no key mutation post-insert.
//! - The public surface is the two facades plus ChainTable for callers
//!   who want index-based access; everything else is implementation
//!   detail.

pub mod chain_table;
mod chain_table_proptest;
pub mod chained_multimap;
pub mod chained_multiset;

// Public surface
pub use chain_table::{ChainTable, EntryIndex};
pub use chained_multimap::ChainedMultimap;
pub use chained_multiset::ChainedMultiset;

#[cfg(feature = "fxhash")]
pub type FxChainedMultimap<K, V> =
    ChainedMultimap<K, V, core::hash::BuildHasherDefault<rustc_hash::FxHasher>>;
#[cfg(feature = "fxhash")]
pub type FxChainedMultiset<T> =
    ChainedMultiset<T, core::hash::BuildHasherDefault<rustc_hash::FxHasher>>;
#[cfg(feature = "ahash")]
pub type AChainedMultimap<K, V> =
    ChainedMultimap<K, V, core::hash::BuildHasherDefault<ahash::AHasher>>;
#[cfg(feature = "ahash")]
pub type AChainedMultiset<T> =
    ChainedMultiset<T, core::hash::BuildHasherDefault<ahash::AHasher>>;
