//! Pair map
//!
//! **`This crate is an attempt to provide Rust hash map with single key to a pair
//! of independently typed values.`**
//!
//! Sometimes during development, it may be necessary to keep two pieces of data
//! under the same key, for example a price and a flag, or a handle and its
//! generation. Using a normal [`HashMap`] with a tuple value works, but it is easy
//! to update one half of the tuple and forget the other, and a plain `HashMap`
//! cannot be told how to compare its keys other than through [`Eq`] and [`Hash`].
//!
//! This crate provides a [`PairMap`] structure - a map where every key refers to
//! exactly one `(V1, V2)` pair which is always written and read as a whole, and
//! where key equality is decided by a [`KeyComparer`] chosen once, at construction.
//!
//! Internally, [`PairMap`] keeps its entries in a dense vector and indexes them
//! with a [`HashTable`] from the [`Hashbrown`] crate, which in turn is a Rust port
//! of Google's high-performance [SwissTable] hash map.
//!
//! [`HashMap`]: https://doc.rust-lang.org/stable/std/collections/struct.HashMap.html
//! [`HashTable`]: https://docs.rs/hashbrown/latest/hashbrown/struct.HashTable.html
//! [`Hashbrown`]: https://github.com/rust-lang/hashbrown
//! [SwissTable]: https://abseil.io/blog/20180927-swisstables
//!
//! # Examples
//!
//! ```
//! use pair_map::PairMap;
//!
//! let mut prices: PairMap<&str, u32, bool> = PairMap::new();
//!
//! prices.add("apple", 3, true).unwrap();
//! prices.add("pear", 5, false).unwrap();
//!
//! // The same key cannot be added twice
//! assert!(prices.add("apple", 4, false).is_err());
//!
//! // But it can be overwritten as a whole
//! prices.add_or_update("apple", 4, false).unwrap();
//! assert_eq!(prices["apple"], (4, false));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rustdoc::broken_intra_doc_links)]

#[macro_use]
mod macros;

pub mod comparer;

mod map;

pub mod pair_map {
    //! A hash map with a single key to a pair of values, plus its iterators and errors.
    pub use crate::map::*;
}

pub use crate::comparer::{DefaultComparer, FnComparer, KeyComparer, OptionalKeys};
#[cfg(feature = "unicase")]
pub use crate::comparer::CaseInsensitive;
pub use crate::map::{Cursor, ErrorKind, InsertError, PairMap, PairMapError};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// Read-only keyed lookup over a collection of key/pair entries.
///
/// Components which only need to look values up should depend on this
/// trait rather than on [`PairMap`] itself.
///
/// # Examples
///
/// ```
/// use pair_map::{pairmap, PairLookup};
///
/// fn total<L: PairLookup<&'static str, u32, u32>>(lookup: &L) -> u32 {
///     lookup.values().map(|(a, b)| a + b).sum()
/// }
///
/// let map = pairmap! {
///     "a" => (1, 2),
///     "b" => (3, 4),
/// };
/// assert_eq!(total(&map), 10);
/// ```
pub trait PairLookup<K, V1, V2> {
    /// An iterator over the keys.
    type Keys<'a>: Iterator<Item = &'a K>
    where
        Self: 'a,
        K: 'a;

    /// An iterator over the value pairs.
    type Values<'a>: Iterator<Item = &'a (V1, V2)>
    where
        Self: 'a,
        V1: 'a,
        V2: 'a;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the keys.
    fn keys(&self) -> Self::Keys<'_>;

    /// Returns an iterator over the value pairs.
    fn values(&self) -> Self::Values<'_>;

    /// Returns the pair stored under `key`, or [`ErrorKind::KeyNotFound`].
    fn get(&self, key: &K) -> Result<&(V1, V2), PairMapError>;

    /// Returns `true` if an entry with an equal key exists.
    fn contains_key(&self, key: &K) -> Result<bool, PairMapError>;

    /// Returns the pair stored under `key`, or `Ok(None)` for a missing key.
    fn try_get(&self, key: &K) -> Result<Option<&(V1, V2)>, PairMapError>;
}

/// A mutable collection of `(key, (value1, value2))` entries.
///
/// Entries are handled as whole units: an entry is only found or removed
/// if both its key and its pair match.
pub trait PairCollection<K, V1, V2> {
    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the collection cannot be modified.
    fn is_read_only(&self) -> bool;

    /// Adds an entry, failing if its key is absent or already present.
    fn add_entry(&mut self, entry: (K, (V1, V2))) -> Result<(), InsertError<K, V1, V2>>;

    /// Removes the entry if both key and pair match. Returns whether it was removed.
    fn remove_entry(&mut self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq;

    /// Returns `true` if an entry with an equal key and an equal pair exists.
    fn contains_entry(&self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq;

    /// Removes all entries.
    fn clear(&mut self);

    /// Clones all entries into `destination`, starting at `start_index`.
    fn copy_to(
        &self,
        destination: &mut [(K, (V1, V2))],
        start_index: usize,
    ) -> Result<(), PairMapError>
    where
        K: Clone,
        V1: Clone,
        V2: Clone;
}
