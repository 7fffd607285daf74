#[cfg(test)]
mod tests_pair_map;

use crate::comparer::KeyComparer;
use crate::{PairCollection, PairLookup};
use core::borrow::Borrow;
use core::fmt::{self, Debug};
use core::iter::{FromIterator, FusedIterator};
use core::mem;
use core::ops::Index;
use core::slice;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashTable;
use std::vec;

mod cursor;
mod error;
mod into_iter;
mod into_keys;
mod into_values;
mod iter;
#[cfg(feature = "rayon")]
mod parallel;
mod projections;

pub use self::cursor::*;
pub use self::error::*;
pub use self::into_iter::*;
pub use self::into_keys::*;
pub use self::into_values::*;
pub use self::iter::*;
pub use self::projections::*;
pub use crate::comparer::{DefaultComparer, DefaultHashBuilder};

/// One stored entry together with the cached hash of its key.
#[derive(Clone)]
pub(crate) struct Bucket<K, V1, V2> {
    hash: u64,
    key: K,
    pair: (V1, V2),
}

impl<K, V1, V2> Bucket<K, V1, V2> {
    #[inline]
    fn refs(&self) -> (&K, &(V1, V2)) {
        (&self.key, &self.pair)
    }

    #[inline]
    fn into_entry(self) -> (K, (V1, V2)) {
        (self.key, self.pair)
    }
}

/// A hash map with a single key to a pair of values.
///
/// Every key refers to exactly one `(V1, V2)` pair. The pair is written and
/// read as a whole: there is no way to replace only one of its halves, so a
/// partially updated pair can never be observed.
///
/// Keys are compared by the [`KeyComparer`] given at construction, which is
/// [`DefaultComparer`] (the key's own [`Eq`] and [`Hash`]) unless
/// [`with_comparer`](PairMap::with_comparer) or
/// [`with_capacity_and_comparer`](PairMap::with_capacity_and_comparer) is used.
/// The comparer never changes during the lifetime of the map.
///
/// It is a logic error for a key to be modified in such a way that its hash or
/// its equality, as determined by the comparer, changes while it is in the map.
/// This is normally only possible through [`Cell`], [`RefCell`], global state,
/// I/O, or unsafe code. The behavior resulting from such a logic error is not
/// specified, but will not result in undefined behavior.
///
/// The iteration order is arbitrary. It is stable as long as the map is not
/// modified, but removing an entry may move another one.
///
/// `PairMap` does no internal synchronization. Sharing it between threads
/// follows the usual rules: `&PairMap` for reading, and a `Mutex` or `RwLock`
/// around it for writing.
///
/// [`Cell`]: https://doc.rust-lang.org/std/cell/struct.Cell.html
/// [`RefCell`]: https://doc.rust-lang.org/std/cell/struct.RefCell.html
///
/// # Examples
///
/// ```
/// use pair_map::PairMap;
///
/// // Item name => (price, in stock)
/// let mut shop: PairMap<String, u32, bool> = PairMap::new();
///
/// shop.add("apple".to_string(), 3, true).unwrap();
/// shop.add("pear".to_string(), 5, false).unwrap();
/// shop.add("plum".to_string(), 2, true).unwrap();
///
/// assert_eq!(shop.len(), 3);
/// assert_eq!(shop["apple"], (3, true));
///
/// // Pears are back in stock
/// assert_eq!(shop.try_update("pear", 5, true), Ok(true));
///
/// // Nobody buys plums
/// assert_eq!(shop.remove("plum"), Ok(Some((2, true))));
///
/// for (name, (price, in_stock)) in &shop {
///     println!("{}: {} ({})", name, price, in_stock);
/// }
/// ```
pub struct PairMap<K, V1, V2, C = DefaultComparer> {
    comparer: C,
    // Invariant: every value in `indices` is a valid index into `entries`, and
    // each index into `entries` is stored exactly once.
    indices: HashTable<usize>,
    entries: Vec<Bucket<K, V1, V2>>,
    // Replaced by every write with a value unique across all maps. Cursors
    // compare it to detect modification.
    stamp: u64,
}

impl<K: Clone, V1: Clone, V2: Clone, C: Clone> Clone for PairMap<K, V1, V2, C> {
    fn clone(&self) -> Self {
        PairMap {
            comparer: self.comparer.clone(),
            indices: self.indices.clone(),
            entries: self.entries.clone(),
            stamp: next_stamp(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.entries.clone_from(&source.entries);
        self.indices.clone_from(&source.indices);

        // Update comparer only if we successfully cloned all elements.
        self.comparer.clone_from(&source.comparer);
        self.touch();
    }
}

/// Ensures that a single closure type across uses of this which, in turn prevents multiple
/// instances of any functions like HashTable::reserve from being generated
#[cfg_attr(feature = "inline-more", inline)]
fn get_hash<K, V1, V2>(entries: &[Bucket<K, V1, V2>]) -> impl Fn(&usize) -> u64 + '_ {
    move |&index| entries[index].hash
}

/// Ensures that a single closure type across uses of this which, in turn prevents multiple
/// instances of any functions like HashTable::find from being generated
#[cfg_attr(feature = "inline-more", inline)]
fn equivalent<'a, Q, K, V1, V2, C>(
    key: &'a Q,
    comparer: &'a C,
    entries: &'a [Bucket<K, V1, V2>],
) -> impl Fn(&usize) -> bool + 'a
where
    Q: ?Sized,
    K: Borrow<Q>,
    C: KeyComparer<Q>,
{
    move |&index| comparer.equals(key, entries[index].key.borrow())
}

/// Returns a stamp no map has held before, so a cursor can never match a
/// map other than the one it was created from.
fn next_stamp() -> u64 {
    static NEXT_STAMP: AtomicU64 = AtomicU64::new(0);
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

fn capacity_from<N: TryInto<usize>>(capacity: N) -> Result<usize, PairMapError> {
    capacity
        .try_into()
        .map_err(|_| PairMapError::InvalidArgument {
            argument: "capacity",
        })
}

impl<K, V1, V2> PairMap<K, V1, V2, DefaultComparer> {
    /// Creates a new empty [`PairMap`] which compares keys with [`DefaultComparer`].
    ///
    /// The map is initially created with a capacity of 0, so it
    /// will not allocate until it is first inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    /// let mut map: PairMap<u32, &str, i32> = PairMap::new();
    ///
    /// // The created PairMap holds none elements
    /// assert_eq!(map.len(), 0);
    ///
    /// // The created PairMap also doesn't allocate memory
    /// assert_eq!(map.capacity(), 0);
    ///
    /// // Now we insert element inside created PairMap
    /// map.add(1, "One", 1).unwrap();
    /// // We can see that the PairMap holds 1 element
    /// assert_eq!(map.len(), 1);
    /// // And it also allocates some capacity
    /// assert!(map.capacity() >= 1);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty [`PairMap`] with the specified capacity which compares
    /// keys with [`DefaultComparer`].
    ///
    /// The map will be able to hold at least `capacity` elements without
    /// reallocating. If `capacity` is 0, the map will not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    /// let mut map: PairMap<&str, i32, &str> = PairMap::with_capacity(5);
    ///
    /// // The created PairMap holds none elements
    /// assert_eq!(map.len(), 0);
    /// // But it can hold at least 5 elements without reallocating
    /// let empty_map_capacity = map.capacity();
    /// assert!(empty_map_capacity >= 5);
    ///
    /// // Now we insert some 5 elements inside created PairMap
    /// map.add("One",   1, "a").unwrap();
    /// map.add("Two",   2, "b").unwrap();
    /// map.add("Three", 3, "c").unwrap();
    /// map.add("Four",  4, "d").unwrap();
    /// map.add("Five",  5, "e").unwrap();
    ///
    /// // We can see that the PairMap holds 5 elements
    /// assert_eq!(map.len(), 5);
    /// // But its capacity isn't changed
    /// assert_eq!(map.capacity(), empty_map_capacity)
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparer(capacity, DefaultComparer::default())
    }

    /// Creates an empty [`PairMap`] with the specified capacity, given as any
    /// integer type, which compares keys with [`DefaultComparer`].
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if `capacity` is negative
    /// or does not fit into `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{ErrorKind, PairMap};
    ///
    /// let error = PairMap::<&str, i32, i32>::try_with_capacity(-1).unwrap_err();
    /// assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    ///
    /// let map = PairMap::<&str, i32, i32>::try_with_capacity(0).unwrap();
    /// assert!(map.is_empty());
    /// ```
    pub fn try_with_capacity<N: TryInto<usize>>(capacity: N) -> Result<Self, PairMapError> {
        Ok(Self::with_capacity(capacity_from(capacity)?))
    }
}

impl<K, V1, V2, C> PairMap<K, V1, V2, C> {
    /// Creates an empty [`PairMap`] which compares keys with `comparer`.
    ///
    /// The map is initially created with a capacity of 0, so it
    /// will not allocate until it is first inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{CaseInsensitive, PairMap};
    ///
    /// let mut map = PairMap::with_comparer(CaseInsensitive::new());
    /// map.add("Content-Type", "text/plain", 10).unwrap();
    ///
    /// assert_eq!(map.get("content-type").unwrap(), &("text/plain", 10));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_capacity_and_comparer(0, comparer)
    }

    /// Creates an empty [`PairMap`] with the specified capacity which compares
    /// keys with `comparer`.
    ///
    /// The map will be able to hold at least `capacity` elements without
    /// reallocating. If `capacity` is 0, the map will not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{CaseInsensitive, PairMap};
    ///
    /// let mut map = PairMap::with_capacity_and_comparer(10, CaseInsensitive::new());
    /// assert!(map.capacity() >= 10);
    ///
    /// map.add("Key", 1, 2).unwrap();
    /// assert!(map.contains_key("KEY").unwrap());
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_capacity_and_comparer(capacity: usize, comparer: C) -> Self {
        Self {
            comparer,
            indices: HashTable::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            stamp: next_stamp(),
        }
    }

    /// Creates an empty [`PairMap`] with the specified capacity, given as any
    /// integer type, which compares keys with `comparer`.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if `capacity` is negative
    /// or does not fit into `usize`.
    pub fn try_with_capacity_and_comparer<N: TryInto<usize>>(
        capacity: N,
        comparer: C,
    ) -> Result<Self, PairMapError> {
        Ok(Self::with_capacity_and_comparer(
            capacity_from(capacity)?,
            comparer,
        ))
    }

    /// Returns a reference to the map's [`KeyComparer`].
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Returns the number of elements the map can hold without reallocating.
    ///
    /// This number is a lower bound; the map might be able to hold
    /// more, but is guaranteed to be able to hold at least this many.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn capacity(&self) -> usize {
        self.indices.capacity().min(self.entries.capacity())
    }

    /// An iterator visiting all keys in arbitrary order.
    /// The iterator element type is `&'a K`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let map = pairmap! {
    ///     "a" => ("One", 1),
    ///     "b" => ("Two", 2),
    /// };
    ///
    /// let mut keys: Vec<_> = map.keys().copied().collect();
    /// keys.sort_unstable();
    /// assert_eq!(keys, ["a", "b"]);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn keys(&self) -> Keys<'_, K, V1, V2> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all value pairs in arbitrary order.
    /// The iterator element type is `&'a (V1, V2)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let map = pairmap! {
    ///     "a" => ("One", 1),
    ///     "b" => ("Two", 2),
    /// };
    ///
    /// let total: i32 = map.values().map(|(_, number)| number).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn values(&self) -> Values<'_, K, V1, V2> {
        Values { inner: self.iter() }
    }

    /// An iterator visiting all entries in arbitrary order.
    /// The iterator element type is `(&'a K, &'a (V1, V2))`.
    ///
    /// The map is borrowed for the lifetime of the iterator, so it can not be
    /// modified while the iterator is alive. See [`cursor`](PairMap::cursor)
    /// for an enumeration which does not hold a borrow.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let map = pairmap! {
    ///     1 => ("a", 'x'),
    ///     2 => ("b", 'y'),
    /// };
    ///
    /// let mut vec: Vec<_> = map.iter().map(|(k, (v1, v2))| (*k, *v1, *v2)).collect();
    /// vec.sort_unstable();
    /// assert_eq!(vec, [(1, "a", 'x'), (2, "b", 'y')]);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn iter(&self) -> Iter<'_, K, V1, V2> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns a detached [`Cursor`] positioned before the first entry.
    ///
    /// Every write to the map invalidates the cursor; advancing it afterwards
    /// fails with [`PairMapError::ConcurrentModification`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{pairmap, ErrorKind};
    ///
    /// let mut map = pairmap! { 1 => ("a", 'x') };
    /// let mut cursor = map.cursor();
    ///
    /// map.remove(&1).unwrap();
    /// assert_eq!(cursor.advance(&map).unwrap_err().kind(), ErrorKind::ConcurrentModification);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.stamp)
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut a = PairMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.add(1, "a", 'x').unwrap();
    /// assert_eq!(a.len(), 1);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no elements.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Always returns `false`: a [`PairMap`] can be modified.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_read_only(&self) -> bool {
        false
    }

    /// Clears the map, removing all key-pair entries. Keeps the allocated
    /// memory for reuse.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let mut a = pairmap! {
    ///     "Breakfast" => ("Pancakes", 500),
    ///     "Lunch" => ("Sandwich", 700),
    /// };
    ///
    /// // We can that see PairMap holds two elements
    /// assert_eq!(a.len(), 2);
    /// let capacity_before_clearing = a.capacity();
    ///
    /// a.clear();
    ///
    /// // And now the map is empty and contains no elements
    /// assert!(a.is_empty() && a.len() == 0);
    /// assert_eq!(a.iter().next(), None);
    /// // But map capacity is equal to the old one
    /// assert_eq!(a.capacity(), capacity_before_clearing);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        log::trace!("clearing {} entries", self.entries.len());
        self.indices.clear();
        self.entries.clear();
        self.touch();
    }

    /// Retains only the entries specified by the predicate.
    ///
    /// In other words, remove all entries `(k, pair)` such that `f(&k, &pair)`
    /// returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map: PairMap<i32, i32, bool> = (0..8).map(|x| (x, (x * 10, x % 2 == 0))).collect();
    /// map.retain(|_, &(_, even)| even);
    ///
    /// assert_eq!(map.len(), 4);
    /// assert!(map.iter().all(|(k, _)| k % 2 == 0));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &(V1, V2)) -> bool,
    {
        let mut guard = RetainGuard {
            before: self.entries.len(),
            map: self,
        };
        guard
            .map
            .entries
            .retain(|bucket| f(&bucket.key, &bucket.pair));
    }

    /// Reserves capacity for at least `additional` more elements to be inserted
    /// in the [`PairMap`]. The collection may reserve more space to avoid
    /// frequent reallocations.
    ///
    /// # Panics
    ///
    /// Panics if the new allocation size overflows [`usize`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    /// let mut map: PairMap<&str, i32, i32> = PairMap::new();
    /// map.reserve(10);
    /// assert!(map.capacity() >= 10);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        log::trace!(
            "reserving room for {} more entries beside {}",
            additional,
            self.entries.len()
        );
        self.indices.reserve(additional, get_hash(&self.entries));
        self.entries.reserve(additional);
    }

    /// Shrinks the capacity of the map as much as possible. It will drop
    /// down as much as possible while maintaining the internal rules
    /// and possibly leaving some space in accordance with the resize policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map: PairMap<i32, i32, i32> = PairMap::with_capacity(100);
    /// map.add(1, 2, 3).unwrap();
    /// map.add(4, 5, 6).unwrap();
    /// assert!(map.capacity() >= 100);
    /// map.shrink_to_fit();
    /// assert!(map.capacity() >= 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        log::trace!("shrinking to fit {} entries", self.entries.len());
        self.indices.shrink_to_fit(get_hash(&self.entries));
        self.entries.shrink_to_fit();
    }

    /// Creates a consuming iterator visiting all the keys in arbitrary order.
    /// The map cannot be used after calling this. The iterator element type is `K`.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn into_keys(self) -> IntoKeys<K, V1, V2> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the value pairs in arbitrary order.
    /// The map cannot be used after calling this. The iterator element type is `(V1, V2)`.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn into_values(self) -> IntoValues<K, V1, V2> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Marks the map as modified, invalidating outstanding cursors.
    #[inline]
    fn touch(&mut self) {
        self.stamp = next_stamp();
    }

    fn rebuild_indices(&mut self) {
        self.indices.clear();
        for (index, bucket) in self.entries.iter().enumerate() {
            self.indices
                .insert_unique(bucket.hash, index, get_hash(&self.entries));
        }
    }
}

/// Brings `indices` back in line with `entries` once `retain` is done,
/// including when the predicate panics halfway through.
struct RetainGuard<'a, K, V1, V2, C> {
    map: &'a mut PairMap<K, V1, V2, C>,
    before: usize,
}

impl<K, V1, V2, C> Drop for RetainGuard<'_, K, V1, V2, C> {
    fn drop(&mut self) {
        let after = self.map.entries.len();
        if after != self.before {
            log::trace!(
                "retain removed {} of {} entries",
                self.before - after,
                self.before
            );
            self.map.rebuild_indices();
            self.map.touch();
        }
    }
}

impl<K, V1, V2, C> PairMap<K, V1, V2, C>
where
    C: KeyComparer<K>,
{
    /// Adds the key and the pair `(value1, value2)` into the map.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] holding back the key and the pair if:
    /// - the key is absent according to the comparer ([`ErrorKind::InvalidArgument`]);
    /// - the map already contains an equal key ([`ErrorKind::DuplicateKey`]).
    ///   The existing entry is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{ErrorKind, PairMap};
    ///
    /// let mut map = PairMap::new();
    /// map.add("x", 1, true).unwrap();
    /// assert_eq!(map["x"], (1, true));
    ///
    /// let error = map.add("x", 2, false).unwrap_err();
    /// assert_eq!(error.error, ErrorKind::DuplicateKey);
    /// assert_eq!(error.key, "x");
    /// assert_eq!(error.pair, (2, false));
    ///
    /// // The map is unchanged
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map["x"], (1, true));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn add(&mut self, key: K, value1: V1, value2: V2) -> Result<(), InsertError<K, V1, V2>> {
        self.insert_new(key, (value1, value2))
    }

    /// Adds a pre-built `(key, (value1, value2))` entry into the map.
    ///
    /// Same validation as [`add`](PairMap::add).
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add_entry((1, ("a", 'x'))).unwrap();
    /// assert!(map.add_entry((1, ("b", 'y'))).is_err());
    /// assert_eq!(map[&1], ("a", 'x'));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn add_entry(&mut self, entry: (K, (V1, V2))) -> Result<(), InsertError<K, V1, V2>> {
        self.insert_new(entry.0, entry.1)
    }

    /// Writes the pair `(value1, value2)` for the key, inserting it if absent and
    /// overwriting the whole pair if present.
    ///
    /// Returns the previous pair if the key was present.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] with [`ErrorKind::InvalidArgument`] if the key is
    /// absent according to the comparer. An existing key is never an error here.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// assert_eq!(map.add_or_update("k", 1, 'a').unwrap(), None);
    /// assert_eq!(map.add_or_update("k", 2, 'b').unwrap(), Some((1, 'a')));
    /// assert_eq!(map.try_get_values("k"), Ok(Some((&2, &'b'))));
    /// ```
    pub fn add_or_update(
        &mut self,
        key: K,
        value1: V1,
        value2: V2,
    ) -> Result<Option<(V1, V2)>, InsertError<K, V1, V2>> {
        let pair = (value1, value2);
        if self.comparer.is_absent(&key) {
            return Err(InsertError {
                error: ErrorKind::InvalidArgument,
                key,
                pair,
            });
        }
        let hash = self.comparer.hash_of(&key);
        match self.find_index(hash, &key) {
            Some(index) => {
                self.touch();
                Ok(Some(mem::replace(&mut self.entries[index].pair, pair)))
            }
            None => {
                self.push(hash, key, pair);
                Ok(None)
            }
        }
    }

    /// Indexed write: inserts or overwrites the pair for the key.
    ///
    /// This is [`add_or_update`](PairMap::add_or_update) without the previous pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.set(7, "seven", 7.0).unwrap();
    /// map.set(7, "SEVEN", 7.5).unwrap();
    /// assert_eq!(map[&7], ("SEVEN", 7.5));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn set(&mut self, key: K, value1: V1, value2: V2) -> Result<(), InsertError<K, V1, V2>> {
        self.add_or_update(key, value1, value2).map(drop)
    }

    /// Overwrites the pair of an existing key.
    ///
    /// Returns `Ok(true)` if the key existed and its pair was replaced. Returns
    /// `Ok(false)` and leaves the map unchanged if the key is not in the map.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add("a", 1, 2).unwrap();
    ///
    /// assert_eq!(map.try_update("a", 10, 20), Ok(true));
    /// assert_eq!(map.try_update("b", 30, 40), Ok(false));
    ///
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map["a"], (10, 20));
    /// ```
    pub fn try_update<Q>(
        &mut self,
        key: &Q,
        value1: V1,
        value2: V2,
    ) -> Result<bool, PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.check_key(key)?;
        match self.find_index(self.comparer.hash_of(key), key) {
            Some(index) => {
                self.entries[index].pair = (value1, value2);
                self.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a key from the map, returning its pair if the key was present.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, "a", 'x').unwrap();
    ///
    /// assert_eq!(map.remove(&1), Ok(Some(("a", 'x'))));
    /// assert_eq!(map.remove(&1), Ok(None));
    /// assert!(!map.contains_key(&1).unwrap());
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<(V1, V2)>, PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.check_key(key)?;
        let hash = self.comparer.hash_of(key);
        match self.find_index(hash, key) {
            Some(index) => Ok(Some(self.remove_found(hash, index).pair)),
            None => Ok(None),
        }
    }

    /// Removes the entry only if both its key and its pair are equal to `entry`.
    ///
    /// Returns whether the entry was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add("a", 1, 'x').unwrap();
    ///
    /// assert_eq!(map.remove_entry(&("a", (1, 'y'))), Ok(false));
    /// assert_eq!(map.remove_entry(&("a", (1, 'x'))), Ok(true));
    /// assert!(map.is_empty());
    /// ```
    pub fn remove_entry(&mut self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq,
    {
        let (key, pair) = entry;
        self.check_key(key)?;
        let hash = self.comparer.hash_of(key);
        match self.find_index(hash, key) {
            Some(index) if self.entries[index].pair == *pair => {
                self.remove_found(hash, index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Returns `true` if the map contains an entry with an equal key.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(String::from("a"), 1, 2).unwrap();
    ///
    /// assert_eq!(map.contains_key("a"), Ok(true));
    /// assert_eq!(map.contains_key("b"), Ok(false));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool, PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.check_key(key)?;
        Ok(self.find_index(self.comparer.hash_of(key), key).is_some())
    }

    /// Returns `true` if the map contains an entry with an equal key and an
    /// equal pair.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, "a", 'x').unwrap();
    ///
    /// assert_eq!(map.contains_entry(&(1, ("a", 'x'))), Ok(true));
    /// assert_eq!(map.contains_entry(&(1, ("a", 'y'))), Ok(false));
    /// assert_eq!(map.contains_entry(&(2, ("a", 'x'))), Ok(false));
    /// ```
    pub fn contains_entry(&self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq,
    {
        let (key, pair) = entry;
        Ok(self.try_get(key)?.map_or(false, |stored| stored == pair))
    }

    /// Indexed read: returns a reference to the pair stored under the key.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::KeyNotFound`] if the key is not in the map, or
    /// [`PairMapError::InvalidArgument`] if the key is absent according to the
    /// comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{PairMap, PairMapError};
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, "a", 'x').unwrap();
    ///
    /// assert_eq!(map.get(&1), Ok(&("a", 'x')));
    /// assert_eq!(map.get(&2), Err(PairMapError::KeyNotFound));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn get<Q>(&self, key: &Q) -> Result<&(V1, V2), PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.try_get(key)?.ok_or(PairMapError::KeyNotFound)
    }

    /// Returns a reference to the pair stored under the key, or `Ok(None)` if
    /// the key is not in the map. A missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, "a", 'x').unwrap();
    ///
    /// assert_eq!(map.try_get(&1), Ok(Some(&("a", 'x'))));
    /// assert_eq!(map.try_get(&2), Ok(None));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn try_get<Q>(&self, key: &Q) -> Result<Option<&(V1, V2)>, PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.check_key(key)?;
        Ok(self.find_pair(key))
    }

    /// Returns references to both values stored under the key, or `Ok(None)`
    /// if the key is not in the map. A missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, "a", 'x').unwrap();
    ///
    /// assert_eq!(map.try_get_values(&1), Ok(Some((&"a", &'x'))));
    /// assert_eq!(map.try_get_values(&2), Ok(None));
    /// ```
    #[cfg_attr(feature = "inline-more", inline)]
    #[allow(clippy::type_complexity)]
    pub fn try_get_values<Q>(&self, key: &Q) -> Result<Option<(&V1, &V2)>, PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        match self.try_get(key)? {
            Some((value1, value2)) => Ok(Some((value1, value2))),
            None => Ok(None),
        }
    }

    /// Returns whether the key was found, together with clones of both values,
    /// or the default value of each type if it was not.
    ///
    /// # Errors
    ///
    /// Returns [`PairMapError::InvalidArgument`] if the key is absent according
    /// to the comparer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::PairMap;
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, String::from("a"), 5u8).unwrap();
    ///
    /// assert_eq!(map.get_values_or_default(&1), Ok((true, String::from("a"), 5)));
    /// assert_eq!(map.get_values_or_default(&2), Ok((false, String::new(), 0)));
    /// ```
    pub fn get_values_or_default<Q>(&self, key: &Q) -> Result<(bool, V1, V2), PairMapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
        V1: Clone + Default,
        V2: Clone + Default,
    {
        match self.try_get(key)? {
            Some((value1, value2)) => Ok((true, value1.clone(), value2.clone())),
            None => Ok((false, V1::default(), V2::default())),
        }
    }

    /// Clones all entries into `destination`, starting at `start_index`.
    ///
    /// The entries are written in iteration order.
    ///
    /// # Errors
    ///
    /// - [`PairMapError::InvalidArgument`] if `start_index` is past the end of
    ///   `destination`;
    /// - [`PairMapError::InsufficientSpace`] if `destination` cannot hold
    ///   [`len`](PairMap::len) entries starting at `start_index`.
    ///
    /// Nothing is written if an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::{PairMap, PairMapError};
    ///
    /// let mut map = PairMap::new();
    /// map.add(1, 'a', true).unwrap();
    ///
    /// let mut destination = [(0, (' ', false)); 3];
    /// map.copy_to(&mut destination, 2).unwrap();
    /// assert_eq!(destination[2], (1, ('a', true)));
    ///
    /// assert_eq!(
    ///     map.copy_to(&mut destination[..2], 2),
    ///     Err(PairMapError::InsufficientSpace { required: 1, available: 0 })
    /// );
    /// ```
    pub fn copy_to(
        &self,
        destination: &mut [(K, (V1, V2))],
        start_index: usize,
    ) -> Result<(), PairMapError>
    where
        K: Clone,
        V1: Clone,
        V2: Clone,
    {
        if start_index > destination.len() {
            return Err(PairMapError::InvalidArgument {
                argument: "start_index",
            });
        }
        let available = destination.len() - start_index;
        if available < self.len() {
            return Err(PairMapError::InsufficientSpace {
                required: self.len(),
                available,
            });
        }
        for (slot, bucket) in destination[start_index..].iter_mut().zip(&self.entries) {
            slot.0.clone_from(&bucket.key);
            slot.1.clone_from(&bucket.pair);
        }
        Ok(())
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn check_key<Q>(&self, key: &Q) -> Result<(), PairMapError>
    where
        Q: ?Sized,
        C: KeyComparer<Q>,
    {
        if self.comparer.is_absent(key) {
            return Err(PairMapError::InvalidArgument { argument: "key" });
        }
        Ok(())
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn find_index<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        self.indices
            .find(hash, equivalent(key, &self.comparer, &self.entries))
            .copied()
    }

    /// Looks the key up without the absent-key check. Stored keys are never absent.
    #[cfg_attr(feature = "inline-more", inline)]
    fn find_pair<Q>(&self, key: &Q) -> Option<&(V1, V2)>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        C: KeyComparer<Q>,
    {
        // Avoid `Option::map` because it bloats LLVM IR.
        match self.find_index(self.comparer.hash_of(key), key) {
            Some(index) => Some(&self.entries[index].pair),
            None => None,
        }
    }

    fn insert_new(&mut self, key: K, pair: (V1, V2)) -> Result<(), InsertError<K, V1, V2>> {
        if self.comparer.is_absent(&key) {
            return Err(InsertError {
                error: ErrorKind::InvalidArgument,
                key,
                pair,
            });
        }
        let hash = self.comparer.hash_of(&key);
        if self.find_index(hash, &key).is_some() {
            log::debug!(
                "rejected duplicate key, map keeps its {} entries",
                self.entries.len()
            );
            return Err(InsertError {
                error: ErrorKind::DuplicateKey,
                key,
                pair,
            });
        }
        self.push(hash, key, pair);
        Ok(())
    }

    /// Appends an entry whose key is known to be vacant.
    fn push(&mut self, hash: u64, key: K, pair: (V1, V2)) {
        let index = self.entries.len();
        self.indices
            .insert_unique(hash, index, get_hash(&self.entries));
        self.entries.push(Bucket { hash, key, pair });
        self.touch();
    }

    /// Removes the entry at `index`, moving the last entry into its place.
    fn remove_found(&mut self, hash: u64, index: usize) -> Bucket<K, V1, V2> {
        if let Ok(slot) = self.indices.find_entry(hash, |&i| i == index) {
            let _ = slot.remove();
        }
        let last = self.entries.len() - 1;
        if index != last {
            let moved_hash = self.entries[last].hash;
            if let Some(slot) = self.indices.find_mut(moved_hash, |&i| i == last) {
                *slot = index;
            }
        }
        self.touch();
        self.entries.swap_remove(index)
    }
}

impl<K, V1, V2, C> PartialEq for PairMap<K, V1, V2, C>
where
    V1: PartialEq,
    V2: PartialEq,
    C: KeyComparer<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        self.iter()
            .all(|(key, pair)| other.find_pair(key).map_or(false, |other| *pair == *other))
    }
}

impl<K, V1, V2, C> Eq for PairMap<K, V1, V2, C>
where
    V1: Eq,
    V2: Eq,
    C: KeyComparer<K>,
{
}

impl<K, V1, V2, C> Debug for PairMap<K, V1, V2, C>
where
    K: Debug,
    V1: Debug,
    V2: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V1, V2, C> Default for PairMap<K, V1, V2, C>
where
    C: Default,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

impl<K, Q, V1, V2, C> Index<&Q> for PairMap<K, V1, V2, C>
where
    Q: ?Sized,
    K: Borrow<Q>,
    C: KeyComparer<K> + KeyComparer<Q>,
{
    type Output = (V1, V2);

    /// Returns a reference to the pair stored under the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map or is absent according to
    /// the comparer. Use [`PairMap::get`] for a fallible read.
    #[cfg_attr(feature = "inline-more", inline)]
    fn index(&self, key: &Q) -> &(V1, V2) {
        match self.get(key) {
            Ok(pair) => pair,
            Err(PairMapError::InvalidArgument { .. }) => panic!("absent key used as index"),
            Err(_) => panic!("no entry found for key"),
        }
    }
}

impl<K, V1, V2, const N: usize> From<[(K, (V1, V2)); N]> for PairMap<K, V1, V2, DefaultComparer>
where
    DefaultComparer: KeyComparer<K>,
{
    fn from(arr: [(K, (V1, V2)); N]) -> Self {
        Self::from_iter(arr)
    }
}

/// Inserts all new key-pairs from the iterator and replaces the pairs of
/// existing keys with the ones returned from the iterator. Absent keys are skipped.
impl<K, V1, V2, C> FromIterator<(K, (V1, V2))> for PairMap<K, V1, V2, C>
where
    C: KeyComparer<K> + Default,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn from_iter<T: IntoIterator<Item = (K, (V1, V2))>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_comparer(iter.size_hint().0, C::default());
        map.extend(iter);
        map
    }
}

/// Inserts all new key-pairs from the iterator and replaces the pairs of
/// existing keys with the ones returned from the iterator. Absent keys are skipped.
impl<K, V1, V2, C> Extend<(K, (V1, V2))> for PairMap<K, V1, V2, C>
where
    C: KeyComparer<K>,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn extend<T: IntoIterator<Item = (K, (V1, V2))>>(&mut self, iter: T) {
        // Keys may be already present or show multiple times in the iterator.
        // Reserve the entire hint lower bound if the map is empty.
        // Otherwise reserve half the hint (rounded up), so the map
        // will only resize twice in the worst case.
        let iter = iter.into_iter();
        let reserve = if self.is_empty() {
            iter.size_hint().0
        } else {
            (iter.size_hint().0 + 1) / 2
        };
        self.reserve(reserve);
        iter.for_each(move |(key, (value1, value2))| {
            let _ = self.add_or_update(key, value1, value2);
        });
    }
}

impl<K, V1, V2, C> IntoIterator for PairMap<K, V1, V2, C> {
    type Item = (K, (V1, V2));
    type IntoIter = IntoIter<K, V1, V2>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn into_iter(self) -> IntoIter<K, V1, V2> {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a, K, V1, V2, C> IntoIterator for &'a PairMap<K, V1, V2, C> {
    type Item = (&'a K, &'a (V1, V2));
    type IntoIter = Iter<'a, K, V1, V2>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn into_iter(self) -> Iter<'a, K, V1, V2> {
        self.iter()
    }
}

impl<K, V1, V2, C> PairLookup<K, V1, V2> for PairMap<K, V1, V2, C>
where
    C: KeyComparer<K>,
{
    type Keys<'a> = Keys<'a, K, V1, V2>
    where
        Self: 'a,
        K: 'a;

    type Values<'a> = Values<'a, K, V1, V2>
    where
        Self: 'a,
        V1: 'a,
        V2: 'a;

    #[inline]
    fn len(&self) -> usize {
        PairMap::len(self)
    }

    #[inline]
    fn keys(&self) -> Keys<'_, K, V1, V2> {
        PairMap::keys(self)
    }

    #[inline]
    fn values(&self) -> Values<'_, K, V1, V2> {
        PairMap::values(self)
    }

    #[inline]
    fn get(&self, key: &K) -> Result<&(V1, V2), PairMapError> {
        PairMap::get(self, key)
    }

    #[inline]
    fn contains_key(&self, key: &K) -> Result<bool, PairMapError> {
        PairMap::contains_key(self, key)
    }

    #[inline]
    fn try_get(&self, key: &K) -> Result<Option<&(V1, V2)>, PairMapError> {
        PairMap::try_get(self, key)
    }
}

impl<K, V1, V2, C> PairCollection<K, V1, V2> for PairMap<K, V1, V2, C>
where
    C: KeyComparer<K>,
{
    #[inline]
    fn len(&self) -> usize {
        PairMap::len(self)
    }

    #[inline]
    fn is_read_only(&self) -> bool {
        PairMap::is_read_only(self)
    }

    #[inline]
    fn add_entry(&mut self, entry: (K, (V1, V2))) -> Result<(), InsertError<K, V1, V2>> {
        PairMap::add_entry(self, entry)
    }

    #[inline]
    fn remove_entry(&mut self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq,
    {
        PairMap::remove_entry(self, entry)
    }

    #[inline]
    fn contains_entry(&self, entry: &(K, (V1, V2))) -> Result<bool, PairMapError>
    where
        V1: PartialEq,
        V2: PartialEq,
    {
        PairMap::contains_entry(self, entry)
    }

    #[inline]
    fn clear(&mut self) {
        PairMap::clear(self)
    }

    #[inline]
    fn copy_to(
        &self,
        destination: &mut [(K, (V1, V2))],
        start_index: usize,
    ) -> Result<(), PairMapError>
    where
        K: Clone,
        V1: Clone,
        V2: Clone,
    {
        PairMap::copy_to(self, destination, start_index)
    }
}
