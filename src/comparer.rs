//! Key equality strategies.
//!
//! A [`PairMap`](crate::PairMap) never compares or hashes its keys directly.
//! Every key-comparing operation goes through the [`KeyComparer`] the map was
//! constructed with, so the same key type can be stored under different notions
//! of equality (exact, case-insensitive, user defined).

use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Default hasher for [`DefaultComparer`].
#[cfg(feature = "ahash")]
pub type DefaultHashBuilder = core::hash::BuildHasherDefault<ahash::AHasher>;

/// Default hasher for [`DefaultComparer`].
#[cfg(not(feature = "ahash"))]
pub type DefaultHashBuilder = std::collections::hash_map::RandomState;

/// Key equality and hashing strategy.
///
/// # Correctness
///
/// Keys which are equal according to [`equals`](KeyComparer::equals) must
/// return the same value from [`hash_of`](KeyComparer::hash_of):
///
/// ```text
/// equals(k1, k2) -> hash_of(k1) == hash_of(k2)
/// ```
///
/// If a map is queried with a borrowed form `Q` of its key type `K`, the
/// comparer's implementations for `K` and `Q` must agree on both equality
/// and hashing, in the same way [`Borrow`](core::borrow::Borrow) requires
/// for `Hash` and `Eq`.
///
/// # Examples
///
/// ```
/// use pair_map::{KeyComparer, PairMap};
///
/// // Compares numbers by their last decimal digit
/// struct LastDigit;
///
/// impl KeyComparer<u32> for LastDigit {
///     fn equals(&self, a: &u32, b: &u32) -> bool {
///         a % 10 == b % 10
///     }
///     fn hash_of(&self, key: &u32) -> u64 {
///         (key % 10) as u64
///     }
/// }
///
/// let mut map = PairMap::with_comparer(LastDigit);
/// map.add(13, "thirteen", true).unwrap();
///
/// assert!(map.add(3, "three", false).is_err());
/// assert_eq!(map.get(&23).unwrap(), &("thirteen", true));
/// ```
pub trait KeyComparer<K: ?Sized> {
    /// Checks if both keys are equal.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Returns the hash of the key.
    fn hash_of(&self, key: &K) -> u64;

    /// Checks if the key represents "no key at all".
    ///
    /// Operations which require a key reject absent keys with
    /// [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument).
    /// Only key types which can represent absence need to override this,
    /// see [`OptionalKeys`].
    #[inline]
    fn is_absent(&self, key: &K) -> bool {
        let _ = key;
        false
    }
}

impl<K: ?Sized, C: KeyComparer<K> + ?Sized> KeyComparer<K> for &C {
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }

    #[inline]
    fn hash_of(&self, key: &K) -> u64 {
        (**self).hash_of(key)
    }

    #[inline]
    fn is_absent(&self, key: &K) -> bool {
        (**self).is_absent(key)
    }
}

#[cfg_attr(feature = "inline-more", inline)]
pub(crate) fn make_hash<Q, S>(hash_builder: &S, val: &Q) -> u64
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    use core::hash::Hasher;
    let mut state = hash_builder.build_hasher();
    val.hash(&mut state);
    state.finish()
}

/// The natural equality of the key type: [`Eq`] for equality and [`Hash`]
/// through a [`BuildHasher`] for hashing.
///
/// The hashing algorithm can be replaced with [`with_hasher`](DefaultComparer::with_hasher).
///
/// # Examples
///
/// ```
/// use pair_map::{DefaultComparer, PairMap};
/// use std::collections::hash_map::RandomState;
///
/// let comparer = DefaultComparer::with_hasher(RandomState::new());
/// let mut map = PairMap::with_comparer(comparer);
/// map.add("a", 1, 'x').unwrap();
/// assert_eq!(map["a"], (1, 'x'));
/// ```
#[derive(Clone, Default)]
pub struct DefaultComparer<S = DefaultHashBuilder> {
    hash_builder: S,
}

impl<S> DefaultComparer<S> {
    /// Creates a comparer which hashes keys with `hash_builder`.
    #[inline]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns a reference to the comparer's [`BuildHasher`].
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<S> fmt::Debug for DefaultComparer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultComparer").finish_non_exhaustive()
    }
}

impl<K, S> KeyComparer<K> for DefaultComparer<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn hash_of(&self, key: &K) -> u64 {
        make_hash(&self.hash_builder, key)
    }
}

/// A comparer assembled from an equality function and a hash function.
///
/// # Examples
///
/// ```
/// use pair_map::{FnComparer, PairMap};
///
/// let by_len = FnComparer::new(
///     |a: &String, b: &String| a.len() == b.len(),
///     |k: &String| k.len() as u64,
/// );
///
/// let mut map = PairMap::with_comparer(by_len);
/// map.add("abc".to_string(), 1, 2).unwrap();
/// assert!(map.contains_key(&"xyz".to_string()).unwrap());
/// ```
#[derive(Clone, Copy)]
pub struct FnComparer<E, H> {
    eq: E,
    hash: H,
}

impl<E, H> FnComparer<E, H> {
    /// Creates a comparer from the `eq` and `hash` functions.
    ///
    /// `eq(a, b)` returning `true` must imply `hash(a) == hash(b)`.
    #[inline]
    pub fn new(eq: E, hash: H) -> Self {
        Self { eq, hash }
    }
}

impl<E, H> fmt::Debug for FnComparer<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparer").finish_non_exhaustive()
    }
}

impl<K, E, H> KeyComparer<K> for FnComparer<E, H>
where
    K: ?Sized,
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u64,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }

    #[inline]
    fn hash_of(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
}

/// Unicode case-insensitive comparison of string keys.
///
/// Works for any key which is [`AsRef<str>`], so a map of `String` keys can
/// be queried with `&str`.
///
/// # Examples
///
/// ```
/// use pair_map::{CaseInsensitive, PairMap};
///
/// let mut map = PairMap::with_comparer(CaseInsensitive::new());
/// map.add(String::from("Key"), 1, 2).unwrap();
///
/// assert!(map.contains_key("KEY").unwrap());
/// assert!(map.add(String::from("kEy"), 3, 4).is_err());
/// ```
#[cfg(feature = "unicase")]
#[derive(Clone, Default)]
pub struct CaseInsensitive<S = DefaultHashBuilder> {
    hash_builder: S,
}

#[cfg(feature = "unicase")]
impl CaseInsensitive {
    /// Creates a case-insensitive comparer with the default hasher.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "unicase")]
impl<S> CaseInsensitive<S> {
    /// Creates a case-insensitive comparer which hashes keys with `hash_builder`.
    #[inline]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self { hash_builder }
    }
}

#[cfg(feature = "unicase")]
impl<S> fmt::Debug for CaseInsensitive<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseInsensitive").finish_non_exhaustive()
    }
}

#[cfg(feature = "unicase")]
impl<K, S> KeyComparer<K> for CaseInsensitive<S>
where
    K: AsRef<str> + ?Sized,
    S: BuildHasher,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn equals(&self, a: &K, b: &K) -> bool {
        unicase::UniCase::new(a.as_ref()) == unicase::UniCase::new(b.as_ref())
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn hash_of(&self, key: &K) -> u64 {
        make_hash(&self.hash_builder, &unicase::UniCase::new(key.as_ref()))
    }
}

/// Adapts a comparer for `K` to keys of type `Option<K>`, treating `None`
/// as an absent key.
///
/// With this comparer, every operation which requires a key rejects `None`
/// with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument).
///
/// # Examples
///
/// ```
/// use pair_map::{ErrorKind, OptionalKeys, PairMap};
///
/// let mut map = PairMap::with_comparer(OptionalKeys::<pair_map::DefaultComparer>::default());
/// map.add(Some("a"), 1, 2).unwrap();
///
/// let error = map.add(None, 3, 4).unwrap_err();
/// assert_eq!(error.error, ErrorKind::InvalidArgument);
/// assert_eq!(map.contains_key(&None).unwrap_err().kind(), ErrorKind::InvalidArgument);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OptionalKeys<C> {
    inner: C,
}

impl<C> OptionalKeys<C> {
    /// Wraps the comparer used for present keys.
    #[inline]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the comparer used for present keys.
    #[inline]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<K, C> KeyComparer<Option<K>> for OptionalKeys<C>
where
    C: KeyComparer<K>,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.inner.equals(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn hash_of(&self, key: &Option<K>) -> u64 {
        match key {
            Some(key) => self.inner.hash_of(key),
            None => 0,
        }
    }

    #[inline]
    fn is_absent(&self, key: &Option<K>) -> bool {
        key.is_none()
    }
}
