use super::*;

/// An owning iterator over the keys of a `PairMap` in arbitrary order.
/// The iterator element type is `K`.
///
/// This `struct` is created by the [`into_keys`](PairMap::into_keys) method
/// on [`PairMap`]. See its documentation for more.
/// The map cannot be used after calling that method.
///
/// # Examples
///
/// ```
/// use pair_map::pairmap;
///
/// let map = pairmap! {
///     "a" => (1, 'x'),
///     "b" => (2, 'y'),
///     "c" => (3, 'z'),
/// };
///
/// let mut keys = map.into_keys();
/// let mut vec = vec![keys.next(), keys.next(), keys.next()];
///
/// // The `IntoKeys` iterator produces keys in arbitrary order, so the
/// // keys must be sorted to test them against a sorted array.
/// vec.sort_unstable();
/// assert_eq!(vec, [Some("a"), Some("b"), Some("c")]);
///
/// // It is fused iterator
/// assert_eq!(keys.next(), None);
/// assert_eq!(keys.next(), None);
/// ```
pub struct IntoKeys<K, V1, V2> {
    pub(super) inner: IntoIter<K, V1, V2>,
}

impl<K, V1, V2> Iterator for IntoKeys<K, V1, V2> {
    type Item = K;

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<K> {
        match self.inner.next() {
            Some((key, _)) => Some(key),
            None => None,
        }
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V1, V2> ExactSizeIterator for IntoKeys<K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V1, V2> FusedIterator for IntoKeys<K, V1, V2> {}

impl<K: Debug, V1, V2> fmt::Debug for IntoKeys<K, V1, V2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.iter().map(|(key, _)| key))
            .finish()
    }
}
