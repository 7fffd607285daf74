use super::*;

/// An owning iterator over the value pairs of a `PairMap` in arbitrary order.
/// The iterator element type is `(V1, V2)`.
///
/// This `struct` is created by the [`into_values`](PairMap::into_values) method
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
/// };
///
/// let mut vec: Vec<(i32, char)> = map.into_values().collect();
///
/// // The `IntoValues` iterator produces pairs in arbitrary order, so the
/// // pairs must be sorted to test them against a sorted array.
/// vec.sort_unstable();
/// assert_eq!(vec, [(1, 'x'), (2, 'y')]);
/// ```
pub struct IntoValues<K, V1, V2> {
    pub(super) inner: IntoIter<K, V1, V2>,
}

impl<K, V1, V2> Iterator for IntoValues<K, V1, V2> {
    type Item = (V1, V2);

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<(V1, V2)> {
        match self.inner.next() {
            Some((_, pair)) => Some(pair),
            None => None,
        }
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V1, V2> ExactSizeIterator for IntoValues<K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V1, V2> FusedIterator for IntoValues<K, V1, V2> {}

impl<K, V1: Debug, V2: Debug> fmt::Debug for IntoValues<K, V1, V2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.iter().map(|(_, pair)| pair))
            .finish()
    }
}
