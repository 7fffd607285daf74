use super::*;

/// An owning iterator over the entries of a `PairMap` in arbitrary order.
/// The iterator element type is `(K, (V1, V2))`.
///
/// This `struct` is created by the [`into_iter`](IntoIterator::into_iter) method
/// on [`PairMap`] (provided by the [`IntoIterator`] trait). See its documentation
/// for more. The map cannot be used after calling that method.
///
/// # Example
///
/// ```
/// use pair_map::pairmap;
///
/// let map = pairmap! {
///     1 => ("a", 'x'),
///     2 => ("b", 'y'),
/// };
///
/// let mut vec: Vec<_> = map.into_iter().collect();
///
/// // The `IntoIter` iterator produces entries in arbitrary order, so the
/// // entries must be sorted to test them against a sorted array.
/// vec.sort_unstable();
/// assert_eq!(vec, [(1, ("a", 'x')), (2, ("b", 'y'))]);
/// ```
pub struct IntoIter<K, V1, V2> {
    pub(super) inner: vec::IntoIter<Bucket<K, V1, V2>>,
}

impl<K, V1, V2> IntoIter<K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    pub(super) fn iter(&self) -> Iter<'_, K, V1, V2> {
        Iter {
            inner: self.inner.as_slice().iter(),
        }
    }
}

impl<K, V1, V2> Iterator for IntoIter<K, V1, V2> {
    type Item = (K, (V1, V2));

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<(K, (V1, V2))> {
        match self.inner.next() {
            Some(bucket) => Some(bucket.into_entry()),
            None => None,
        }
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V1, V2> ExactSizeIterator for IntoIter<K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V1, V2> FusedIterator for IntoIter<K, V1, V2> {}

impl<K: Debug, V1: Debug, V2: Debug> fmt::Debug for IntoIter<K, V1, V2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
