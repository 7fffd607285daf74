use super::*;

/// An iterator over the entries of a `PairMap` in arbitrary order.
/// The iterator element type is `(&'a K, &'a (V1, V2))`.
///
/// This `struct` is created by the [`iter`](PairMap::iter) method
/// on [`PairMap`]. See its documentation for more.
///
/// # Example
///
/// ```
/// use pair_map::pairmap;
///
/// let map = pairmap! {
///     "a" => (1, 'x'),
///     "b" => (2, 'y'),
/// };
///
/// let mut vec: Vec<_> = map.iter().collect();
///
/// // The `Iter` iterator produces entries in arbitrary order, so the
/// // entries must be sorted to test them against a sorted array.
/// vec.sort_unstable();
/// assert_eq!(vec, [(&"a", &(1, 'x')), (&"b", &(2, 'y'))]);
/// ```
pub struct Iter<'a, K, V1, V2> {
    pub(super) inner: slice::Iter<'a, Bucket<K, V1, V2>>,
}

impl<K, V1, V2> Clone for Iter<'_, K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Debug, V1: Debug, V2: Debug> fmt::Debug for Iter<'_, K, V1, V2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V1, V2> Iterator for Iter<'a, K, V1, V2> {
    type Item = (&'a K, &'a (V1, V2));

    #[cfg_attr(feature = "inline-more", inline)]
    fn next(&mut self) -> Option<(&'a K, &'a (V1, V2))> {
        // Avoid `Option::map` because it bloats LLVM IR.
        match self.inner.next() {
            Some(bucket) => Some((&bucket.key, &bucket.pair)),
            None => None,
        }
    }

    #[cfg_attr(feature = "inline-more", inline)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V1, V2> ExactSizeIterator for Iter<'_, K, V1, V2> {
    #[cfg_attr(feature = "inline-more", inline)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V1, V2> FusedIterator for Iter<'_, K, V1, V2> {}
