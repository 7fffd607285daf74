use super::*;

// `Keys` and `Values` differ only in which half of an entry they yield.
macro_rules! projection_iter {
    (
        $(#[$attr:meta])*
        $name:ident<$lt:lifetime> => $item:ty,
        |$key:pat_param, $pair:pat_param| $out:expr
    ) => {
        $(#[$attr])*
        pub struct $name<$lt, K, V1, V2> {
            pub(super) inner: Iter<$lt, K, V1, V2>,
        }

        impl<K, V1, V2> Clone for $name<'_, K, V1, V2> {
            #[cfg_attr(feature = "inline-more", inline)]
            fn clone(&self) -> Self {
                $name {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<$lt, K, V1, V2> fmt::Debug for $name<$lt, K, V1, V2>
        where
            $item: Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.clone()).finish()
            }
        }

        impl<$lt, K, V1, V2> Iterator for $name<$lt, K, V1, V2> {
            type Item = $item;

            #[cfg_attr(feature = "inline-more", inline)]
            fn next(&mut self) -> Option<$item> {
                // Avoid `Option::map` because it bloats LLVM IR.
                match self.inner.next() {
                    Some(($key, $pair)) => Some($out),
                    None => None,
                }
            }

            #[cfg_attr(feature = "inline-more", inline)]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V1, V2> ExactSizeIterator for $name<'_, K, V1, V2> {
            #[cfg_attr(feature = "inline-more", inline)]
            fn len(&self) -> usize {
                self.inner.len()
            }
        }

        impl<K, V1, V2> FusedIterator for $name<'_, K, V1, V2> {}
    };
}

projection_iter! {
    /// An iterator over the keys of a `PairMap` in arbitrary order.
    /// The iterator element type is `&'a K`.
    ///
    /// This `struct` is created by the [`keys`](PairMap::keys) method
    /// on [`PairMap`]. See its documentation for more.
    ///
    /// # Example
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let map = pairmap! {
    ///     1 => ("One", 1.0),
    ///     2 => ("Two", 2.0),
    ///     3 => ("Three", 3.0),
    /// };
    ///
    /// let mut keys: Vec<_> = map.keys().copied().collect();
    /// keys.sort_unstable();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    Keys<'a> => &'a K,
    |key, _| key
}

projection_iter! {
    /// An iterator over the value pairs of a `PairMap` in arbitrary order.
    /// The iterator element type is `&'a (V1, V2)`.
    ///
    /// This `struct` is created by the [`values`](PairMap::values) method
    /// on [`PairMap`]. See its documentation for more.
    ///
    /// # Example
    ///
    /// ```
    /// use pair_map::pairmap;
    ///
    /// let map = pairmap! {
    ///     "a" => (10, true),
    ///     "b" => (20, false),
    /// };
    ///
    /// let total: i32 = map.values().map(|(amount, _)| amount).sum();
    /// assert_eq!(total, 30);
    ///
    /// // It is fused iterator
    /// let mut values = map.values().skip(2);
    /// assert_eq!(values.next(), None);
    /// assert_eq!(values.next(), None);
    /// ```
    Values<'a> => &'a (V1, V2),
    |_, pair| pair
}
