use super::*;
use ::rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

impl<K, V1, V2, C> PairMap<K, V1, V2, C>
where
    K: Sync,
    V1: Sync,
    V2: Sync,
{
    /// Visits all entries in parallel. The iterator element type is
    /// `(&'a K, &'a (V1, V2))`.
    ///
    /// This method is only available if the `rayon` feature is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use pair_map::pairmap;
    /// use rayon::prelude::*;
    ///
    /// let map = pairmap! {
    ///     1 => (10, 100),
    ///     2 => (20, 200),
    ///     3 => (30, 300),
    /// };
    ///
    /// let sum: i32 = map.par_iter().map(|(k, (a, b))| k + a + b).sum();
    /// assert_eq!(sum, 666);
    /// ```
    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = (&K, &(V1, V2))> + '_ {
        self.entries.par_iter().map(Bucket::refs)
    }
}
