use super::*;

/// A detached enumeration cursor over the entries of a [`PairMap`].
///
/// Unlike [`Iter`], a `Cursor` does not borrow the map between steps, so the
/// map may be modified while a cursor is alive. Any write to the map after the
/// cursor was created (or last [`reset`](Cursor::reset)) makes the next call to
/// [`advance`](Cursor::advance) fail with [`PairMapError::ConcurrentModification`],
/// instead of silently skipping or repeating entries.
///
/// A cursor belongs to the map it was created from. Advancing it with any
/// other map, including a clone, fails with the same error.
///
/// # Examples
///
/// ```
/// use pair_map::{pairmap, PairMapError};
///
/// let mut map = pairmap! {
///     "a" => (1, 'x'),
///     "b" => (2, 'y'),
/// };
///
/// let mut cursor = map.cursor();
/// let mut seen = 0;
/// while let Some((_key, _pair)) = cursor.advance(&map).unwrap() {
///     seen += 1;
/// }
/// assert_eq!(seen, 2);
///
/// cursor.reset(&map);
/// assert!(cursor.advance(&map).unwrap().is_some());
///
/// map.add("c", 3, 'z').unwrap();
/// assert_eq!(cursor.advance(&map), Err(PairMapError::ConcurrentModification));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    stamp: u64,
    position: usize,
}

impl Cursor {
    #[inline]
    pub(super) fn new(stamp: u64) -> Self {
        Cursor { stamp, position: 0 }
    }

    /// Returns the next entry of `map`, `Ok(None)` once all entries were visited,
    /// or [`PairMapError::ConcurrentModification`] if `map` was modified since this
    /// cursor was created or reset.
    #[allow(clippy::type_complexity)]
    pub fn advance<'a, K, V1, V2, C>(
        &mut self,
        map: &'a PairMap<K, V1, V2, C>,
    ) -> Result<Option<(&'a K, &'a (V1, V2))>, PairMapError> {
        if self.stamp != map.stamp {
            log::debug!(
                "cursor at position {} invalidated by a write to the map",
                self.position
            );
            return Err(PairMapError::ConcurrentModification);
        }
        match map.entries.get(self.position) {
            Some(bucket) => {
                self.position += 1;
                Ok(Some(bucket.refs()))
            }
            None => Ok(None),
        }
    }

    /// Restarts the enumeration from the first entry of `map` as it is now.
    #[inline]
    pub fn reset<K, V1, V2, C>(&mut self, map: &PairMap<K, V1, V2, C>) {
        self.stamp = map.stamp;
        self.position = 0;
    }

    /// Returns the number of entries this cursor has yielded since it was
    /// created or reset.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}
