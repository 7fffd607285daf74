/// Create a [`PairMap<K, V1, V2, DefaultComparer>`](crate::PairMap)
/// from a list of sequentially given keys and value pairs.
///
/// Input data list must follow the rule `K => (V1, V2), K => (V1, V2)` ... and so on.
///
/// Last comma separator can be omitted. If a key is given more than once,
/// the last pair wins.
/// If this macros is called without arguments, i.e. like
/// ```
/// # use pair_map::{PairMap, pairmap};
/// let map: PairMap<i32, String, String> = pairmap![];
/// ```
/// it is equivalent to [`PairMap::new()`](crate::PairMap::new) function
///
/// # Examples
///
/// ```
/// use pair_map::{PairMap, pairmap};
///
/// // Calling macros without arguments is equivalent to PairMap::new() function
/// let _map0: PairMap<i32, i32, i32> = pairmap![];
///
/// let map = pairmap!{
///     1 => ("a", "One"),
///     2 => ("b", "Two"), // last comma separator can be omitted
/// };
///
/// assert_eq!(map[&1], ("a", "One"));
/// assert_eq!(map.try_get_values(&2), Ok(Some((&"b", &"Two"))));
/// ```
#[macro_export]
macro_rules! pairmap {
    () => ($crate::PairMap::new());
    ($($key:expr => ($value1:expr, $value2:expr)),+ $(,)?) => (
        <$crate::PairMap<_, _, _, $crate::DefaultComparer> as ::core::iter::FromIterator<_>>::from_iter(
            [$(($key, ($value1, $value2))),+]
        )
    );
}
