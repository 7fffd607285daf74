use super::{ErrorKind, PairMap, PairMapError};
use crate::comparer::{DefaultComparer, FnComparer, OptionalKeys};
use crate::{PairCollection, PairLookup};
use core::cell::RefCell;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;

#[test]
fn test_zero_capacities() {
    type PM = PairMap<i32, i32, i32>;

    let m = PM::new();
    assert_eq!(m.capacity(), 0);

    let m = PM::default();
    assert_eq!(m.capacity(), 0);

    let m = PM::with_capacity(0);
    assert_eq!(m.capacity(), 0);

    let m = PM::try_with_capacity(0u8).unwrap();
    assert_eq!(m.capacity(), 0);

    let m = PairMap::<i32, i32, i32, _>::with_comparer(DefaultComparer::with_hasher(
        RandomState::new(),
    ));
    assert_eq!(m.capacity(), 0);

    let mut m = PM::new();
    m.add(1, 1, 1).unwrap();
    m.add(2, 2, 2).unwrap();
    assert_eq!(m.try_get(&1), Ok(Some(&(1, 1))));
    assert_eq!(m.try_get(&2), Ok(Some(&(2, 2))));
    m.remove(&1).unwrap();
    m.remove(&2).unwrap();
    m.shrink_to_fit();
    assert_eq!(m.capacity(), 0);

    let mut m = PM::new();
    m.add_or_update(1, 1, 1).unwrap();
    m.set(2, 2, 2).unwrap();
    m.clear();
    m.shrink_to_fit();
    assert_eq!(m.capacity(), 0);
}

#[test]
fn test_try_with_capacity() {
    type PM = PairMap<i32, i32, i32>;

    assert_eq!(
        PM::try_with_capacity(-1).unwrap_err(),
        PairMapError::InvalidArgument {
            argument: "capacity"
        }
    );
    assert_eq!(
        PM::try_with_capacity(i64::MIN).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        PM::try_with_capacity_and_comparer(-5i16, DefaultComparer::default())
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidArgument
    );

    // Zero is a valid capacity and gives a usable map
    let mut m = PM::try_with_capacity(0).unwrap();
    assert!(m.is_empty());
    m.add(1, 2, 3).unwrap();
    assert_eq!(m[&1], (2, 3));

    let m = PM::try_with_capacity(16u64).unwrap();
    assert!(m.capacity() >= 16);
}

#[test]
fn test_add() {
    let mut m = PairMap::new();
    assert_eq!(m.len(), 0);
    m.add(1, "a", 2).unwrap();
    assert_eq!(m.len(), 1);
    m.add(2, "b", 4).unwrap();
    assert_eq!(m.len(), 2);

    assert_eq!(m[&1], ("a", 2));
    assert_eq!(m[&2], ("b", 4));
}

#[test]
fn test_add_round_trip() {
    let mut m = PairMap::new();
    m.add("x", 1, true).unwrap();
    assert_eq!(m["x"], (1, true));
}

#[test]
fn test_add_duplicate_leaves_map_unchanged() {
    let mut m = PairMap::new();
    m.add("a", 1, 'x').unwrap();
    m.add("b", 2, 'y').unwrap();

    let error = m.add("a", 10, 'z').unwrap_err();
    assert_eq!(error.error, ErrorKind::DuplicateKey);
    assert_eq!(error.into_entry(), ("a", (10, 'z')));

    let error = m.add_entry(("b", (20, 'w'))).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DuplicateKey);

    assert_eq!(m.len(), 2);
    assert_eq!(m["a"], (1, 'x'));
    assert_eq!(m["b"], (2, 'y'));
}

#[test]
fn test_insert_error_converts_with_question_mark() {
    fn build() -> Result<PairMap<&'static str, i32, i32>, PairMapError> {
        let mut map = PairMap::new();
        map.add("a", 1, 2)?;
        map.add("a", 3, 4)?;
        Ok(map)
    }

    assert_eq!(build().unwrap_err(), PairMapError::DuplicateKey);
}

#[test]
fn test_count_follows_distinct_adds_and_removes() {
    let mut m = PairMap::new();
    for i in 0..64u32 {
        m.add(i, i * 2, i % 2 == 0).unwrap();
        assert_eq!(m.len(), i as usize + 1);
    }
    for i in 0..32u32 {
        assert!(m.remove(&i).unwrap().is_some());
        assert_eq!(m.len(), 64 - i as usize - 1);
    }
    for i in 0..32u32 {
        assert!(m.remove(&i).unwrap().is_none());
    }
    assert_eq!(m.len(), 32);
}

#[test]
fn test_add_or_update() {
    let mut m = PairMap::new();

    assert_eq!(m.add_or_update("k", 1, 'a').unwrap(), None);
    assert_eq!(m.try_get_values("k"), Ok(Some((&1, &'a'))));

    assert_eq!(m.add_or_update("k", 2, 'b').unwrap(), Some((1, 'a')));
    assert_eq!(m.try_get_values("k"), Ok(Some((&2, &'b'))));
    assert_eq!(m.len(), 1);
}

#[test]
fn test_set() {
    let mut m = PairMap::new();
    m.set(1, "one", 1.0).unwrap();
    m.set(2, "two", 2.0).unwrap();
    m.set(1, "ONE", 1.5).unwrap();

    assert_eq!(m.len(), 2);
    assert_eq!(m[&1], ("ONE", 1.5));
    assert_eq!(m[&2], ("two", 2.0));
}

#[test]
fn test_try_update() {
    let mut m = PairMap::new();
    m.add(1, "a", 'x').unwrap();

    assert_eq!(m.try_update(&1, "b", 'y'), Ok(true));
    assert_eq!(m[&1], ("b", 'y'));

    // No entry materializes for an absent key
    assert_eq!(m.try_update(&2, "c", 'z'), Ok(false));
    assert_eq!(m.len(), 1);
    assert_eq!(m.contains_key(&2), Ok(false));
    assert_eq!(m.try_get(&2), Ok(None));
}

#[test]
fn test_remove() {
    let mut m = PairMap::new();
    m.add(1, 2, 3).unwrap();

    assert_eq!(m.remove(&7), Ok(None));
    assert_eq!(m.len(), 1);

    assert_eq!(m.remove(&1), Ok(Some((2, 3))));
    assert_eq!(m.contains_key(&1), Ok(false));
    assert_eq!(m.remove(&1), Ok(None));
    assert!(m.is_empty());
}

#[test]
fn test_empty_remove() {
    let mut m: PairMap<i32, bool, bool> = PairMap::new();
    assert_eq!(m.remove(&0), Ok(None));
    assert_eq!(m.remove_entry(&(0, (true, true))), Ok(false));
}

#[test]
fn test_remove_moves_last_entry() {
    let mut m = PairMap::new();
    for i in 0..100u32 {
        m.add(i, i * 10, i.to_string()).unwrap();
    }

    for i in (0..100u32).step_by(2) {
        assert_eq!(m.remove(&i), Ok(Some((i * 10, i.to_string()))));
    }
    assert_eq!(m.len(), 50);

    for i in 0..100u32 {
        if i % 2 == 0 {
            assert_eq!(m.try_get(&i), Ok(None));
        } else {
            assert_eq!(m.try_get(&i), Ok(Some(&(i * 10, i.to_string()))));
        }
    }

    // Every entry is still reachable through its own key
    for (key, pair) in m.iter() {
        assert_eq!(m.get(key), Ok(pair));
    }
}

#[test]
fn test_remove_entry() {
    let mut m = PairMap::new();
    m.add("a", 1, 'x').unwrap();
    m.add("b", 2, 'y').unwrap();

    // Both key and pair must match
    assert_eq!(m.remove_entry(&("a", (1, 'y'))), Ok(false));
    assert_eq!(m.remove_entry(&("a", (2, 'x'))), Ok(false));
    assert_eq!(m.remove_entry(&("c", (1, 'x'))), Ok(false));
    assert_eq!(m.len(), 2);

    assert_eq!(m.remove_entry(&("a", (1, 'x'))), Ok(true));
    assert_eq!(m.len(), 1);
    assert_eq!(m.contains_key("a"), Ok(false));
    assert_eq!(m.contains_entry(&("b", (2, 'y'))), Ok(true));
}

#[test]
fn test_contains() {
    let mut m = PairMap::new();
    m.add(String::from("key"), 1u8, "one").unwrap();

    assert_eq!(m.contains_key("key"), Ok(true));
    assert_eq!(m.contains_key("KEY"), Ok(false));
    assert_eq!(m.contains_entry(&(String::from("key"), (1, "one"))), Ok(true));
    assert_eq!(m.contains_entry(&(String::from("key"), (2, "one"))), Ok(false));
    assert_eq!(m.contains_entry(&(String::from("other"), (1, "one"))), Ok(false));
}

#[test]
fn test_get() {
    let mut m = PairMap::new();
    m.add(1, "a", 'x').unwrap();

    assert_eq!(m.get(&1), Ok(&("a", 'x')));
    assert_eq!(m.get(&2), Err(PairMapError::KeyNotFound));
    assert_eq!(m.get(&2).unwrap_err().kind(), ErrorKind::KeyNotFound);
}

#[test]
fn test_try_get_values_and_defaults() {
    let mut m = PairMap::new();
    m.add("a", String::from("alpha"), 1u64).unwrap();

    assert_eq!(m.try_get_values("a"), Ok(Some((&String::from("alpha"), &1))));
    assert_eq!(m.try_get_values("b"), Ok(None));

    assert_eq!(
        m.get_values_or_default("a"),
        Ok((true, String::from("alpha"), 1))
    );
    assert_eq!(m.get_values_or_default("b"), Ok((false, String::new(), 0)));
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn test_index_nonexistent() {
    let mut m = PairMap::new();
    m.add(0, 1, 2).unwrap();
    m[&4];
}

#[test]
fn test_is_read_only() {
    let m: PairMap<i32, i32, i32> = PairMap::new();
    assert!(!m.is_read_only());
}

#[cfg(feature = "unicase")]
#[test]
fn test_case_insensitive_keys() {
    use crate::comparer::CaseInsensitive;

    let mut m = PairMap::with_comparer(CaseInsensitive::new());
    m.add(String::from("Key"), 1, 2).unwrap();

    assert_eq!(m.contains_key("KEY"), Ok(true));
    assert_eq!(m.contains_key(&String::from("key")), Ok(true));

    let error = m.add(String::from("KEY"), 3, 4).unwrap_err();
    assert_eq!(error.error, ErrorKind::DuplicateKey);
    assert_eq!(m.len(), 1);
    assert_eq!(m["kEy"], (1, 2));

    // The stored key keeps its original spelling
    assert_eq!(m.keys().next().map(String::as_str), Some("Key"));

    assert_eq!(m.try_update("KEY", 5, 6), Ok(true));
    assert_eq!(m.remove("key"), Ok(Some((5, 6))));
    assert!(m.is_empty());
}

#[test]
fn test_fn_comparer() {
    let comparer = FnComparer::new(
        |a: &i32, b: &i32| a.abs() == b.abs(),
        |k: &i32| k.unsigned_abs() as u64,
    );
    let mut m = PairMap::with_comparer(comparer);
    m.add(-5, "minus five", ()).unwrap();

    assert_eq!(
        m.add(5, "five", ()).unwrap_err().error,
        ErrorKind::DuplicateKey
    );
    assert_eq!(m[&5], ("minus five", ()));
    assert_eq!(m.add_or_update(5, "five", ()).unwrap(), Some(("minus five", ())));
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), [-5]);
}

#[test]
fn test_custom_hasher() {
    let mut m = PairMap::with_comparer(DefaultComparer::with_hasher(
        fnv::FnvBuildHasher::default(),
    ));
    for i in 0..1000u32 {
        m.add(i, i as u64, i % 7 == 0).unwrap();
    }
    assert_eq!(m.len(), 1000);
    for i in 0..1000u32 {
        assert_eq!(m[&i], (i as u64, i % 7 == 0));
    }
}

#[test]
fn test_optional_keys() {
    let mut m: PairMap<Option<&str>, i32, i32, OptionalKeys<DefaultComparer>> =
        PairMap::with_comparer(OptionalKeys::default());

    m.add(Some("a"), 1, 2).unwrap();

    let error = m.add(None, 3, 4).unwrap_err();
    assert_eq!(error.error, ErrorKind::InvalidArgument);
    assert_eq!(error.into_entry(), (None, (3, 4)));

    assert_eq!(
        m.add_entry((None, (3, 4))).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        m.add_or_update(None, 3, 4).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        m.set(None, 3, 4).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        m.contains_key(&None),
        Err(PairMapError::InvalidArgument { argument: "key" })
    );
    assert_eq!(
        m.get(&None),
        Err(PairMapError::InvalidArgument { argument: "key" })
    );

    let absent = PairMapError::InvalidArgument { argument: "key" };

    // Operations that never fail for a missing key still reject an absent one
    let mut cursor = m.cursor();
    assert_eq!(m.try_get(&None).unwrap_err(), absent);
    assert_eq!(m.try_get_values(&None).unwrap_err(), absent);
    assert_eq!(m.get_values_or_default(&None).unwrap_err(), absent);
    assert_eq!(m.contains_entry(&(None, (1, 2))).unwrap_err(), absent);
    assert_eq!(m.try_update(&None, 5, 6).unwrap_err(), absent);
    assert_eq!(m.remove(&None).unwrap_err(), absent);
    assert_eq!(m.remove_entry(&(None, (1, 2))).unwrap_err(), absent);
    assert_eq!(PairLookup::try_get(&m, &None).unwrap_err(), absent);
    assert_eq!(PairCollection::contains_entry(&m, &(None, (1, 2))).unwrap_err(), absent);
    assert_eq!(PairCollection::remove_entry(&mut m, &(None, (1, 2))).unwrap_err(), absent);

    // None of them touched the map
    assert!(cursor.advance(&m).unwrap().is_some());
    assert_eq!(m.len(), 1);
    assert_eq!(m.contains_key(&Some("a")), Ok(true));
    assert_eq!(m[&Some("a")], (1, 2));
}

#[test]
#[should_panic(expected = "absent key used as index")]
fn test_index_absent_key() {
    let mut m: PairMap<Option<i32>, i32, i32, OptionalKeys<DefaultComparer>> =
        PairMap::with_comparer(OptionalKeys::default());
    m.add(Some(1), 2, 3).unwrap();
    m[&None];
}

#[test]
fn test_clear() {
    let mut m = PairMap::new();
    for i in 0..10 {
        m.add(i, i, i).unwrap();
    }
    let capacity = m.capacity();

    m.clear();
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
    assert_eq!(m.iter().next(), None);
    assert_eq!(m.capacity(), capacity);

    let mut cursor = m.cursor();
    assert_eq!(cursor.advance(&m), Ok(None));

    // The map is still usable afterwards
    m.add(3, 4, 5).unwrap();
    assert_eq!(m[&3], (4, 5));
}

#[test]
fn test_cursor_visits_every_entry_once() {
    let m = pairmap! {
        1 => ("a", 1.0),
        2 => ("b", 2.0),
        3 => ("c", 3.0),
    };

    let mut cursor = m.cursor();
    let mut keys = Vec::new();
    while let Some((key, _)) = cursor.advance(&m).unwrap() {
        keys.push(*key);
    }
    keys.sort_unstable();
    assert_eq!(keys, [1, 2, 3]);
    assert_eq!(cursor.position(), 3);

    // An exhausted cursor keeps returning `None`
    assert_eq!(cursor.advance(&m), Ok(None));

    // And can be restarted
    cursor.reset(&m);
    assert_eq!(cursor.position(), 0);
    assert!(cursor.advance(&m).unwrap().is_some());
}

#[test]
fn test_cursor_detects_modification() {
    fn assert_invalidated(mutate: impl FnOnce(&mut PairMap<i32, &'static str, f64>)) {
        let mut m = pairmap! {
            1 => ("a", 1.0),
            2 => ("b", 2.0),
        };
        let mut cursor = m.cursor();
        assert!(cursor.advance(&m).unwrap().is_some());

        mutate(&mut m);

        assert_eq!(
            cursor.advance(&m),
            Err(PairMapError::ConcurrentModification)
        );
        // The error is not a one-off
        assert_eq!(
            cursor.advance(&m).unwrap_err().kind(),
            ErrorKind::ConcurrentModification
        );

        cursor.reset(&m);
        assert!(cursor.advance(&m).is_ok());
    }

    assert_invalidated(|m| m.add(3, "c", 3.0).unwrap());
    assert_invalidated(|m| m.add_entry((3, ("c", 3.0))).unwrap());
    assert_invalidated(|m| {
        m.remove(&1).unwrap();
    });
    assert_invalidated(|m| assert_eq!(m.remove_entry(&(1, ("a", 1.0))), Ok(true)));
    assert_invalidated(|m| m.set(1, "z", 0.0).unwrap());
    assert_invalidated(|m| m.set(9, "z", 0.0).unwrap());
    assert_invalidated(|m| assert_eq!(m.try_update(&2, "y", 0.5), Ok(true)));
    assert_invalidated(|m| m.clear());
    assert_invalidated(|m| m.retain(|key, _| *key == 1));
    assert_invalidated(|m| m.extend([(7, ("g", 7.0))]));
}

#[test]
fn test_cursor_survives_failed_writes() {
    let mut m = pairmap! { 1 => ("a", 1.0) };
    let mut cursor = m.cursor();

    assert_eq!(m.try_update(&7, "x", 0.0), Ok(false));
    assert_eq!(m.remove(&7), Ok(None));
    assert!(m.add(1, "dup", 0.0).is_err());
    assert_eq!(m.remove_entry(&(1, ("a", 2.0))), Ok(false));
    m.retain(|_, _| true);
    assert_eq!(m.contains_key(&1), Ok(true));

    assert_eq!(cursor.advance(&m).unwrap(), Some((&1, &("a", 1.0))));

    let mut empty: PairMap<i32, i32, i32> = PairMap::new();
    let mut cursor = empty.cursor();
    empty.clear();
    assert_eq!(cursor.advance(&empty), Ok(None));
}

#[test]
fn test_cursor_is_bound_to_its_map() {
    let mut a: PairMap<i32, i32, i32> = PairMap::new();
    let b: PairMap<i32, i32, i32> = PairMap::new();

    // Two untouched maps never share a stamp
    let mut cursor = a.cursor();
    assert_eq!(
        cursor.advance(&b),
        Err(PairMapError::ConcurrentModification)
    );
    assert_eq!(cursor.advance(&a), Ok(None));

    // Replacing the map with a clone counts as a write
    a = b.clone();
    assert_eq!(
        cursor.advance(&a),
        Err(PairMapError::ConcurrentModification)
    );

    let mut cursor = a.cursor();
    a.clone_from(&b);
    assert_eq!(
        cursor.advance(&a),
        Err(PairMapError::ConcurrentModification)
    );
}

#[test]
fn test_copy_to() {
    let m = pairmap! {
        1 => ('a', true),
        2 => ('b', false),
    };
    let blank = (0, (' ', false));

    let mut destination = vec![blank; 4];
    m.copy_to(&mut destination, 1).unwrap();
    assert_eq!(destination[0], blank);
    assert_eq!(destination[3], blank);
    let mut copied = destination[1..3].to_vec();
    copied.sort_unstable();
    assert_eq!(copied, [(1, ('a', true)), (2, ('b', false))]);

    // Fits exactly
    m.copy_to(&mut destination, 2).unwrap();

    let before = destination.clone();
    assert_eq!(
        m.copy_to(&mut destination, 3),
        Err(PairMapError::InsufficientSpace {
            required: 2,
            available: 1
        })
    );
    assert_eq!(
        m.copy_to(&mut destination, 5),
        Err(PairMapError::InvalidArgument {
            argument: "start_index"
        })
    );
    // Nothing is written on failure
    assert_eq!(destination, before);

    let empty: PairMap<i32, char, bool> = PairMap::new();
    empty.copy_to(&mut [], 0).unwrap();
}

#[test]
fn test_iterate() {
    let mut m = PairMap::with_capacity(4);
    for i in 0..32 {
        m.add(i, i * 2, i * 3).unwrap();
    }
    assert_eq!(m.len(), 32);

    let mut observed: u32 = 0;

    for (k, (v1, v2)) in &m {
        assert_eq!(*v1, *k * 2);
        assert_eq!(*v2, *k * 3);
        observed |= 1 << *k;
    }
    assert_eq!(observed, 0xFFFF_FFFF);
}

#[test]
fn test_iter_len_and_fused() {
    let m = pairmap! {
        1 => (10, 100),
        2 => (20, 200),
    };

    let mut iter = m.iter();
    assert_eq!(iter.len(), 2);
    iter.next();
    assert_eq!(iter.len(), 1);
    iter.next();
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);

    assert_eq!(m.keys().len(), 2);
    assert_eq!(m.values().len(), 2);
}

#[test]
fn test_into_iterators() {
    let m = pairmap! {
        1 => (10, 100),
        2 => (20, 200),
    };

    let mut keys: Vec<_> = m.clone().into_keys().collect();
    keys.sort_unstable();
    assert_eq!(keys, [1, 2]);

    let mut values: Vec<_> = m.clone().into_values().collect();
    values.sort_unstable();
    assert_eq!(values, [(10, 100), (20, 200)]);

    let mut iter = m.into_iter();
    assert_eq!(iter.len(), 2);
    iter.next();
    assert_eq!(iter.len(), 1);
    iter.next();
    assert_eq!(iter.next(), None);
}

#[test]
fn test_debug() {
    let m = pairmap! { 1 => ("a", 'x') };
    assert_eq!(format!("{:?}", m), r#"{1: ("a", 'x')}"#);
    assert_eq!(format!("{:?}", m.iter()), r#"[(1, ("a", 'x'))]"#);
    assert_eq!(format!("{:?}", m.keys()), "[1]");
    assert_eq!(format!("{:?}", m.values()), r#"[("a", 'x')]"#);

    let empty: PairMap<i32, i32, i32> = PairMap::new();
    assert_eq!(format!("{:?}", empty), "{}");
}

#[test]
fn test_eq_and_clone() {
    let mut a = pairmap! {
        1 => ("a", 'x'),
        2 => ("b", 'y'),
    };

    let b = a.clone();
    assert_eq!(a, b);

    a.set(2, "b", 'z').unwrap();
    assert_ne!(a, b);

    let mut c = PairMap::new();
    c.clone_from(&a);
    assert_eq!(c, a);

    // Equality does not depend on the insertion order
    let d = PairMap::from([(2, ("b", 'z')), (1, ("a", 'x'))]);
    assert_eq!(d, a);

    let e = pairmap! { 1 => ("a", 'x') };
    assert_ne!(e, a);
}

#[test]
fn test_from_iter_last_pair_wins() {
    let m: PairMap<&str, i32, i32> = vec![("a", (1, 1)), ("b", (2, 2)), ("a", (3, 3))]
        .into_iter()
        .collect();

    assert_eq!(m.len(), 2);
    assert_eq!(m["a"], (3, 3));
    assert_eq!(m["b"], (2, 2));
}

#[test]
fn test_extend() {
    let mut m = pairmap! { "a" => (1, 1) };
    m.extend(vec![("a", (9, 9)), ("c", (3, 3))]);

    assert_eq!(m.len(), 2);
    assert_eq!(m["a"], (9, 9));
    assert_eq!(m["c"], (3, 3));
}

#[test]
fn test_retain() {
    let mut m: PairMap<i32, i32, bool> = (0..100).map(|x| (x, (x * 10, x % 2 == 0))).collect();

    m.retain(|_, &(_, even)| even);
    assert_eq!(m.len(), 50);
    for i in 0..100 {
        assert_eq!(m.contains_key(&i), Ok(i % 2 == 0));
    }
    assert_eq!(m[&40], (400, true));

    m.retain(|&k, _| k < 10);
    let mut keys: Vec<_> = m.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, [0, 2, 4, 6, 8]);
}

#[test]
fn test_retain_panic_keeps_map_usable() {
    let mut m: PairMap<i32, i32, i32> = (0..16).map(|x| (x, (x, x * 2))).collect();
    let mut cursor = m.cursor();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        m.retain(|&k, _| {
            if k == 8 {
                panic!("predicate failed");
            }
            k % 3 != 0
        });
    }));
    assert!(result.is_err());

    // Entries not yet visited survive, and every survivor is reachable
    for k in 8..16 {
        assert_eq!(m.try_get(&k), Ok(Some(&(k, k * 2))));
    }
    let mut found = 0;
    for k in 0..16 {
        if let Some(pair) = m.try_get(&k).unwrap() {
            assert_eq!(*pair, (k, k * 2));
            found += 1;
        }
    }
    assert_eq!(found, m.len());
    for (key, pair) in m.iter() {
        assert_eq!(m.get(key), Ok(pair));
    }
    assert_eq!(
        cursor.advance(&m),
        Err(PairMapError::ConcurrentModification)
    );

    // And it keeps working afterwards
    m.add(100, 1, 2).unwrap();
    assert_eq!(m.remove(&100), Ok(Some((1, 2))));
}

#[test]
fn test_reserve() {
    let mut m: PairMap<i32, i32, i32> = PairMap::new();
    m.reserve(100);
    assert!(m.capacity() >= 100);

    m.add(1, 2, 3).unwrap();
    m.reserve(10);
    assert_eq!(m[&1], (2, 3));
}

#[test]
fn test_capability_traits() {
    fn lookup_summary<L>(lookup: &L) -> (usize, Vec<u32>)
    where
        L: PairLookup<u32, &'static str, bool>,
    {
        let mut keys: Vec<u32> = lookup.keys().copied().collect();
        keys.sort_unstable();
        (lookup.len(), keys)
    }

    fn fill<C>(collection: &mut C)
    where
        C: PairCollection<u32, &'static str, bool>,
    {
        assert!(!collection.is_read_only());
        collection.add_entry((1, ("one", true))).unwrap();
        collection.add_entry((2, ("two", false))).unwrap();
        assert!(collection.add_entry((1, ("uno", true))).is_err());
        assert_eq!(collection.contains_entry(&(1, ("one", true))), Ok(true));
        assert_eq!(collection.remove_entry(&(2, ("two", true))), Ok(false));
        assert_eq!(collection.len(), 2);
    }

    let mut m = PairMap::new();
    fill(&mut m);
    assert_eq!(lookup_summary(&m), (2, vec![1, 2]));

    assert_eq!(PairLookup::get(&m, &3), Err(PairMapError::KeyNotFound));
    assert_eq!(PairLookup::try_get(&m, &2), Ok(Some(&("two", false))));
    assert_eq!(PairLookup::contains_key(&m, &1), Ok(true));
    assert_eq!(PairLookup::values(&m).count(), 2);

    let mut destination = vec![(0, ("", false)); 2];
    PairCollection::copy_to(&m, &mut destination, 0).unwrap();
    destination.sort_unstable();
    assert_eq!(destination, [(1, ("one", true)), (2, ("two", false))]);

    PairCollection::clear(&mut m);
    assert!(PairLookup::is_empty(&m));
}

#[test]
fn test_random_operations_match_std_map() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let mut m = PairMap::new();
    let mut model = HashMap::new();

    for _ in 0..10_000 {
        let key: u8 = rng.gen_range(0..64);
        match rng.gen_range(0..4) {
            0 => {
                let pair = (key as u32 * 2, key % 3 == 0);
                let added = m.add(key, pair.0, pair.1).is_ok();
                assert_eq!(added, !model.contains_key(&key));
                if added {
                    model.insert(key, pair);
                }
            }
            1 => {
                assert_eq!(m.remove(&key), Ok(model.remove(&key)));
            }
            2 => {
                let value = rng.gen::<u32>();
                assert_eq!(
                    m.add_or_update(key, value, true).unwrap(),
                    model.insert(key, (value, true))
                );
            }
            _ => {
                let value = rng.gen::<u32>();
                let updated = m.try_update(&key, value, false).unwrap();
                assert_eq!(updated, model.contains_key(&key));
                if updated {
                    model.insert(key, (value, false));
                }
            }
        }
        assert_eq!(m.len(), model.len());
    }

    for (key, pair) in &model {
        assert_eq!(m.get(key), Ok(pair));
    }
    for (key, pair) in &m {
        assert_eq!(model.get(key), Some(pair));
    }
}

thread_local! { static DROP_VECTOR: RefCell<Vec<i32>> = RefCell::new(Vec::new()) }

#[derive(Hash, PartialEq, Eq, Debug)]
struct Droppable {
    k: usize,
}

impl Droppable {
    fn new(k: usize) -> Droppable {
        DROP_VECTOR.with(|slot| {
            slot.borrow_mut()[k] += 1;
        });

        Droppable { k }
    }
}

impl Drop for Droppable {
    fn drop(&mut self) {
        DROP_VECTOR.with(|slot| {
            slot.borrow_mut()[self.k] -= 1;
        });
    }
}

impl Clone for Droppable {
    fn clone(&self) -> Droppable {
        Droppable::new(self.k)
    }
}

fn assert_live(range: core::ops::Range<usize>, count: i32) {
    DROP_VECTOR.with(|v| {
        for i in range {
            assert_eq!(v.borrow()[i], count, "live count of {}", i);
        }
    });
}

#[test]
fn test_drops() {
    DROP_VECTOR.with(|slot| {
        *slot.borrow_mut() = vec![0; 200];
    });

    {
        let mut m = PairMap::new();

        assert_live(0..200, 0);

        for i in 0..100 {
            m.add(Droppable::new(i), Droppable::new(i + 100), i).unwrap();
        }

        assert_live(0..200, 1);

        for i in 0..50 {
            let k = Droppable::new(i);
            let v = m.remove(&k).unwrap();

            assert!(v.is_some());

            DROP_VECTOR.with(|v| {
                assert_eq!(v.borrow()[i], 1);
                assert_eq!(v.borrow()[i + 100], 1);
            });
        }

        assert_live(0..50, 0);
        assert_live(50..100, 1);
        assert_live(100..150, 0);
        assert_live(150..200, 1);

        for i in 0..50 {
            m.add(Droppable::new(i), Droppable::new(i + 100), i).unwrap();
        }

        assert_live(0..200, 1);

        // Overwriting drops the old pair and the extra key
        for i in 0..50 {
            m.set(Droppable::new(i), Droppable::new(i + 100), i).unwrap();
        }

        assert_live(0..200, 1);

        // A rejected duplicate hands key and pair back
        let error = m.add(Droppable::new(0), Droppable::new(100), 0).unwrap_err();
        DROP_VECTOR.with(|v| {
            assert_eq!(v.borrow()[0], 2);
            assert_eq!(v.borrow()[100], 2);
        });
        drop(error);

        assert_live(0..200, 1);
    }

    assert_live(0..200, 0);
}

#[test]
fn test_into_iter_drops() {
    DROP_VECTOR.with(|v| {
        *v.borrow_mut() = vec![0; 200];
    });

    let half = {
        let mut m = PairMap::new();
        for i in 0..100 {
            m.add(Droppable::new(i), Droppable::new(i + 100), i).unwrap();
        }

        assert_live(0..200, 1);

        m
    };

    // By the way, ensure that cloning doesn't screw up the dropping.
    drop(half.clone());

    assert_live(0..200, 1);

    let mut iter = half.into_iter();
    for _ in iter.by_ref().take(50) {}

    assert_eq!(iter.len(), 50);
    drop(iter);

    assert_live(0..200, 0);
}
