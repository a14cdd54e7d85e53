use std::cell::Cell;
use std::rc::Rc;

use tag_hash::BuildTagHasher;
use tag_hash::HashMap;
use tag_hash::HashSet;
use tag_hash::HashTable;
use tag_hash::TryReserveError;
use tag_hash::hash::hash_u64;
use tag_hash::hash_table::Entry;

#[test]
fn set_of_thousand_with_even_keys_erased() {
    let mut set = HashSet::new();
    for k in 1..=1000u32 {
        assert!(set.insert(k));
    }
    assert_eq!(set.len(), 1000);

    for k in (2..=1000u32).step_by(2) {
        assert_eq!(set.erase(&k), 1);
    }
    assert_eq!(set.len(), 500);
    assert!(!set.contains(&2));
    assert!(set.contains(&3));
    assert_eq!(set.iter().filter(|&&k| k % 2 == 0).count(), 0);
}

#[test]
fn emplace_keeps_existing_value() {
    let mut map = HashMap::new();
    map.insert("a", 1);

    let (value, inserted) = map.emplace("a", 2);
    assert!(!inserted);
    assert_eq!(*value, 1);
    assert_eq!(map["a"], 1);
}

#[test]
fn collect_keeps_first_value_per_key() {
    let map: HashMap<i32, &str> = [(1, "x"), (1, "y"), (2, "z"), (1, "w"), (2, "q")]
        .into_iter()
        .collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&1], "x");
    assert_eq!(map[&2], "z");

    let from_array = HashMap::from([(1, "x"), (1, "y"), (2, "z"), (1, "w"), (2, "q")]);
    assert_eq!(map, from_array);
}

#[test]
fn taken_container_is_empty_and_reusable() {
    let mut map: HashMap<u64, String> = (0..100).map(|k| (k, k.to_string())).collect();
    let moved = std::mem::take(&mut map);

    assert_eq!(moved.len(), 100);
    assert!(map.is_empty());
    assert_eq!(map.capacity(), 0);

    map.insert(7, "seven".to_string());
    assert_eq!(map.get(&7).map(String::as_str), Some("seven"));
    assert_eq!(moved.get(&7).map(String::as_str), Some("7"));
}

#[test]
fn shrink_to_fit_reaches_minimal_size() {
    let mut set: HashSet<u64> = (0..10_000).collect();
    set.retain(|&k| k < 300);
    set.shrink_to_fit();
    assert_eq!(set.capacity() + 1, (2 * 300usize).next_power_of_two());

    set.clear();
    set.shrink_to_fit();
    assert_eq!(set.capacity(), 0);
}

#[test]
fn growth_preserves_contents_for_both_rebuild_paths() {
    // Plain integers are relocated bitwise; strings go through the general
    // move path because they carry drop glue.
    let mut ints = HashTable::new();
    let mut strings = HashTable::new();
    for k in 0..5000u64 {
        let hash = hash_u64(k) as u64;
        match ints.entry(hash, |&v| v == k) {
            Entry::Vacant(entry) => {
                entry.insert(k);
            }
            Entry::Occupied(_) => unreachable!(),
        }
        let text = k.to_string();
        match strings.entry(hash, |v: &String| *v == text) {
            Entry::Vacant(entry) => {
                entry.insert(text);
            }
            Entry::Occupied(_) => unreachable!(),
        }
    }

    for k in 0..5000u64 {
        let hash = hash_u64(k) as u64;
        assert_eq!(ints.find(hash, |&v| v == k), Some(&k));
        let text = k.to_string();
        assert_eq!(strings.find(hash, |v| *v == text), Some(&text));
    }
    assert_eq!(ints.iter().count(), 5000);
    assert_eq!(strings.iter().count(), 5000);
}

#[derive(Clone)]
struct Counted(Rc<Cell<usize>>);

impl Drop for Counted {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn every_value_is_dropped_once() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut map = HashMap::new();
        for k in 0..1000u32 {
            map.insert(k, Counted(drops.clone()));
        }
        assert_eq!(drops.get(), 0);

        // Overwrites drop the previous value.
        for k in 0..100u32 {
            map.insert(k, Counted(drops.clone()));
        }
        assert_eq!(drops.get(), 100);

        for k in 100..300u32 {
            assert_eq!(map.erase(&k), 1);
        }
        assert_eq!(drops.get(), 300);

        // A rejected emplace drops the argument.
        map.emplace(0, Counted(drops.clone()));
        assert_eq!(drops.get(), 301);

        let drained = map.drain().take(10).count();
        assert_eq!(drained, 10);
        assert!(map.is_empty());
        assert_eq!(drops.get(), 1101);

        for k in 0..50u32 {
            map.insert(k, Counted(drops.clone()));
        }
    }
    assert_eq!(drops.get(), 1151);
}

#[test]
fn clone_copies_live_entries_only() {
    let mut original: HashMap<u32, String> = (0..200).map(|k| (k, k.to_string())).collect();
    for k in 0..150 {
        original.remove(&k);
    }
    let copy = original.clone();
    original.insert(1, "changed".to_string());

    assert_eq!(copy.len(), 50);
    assert!(!copy.contains_key(&1));
    assert_eq!(copy.capacity(), original.capacity());
    for k in 150..200 {
        assert_eq!(copy[&k], k.to_string());
    }
}

#[test]
fn swap_exchanges_contents() {
    let mut a = HashSet::from([1, 2, 3]);
    let mut b = HashSet::with_capacity_and_hasher(100, BuildTagHasher);
    b.insert(9);
    let b_capacity = b.capacity();

    a.swap(&mut b);
    assert_eq!(a.len(), 1);
    assert!(a.contains(&9));
    assert_eq!(a.capacity(), b_capacity);
    assert_eq!(b.len(), 3);
}

#[test]
fn try_reserve_reports_overflow() {
    let mut map: HashMap<u64, u64> = HashMap::new();
    map.insert(1, 1);
    let capacity = map.capacity();

    let err = map.try_reserve(usize::MAX / 2).unwrap_err();
    assert_eq!(err, TryReserveError::CapacityOverflow);
    assert_eq!(
        err.to_string(),
        "hash table capacity exceeds the maximum table size"
    );
    assert_eq!(map.capacity(), capacity);
    assert_eq!(map.get(&1), Some(&1));
}

#[test]
fn heavy_churn_stays_small() {
    let mut set = HashSet::new();
    for round in 0..200u64 {
        for k in 0..20 {
            set.insert(round * 1000 + k);
        }
        for k in 0..20 {
            assert!(set.remove(&(round * 1000 + k)));
        }
    }
    assert!(set.is_empty());
    assert!(set.capacity() <= 127);
}
