use core::hash::BuildHasher;
use core::hash::Hasher;
use std::collections::HashMap as StdHashMap;
use std::collections::HashSet as StdHashSet;

use proptest::prelude::*;
use tag_hash::HashMap;
use tag_hash::HashSet;

// Sends every key to one of eight hashes, so most keys share a chain.
#[derive(Clone, Default)]
struct Clustered;

struct ClusteredHasher(u64);

impl Hasher for ClusteredHasher {
    fn finish(&self) -> u64 {
        self.0 % 8
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(b as u64);
        }
    }
}

impl BuildHasher for Clustered {
    type Hasher = ClusteredHasher;

    fn build_hasher(&self) -> Self::Hasher {
        ClusteredHasher(0)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Emplace(u16, u32),
    Remove(u16),
    Get(u16),
    Reserve(u8),
    ShrinkToFit,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u16..200, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0u16..200, any::<u32>()).prop_map(|(k, v)| Op::Emplace(k, v)),
        5 => (0u16..200).prop_map(Op::Remove),
        3 => (0u16..200).prop_map(Op::Get),
        1 => any::<u8>().prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
    ]
}

fn run_map_model<S: BuildHasher + Default>(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut map: HashMap<u16, u32, S> = HashMap::default();
    let mut model: StdHashMap<u16, u32> = StdHashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                prop_assert_eq!(map.insert(k, v), model.insert(k, v));
            }
            Op::Emplace(k, v) => {
                let expected = !model.contains_key(&k);
                model.entry(k).or_insert(v);
                let (stored, inserted) = map.emplace(k, v);
                prop_assert_eq!(inserted, expected);
                prop_assert_eq!(*stored, model[&k]);
            }
            Op::Remove(k) => {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
            }
            Op::Get(k) => {
                prop_assert_eq!(map.get(&k), model.get(&k));
            }
            Op::Reserve(n) => {
                map.reserve(n as usize);
                let slots = map.capacity() + 1;
                prop_assert!(slots >= 2 * (map.len() + n as usize));
            }
            Op::ShrinkToFit => {
                map.shrink_to_fit();
                if map.is_empty() {
                    prop_assert_eq!(map.capacity(), 0);
                } else {
                    let slots = map.capacity() + 1;
                    prop_assert!(slots >= 2 * map.len());
                    prop_assert!(slots / 2 < 2 * map.len());
                }
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
        }

        prop_assert_eq!(map.len(), model.len());
        if map.capacity() != 0 {
            // At least half of the slots stay free.
            prop_assert!(2 * map.len() <= map.capacity() + 1);
        }
    }

    let mut entries: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
    entries.sort_unstable();
    let mut expected: Vec<_> = model.into_iter().collect();
    expected.sort_unstable();
    prop_assert_eq!(entries, expected);
    Ok(())
}

proptest! {
    #[test]
    fn prop_map_matches_std(ops in proptest::collection::vec(op(), 1..400)) {
        run_map_model::<tag_hash::DefaultHashBuilder>(ops)?;
    }

    #[test]
    fn prop_map_matches_std_with_clustered_hashes(ops in proptest::collection::vec(op(), 1..400)) {
        run_map_model::<Clustered>(ops)?;
    }

    #[test]
    fn prop_set_matches_std(
        inserts in proptest::collection::vec(0u32..500, 0..300),
        removes in proptest::collection::vec(0u32..500, 0..300),
    ) {
        let mut set: HashSet<u32> = HashSet::new();
        let mut model: StdHashSet<u32> = StdHashSet::new();

        for (k, r) in inserts.iter().zip(removes.iter().chain(core::iter::repeat(&u32::MAX))) {
            prop_assert_eq!(set.insert(*k), model.insert(*k));
            prop_assert_eq!(set.remove(r), model.remove(r));
        }
        for k in 0..500 {
            prop_assert_eq!(set.contains(&k), model.contains(&k));
        }
        prop_assert_eq!(set.iter().count(), model.len());
    }

    #[test]
    fn prop_retain_keeps_exactly_matching(keys in proptest::collection::vec(any::<u64>(), 0..300), modulus in 1u64..7) {
        let mut set: HashSet<u64> = keys.iter().copied().collect();
        let model: StdHashSet<u64> = keys.iter().copied().filter(|k| k % modulus == 0).collect();

        set.retain(|k| k % modulus == 0);
        prop_assert_eq!(set.len(), model.len());
        for k in &model {
            prop_assert!(set.contains(k));
        }
    }
}
