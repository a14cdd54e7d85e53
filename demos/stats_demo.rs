use std::hash::BuildHasher;
use std::hash::Hasher;

use clap::Parser;
use clap::ValueEnum;
use siphasher::sip::SipHasher;
use tag_hash::BuildTagHasher;
use tag_hash::HashTable;
use tag_hash::hash_table::Entry;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HashKind {
    /// The crate's default fixed-width hash.
    Tag,
    /// SipHash-1-3 with zero keys.
    Sip,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Number of values to remove and re-insert after the initial fill.
    #[arg(short = 'r', long = "churn", default_value_t = 0)]
    churn: usize,

    #[arg(long = "hasher", value_enum, default_value_t = HashKind::Tag)]
    hasher: HashKind,
}

fn hash_u64(kind: HashKind, value: u64) -> u64 {
    match kind {
        HashKind::Tag => BuildTagHasher.hash_one(value),
        HashKind::Sip => {
            let mut hasher = SipHasher::new();
            hasher.write_u64(value);
            hasher.finish()
        }
    }
}

fn insert(table: &mut HashTable<u64>, kind: HashKind, value: u64) {
    match table.entry(hash_u64(kind, value), |&v| v == value) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
        Entry::Occupied(_) => {
            panic!("Value already exists in table: {}", value);
        }
    }
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);
    println!("Slot mask after construction: {}", table.capacity());
    println!("Filling table with {} u64 values...", args.target_capacity);

    for i in 0..args.target_capacity {
        insert(&mut table, args.hasher, i as u64);
    }
    let mask_after_fill = table.capacity();

    if args.churn > 0 && args.target_capacity > 0 {
        println!("Churning {} values...", args.churn);
        // Live values are always `next - target_capacity..next`.
        let window = args.target_capacity as u64;
        for next in window..window + args.churn as u64 {
            let oldest = next - window;
            table.remove(hash_u64(args.hasher, oldest), |&v| v == oldest);
            insert(&mut table, args.hasher, next);
        }
    }

    println!("Inserted {} values into table", table.len());
    if table.capacity() != mask_after_fill {
        println!(
            "Table was rebuilt: slot mask {} -> {}",
            mask_after_fill,
            table.capacity()
        );
    }

    table.print_probe_histogram();
    table.debug_stats().print();
}
