//! The slot array shared by [`HashMap`](crate::HashMap) and
//! [`HashSet`](crate::HashSet).
//!
//! [`HashTable`] stores values in a single power-of-two array of slots. Each
//! slot carries a 32-bit mark: `0` for a slot that was never used, `1` for a
//! tombstone left behind by an erase, and otherwise the value's 32-bit hash
//! with both low bits set. Lookups probe linearly from `mark & capacity`
//! until they reach the value or a never-used slot.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::TryReserveError;

/// Mark of a slot that has never held a value since the last rebuild.
const EMPTY: u32 = 0;

/// Mark of a slot whose value was erased while later slots were in use.
const TOMBSTONE: u32 = 1;

/// Smallest mark of an active slot.
const ACTIVE: u32 = 2;

/// Bits forced on in every stored mark so it can never be confused with
/// [`EMPTY`] or [`TOMBSTONE`].
const TAG_BITS: u32 = 3;

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// Largest slot count a table may allocate.
        const MAX_SLOTS: usize = 1 << 32;
    } else {
        /// Largest slot count a table may allocate.
        const MAX_SLOTS: usize = 1 << (usize::BITS - 2);
    }
}

#[inline(always)]
fn prefetch<T>(ptr: *const T) {
    cfg_if::cfg_if! {
        if #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))] {
            // SAFETY: a prefetch is only a hint and never dereferences `ptr`.
            unsafe {
                use core::arch::x86_64::*;
                _mm_prefetch(ptr as *const i8, _MM_HINT_T0);
            }
        } else {
            let _ = ptr;
        }
    }
}

/// Derives the stored mark from a full hash.
#[inline(always)]
fn tag(hash: u64) -> u32 {
    hash as u32 | TAG_BITS
}

#[inline(always)]
fn is_active(mark: u32) -> bool {
    mark >= ACTIVE
}

/// Number of slots needed to hold `capacity` values below half load.
#[inline]
fn slots_for(capacity: usize) -> Option<usize> {
    capacity.checked_mul(2)?.checked_next_power_of_two()
}

#[inline]
fn slot_layout<V>(slots: usize) -> Option<Layout> {
    Layout::array::<Slot<V>>(slots).ok()
}

#[derive(Clone, Copy)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    #[inline(never)]
    fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("hash table capacity overflow"),
        }
    }

    #[cold]
    #[inline(never)]
    fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}

#[repr(C)]
struct Slot<V> {
    mark: u32,
    data: MaybeUninit<V>,
}

/// Result of walking a probe sequence for insertion.
enum Probe {
    Found(usize),
    Vacant { index: usize, reuses_tombstone: bool },
}

/// Debug statistics for a [`HashTable`].
///
/// Only available with the `stats` feature (or under `cfg(test)`).
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live values.
    pub populated: usize,
    /// Number of tombstones awaiting a rebuild.
    pub tombstones: usize,
    /// Number of allocated slots.
    pub total_slots: usize,
    /// Fraction of slots that are live or tombstoned.
    pub load_factor: f64,
    /// Longest distance between a value's home slot and the slot holding it.
    pub max_probe_length: usize,
    /// Average distance between a value's home slot and the slot holding it.
    pub mean_probe_length: f64,
    /// Bytes held by the slot array.
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Prints the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {} live + {} tombstones / {} slots ({:.2}% load factor)",
            self.populated,
            self.tombstones,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {} / mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash table using linear probing over tagged slots.
///
/// `HashTable<V>` does not know how to hash or compare its values; every
/// operation takes the value's hash and an equality predicate. The
/// [`HashMap`](crate::HashMap) and [`HashSet`](crate::HashSet) facades supply
/// both from a [`BuildHasher`](core::hash::BuildHasher) and `Eq`.
///
/// The table keeps at least half of its slots free of live values and
/// tombstones. When an insertion would break that, the table is rebuilt:
/// at the same size when fewer than a quarter of the slots hold live values,
/// and at twice the size otherwise. A table that has never been inserted into
/// does not allocate.
///
/// A value's home slot is its mark masked by the slot count. Marks always
/// have their two low bits set, so only slots whose index is 3 mod 4 can be
/// a home slot. Runs start at a quarter of the slots and fill the three slots
/// after each one, which makes probe sequences slightly longer than a fully
/// spread start would.
///
/// # Examples
///
/// ```rust
/// use tag_hash::hash::hash_bytes;
/// use tag_hash::hash_table::HashTable;
///
/// let mut table = HashTable::new();
/// let hash = hash_bytes(b"apple") as u64;
///
/// table.entry(hash, |v: &&str| *v == "apple").or_insert("apple");
/// assert_eq!(table.find(hash, |v| *v == "apple"), Some(&"apple"));
/// assert_eq!(table.remove(hash, |v| *v == "apple"), Some("apple"));
/// assert!(table.is_empty());
/// ```
pub struct HashTable<V> {
    slots: NonNull<Slot<V>>,
    /// Slot count minus one, or zero for the unallocated table.
    capacity: usize,
    size: usize,
    erased: usize,
    _phantom: PhantomData<V>,
}

// SAFETY: the table owns its values; sending or sharing it is sending or
// sharing them.
unsafe impl<V: Send> Send for HashTable<V> {}
// SAFETY: as above.
unsafe impl<V: Sync> Sync for HashTable<V> {}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Marks<'a, V>(&'a HashTable<V>);

        impl<V> Debug for Marks<'_, V> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let table = self.0;
                let mut list = f.debug_list();
                if table.capacity != 0 {
                    for index in 0..=table.capacity {
                        // SAFETY: index is within the allocated slot range.
                        let mark = unsafe { table.slot(index).mark };
                        match mark {
                            EMPTY => list.entry(&format_args!("-")),
                            TOMBSTONE => list.entry(&format_args!("x")),
                            mark => list.entry(&format_args!("{mark:08x}")),
                        };
                    }
                }
                list.finish()
            }
        }

        f.debug_struct("HashTable")
            .field("size", &self.size)
            .field("erased", &self.erased)
            .field("capacity", &self.capacity)
            .field("marks", &Marks(self))
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        if self.size == 0 {
            return Self::new();
        }

        let Ok(mut new_table) = Self::allocate(self.capacity + 1, Fallibility::Infallible) else {
            unreachable!()
        };

        let mut remaining = self.size;
        let mut index = 0;
        while remaining != 0 {
            // SAFETY: `remaining` live slots lie at or after `index`, so it stays
            // in bounds, and an active mark means the slot is initialized.
            let slot = unsafe { self.slot(index) };
            if is_active(slot.mark) {
                let value = unsafe { slot.data.assume_init_ref() }.clone();
                new_table.insert_unique(slot.mark, value);
                remaining -= 1;
            }
            index += 1;
        }

        new_table
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        // SAFETY: the table is not used again after this point.
        unsafe {
            self.drop_elements();
            self.free();
        }
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table. Does not allocate.
    pub const fn new() -> Self {
        Self {
            slots: NonNull::dangling(),
            capacity: 0,
            size: 0,
            erased: 0,
            _phantom: PhantomData,
        }
    }

    /// Creates a table able to hold at least `capacity` values before it is
    /// rebuilt.
    ///
    /// The slot count is the smallest power of two at or above
    /// `2 * capacity`. A capacity of zero does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the slot count exceeds the maximum table size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u32> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 255);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let Ok(table) = Self::with_capacity_impl(capacity, Fallibility::Infallible) else {
            unreachable!()
        };
        table
    }

    /// Fallible variant of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::with_capacity_impl(capacity, Fallibility::Fallible)
    }

    fn with_capacity_impl(
        capacity: usize,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        if capacity == 0 {
            return Ok(Self::new());
        }
        let slots = slots_for(capacity).ok_or_else(|| fallibility.capacity_overflow())?;
        Self::allocate(slots, fallibility)
    }

    fn allocate(slots: usize, fallibility: Fallibility) -> Result<Self, TryReserveError> {
        debug_assert!(slots.is_power_of_two() && slots >= 2);
        if slots > MAX_SLOTS {
            return Err(fallibility.capacity_overflow());
        }
        let Some(layout) = slot_layout::<V>(slots) else {
            return Err(fallibility.capacity_overflow());
        };

        // SAFETY: every slot carries a mark, so the layout is never zero-sized.
        // Zeroed memory marks every slot EMPTY.
        let raw = unsafe { alloc::alloc::alloc_zeroed(layout) };
        let Some(slots_ptr) = NonNull::new(raw.cast::<Slot<V>>()) else {
            return Err(fallibility.alloc_err(layout));
        };

        Ok(Self {
            slots: slots_ptr,
            capacity: slots - 1,
            size: 0,
            erased: 0,
            _phantom: PhantomData,
        })
    }

    /// # Safety
    ///
    /// The table must be allocated and `index <= self.capacity`.
    #[inline(always)]
    unsafe fn slot(&self, index: usize) -> &Slot<V> {
        debug_assert!(index <= self.capacity);
        unsafe { &*self.slots.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// The table must be allocated and `index <= self.capacity`.
    #[inline(always)]
    unsafe fn slot_mut(&mut self, index: usize) -> &mut Slot<V> {
        debug_assert!(index <= self.capacity);
        unsafe { &mut *self.slots.as_ptr().add(index) }
    }

    #[inline(always)]
    fn home(&self, mark: u32) -> usize {
        mark as usize & self.capacity
    }

    #[inline(always)]
    fn next(&self, index: usize) -> usize {
        (index + 1) & self.capacity
    }

    /// Returns the number of values in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the slot mask: one less than the number of allocated slots, or
    /// zero for a table that has not allocated.
    ///
    /// At most half of the slots are ever occupied by live values or
    /// tombstones.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the value matching `hash` and `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash::hash_u64;
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(hash_u64(7) as u64, |v: &(u64, &str)| v.0 == 7).or_insert((7, "seven"));
    ///
    /// assert_eq!(table.find(hash_u64(7) as u64, |v| v.0 == 7), Some(&(7, "seven")));
    /// assert_eq!(table.find(hash_u64(8) as u64, |v| v.0 == 8), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: find_index only returns active slots.
        Some(unsafe { self.slot(index).data.assume_init_ref() })
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`, if
    /// any.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: find_index only returns active slots.
        Some(unsafe { self.slot_mut(index).data.assume_init_mut() })
    }

    #[inline]
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.size == 0 {
            return None;
        }

        let mark = tag(hash);
        let mut index = self.home(mark);
        prefetch(self.slots.as_ptr().wrapping_add(index));

        // Terminates: a rebuild always leaves at least one EMPTY slot.
        loop {
            // SAFETY: size > 0 means the table is allocated, and index is
            // masked by capacity.
            let slot = unsafe { self.slot(index) };
            if slot.mark == mark {
                // SAFETY: a matching mark is an active mark.
                if eq(unsafe { slot.data.assume_init_ref() }) {
                    return Some(index);
                }
            } else if slot.mark == EMPTY {
                return None;
            }
            index = self.next(index);
        }
    }

    /// Looks up the entry for `hash` and `eq`, growing the table first if an
    /// insertion would leave it more than half used.
    ///
    /// A vacant entry points at the first tombstone on the probe path when
    /// there is one, so inserting through it reuses that slot.
    ///
    /// # Panics
    ///
    /// Panics if the table would exceed the maximum table size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash::hash_bytes;
    /// use tag_hash::hash_table::Entry;
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// let hash = hash_bytes(b"k") as u64;
    ///
    /// match table.entry(hash, |v: &(&str, i32)| v.0 == "k") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(("k", 1));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    /// table.entry(hash, |v| v.0 == "k").and_modify(|v| v.1 += 1);
    /// assert_eq!(table.find(hash, |v| v.0 == "k"), Some(&("k", 2)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let Ok(entry) = self.entry_impl(hash, eq, Fallibility::Infallible) else {
            unreachable!()
        };
        entry
    }

    /// Fallible variant of [`entry`](Self::entry). On error the table is left
    /// unchanged.
    pub fn try_entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
    ) -> Result<Entry<'_, V>, TryReserveError> {
        self.entry_impl(hash, eq, Fallibility::Fallible)
    }

    #[inline]
    fn entry_impl(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        fallibility: Fallibility,
    ) -> Result<Entry<'_, V>, TryReserveError> {
        self.maybe_grow(fallibility)?;

        let mark = tag(hash);
        Ok(match self.probe(mark, eq) {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant {
                index,
                reuses_tombstone,
            } => Entry::Vacant(VacantEntry {
                table: self,
                index,
                mark,
                reuses_tombstone,
            }),
        })
    }

    /// Walks the probe path of `mark`. Requires an allocated table.
    #[inline]
    fn probe(&self, mark: u32, eq: impl Fn(&V) -> bool) -> Probe {
        let mut index = self.home(mark);
        let mut tombstone = None;
        prefetch(self.slots.as_ptr().wrapping_add(index));

        loop {
            // SAFETY: callers grow the table first, so it is allocated, and
            // index is masked by capacity.
            let slot = unsafe { self.slot(index) };
            match slot.mark {
                EMPTY => {
                    return match tombstone {
                        Some(index) => Probe::Vacant {
                            index,
                            reuses_tombstone: true,
                        },
                        None => Probe::Vacant {
                            index,
                            reuses_tombstone: false,
                        },
                    };
                }
                TOMBSTONE => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                // SAFETY: a matching mark is an active mark.
                m if m == mark && eq(unsafe { slot.data.assume_init_ref() }) => {
                    return Probe::Found(index);
                }
                _ => {}
            }
            index = self.next(index);
        }
    }

    /// Places `value` in the first EMPTY slot of its probe path. Only valid on
    /// tables without tombstones that have room for one more value.
    #[inline]
    fn insert_unique(&mut self, mark: u32, value: V) -> usize {
        debug_assert_eq!(self.erased, 0);
        let index = self.find_empty(mark);
        // SAFETY: find_empty returns an in-bounds slot.
        let slot = unsafe { self.slot_mut(index) };
        slot.data.write(value);
        slot.mark = mark;
        self.size += 1;
        index
    }

    #[inline]
    fn find_empty(&self, mark: u32) -> usize {
        let mut index = self.home(mark);
        // SAFETY: the table is allocated with at least one EMPTY slot, and
        // index is masked by capacity.
        while unsafe { self.slot(index).mark } != EMPTY {
            index = self.next(index);
        }
        index
    }

    /// Removes and returns the value matching `hash` and `eq`, if any.
    ///
    /// The slot becomes EMPTY when the next slot is EMPTY, which keeps probe
    /// paths short, and a tombstone otherwise.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: find_index only returns active slots.
        Some(unsafe { self.take_at(index) })
    }

    /// Moves the value out of `index` and retires the slot.
    ///
    /// # Safety
    ///
    /// `index` must be an active slot.
    unsafe fn take_at(&mut self, index: usize) -> V {
        let next = self.next(index);
        // SAFETY: both indices are in bounds and `index` is active.
        let next_mark = unsafe { self.slot(next).mark };
        let slot = unsafe { self.slot_mut(index) };
        let value = unsafe { slot.data.assume_init_read() };

        if next_mark == EMPTY {
            slot.mark = EMPTY;
        } else {
            slot.mark = TOMBSTONE;
            self.erased += 1;
        }
        self.size -= 1;
        value
    }

    /// Removes every value and releases the slot array.
    pub fn clear(&mut self) {
        drop(core::mem::replace(self, Self::new()));
    }

    /// Ensures `additional` more values can be inserted without a rebuild.
    ///
    /// # Panics
    ///
    /// Panics if the required table exceeds the maximum table size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(10);
    /// assert_eq!(table.capacity(), 31);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let Ok(()) = self.reserve_impl(additional, Fallibility::Infallible) else {
            unreachable!()
        };
    }

    /// Fallible variant of [`reserve`](Self::reserve). On error the table is
    /// left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.reserve_impl(additional, Fallibility::Fallible)
    }

    fn reserve_impl(
        &mut self,
        additional: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let wanted = (self.size + self.erased)
            .checked_add(additional)
            .and_then(|used| used.checked_mul(2))
            .ok_or_else(|| fallibility.capacity_overflow())?;
        // `maybe_grow` lets inserts fill exactly half of the slots.
        if wanted <= self.capacity + 1 {
            return Ok(());
        }

        let slots = slots_for(self.size + additional)
            .ok_or_else(|| fallibility.capacity_overflow())?
            .max(self.capacity + 1);
        self.resize(slots, fallibility)
    }

    /// Shrinks the slot array to the smallest power of two holding the live
    /// values below half load, and clears out tombstones. An empty table
    /// releases its slot array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash::hash_u64;
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::with_capacity(1000);
    /// for k in 0..10u64 {
    ///     table.entry(hash_u64(k) as u64, |v| *v == k).or_insert(k);
    /// }
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 31);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.size == 0 {
            self.clear();
            return;
        }

        let Some(slots) = slots_for(self.size) else {
            return;
        };
        if slots < self.capacity + 1 || self.erased != 0 {
            let Ok(()) = self.resize(slots, Fallibility::Infallible) else {
                unreachable!()
            };
        }
    }

    #[inline]
    fn maybe_grow(&mut self, fallibility: Fallibility) -> Result<(), TryReserveError> {
        let used = self.size + self.erased;
        if self.capacity - used <= used {
            self.grow(fallibility)
        } else {
            Ok(())
        }
    }

    /// Rebuilds a table that has run out of free slots. Tables that are
    /// mostly tombstones are rebuilt at the same size.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, fallibility: Fallibility) -> Result<(), TryReserveError> {
        let slots = self.capacity + 1;
        let target = if self.size < slots / 4 {
            slots
        } else {
            slots
                .checked_mul(2)
                .ok_or_else(|| fallibility.capacity_overflow())?
        };
        self.resize(target, fallibility)
    }

    /// Moves every value into a fresh table of `slots` slots. On error the
    /// table is untouched.
    fn resize(&mut self, slots: usize, fallibility: Fallibility) -> Result<(), TryReserveError> {
        let mut new_table = Self::allocate(slots, fallibility)?;
        debug_assert!(self.size * 2 <= slots);

        if self.size != 0 {
            if core::mem::needs_drop::<V>() {
                self.move_into(&mut new_table);
            } else {
                self.relocate_into(&mut new_table);
            }
        }

        core::mem::swap(self, &mut new_table);
        Ok(())
    }

    /// Rebuild path for values without drop glue: slots are copied bitwise
    /// and the old array is released without visiting it again.
    fn relocate_into(&mut self, new_table: &mut Self) {
        let mut remaining = self.size;
        let mut src = self.slots.as_ptr().cast_const();

        while remaining != 0 {
            // SAFETY: `remaining` active slots lie at or after `src`, so it
            // stays within the slot array. The copy is to an EMPTY slot of a
            // distinct allocation.
            unsafe {
                let mark = (*src).mark;
                if is_active(mark) {
                    let dst = new_table.find_empty(mark);
                    core::ptr::copy_nonoverlapping(src, new_table.slots.as_ptr().add(dst), 1);
                    remaining -= 1;
                }
                src = src.add(1);
            }
        }

        new_table.size = self.size;
        self.size = 0;
        self.erased = 0;
    }

    /// General rebuild path: each value is moved into `new_table` and its old
    /// slot retired, so both tables stay consistent at every step.
    fn move_into(&mut self, new_table: &mut Self) {
        let mut index = 0;

        while self.size != 0 {
            // SAFETY: live slots remain at or after `index` while size > 0.
            let slot = unsafe { self.slot_mut(index) };
            if is_active(slot.mark) {
                let mark = slot.mark;
                // SAFETY: the slot is active; its mark is cleared right after.
                let value = unsafe { slot.data.assume_init_read() };
                slot.mark = TOMBSTONE;
                new_table.insert_unique(mark, value);
                self.erased += 1;
                self.size -= 1;
            }
            index += 1;
        }
    }

    /// # Safety
    ///
    /// Must only be called when the table is about to be released.
    unsafe fn drop_elements(&mut self) {
        if !core::mem::needs_drop::<V>() {
            return;
        }

        let mut remaining = self.size;
        let mut index = 0;
        while remaining != 0 {
            // SAFETY: live slots remain at or after `index` while remaining > 0.
            let slot = unsafe { self.slot_mut(index) };
            if is_active(slot.mark) {
                slot.mark = EMPTY;
                remaining -= 1;
                // SAFETY: the slot was active.
                unsafe { slot.data.assume_init_drop() };
            }
            index += 1;
        }
        self.size = 0;
    }

    /// # Safety
    ///
    /// The slot array must not be used afterwards.
    unsafe fn free(&mut self) {
        if self.capacity == 0 {
            return;
        }
        if let Some(layout) = slot_layout::<V>(self.capacity + 1) {
            // SAFETY: the array was allocated with this layout in `allocate`.
            unsafe { alloc::alloc::dealloc(self.slots.as_ptr().cast(), layout) };
        }
    }

    /// Marks every slot EMPTY. The table must hold no live values.
    fn reset_marks(&mut self) {
        debug_assert_eq!(self.size, 0);
        if self.capacity != 0 {
            // SAFETY: zeroing a slot marks it EMPTY and leaves its data
            // uninitialized, which is valid for `MaybeUninit`.
            unsafe { core::ptr::write_bytes(self.slots.as_ptr(), 0, self.capacity + 1) };
        }
        self.erased = 0;
    }

    /// Returns the first active slot at or after `from`.
    ///
    /// # Safety
    ///
    /// An active slot must exist at or after `from`.
    #[inline]
    unsafe fn next_active(&self, mut from: usize) -> usize {
        // SAFETY: guaranteed by the caller.
        while !is_active(unsafe { self.slot(from).mark }) {
            from += 1;
        }
        from
    }

    /// Returns an iterator over the values in slot order.
    ///
    /// The iterator counts down the values still to visit and stops as soon as
    /// the last one is produced, without scanning the rest of the array.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slot: self.slots.as_ptr(),
            remaining: self.size,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slot: self.slots.as_ptr(),
            remaining: self.size,
            _marker: PhantomData,
        }
    }

    /// Removes every value, yielding each one. The slot array is kept.
    ///
    /// Values not consumed by the iterator are dropped when it is dropped.
    /// If the iterator is leaked the table is left empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash::hash_u64;
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for k in 0..4u64 {
    ///     table.entry(hash_u64(k) as u64, |v| *v == k).or_insert(k);
    /// }
    /// let capacity = table.capacity();
    ///
    /// let mut values: Vec<u64> = table.drain().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3]);
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let table = core::mem::take(self);
        Drain {
            inner: IntoIter { table, index: 0 },
            table: self,
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut cursor = self.cursor_mut();
        while let Some(value) = cursor.get_mut() {
            if f(value) {
                cursor.move_next();
            } else {
                cursor.remove();
            }
        }
    }

    /// Returns an iterator that removes and yields the values for which
    /// `pred` returns `true`. Values not yet visited when the iterator is
    /// dropped stay in the table.
    pub fn extract_if<F>(&mut self, pred: F) -> ExtractIf<'_, V, F>
    where
        F: FnMut(&mut V) -> bool,
    {
        ExtractIf {
            cursor: self.cursor_mut(),
            pred,
        }
    }

    /// Returns a cursor positioned at the first value in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::hash::hash_u64;
    /// use tag_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for k in 0..10u64 {
    ///     table.entry(hash_u64(k) as u64, |v| *v == k).or_insert(k);
    /// }
    ///
    /// let mut cursor = table.cursor_mut();
    /// while let Some(value) = cursor.get() {
    ///     if value % 2 == 0 {
    ///         cursor.remove();
    ///     } else {
    ///         cursor.move_next();
    ///     }
    /// }
    /// assert_eq!(table.len(), 5);
    /// ```
    pub fn cursor_mut(&mut self) -> CursorMut<'_, V> {
        let mut cursor = CursorMut {
            table: self,
            current: None,
            remaining: 0,
        };
        if cursor.table.size != 0 {
            cursor.remaining = cursor.table.size - 1;
            // SAFETY: the table holds at least one value.
            cursor.current = Some(unsafe { cursor.table.next_active(0) });
        }
        cursor
    }

    /// Returns the probe distance of every value, indexed by distance.
    ///
    /// Only available with the `stats` feature (or under `cfg(test)`).
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];

        let mut remaining = self.size;
        let mut index = 0;
        while remaining != 0 {
            // SAFETY: live slots remain at or after `index` while remaining > 0.
            let mark = unsafe { self.slot(index).mark };
            if is_active(mark) {
                let distance = index.wrapping_sub(self.home(mark)) & self.capacity;
                if distance >= hist.len() {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
                remaining -= 1;
            }
            index += 1;
        }

        hist
    }

    /// Returns occupancy and probe-length statistics.
    ///
    /// Only available with the `stats` feature (or under `cfg(test)`).
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = if self.capacity == 0 {
            0
        } else {
            self.capacity + 1
        };

        let hist = self.probe_histogram();
        let total_distance: usize = hist
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.size,
            tombstones: self.erased,
            total_slots,
            load_factor: if total_slots == 0 {
                0.0
            } else {
                (self.size + self.erased) as f64 / total_slots as f64
            },
            max_probe_length: hist.iter().rposition(|&count| count != 0).unwrap_or(0),
            mean_probe_length: if self.size == 0 {
                0.0
            } else {
                total_distance as f64 / self.size as f64
            },
            total_bytes: total_slots * core::mem::size_of::<Slot<V>>(),
        }
    }

    /// Prints the probe histogram as a bar chart.
    ///
    /// Only available with the `stats` and `std` features (or under
    /// `cfg(test)`).
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.size);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if units % 8 > 0 {
                bar.push(partial[units % 8 - 1]);
            }
            bar
        };

        for (distance, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

impl<V> IntoIterator for HashTable<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type Item = &'a mut V;
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value. `default` is only called for vacant
    /// entries.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
    mark: u32,
    reuses_tombstone: bool,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` into the slot this entry points at.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        if self.reuses_tombstone {
            table.erased -= 1;
        }
        table.size += 1;

        // SAFETY: the probe that produced this entry returned an in-bounds
        // EMPTY or TOMBSTONE slot, and the table has not changed since.
        let slot = unsafe { table.slot_mut(self.index) };
        slot.mark = self.mark;
        slot.data.write(value)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns a reference to the value.
    pub fn get(&self) -> &V {
        // SAFETY: the entry points at an active slot.
        unsafe { self.table.slot(self.index).data.assume_init_ref() }
    }

    /// Returns a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: the entry points at an active slot.
        unsafe { self.table.slot_mut(self.index).data.assume_init_mut() }
    }

    /// Converts the entry into a mutable reference tied to the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        // SAFETY: the entry points at an active slot.
        unsafe { table.slot_mut(self.index).data.assume_init_mut() }
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        // SAFETY: the entry points at an active slot.
        unsafe { self.table.take_at(self.index) }
    }
}

/// An iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    slot: *const Slot<V>,
    remaining: usize,
    _marker: PhantomData<&'a V>,
}

// SAFETY: the iterator only hands out shared references.
unsafe impl<V: Sync> Send for Iter<'_, V> {}
// SAFETY: as above.
unsafe impl<V: Sync> Sync for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // SAFETY: `remaining` active slots lie at or after `slot`, so every
        // read stays within the slot array.
        unsafe {
            while !is_active((*self.slot).mark) {
                self.slot = self.slot.add(1);
            }
            let value = (*self.slot).data.assume_init_ref();
            self.remaining -= 1;
            self.slot = self.slot.add(1);
            Some(value)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

impl<V: Debug> Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, V> {
    slot: *mut Slot<V>,
    remaining: usize,
    _marker: PhantomData<&'a mut V>,
}

// SAFETY: the iterator hands out unique references to distinct values.
unsafe impl<V: Send> Send for IterMut<'_, V> {}
// SAFETY: as above.
unsafe impl<V: Sync> Sync for IterMut<'_, V> {}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // SAFETY: as for `Iter`, and each slot is yielded at most once.
        unsafe {
            while !is_active((*self.slot).mark) {
                self.slot = self.slot.add(1);
            }
            let value = (*self.slot).data.assume_init_mut();
            self.remaining -= 1;
            self.slot = self.slot.add(1);
            Some(value)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::into_iter`].
pub struct IntoIter<V> {
    table: HashTable<V>,
    index: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.table.size == 0 {
            return None;
        }

        // SAFETY: the table still holds a value at or after `index`.
        let index = unsafe { self.table.next_active(self.index) };
        self.index = index + 1;

        // SAFETY: `index` is active. Clearing its mark hands ownership of
        // the value to the caller.
        let slot = unsafe { self.table.slot_mut(index) };
        let value = unsafe { slot.data.assume_init_read() };
        slot.mark = EMPTY;
        self.table.size -= 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.size, Some(self.table.size))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::drain`].
pub struct Drain<'a, V> {
    inner: IntoIter<V>,
    table: &'a mut HashTable<V>,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut self.inner {}

        let mut table = core::mem::take(&mut self.inner.table);
        table.reset_marks();
        *self.table = table;
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
impl<V> FusedIterator for Drain<'_, V> {}

/// A cursor over the values of a [`HashTable`] that can remove the value it
/// points at.
///
/// Created by [`HashTable::cursor_mut`]. The cursor visits values in slot
/// order; [`remove`](Self::remove) advances it to the next value.
pub struct CursorMut<'a, V> {
    table: &'a mut HashTable<V>,
    current: Option<usize>,
    /// Live values after `current`.
    remaining: usize,
}

impl<V> CursorMut<'_, V> {
    /// Returns the value under the cursor, or `None` past the last value.
    pub fn get(&self) -> Option<&V> {
        let index = self.current?;
        // SAFETY: `current` is always an active slot.
        Some(unsafe { self.table.slot(index).data.assume_init_ref() })
    }

    /// Returns the value under the cursor mutably.
    pub fn get_mut(&mut self) -> Option<&mut V> {
        let index = self.current?;
        // SAFETY: `current` is always an active slot.
        Some(unsafe { self.table.slot_mut(index).data.assume_init_mut() })
    }

    /// Returns `true` once the cursor has moved past the last value.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the next value in slot order.
    pub fn move_next(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        if self.remaining == 0 {
            self.current = None;
        } else {
            self.remaining -= 1;
            // SAFETY: `remaining` was nonzero, so an active slot follows.
            self.current = Some(unsafe { self.table.next_active(index + 1) });
        }
    }

    /// Removes the value under the cursor and moves to the next one.
    pub fn remove(&mut self) -> Option<V> {
        let index = self.current?;
        // SAFETY: `current` is always an active slot. Retiring it leaves every
        // later slot untouched.
        let value = unsafe { self.table.take_at(index) };
        self.move_next();
        Some(value)
    }
}

/// An iterator that removes the values matching a predicate.
///
/// Created by [`HashTable::extract_if`].
pub struct ExtractIf<'a, V, F> {
    cursor: CursorMut<'a, V>,
    pred: F,
}

impl<V, F> Iterator for ExtractIf<'_, V, F>
where
    F: FnMut(&mut V) -> bool,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(value) = self.cursor.get_mut() {
            if (self.pred)(value) {
                return self.cursor.remove();
            }
            self.cursor.move_next();
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = if self.cursor.is_end() {
            0
        } else {
            self.cursor.remaining + 1
        };
        (0, Some(upper))
    }
}

impl<V, F> FusedIterator for ExtractIf<'_, V, F> where F: FnMut(&mut V) -> bool {}
