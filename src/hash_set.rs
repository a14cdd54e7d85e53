use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::Chain;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::TryReserveError;
use crate::hash_table;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash set stored in a [`HashTable`].
///
/// `HashSet<T, S>` hashes values with the [`BuildHasher`] `S` and compares
/// them with their `Eq` implementation. Inserting a value that is already
/// present leaves the stored value untouched; use [`replace`](Self::replace)
/// to swap it out.
///
/// # Performance Characteristics
///
/// - **Memory**: 4 bytes per slot plus the size of `T`, with the slot count
///   kept at least twice the number of values.
///
/// # Examples
///
/// ```rust
/// use tag_hash::HashSet;
///
/// let mut set: HashSet<u32> = (1..=1000).collect();
/// for k in (2..=1000).step_by(2) {
///     assert_eq!(set.erase(&k), 1);
/// }
/// assert_eq!(set.len(), 500);
/// assert!(set.contains(&999));
/// assert!(!set.contains(&1000));
/// ```
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> HashSet<T, DefaultHashBuilder> {
    /// Creates an empty set using the default hasher. Does not allocate.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty set able to hold `capacity` values without a
    /// rebuild, using the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(10);
    /// assert_eq!(set.capacity(), 31);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<T, S> HashSet<T, S> {
    /// Creates an empty set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use tag_hash::HashSet;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let set: HashSet<i32, _> = HashSet::with_hasher(SimpleHasher);
    /// assert!(set.is_empty());
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty set able to hold `capacity` values without a
    /// rebuild, using the given hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the slot mask of the underlying table: one less than the
    /// number of slots, or zero before the first allocation.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes every value and releases the table.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the table to the smallest size holding the current values,
    /// dropping any tombstones. An empty set releases its table.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Ensures `additional` more values can be inserted without a rebuild.
    ///
    /// # Panics
    ///
    /// Panics if the required table exceeds the maximum table size.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible variant of [`reserve`](Self::reserve). On error the set is
    /// left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }

    /// Exchanges the contents and hashers of two sets.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes every value, yielding each one. The table's allocation is
    /// kept.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (0..10).collect();
    /// set.retain(|&v| v % 3 == 0);
    /// assert_eq!(set.len(), 4);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(v));
    }

    /// Returns an iterator that removes and yields the values for which
    /// `pred` returns `true`. Values not yet visited when the iterator is
    /// dropped stay in the set.
    pub fn extract_if<F>(&mut self, pred: F) -> ExtractIf<'_, T, F>
    where
        F: FnMut(&T) -> bool,
    {
        ExtractIf {
            cursor: self.table.cursor_mut(),
            pred,
        }
    }

    /// Returns a cursor positioned at the first value, able to remove the
    /// value it points at.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            inner: self.table.cursor_mut(),
        }
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Adds a value to the set. Returns `false`, leaving the stored value in
    /// place, if an equal value was already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.emplace(value).1
    }

    /// Adds a value if absent. Returns a reference to the stored value and
    /// whether the insertion happened.
    pub fn emplace(&mut self, value: T) -> (&T, bool) {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(entry) => (&*entry.into_mut(), false),
            TableEntry::Vacant(entry) => (&*entry.insert(value), true),
        }
    }

    /// Fallible variant of [`insert`](Self::insert). On error the set is left
    /// unchanged and `value` is dropped.
    pub fn try_insert(&mut self, value: T) -> Result<bool, TryReserveError> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.try_entry(hash, |v| v == &value)? {
            TableEntry::Occupied(_) => Ok(false),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                Ok(true)
            }
        }
    }

    /// Returns the stored value equal to `value`, inserting it first if
    /// absent.
    pub fn get_or_insert(&mut self, value: T) -> &T {
        self.emplace(value).0
    }

    /// Returns `true` if the set holds `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns the number of values equal to `value`: 1 or 0.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.contains(value))
    }

    /// Returns the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v.borrow() == value)
    }

    /// Removes `value`. Returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes `value`, returning the number of values removed: 1 or 0.
    pub fn erase<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.remove(value))
    }

    /// Adds `value`, replacing and returning an equal stored value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tag_hash::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert_eq!(set.replace(String::from("a")), None);
    /// assert_eq!(set.replace(String::from("a")), Some(String::from("a")));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v.borrow() == value)
    }

    /// Returns `true` if the sets share no values.
    pub fn is_disjoint(&self, other: &HashSet<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every value of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<T, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the values in `self` or `other`, without
    /// duplicates.
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S>) -> Union<'a, T, S> {
        let (large, small) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Union {
            iter: large.iter().chain(small.difference(large)),
        }
    }

    /// Returns an iterator over the values in both sets.
    pub fn intersection<'a>(&'a self, other: &'a HashSet<T, S>) -> Intersection<'a, T, S> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Returns an iterator over the values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the values in exactly one of the sets.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

impl<T, S> Default for HashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a set from `iter`, keeping the first of any equal values.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S> Extend<&'a T> for HashSet<T, S>
where
    T: Hash + Eq + Copy + 'a,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> From<[T; N]> for HashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, S> IntoIterator for HashSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of a [`HashSet`].
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// A draining iterator over the values of a [`HashSet`].
pub struct Drain<'a, T> {
    inner: hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}
impl<T> FusedIterator for Drain<'_, T> {}

/// An owning iterator over the values of a [`HashSet`].
pub struct IntoIter<T> {
    inner: hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Chain<Iter<'a, T>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    iter: Chain<Difference<'a, T, S>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator that removes and yields the values matching a predicate.
///
/// Created by [`HashSet::extract_if`].
pub struct ExtractIf<'a, T, F> {
    cursor: hash_table::CursorMut<'a, T>,
    pred: F,
}

impl<T, F> Iterator for ExtractIf<'_, T, F>
where
    F: FnMut(&T) -> bool,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(value) = self.cursor.get() {
            if (self.pred)(value) {
                return self.cursor.remove();
            }
            self.cursor.move_next();
        }
        None
    }
}

impl<T, F> FusedIterator for ExtractIf<'_, T, F> where F: FnMut(&T) -> bool {}

/// A cursor over the values of a [`HashSet`] that can remove the value it
/// points at.
///
/// # Examples
///
/// ```rust
/// use tag_hash::HashSet;
///
/// let mut set: HashSet<u32> = (0..20).collect();
/// let mut cursor = set.cursor_mut();
/// while let Some(&value) = cursor.get() {
///     if value >= 10 {
///         assert_eq!(cursor.remove(), Some(value));
///     } else {
///         cursor.move_next();
///     }
/// }
/// assert_eq!(set.len(), 10);
/// ```
pub struct CursorMut<'a, T> {
    inner: hash_table::CursorMut<'a, T>,
}

impl<T> CursorMut<'_, T> {
    /// Returns the value under the cursor, or `None` past the last value.
    pub fn get(&self) -> Option<&T> {
        self.inner.get()
    }

    /// Returns `true` once the cursor has moved past the last value.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    /// Moves to the next value.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Removes the value under the cursor and moves to the next one.
    pub fn remove(&mut self) -> Option<T> {
        self.inner.remove()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: HashSet<i32> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 0);

        let set2 = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let set: HashSet<i32> = HashSet::with_capacity(100);
        assert_eq!(set.capacity(), 255);
        assert!(set.is_empty());

        let set2 = HashSet::<i32, _>::with_capacity_and_hasher(0, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 0);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 2);

        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
        assert_eq!(set.count(&1), 1);
        assert_eq!(set.count(&3), 0);
    }

    #[test]
    fn test_emplace_reports_existing_value() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        let (value, inserted) = set.emplace("a".to_string());
        assert!(inserted);
        assert_eq!(value, "a");

        let (value, inserted) = set.emplace("a".to_string());
        assert!(!inserted);
        assert_eq!(value, "a");
        assert_eq!(set.len(), 1);

        assert_eq!(set.get_or_insert("b".to_string()), "b");
        assert_eq!(set.len(), 2);
        assert_eq!(set.try_insert("c".to_string()), Ok(true));
        assert_eq!(set.try_insert("c".to_string()), Ok(false));
    }

    #[test]
    fn test_remove_erase_and_take() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert("hello".to_string());
        set.insert("world".to_string());
        set.insert("!".to_string());

        assert!(set.remove("hello"));
        assert!(!set.remove("hello"));
        assert_eq!(set.erase("world"), 1);
        assert_eq!(set.erase("world"), 0);
        assert_eq!(set.take("!"), Some("!".to_string()));
        assert_eq!(set.take("!"), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_replace_and_get() {
        #[derive(Debug)]
        struct Tagged(u32, &'static str);

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl Eq for Tagged {}
        impl core::hash::Hash for Tagged {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set.insert(Tagged(1, "first")));
        assert!(!set.insert(Tagged(1, "second")));
        assert_eq!(set.get(&Tagged(1, "")).map(|t| t.1), Some("first"));

        let old = set.replace(Tagged(1, "third"));
        assert_eq!(old.map(|t| t.1), Some("first"));
        assert_eq!(set.get(&Tagged(1, "")).map(|t| t.1), Some("third"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear_and_shrink() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            set.insert(i);
        }
        set.retain(|&v| v < 10);
        set.shrink_to_fit();
        assert_eq!(set.capacity(), 31);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 0);
        assert!(set.insert(5));
    }

    #[test]
    fn test_iter_and_into_iter() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }

        assert_eq!(set.iter().len(), 10);
        let mut values: Vec<_> = set.iter().copied().collect();
        values.sort_unstable();
        assert_eq!(values, (0..10).collect::<Vec<_>>());

        let mut owned: Vec<_> = set.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_drain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }
        let capacity = set.capacity();

        let drained: Vec<_> = set.drain().collect();
        assert_eq!(drained.len(), 10);
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_extract_if_and_cursor() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..50 {
            set.insert(i);
        }

        let mut odd: Vec<_> = set.extract_if(|v| v % 2 == 1).collect();
        odd.sort_unstable();
        assert_eq!(odd, (1..50).step_by(2).collect::<Vec<_>>());
        assert_eq!(set.len(), 25);

        let mut cursor = set.cursor_mut();
        let mut removed = 0;
        while let Some(&v) = cursor.get() {
            if v >= 40 {
                cursor.remove();
                removed += 1;
            } else {
                cursor.move_next();
            }
        }
        assert!(cursor.is_end());
        assert_eq!(removed, 5);
        assert_eq!(set.len(), 20);
    }

    #[test]
    fn test_erase_even_keys_scenario() {
        let mut set: HashSet<u32, SipHashBuilder> = (1..=1000).collect();
        assert_eq!(set.len(), 1000);

        for k in (2..=1000).step_by(2) {
            assert_eq!(set.erase(&k), 1);
        }
        assert_eq!(set.len(), 500);
        for k in 1..=1000 {
            assert_eq!(set.contains(&k), k % 2 == 1);
        }
        assert_eq!(set.iter().count(), 500);
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for round in 0..20 {
            for i in 0..100 {
                assert!(set.insert(i + round * 100));
            }
            for i in 0..100 {
                assert!(set.remove(&(i + round * 100)));
            }
            assert!(set.is_empty());
        }
        assert!(set.capacity() <= 511);
    }

    #[test]
    fn test_string_values() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        let words = vec!["apple", "banana", "cherry"];
        for w in &words {
            set.insert(String::from(*w));
        }
        for w in &words {
            assert!(set.contains(*w));
        }
        assert!(!set.contains("durian"));
    }

    #[test]
    fn test_from_array_extend_and_eq() {
        let a = HashSet::from([1, 2, 3, 3, 2]);
        assert_eq!(a.len(), 3);

        let mut b: HashSet<i32> = HashSet::new();
        b.extend(&[3, 2]);
        b.extend([1]);
        assert_eq!(a, b);

        let mut c = a.clone();
        c.insert(4);
        assert_ne!(a, c);

        let mut d = HashSet::new();
        d.swap(&mut c);
        assert!(c.is_empty());
        assert_eq!(d.len(), 4);
        assert_eq!(alloc::format!("{:?}", HashSet::from([7])), "{7}");
    }

    #[test]
    fn test_is_disjoint() {
        let mut a = HashSet::with_hasher(SipHashBuilder::default());
        a.insert(1);
        a.insert(2);
        a.insert(3);

        let mut b = HashSet::with_hasher(a.hasher().clone());
        b.insert(4);
        b.insert(5);
        b.insert(6);

        assert!(a.is_disjoint(&b));
        assert!(b.is_disjoint(&a));

        b.insert(2);
        assert!(!a.is_disjoint(&b));
        assert!(!b.is_disjoint(&a));
    }

    #[test]
    fn test_is_subset_and_superset() {
        let a = HashSet::from([1, 2]);
        let b = HashSet::from([1, 2, 3]);

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(a.is_subset(&a));
        assert!(b.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_union() {
        let a = HashSet::from([1, 2, 3]);
        let b = HashSet::from([3, 4, 5]);

        let mut union: Vec<_> = a.union(&b).copied().collect();
        union.sort_unstable();
        assert_eq!(union, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_intersection() {
        let a = HashSet::from([1, 2, 3]);
        let b = HashSet::from([2, 3, 4, 5]);

        let mut intersection: Vec<_> = a.intersection(&b).copied().collect();
        intersection.sort_unstable();
        assert_eq!(intersection, [2, 3]);
    }

    #[test]
    fn test_difference() {
        let a = HashSet::from([1, 2, 3]);
        let b = HashSet::from([2, 3, 4]);

        let difference: Vec<_> = a.difference(&b).copied().collect();
        assert_eq!(difference, [1]);
    }

    #[test]
    fn test_symmetric_difference() {
        let a = HashSet::from([1, 2, 3]);
        let b = HashSet::from([2, 3, 4]);

        let mut sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
        sym_diff.sort_unstable();
        assert_eq!(sym_diff, [1, 4]);
    }
}
