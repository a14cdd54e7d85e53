use core::hash::BuildHasher;
use core::hash::Hasher;

/// Starting state of the FNV-style fold.
pub const OFFSET_BASIS: u32 = 2_166_136_261;

/// Multiplier applied after every word folded into the state.
pub const PRIME: u32 = 1607;

/// Odd 64-bit constant used by the multiplicative mix for 4 and 8 byte keys.
pub const MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline(always)]
fn finalize(hash: u32) -> u32 {
    hash ^ (hash >> 16)
}

#[inline(always)]
fn step(hash: u32, word: u32) -> u32 {
    (hash ^ word).wrapping_mul(PRIME)
}

/// Folds `bytes` into a 32-bit hash starting from `offset`.
///
/// The input is consumed four bytes at a time as little-endian words,
/// followed by a trailing two-byte word and a trailing byte when present.
///
/// # Examples
///
/// ```rust
/// use tag_hash::hash::OFFSET_BASIS;
/// use tag_hash::hash::fnv_1a;
/// use tag_hash::hash::hash_bytes;
///
/// assert_eq!(fnv_1a(b"hello", OFFSET_BASIS), hash_bytes(b"hello"));
/// ```
#[inline]
pub fn fnv_1a(bytes: &[u8], offset: u32) -> u32 {
    let mut hash = offset;

    let mut words = bytes.chunks_exact(4);
    for word in &mut words {
        hash = step(hash, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
    }

    let mut tail = words.remainder();
    if tail.len() & 2 != 0 {
        hash = step(hash, u16::from_le_bytes([tail[0], tail[1]]) as u32);
        tail = &tail[2..];
    }
    if let Some(&byte) = tail.first() {
        hash = step(hash, byte as u32);
    }

    finalize(hash)
}

/// Hashes an arbitrary byte string.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    fnv_1a(bytes, OFFSET_BASIS)
}

/// Multiplies `value` by [`MIX`] and folds the 128-bit product down to 32
/// bits.
#[inline(always)]
pub fn fold_mul(value: u64) -> u32 {
    let product = (value as u128).wrapping_mul(MIX as u128);
    (((product >> 64) as u64) ^ (product as u64)) as u32
}

#[inline(always)]
fn hash_u8_from(value: u8, offset: u32) -> u32 {
    finalize(step(offset, value as u32))
}

#[inline(always)]
fn hash_u16_from(value: u16, offset: u32) -> u32 {
    finalize(step(offset, value as u32))
}

#[inline(always)]
fn hash_12_from(key: &[u8; 12], offset: u32) -> u32 {
    let w0 = u32::from_le_bytes([key[0], key[1], key[2], key[3]]);
    let w1 = u32::from_le_bytes([key[4], key[5], key[6], key[7]]);
    let w2 = u32::from_le_bytes([key[8], key[9], key[10], key[11]]);
    finalize(step(step(step(offset, w0), w1), w2))
}

#[inline(always)]
fn hash_16_from(key: &[u8; 16], offset: u32) -> u32 {
    let w0 = u32::from_le_bytes([key[0], key[1], key[2], key[3]]);
    let w1 = u32::from_le_bytes([key[4], key[5], key[6], key[7]]);
    let w2 = u32::from_le_bytes([key[8], key[9], key[10], key[11]]);
    let w3 = u32::from_le_bytes([key[12], key[13], key[14], key[15]]);
    finalize(step(step(step(step(offset, w0), w1), w2), w3))
}

/// Hashes a single byte.
#[inline]
pub fn hash_u8(value: u8) -> u32 {
    hash_u8_from(value, OFFSET_BASIS)
}

/// Hashes a 2-byte key.
#[inline]
pub fn hash_u16(value: u16) -> u32 {
    hash_u16_from(value, OFFSET_BASIS)
}

/// Hashes a 4-byte key with the multiplicative mix.
#[inline]
pub fn hash_u32(value: u32) -> u32 {
    fold_mul(value as u64)
}

/// Hashes an 8-byte key with the multiplicative mix.
#[inline]
pub fn hash_u64(value: u64) -> u32 {
    fold_mul(value)
}

/// Hashes a 12-byte key.
#[inline]
pub fn hash_12(key: &[u8; 12]) -> u32 {
    hash_12_from(key, OFFSET_BASIS)
}

/// Hashes a 16-byte key.
#[inline]
pub fn hash_16(key: &[u8; 16]) -> u32 {
    hash_16_from(key, OFFSET_BASIS)
}

/// A [`Hasher`] that routes every write to the fixed-width hash matching its
/// size.
///
/// Successive writes chain: the running hash becomes the offset of the next
/// fold, and is mixed into the input of the next multiplicative step. A key
/// that performs a single write hashes exactly like the matching free
/// function, e.g. a `u64` key hashes to [`hash_u64`].
///
/// `str` keys are not a single write. They go through the default
/// [`Hasher::write_str`], which writes the bytes followed by a `0xff` byte,
/// so a `&str` key does not hash to [`hash_bytes`] of its bytes. Hash the
/// bytes directly when the two must agree.
///
/// # Examples
///
/// ```rust
/// use core::hash::Hasher;
///
/// use tag_hash::hash::TagHasher;
/// use tag_hash::hash::hash_u64;
///
/// let mut hasher = TagHasher::default();
/// hasher.write_u64(42);
/// assert_eq!(hasher.finish(), hash_u64(42) as u64);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TagHasher {
    hash: u32,
}

impl Default for TagHasher {
    #[inline]
    fn default() -> Self {
        Self { hash: OFFSET_BASIS }
    }
}

impl TagHasher {
    #[inline(always)]
    fn chain(&self) -> u64 {
        (self.hash ^ OFFSET_BASIS) as u64
    }
}

impl Hasher for TagHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash as u64
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.hash = fnv_1a(bytes, self.hash);
    }

    #[inline]
    fn write_u8(&mut self, value: u8) {
        self.hash = hash_u8_from(value, self.hash);
    }

    #[inline]
    fn write_u16(&mut self, value: u16) {
        self.hash = hash_u16_from(value, self.hash);
    }

    #[inline]
    fn write_u32(&mut self, value: u32) {
        self.hash = fold_mul(value as u64 ^ self.chain());
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.hash = fold_mul(value ^ self.chain());
    }

    #[inline]
    fn write_u128(&mut self, value: u128) {
        self.hash = hash_16_from(&value.to_le_bytes(), self.hash);
    }

    #[inline]
    fn write_usize(&mut self, value: usize) {
        self.write_u64(value as u64);
    }
}

/// Builds [`TagHasher`]s. Zero-sized and deterministic: two builders always
/// hash a key to the same value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildTagHasher;

impl BuildHasher for BuildTagHasher {
    type Hasher = TagHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        TagHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;

    use super::*;

    #[test]
    fn fixed_widths_match_generic_fold() {
        assert_eq!(hash_u8(0xAB), hash_bytes(&[0xAB]));
        assert_eq!(hash_u16(0xBEEF), hash_bytes(&0xBEEFu16.to_le_bytes()));

        let twelve = *b"twelve bytes";
        assert_eq!(hash_12(&twelve), hash_bytes(&twelve));

        let sixteen = *b"sixteen bytes!!!";
        assert_eq!(hash_16(&sixteen), hash_bytes(&sixteen));
    }

    #[test]
    fn tail_handling() {
        // 7 bytes: one word, one half-word, one byte.
        let bytes = b"abcdefg";
        let mut expected = OFFSET_BASIS;
        expected = (expected ^ u32::from_le_bytes(*b"abcd")).wrapping_mul(PRIME);
        expected = (expected ^ u16::from_le_bytes(*b"ef") as u32).wrapping_mul(PRIME);
        expected = (expected ^ b'g' as u32).wrapping_mul(PRIME);
        expected ^= expected >> 16;
        assert_eq!(hash_bytes(bytes), expected);

        assert_eq!(hash_bytes(&[]), OFFSET_BASIS ^ (OFFSET_BASIS >> 16));
    }

    #[test]
    fn fold_mul_uses_high_half() {
        // For 2^63 the low half of the product is 0 or 2^63, so a non-trivial
        // result can only come from folding in the high half.
        let hash = hash_u64(1 << 63);
        assert_eq!(hash, fold_mul(1 << 63));
        assert_ne!(hash, 0);
        assert_eq!(hash_u32(7), hash_u64(7));
    }

    #[test]
    fn small_integers_spread_over_all_bits() {
        let mut seen_high = 0u32;
        let mut seen_low = 0u32;
        for k in 0..64u64 {
            let hash = hash_u64(k);
            seen_high |= hash >> 28;
            seen_low |= hash & 0xF;
        }
        assert_eq!(seen_high, 0xF);
        assert_eq!(seen_low, 0xF);
    }

    #[test]
    fn single_write_matches_free_functions() {
        let builder = BuildTagHasher;
        assert_eq!(builder.hash_one(9u64), hash_u64(9) as u64);
        assert_eq!(builder.hash_one(9u32), hash_u32(9) as u64);
        assert_eq!(builder.hash_one(9u16), hash_u16(9) as u64);
        assert_eq!(builder.hash_one(9u8), hash_u8(9) as u64);

        let mut hasher = builder.build_hasher();
        hasher.write(b"raw bytes");
        assert_eq!(hasher.finish(), hash_bytes(b"raw bytes") as u64);
    }

    #[test]
    fn chained_writes_depend_on_order() {
        let builder = BuildTagHasher;
        assert_ne!(builder.hash_one((1u64, 2u64)), builder.hash_one((2u64, 1u64)));
        assert_ne!(builder.hash_one("ab"), builder.hash_one("ba"));
        assert_eq!(builder.hash_one("same"), builder.hash_one("same"));
    }

    #[test]
    fn str_keys_append_terminator_byte() {
        let builder = BuildTagHasher;

        let mut hasher = builder.build_hasher();
        hasher.write(b"ab");
        hasher.write_u8(0xff);
        assert_eq!(builder.hash_one("ab"), hasher.finish());

        let mut hasher = builder.build_hasher();
        hasher.write(b"ab");
        assert_eq!(hasher.finish(), hash_bytes(b"ab") as u64);
        assert_eq!(builder.hash_one(b"ab".as_slice()), {
            let mut hasher = builder.build_hasher();
            hasher.write_usize(2);
            hasher.write(b"ab");
            hasher.finish()
        });
    }
}
