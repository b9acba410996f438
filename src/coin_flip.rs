//! Towers grow upwards one layer at a time, and each step is decided by a
//! "coin flip". Rather than drawing entropy, the flip is a pure function of
//! the key's bytes and the number of flips already made for it, so the shape
//! of a map depends only on which keys it holds and the order they arrived.
//!
//! The key's fixed-width byte representation is XOR-folded into a single
//! byte, and flip `$i$` reads bit `$i \bmod 8$` of that byte:
//!
//! ```text
//! 5u32  = 00000000 00000000 00000000 00000101
//! fold  = 0x00 ^ 0x00 ^ 0x00 ^ 0x05 = 0b0000_0101
//! flip(0) = true, flip(1) = false, flip(2) = true, ...
//! ```
//!
//! A key whose bytes cancel out (`0u32`, `""`, `"aa"`, ...) folds to zero and
//! never leaves the base layer.

/// Number of bits in the folded hash; attempt indices wrap around it.
const BITS_IN_FOLD: usize = 8;

// ////////////////////////////////////////////////////////////////////////////
// Coin Flip
// ////////////////////////////////////////////////////////////////////////////

/// Key types that can decide their own promotion through the skip list's
/// layers.
///
/// Implementors only supply [`fold`][CoinFlip::fold]; the flip itself is
/// derived from it.
///
/// # Examples
///
/// ```
/// use towerlist::CoinFlip;
///
/// assert_eq!(5_u32.fold(), 0b101);
/// assert!(5_u32.flip(0));
/// assert!(!5_u32.flip(1));
/// assert!("".fold() == 0 && !"".flip(0));
/// ```
pub trait CoinFlip {
    /// XOR of every byte in the key's fixed-width representation.
    #[must_use]
    fn fold(&self) -> u8;

    /// Whether the key should be promoted on its `attempt`-th flip (counting
    /// from zero).
    ///
    /// Identical `(key, attempt)` inputs always give identical outputs.
    #[inline]
    #[must_use]
    fn flip(&self, attempt: usize) -> bool {
        self.fold() & (1 << (attempt % BITS_IN_FOLD)) != 0
    }
}

/// Flip the coin for `key` on its `attempt`-th promotion.
///
/// This is a convenience wrapper around [`CoinFlip::flip`].
#[inline]
#[must_use]
pub fn flip_coin<K: CoinFlip + ?Sized>(key: &K, attempt: usize) -> bool {
    key.flip(attempt)
}

/// XOR-fold a byte sequence.
#[inline]
fn fold_bytes<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u8 {
    bytes.into_iter().fold(0, |hash, byte| hash ^ byte)
}

macro_rules! impl_coin_flip_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl CoinFlip for $t {
                #[inline]
                fn fold(&self) -> u8 {
                    fold_bytes(&self.to_be_bytes())
                }
            }
        )*
    };
}

impl_coin_flip_for_int!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

impl CoinFlip for char {
    #[inline]
    fn fold(&self) -> u8 {
        u32::from(*self).fold()
    }
}

impl CoinFlip for bool {
    #[inline]
    fn fold(&self) -> u8 {
        u8::from(*self)
    }
}

impl CoinFlip for str {
    #[inline]
    fn fold(&self) -> u8 {
        fold_bytes(self.as_bytes())
    }
}

impl CoinFlip for String {
    #[inline]
    fn fold(&self) -> u8 {
        self.as_str().fold()
    }
}

impl CoinFlip for [u8] {
    #[inline]
    fn fold(&self) -> u8 {
        fold_bytes(self)
    }
}

impl CoinFlip for Vec<u8> {
    #[inline]
    fn fold(&self) -> u8 {
        self.as_slice().fold()
    }
}

impl<T: CoinFlip + ?Sized> CoinFlip for &T {
    #[inline]
    fn fold(&self) -> u8 {
        (**self).fold()
    }
}

impl<T: CoinFlip + ?Sized> CoinFlip for Box<T> {
    #[inline]
    fn fold(&self) -> u8 {
        (**self).fold()
    }
}
