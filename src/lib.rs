//! An ordered map built on a skip list whose shape is decided by its keys.
//!
//! A skiplist stores its entries in several linked layers: the base layer
//! holds every key in order, and each layer above holds a subset of the one
//! below so that searches can skip ahead before dropping down. Searching,
//! inserting and removing are all `O(log(n))` on average, without any
//! rebalancing.
//!
//! Conceptually, a [`SkipMap`] holding `0, 1, 3, 5, 9` looks like:
//!
//! ```text
//! -inf ------------------------------------------> +inf
//! -inf ----------------> [3] --------------------> +inf
//! -inf --------> [1] --> [3] --> [5] --> [9] ----> +inf
//! -inf --> [0] --> [1] --> [3] --> [5] --> [9] --> +inf
//! ```
//!
//! where each column `[x]` is the "tower" of key `x`, linked both
//! horizontally and vertically, and every layer is bounded by two sentinels.
//! The top layer is always kept empty.
//!
//! Unlike most skiplists, promotion to a higher layer is not random: the key
//! itself decides through [`CoinFlip`], which XOR-folds the key's bytes and
//! reads one bit per promotion. Building a map from the same keys in the same
//! order therefore always produces the same structure.
//!
//! ```
//! use towerlist::{SkipMap, SkipMapError};
//!
//! let mut skipmap = SkipMap::new();
//! for key in [0_u32, 5, 3, 9, 1] {
//!     skipmap.insert(key, key * 100);
//! }
//!
//! assert_eq!(skipmap.all_keys_in_order(), vec![0, 1, 3, 5, 9]);
//! assert_eq!(skipmap.next_key(&0), Ok(&1));
//! assert_eq!(skipmap.previous_key(&9), Ok(&5));
//! assert_eq!(skipmap.height(&3), Ok(3));
//!
//! skipmap.erase(&3)?;
//! assert_eq!(skipmap.find(&3), Err(SkipMapError::NotFound));
//! # Ok::<(), SkipMapError>(())
//! ```
//!
//! With the `tracing` feature enabled, structural changes (new layers, the
//! layer cap being hit, towers being erased) are reported as `trace`-level
//! events.

mod coin_flip;
mod skipmap;
mod skipnode;

pub use coin_flip::{CoinFlip, flip_coin};
pub use skipmap::{
    IntoIter, Iter, IterMut, Keys, SMALL_LAYER_CAP, SMALL_LEN, SkipMap, SkipMapError, Structure,
    Values, ValuesMut, layer_cap,
};
