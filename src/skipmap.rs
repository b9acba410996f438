//! SkipMap stores key-value pairs, with the keys being unique and always
//! sorted.
//!
//! The map is a stack of doubly-linked layers. Layer 0 holds every key; each
//! layer above holds a subset of the one below it, and a key's nodes across
//! layers form a contiguous "tower". Every layer is bounded by two sentinels,
//! and the topmost layer is always kept empty as a spare:
//!
//! ```text
//! layer 3:  -inf ------------------------------> +inf
//! layer 2:  -inf ---------> [3] ---------------> +inf
//! layer 1:  -inf --> [1] -> [3] -> [5] -> [9] -> +inf
//! layer 0:  -inf -> [0] -> [1] -> [3] -> [5] -> [9] -> +inf
//! ```
//!
//! How tall a tower grows is decided by the key itself through [`CoinFlip`],
//! so the same sequence of inserts always produces the same topology.

use std::{borrow::Borrow, cmp, fmt, iter};

use thiserror::Error;

use crate::coin_flip::CoinFlip;
use crate::skipnode::{Arena, Handle, SkipNode, Slot};

/// Key count up to which the fixed [`SMALL_LAYER_CAP`] applies.
pub const SMALL_LEN: usize = 16;

/// Layer cap used while the map holds at most [`SMALL_LEN`] keys.
pub const SMALL_LAYER_CAP: usize = 13;

/// The layer count at which an insertion stops promoting its key, for a map
/// holding `len` keys (the new key included).
///
/// This is [`SMALL_LAYER_CAP`] for small maps and `$3 \lceil \log_2 n \rceil +
/// 1$` otherwise, keeping tower heights logarithmic in the number of keys.
///
/// # Examples
///
/// ```
/// use towerlist::layer_cap;
///
/// assert_eq!(layer_cap(1), 13);
/// assert_eq!(layer_cap(16), 13);
/// assert_eq!(layer_cap(17), 16);
/// assert_eq!(layer_cap(1024), 31);
/// ```
#[inline]
#[must_use]
pub const fn layer_cap(len: usize) -> usize {
    if len <= SMALL_LEN {
        SMALL_LAYER_CAP
    } else {
        3 * ceil_log2(len) + 1
    }
}

/// `$\lceil \log_2 n \rceil$` for `n >= 2`.
#[inline]
#[expect(
    clippy::as_conversions,
    reason = "Bit counts always fit in usize"
)]
const fn ceil_log2(n: usize) -> usize {
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

// ////////////////////////////////////////////////////////////////////////////
// Errors
// ////////////////////////////////////////////////////////////////////////////

/// Errors returned by [`SkipMap`] queries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipMapError {
    /// The key is not in the map, or the requested neighbour of the key does
    /// not exist.
    #[error("key not found.")]
    NotFound,
}

// ////////////////////////////////////////////////////////////////////////////
// SkipMap
// ////////////////////////////////////////////////////////////////////////////

/// An ordered map backed by a layered skip list whose shape is determined by
/// its keys.
///
/// Lookups, insertions and removals take expected `$O(\log n)$` time. Note
/// that mutable references to keys are not available at all as this could
/// result in a node being left out of the proper ordering.
#[derive(Clone)]
pub struct SkipMap<K, V> {
    /// Every node of every layer, sentinels included.
    nodes: Arena<SkipNode<K, V>>,
    /// Sentinels of layer 0.
    front: Handle,
    back: Handle,
    /// Sentinels of the topmost (spare) layer.
    top_front: Handle,
    top_back: Handle,
    len: usize,
    layers: usize,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K, V> SkipMap<K, V> {
    /// Create a new, empty skipmap with two layers.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<u32, String> = SkipMap::new();
    /// assert!(skipmap.is_empty());
    /// assert_eq!(skipmap.layers(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_arena(Arena::new())
    }

    /// Create a new, empty skipmap with node storage pre-allocated for
    /// roughly `capacity` keys.
    ///
    /// On average a key occupies two nodes, so room is reserved for twice
    /// `capacity` nodes plus the sentinels.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::with_capacity(100);
    /// skipmap.extend((0..100_u32).map(|x| (x, x)));
    /// assert_eq!(skipmap.len(), 100);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_arena(Arena::with_capacity(
            capacity.saturating_mul(2).saturating_add(4),
        ))
    }

    fn from_arena(mut nodes: Arena<SkipNode<K, V>>) -> Self {
        let front = nodes.alloc(SkipNode::boundary());
        let back = nodes.alloc(SkipNode::boundary());
        nodes.get_mut(front).next = Some(back);
        nodes.get_mut(back).prev = Some(front);

        let mut skipmap = SkipMap {
            nodes,
            front,
            back,
            top_front: front,
            top_back: back,
            len: 0,
            layers: 1,
        };
        skipmap.push_layer();
        skipmap
    }

    /// Returns the number of keys in the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10_u32).map(|x| (x, x)));
    /// assert_eq!(skipmap.len(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the skipmap contains no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.is_empty());
    ///
    /// skipmap.insert(1_u32, "Rust");
    /// assert!(!skipmap.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of layers, counting the base layer and the empty
    /// spare layer at the top.
    ///
    /// An empty skipmap has two layers. The count grows as towers are
    /// promoted and never shrinks, not even when keys are erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert_eq!(skipmap.layers(), 2);
    ///
    /// // 5 = 0b101 is promoted once, which needs a new spare layer.
    /// skipmap.insert(5_u32, ());
    /// assert_eq!(skipmap.layers(), 3);
    ///
    /// skipmap.erase(&5).unwrap();
    /// assert_eq!(skipmap.layers(), 3);
    /// ```
    #[inline]
    #[must_use]
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Provides a reference to the smallest key and its value, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.front().is_none());
    ///
    /// skipmap.insert(2_u32, "World");
    /// skipmap.insert(1, "Hello");
    /// assert_eq!(skipmap.front(), Some((&1, &"Hello")));
    /// ```
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<(&K, &V)> {
        self.node(self.front)
            .next
            .and_then(|first| self.node(first).item_ref())
    }

    /// Provides a reference to the largest key and its value, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.back().is_none());
    ///
    /// skipmap.insert(2_u32, "World");
    /// skipmap.insert(1, "Hello");
    /// assert_eq!(skipmap.back(), Some((&2, &"World")));
    /// ```
    #[inline]
    #[must_use]
    pub fn back(&self) -> Option<(&K, &V)> {
        self.node(self.back)
            .prev
            .and_then(|last| self.node(last).item_ref())
    }

    /// Removes the smallest key and returns it with its value, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.insert(1_u32, "Hello");
    /// skipmap.insert(2, "World");
    ///
    /// assert_eq!(skipmap.pop_front(), Some((1, "Hello")));
    /// assert_eq!(skipmap.pop_front(), Some((2, "World")));
    /// assert!(skipmap.pop_front().is_none());
    /// ```
    #[inline]
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let first = self.node(self.front).next?;
        if self.node(first).is_boundary() {
            return None;
        }
        self.remove_tower(first)
    }

    /// Removes the largest key and returns it with its value, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.insert(1_u32, "Hello");
    /// skipmap.insert(2, "World");
    ///
    /// assert_eq!(skipmap.pop_back(), Some((2, "World")));
    /// assert_eq!(skipmap.pop_back(), Some((1, "Hello")));
    /// assert!(skipmap.pop_back().is_none());
    /// ```
    #[inline]
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let last = self.node(self.back).prev?;
        if self.node(last).is_boundary() {
            return None;
        }
        self.remove_tower(last)
    }

    /// Creates an iterator over the entries of the skipmap, in ascending key
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(3_u32, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
    /// let entries: Vec<_> = skipmap.iter().collect();
    /// assert_eq!(entries, [(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            first: self.node(self.front).next,
            last: self.node(self.back).prev,
            size: self.len,
        }
    }

    /// Creates a mutable iterator over the entries of the skipmap, in
    /// ascending key order.
    ///
    /// The keys cannot be modified as they must remain in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..5_u32).map(|x| (x, x)).collect();
    /// for (k, v) in skipmap.iter_mut() {
    ///     *v += k * 10;
    /// }
    /// assert_eq!(skipmap.find(&3), Ok(&33));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        // Nodes are addressed by handle, so the base-layer order is resolved
        // against a table of disjoint slot borrows before iteration starts.
        let front = self.front;
        let mut table: Vec<Option<&mut SkipNode<K, V>>> = self.nodes.slots_mut().collect();
        let mut entries = Vec::with_capacity(self.len);
        let mut cursor = table[front.to_index()].take().and_then(|node| node.next);
        while let Some(handle) = cursor {
            let Some(node) = table[handle.to_index()].take() else {
                break;
            };
            cursor = node.next;
            if let Slot::Entry { key, value } = &mut node.slot {
                entries.push((&*key, value));
            }
        }
        IterMut(entries.into_iter())
    }

    /// Creates an iterator over the keys of the skipmap, in ascending order.
    ///
    /// The iterator borrows the skipmap and can be recreated any number of
    /// times.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(9_u32, ()), (0, ()), (5, ())].into_iter().collect();
    /// assert!(skipmap.keys().eq([0_u32, 5, 9].iter()));
    /// assert!(skipmap.keys().rev().eq([9_u32, 5, 0].iter()));
    /// ```
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Creates an iterator over the values of the skipmap, in ascending key
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(2_u32, "b"), (1, "a")].into_iter().collect();
    /// assert!(skipmap.values().eq([&"a", &"b"]));
    /// ```
    #[inline]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Creates an iterator over mutable references to the values of the
    /// skipmap, in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = [(2_u32, 20_i32), (1, 10)].into_iter().collect();
    /// skipmap.values_mut().for_each(|v| *v += 1);
    /// assert!(skipmap.values().eq([&11_i32, &21]));
    /// ```
    #[inline]
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    /// Returns all keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// for key in [0_u32, 5, 3, 9, 1] {
    ///     skipmap.insert(key, ());
    /// }
    /// assert_eq!(skipmap.all_keys_in_order(), vec![0, 1, 3, 5, 9]);
    /// ```
    #[must_use]
    pub fn all_keys_in_order(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Returns an adapter which renders the full layered structure of the
    /// skipmap, for debugging purposes.
    ///
    /// Layers are printed top to bottom, one per line, with every node
    /// followed by a space and the sentinels shown as `-inf` and `+inf`. The
    /// output is meant for humans; its format is not stable.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.insert(0_u32, ());
    /// skipmap.insert(5, ());
    /// println!("{}", skipmap.structure());
    /// ```
    #[inline]
    pub fn structure(&self) -> Structure<'_, K, V> {
        Structure(self)
    }
}

impl<K, V> SkipMap<K, V>
where
    K: Ord + CoinFlip,
{
    /// Insert the key and value into the skipmap.
    ///
    /// Returns `true` if the key was inserted, and `false` if the key was
    /// already present, in which case the skipmap is left untouched (the
    /// existing value is *not* replaced).
    ///
    /// Once placed on the base layer, the key's tower is promoted one layer
    /// at a time for as long as [`CoinFlip::flip`] comes up heads, adding a
    /// new spare layer on top whenever the tower reaches the current top.
    /// Promotion also stops once the layer count reaches [`layer_cap`].
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    ///
    /// assert!(skipmap.insert(1_u32, "Hello"));
    /// assert!(skipmap.insert(2, "World"));
    /// assert!(!skipmap.insert(2, "Again"));
    /// assert_eq!(skipmap.len(), 2);
    /// assert_eq!(skipmap.find(&2), Ok(&"World"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let predecessor = self.descend(&key);
        if let Some(successor) = self.node(predecessor).next {
            if self.key_at(successor) == Some(&key) {
                return false;
            }
        }

        let base = self.nodes.alloc(SkipNode::entry(key, value));
        self.splice_after(predecessor, base);
        self.len += 1;

        let mut height = 1;
        let mut tower_top = base;
        let mut anchor = predecessor;
        let mut attempt = 0;
        while self.key_at(base).is_some_and(|key| key.flip(attempt)) {
            if height == self.layers - 1 {
                self.push_layer();
            }

            anchor = self.climb(anchor);
            let express = self.nodes.alloc(SkipNode::express(base));
            self.splice_after(anchor, express);
            self.nodes.get_mut(express).down = Some(tower_top);
            self.nodes.get_mut(tower_top).up = Some(express);
            tower_top = express;
            height += 1;

            if self.layers >= layer_cap(self.len) {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    height,
                    layers = self.layers,
                    len = self.len,
                    "layer cap reached, promotion stopped"
                );
                break;
            }
            attempt += 1;
        }
        true
    }
}

impl<K, V> SkipMap<K, V> {
    /// Returns a reference to the value of the key.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::{SkipMap, SkipMapError};
    ///
    /// let skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x * 2)).collect();
    /// assert_eq!(skipmap.find(&4), Ok(&8));
    /// assert_eq!(skipmap.find(&10), Err(SkipMapError::NotFound));
    /// ```
    #[inline]
    pub fn find<Q>(&self, key: &Q) -> Result<&V, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        self.node(base)
            .item_ref()
            .map(|(_, value)| value)
            .ok_or(SkipMapError::NotFound)
    }

    /// Returns a mutable reference to the value of the key.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x)).collect();
    /// *skipmap.find_mut(&3).unwrap() = 100;
    /// assert_eq!(skipmap.find(&3), Ok(&100));
    /// ```
    #[inline]
    pub fn find_mut<Q>(&mut self, key: &Q) -> Result<&mut V, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        self.nodes
            .get_mut(base)
            .item_mut()
            .map(|(_, value)| value)
            .ok_or(SkipMapError::NotFound)
    }

    /// Returns a reference to the value of the key, or `None` if it is not
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x)).collect();
    /// assert_eq!(skipmap.get(&0), Some(&0));
    /// assert!(skipmap.get(&10).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).ok()
    }

    /// Returns a mutable reference to the value of the key, or `None` if it
    /// is not present.
    #[inline]
    #[must_use]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_mut(key).ok()
    }

    /// Returns `true` if the key is contained in the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x)).collect();
    /// assert!(skipmap.contains_key(&4));
    /// assert!(!skipmap.contains_key(&15));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_ok()
    }

    /// Returns the height of the key's tower, with a key only present on the
    /// base layer having a height of 1.
    ///
    /// The height is at least 1 and always strictly less than
    /// [`layers`][SkipMap::layers], as the top layer is kept empty.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.insert(0_u32, ()); // 0b000: never promoted
    /// skipmap.insert(3, ()); //     0b011: promoted twice
    /// assert_eq!(skipmap.height(&0), Ok(1));
    /// assert_eq!(skipmap.height(&3), Ok(3));
    /// ```
    pub fn height<Q>(&self, key: &Q) -> Result<usize, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.locate(key)?;
        let mut height = 1;
        while let Some(up) = self.node(node).up {
            node = up;
            height += 1;
        }
        Ok(height)
    }

    /// Returns the smallest key strictly greater than the given key.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present, or if it is the
    /// largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::{SkipMap, SkipMapError};
    ///
    /// let skipmap: SkipMap<_, _> = [(0_u32, ()), (5, ()), (9, ())].into_iter().collect();
    /// assert_eq!(skipmap.next_key(&0), Ok(&5));
    /// assert_eq!(skipmap.next_key(&9), Err(SkipMapError::NotFound));
    /// assert_eq!(skipmap.next_key(&1), Err(SkipMapError::NotFound));
    /// ```
    pub fn next_key<Q>(&self, key: &Q) -> Result<&K, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        self.node(base)
            .next
            .and_then(|next| self.key_at(next))
            .ok_or(SkipMapError::NotFound)
    }

    /// Returns the largest key strictly less than the given key.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present, or if it is the
    /// smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::{SkipMap, SkipMapError};
    ///
    /// let skipmap: SkipMap<_, _> = [(0_u32, ()), (5, ()), (9, ())].into_iter().collect();
    /// assert_eq!(skipmap.previous_key(&9), Ok(&5));
    /// assert_eq!(skipmap.previous_key(&0), Err(SkipMapError::NotFound));
    /// ```
    pub fn previous_key<Q>(&self, key: &Q) -> Result<&K, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        self.node(base)
            .prev
            .and_then(|prev| self.key_at(prev))
            .ok_or(SkipMapError::NotFound)
    }

    /// Returns `true` if the key is the smallest in the skipmap.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(0_u32, ()), (5, ())].into_iter().collect();
    /// assert_eq!(skipmap.is_smallest_key(&0), Ok(true));
    /// assert_eq!(skipmap.is_smallest_key(&5), Ok(false));
    /// assert!(skipmap.is_smallest_key(&1).is_err());
    /// ```
    pub fn is_smallest_key<Q>(&self, key: &Q) -> Result<bool, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        Ok(self.node(self.front).next == Some(base))
    }

    /// Returns `true` if the key is the largest in the skipmap.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(0_u32, ()), (5, ())].into_iter().collect();
    /// assert_eq!(skipmap.is_largest_key(&5), Ok(true));
    /// assert_eq!(skipmap.is_largest_key(&0), Ok(false));
    /// ```
    pub fn is_largest_key<Q>(&self, key: &Q) -> Result<bool, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        Ok(self.node(self.back).prev == Some(base))
    }

    /// Removes the key and its whole tower from the skipmap, returning the
    /// value it held.
    ///
    /// The number of layers is left unchanged, even if some layers are left
    /// without any keys.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::{SkipMap, SkipMapError};
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x)).collect();
    /// assert_eq!(skipmap.erase(&4), Ok(4));
    /// assert_eq!(skipmap.erase(&4), Err(SkipMapError::NotFound));
    /// assert_eq!(skipmap.len(), 9);
    /// ```
    pub fn erase<Q>(&mut self, key: &Q) -> Result<V, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let base = self.locate(key)?;
        self.remove_tower(base)
            .map(|(_, value)| value)
            .ok_or(SkipMapError::NotFound)
    }

    /// Removes the key and returns its value, or `None` if it was not
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use towerlist::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10_u32).map(|x| (x, x)).collect();
    /// assert_eq!(skipmap.remove(&4), Some(4));
    /// assert!(skipmap.remove(&4).is_none());
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.erase(key).ok()
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<K, V> SkipMap<K, V> {
    #[inline]
    fn node(&self, handle: Handle) -> &SkipNode<K, V> {
        self.nodes.get(handle)
    }

    /// The key a node stands for, or `None` for a sentinel.
    fn key_at(&self, handle: Handle) -> Option<&K> {
        match self.node(handle).slot {
            Slot::Boundary => None,
            Slot::Entry { ref key, .. } => Some(key),
            Slot::Express { base } => self.node(base).item_ref().map(|(key, _)| key),
        }
    }

    /// Move right along a layer while the next node holds a key strictly less
    /// than `key`, returning the last node reached.
    fn advance_while_less<Q>(&self, mut current: Handle, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        while let Some(next) = self.node(current).next {
            match self.key_at(next) {
                Some(next_key) if next_key.borrow() < key => current = next,
                _ => break,
            }
        }
        current
    }

    /// Descend from the top-left sentinel to the last base-layer node whose
    /// key is strictly less than `key` (possibly the front sentinel).
    fn descend<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.top_front;
        loop {
            current = self.advance_while_less(current, key);
            match self.node(current).down {
                Some(below) => current = below,
                None => return current,
            }
        }
    }

    /// Find the base-layer node holding `key`.
    ///
    /// Layer 0 is ascending, so the key can only be right after the node
    /// [`descend`][Self::descend] stops at.
    fn locate<Q>(&self, key: &Q) -> Result<Handle, SkipMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let predecessor = self.descend(key);
        self.node(predecessor)
            .next
            .filter(|&next| {
                self.key_at(next)
                    .is_some_and(|next_key| next_key.borrow() == key)
            })
            .ok_or(SkipMapError::NotFound)
    }

    /// Walk left from `current` to the nearest node that has a node above it,
    /// and return that node above.
    ///
    /// Every layer below the top starts with a sentinel linked upwards, so
    /// the walk always succeeds below the top layer.
    #[expect(
        clippy::expect_used,
        reason = "Front sentinels below the top layer always have an up link"
    )]
    fn climb(&self, mut current: Handle) -> Handle {
        loop {
            let node = self.node(current);
            if let Some(up) = node.up {
                return up;
            }
            current = node
                .prev
                .expect("climbing walked past the front sentinel");
        }
    }

    /// Link `node` into the layer of `prev`, right after it.
    fn splice_after(&mut self, prev: Handle, node: Handle) {
        let next = self.node(prev).next;
        {
            let inserted = self.nodes.get_mut(node);
            inserted.prev = Some(prev);
            inserted.next = next;
        }
        self.nodes.get_mut(prev).next = Some(node);
        if let Some(next) = next {
            self.nodes.get_mut(next).prev = Some(node);
        }
    }

    /// Bypass `handle` in its layer and release its slot.
    fn unlink(&mut self, handle: Handle) -> SkipNode<K, V> {
        let node = self.nodes.take(handle);
        if let Some(prev) = node.prev {
            self.nodes.get_mut(prev).next = node.next;
        }
        if let Some(next) = node.next {
            self.nodes.get_mut(next).prev = node.prev;
        }
        node
    }

    /// Remove the tower standing on the base-layer node `base`, bottom-up.
    fn remove_tower(&mut self, base: Handle) -> Option<(K, V)> {
        let removed = self.unlink(base);
        let mut above = removed.up;
        while let Some(handle) = above {
            above = self.unlink(handle).up;
        }
        self.len -= 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(len = self.len, "erased tower");

        removed.into_inner()
    }

    /// Add a new, empty layer above the current top layer.
    fn push_layer(&mut self) {
        let front = self.nodes.alloc(SkipNode::boundary());
        let back = self.nodes.alloc(SkipNode::boundary());
        {
            let node = self.nodes.get_mut(front);
            node.next = Some(back);
            node.down = Some(self.top_front);
        }
        {
            let node = self.nodes.get_mut(back);
            node.prev = Some(front);
            node.down = Some(self.top_back);
        }
        self.nodes.get_mut(self.top_front).up = Some(front);
        self.nodes.get_mut(self.top_back).up = Some(back);
        self.top_front = front;
        self.top_back = back;
        self.layers += 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(layers = self.layers, "added spare layer");
    }
}

#[cfg(test)]
impl<K: Ord + fmt::Debug, V> SkipMap<K, V> {
    /// Checks the integrity of the skipmap.
    fn check(&self) {
        fn is_entry<K, V>(node: &SkipNode<K, V>) -> bool {
            matches!(node.slot, Slot::Entry { .. })
        }

        let mut nodes = 0;
        let mut layer_count = 0;
        let mut row = Some(self.top_front);
        while let Some(head) = row {
            layer_count += 1;
            assert!(self.node(head).is_boundary());
            assert!(self.node(head).prev.is_none());

            let mut previous_key: Option<&K> = None;
            let mut cursor = Some(head);
            let mut last = head;
            while let Some(handle) = cursor {
                nodes += 1;
                let node = self.node(handle);
                if let Some(next) = node.next {
                    assert_eq!(self.node(next).prev, Some(handle));
                }
                if let Some(up) = node.up {
                    assert_eq!(self.node(up).down, Some(handle));
                }
                if let Some(down) = node.down {
                    assert_eq!(self.node(down).up, Some(handle));
                    assert_eq!(self.key_at(down), self.key_at(handle));
                }
                if let Some(key) = self.key_at(handle) {
                    if let Some(previous_key) = previous_key {
                        assert!(previous_key < key, "{previous_key:?} !< {key:?}");
                    }
                    previous_key = Some(key);
                    assert_eq!(node.down.is_none(), is_entry(node));
                }
                last = handle;
                cursor = node.next;
            }
            assert!(self.node(last).is_boundary());
            if head == self.top_front {
                assert_eq!(last, self.top_back);
                assert_eq!(self.node(head).next, Some(self.top_back));
            }
            if self.node(head).down.is_none() {
                assert_eq!(head, self.front);
                assert_eq!(last, self.back);
            }
            row = self.node(head).down;
        }
        assert_eq!(layer_count, self.layers);
        assert!(self.layers >= 2);
        assert_eq!(nodes, self.nodes.len());
        assert_eq!(self.iter().count(), self.len);
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K, V> Default for SkipMap<K, V> {
    #[inline]
    fn default() -> SkipMap<K, V> {
        SkipMap::new()
    }
}

/// Two skipmaps are equal if they hold the same entries; their layered
/// structure is not compared.
impl<AK, AV, BK, BV> cmp::PartialEq<SkipMap<BK, BV>> for SkipMap<AK, AV>
where
    AK: cmp::PartialEq<BK>,
    AV: cmp::PartialEq<BV>,
{
    #[inline]
    fn eq(&self, other: &SkipMap<BK, BV>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(x, y)| x.0 == y.0 && x.1 == y.1)
    }
}

impl<K: cmp::Eq, V: cmp::Eq> cmp::Eq for SkipMap<K, V> {}

impl<K, V> Extend<(K, V)> for SkipMap<K, V>
where
    K: Ord + CoinFlip,
{
    /// Inserts every entry; entries whose key is already present are dropped.
    #[inline]
    fn extend<I: iter::IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value);
        }
    }
}

impl<K, V> iter::FromIterator<(K, V)> for SkipMap<K, V>
where
    K: Ord + CoinFlip,
{
    #[inline]
    fn from_iter<I>(iter: I) -> SkipMap<K, V>
    where
        I: iter::IntoIterator<Item = (K, V)>,
    {
        let mut skipmap = SkipMap::new();
        skipmap.extend(iter);
        skipmap
    }
}

impl<K, V> fmt::Debug for SkipMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> fmt::Display for SkipMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k}, {v})")?;
        }
        write!(f, "]")
    }
}

impl<K, V> iter::IntoIterator for SkipMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, K, V> iter::IntoIterator for &'a SkipMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> iter::IntoIterator for &'a mut SkipMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// ///////////////////////////////////////////////
// Extra structs
// ///////////////////////////////////////////////

/// An iterator over the entries of a [`SkipMap`].
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<SkipNode<K, V>>,
    first: Option<Handle>,
    last: Option<Handle>,
    size: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        let node = self.nodes.get(self.first?);
        self.size -= 1;
        self.first = node.next;
        node.item_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        let node = self.nodes.get(self.last?);
        self.size -= 1;
        self.last = node.prev;
        node.item_ref()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            first: self.first,
            last: self.last,
            size: self.size,
        }
    }
}

/// A mutable iterator over the entries of a [`SkipMap`].
pub struct IterMut<'a, K, V>(std::vec::IntoIter<(&'a K, &'a mut V)>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a [`SkipMap`].
pub struct IntoIter<K, V>(SkipMap<K, V>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// Iterator over a [`SkipMap`]'s keys.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|x| x.0)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator over a [`SkipMap`]'s values.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|x| x.1)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Iterator over mutable references to a [`SkipMap`]'s values.
pub struct ValuesMut<'a, K, V>(IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|x| x.1)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// Renders every layer of a [`SkipMap`]; see [`SkipMap::structure`].
pub struct Structure<'a, K, V>(&'a SkipMap<K, V>);

impl<K: fmt::Display, V> fmt::Display for Structure<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let skipmap = self.0;
        let mut row = Some(skipmap.top_front);
        while let Some(head) = row {
            let mut cursor = Some(head);
            while let Some(handle) = cursor {
                let node = skipmap.node(handle);
                match skipmap.key_at(handle) {
                    Some(key) => write!(f, "{key} ")?,
                    None if node.prev.is_none() => write!(f, "-inf ")?,
                    None => write!(f, "+inf ")?,
                }
                cursor = node.next;
            }
            writeln!(f)?;
            row = skipmap.node(head).down;
        }
        writeln!(f, "{}", "-".repeat(24))
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
