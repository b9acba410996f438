//! Node storage for the skip map.
//!
//! Every node, sentinels included, lives in a single [`Arena`] and is
//! addressed by a [`Handle`]. The four navigational links of a node are plain
//! `Option<Handle>`s: none of them own anything, so splicing a node in or out
//! is a matter of rewriting indices and tearing down the map is dropping the
//! arena.

use std::num::NonZero;

// ////////////////////////////////////////////////////////////////////////////
// Handle
// ////////////////////////////////////////////////////////////////////////////

/// A stable reference to a slot in an [`Arena`].
///
/// Handles are stored off-by-one in a `NonZero` so that `Option<Handle>` is
/// the same size as the handle itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<usize>);

impl Handle {
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        match NonZero::new(index.wrapping_add(1)) {
            Some(raw) => Self(raw),
            None => panic!("`Handle::from_index()` - index overflow"),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        self.0.get() - 1
    }
}

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// What a node stands for.
///
/// Sentinels are tagged explicitly rather than holding a default key, so no
/// comparison can ever mistake a boundary for a real entry.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    /// One of the two sentinels bounding a layer.
    Boundary,
    /// A node on layer 0. This is the only place the key and value are
    /// stored.
    Entry { key: K, value: V },
    /// A tower member above layer 0, pointing back to the base entry which
    /// holds its key.
    Express { base: Handle },
}

/// A node in the layered topology.
///
/// `next` and `prev` link nodes within a layer; `up` and `down` link the
/// nodes of one tower (or one column of sentinels) across adjacent layers.
#[derive(Clone, Debug)]
pub(crate) struct SkipNode<K, V> {
    pub slot: Slot<K, V>,
    pub next: Option<Handle>,
    pub prev: Option<Handle>,
    pub up: Option<Handle>,
    pub down: Option<Handle>,
}

impl<K, V> SkipNode<K, V> {
    /// Create a new sentinel with no links.
    #[inline]
    pub(crate) const fn boundary() -> Self {
        Self::with_slot(Slot::Boundary)
    }

    /// Create a new base-layer node with no links.
    #[inline]
    pub(crate) const fn entry(key: K, value: V) -> Self {
        Self::with_slot(Slot::Entry { key, value })
    }

    /// Create a new tower member for the entry at `base`, with no links.
    #[inline]
    pub(crate) const fn express(base: Handle) -> Self {
        Self::with_slot(Slot::Express { base })
    }

    #[inline]
    const fn with_slot(slot: Slot<K, V>) -> Self {
        Self {
            slot,
            next: None,
            prev: None,
            up: None,
            down: None,
        }
    }

    /// Returns `true` if the node is a sentinel.
    #[inline]
    pub(crate) const fn is_boundary(&self) -> bool {
        matches!(self.slot, Slot::Boundary)
    }

    /// The key and value, if this is a base-layer entry.
    #[inline]
    pub(crate) const fn item_ref(&self) -> Option<(&K, &V)> {
        match self.slot {
            Slot::Entry {
                ref key, ref value, ..
            } => Some((key, value)),
            Slot::Boundary | Slot::Express { .. } => None,
        }
    }

    /// The key and a mutable value, if this is a base-layer entry.
    #[inline]
    pub(crate) fn item_mut(&mut self) -> Option<(&K, &mut V)> {
        match self.slot {
            Slot::Entry {
                ref key,
                ref mut value,
            } => Some((key, value)),
            Slot::Boundary | Slot::Express { .. } => None,
        }
    }

    /// Consumes the node, returning the key and value it holds.
    #[inline]
    pub(crate) fn into_inner(self) -> Option<(K, V)> {
        match self.slot {
            Slot::Entry { key, value } => Some((key, value)),
            Slot::Boundary | Slot::Express { .. } => None,
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Slot storage for nodes, with freed slots recycled before the vector grows.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    #[expect(
        clippy::expect_used,
        reason = "A dangling handle is a broken link invariant"
    )]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()]
            .as_ref()
            .expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    #[expect(
        clippy::expect_used,
        reason = "A dangling handle is a broken link invariant"
    )]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()]
            .as_mut()
            .expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    #[expect(
        clippy::expect_used,
        reason = "A dangling handle is a broken link invariant"
    )]
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()]
            .take()
            .expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    /// Disjoint mutable borrows of every slot, indexed like the handles.
    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = Option<&mut T>> {
        self.slots.iter_mut().map(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use pretty_assertions::assert_eq;

    use super::{Arena, Handle, SkipNode, Slot};

    #[test]
    fn handle_round_trip() {
        for index in [0, 1, 2, 1023, usize::MAX - 1] {
            assert_eq!(Handle::from_index(index).to_index(), index);
        }
    }

    #[test]
    fn optional_handle_is_niche_packed() {
        assert_eq!(size_of::<Option<Handle>>(), size_of::<Handle>());
    }

    #[test]
    #[should_panic(expected = "index overflow")]
    fn handle_overflow() {
        let _ = Handle::from_index(usize::MAX);
    }

    #[test]
    fn arena_reuses_freed_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.take(a), 'a');
        assert_eq!(arena.len(), 1);

        let c = arena.alloc('c');
        assert_eq!(c, a);
        assert_eq!(*arena.get(c), 'c');
        assert_eq!(*arena.get(b), 'b');

        *arena.get_mut(b) = 'B';
        assert_eq!(*arena.get(b), 'B');
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "`handle` is invalid")]
    fn arena_rejects_freed_handle() {
        let mut arena = Arena::with_capacity(4);
        let a = arena.alloc(1_u8);
        let _ = arena.take(a);
        let _ = arena.get(a);
    }

    #[test]
    fn node_slots() {
        let boundary: SkipNode<u32, &str> = SkipNode::boundary();
        assert!(boundary.is_boundary());
        assert!(boundary.item_ref().is_none());

        let mut entry: SkipNode<u32, &str> = SkipNode::entry(7, "seven");
        assert!(!entry.is_boundary());
        assert_eq!(entry.item_ref(), Some((&7, &"seven")));
        if let Some((_, value)) = entry.item_mut() {
            *value = "SEVEN";
        }
        assert_eq!(entry.into_inner(), Some((7, "SEVEN")));

        let express: SkipNode<u32, &str> = SkipNode::express(Handle::from_index(3));
        assert!(!express.is_boundary());
        assert!(express.item_ref().is_none());
        assert!(matches!(express.slot, Slot::Express { base } if base.to_index() == 3));
    }
}
