use crate::Error;
use std::sync::atomic::{AtomicU64, Ordering};

// 64 bits never wrap in practice, so no two arenas share an id.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle to a list node.
///
/// The handle stays valid until its node is deleted or popped, no matter how the rest of
/// the list changes. A deleted node's slot may be reused, but handles to the old node will
/// not resolve to the new one, and handles from another list never resolve at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    arena: u64,
    index: u32,
    generation: u32,
}

pub(crate) struct Node<D> {
    pub data: D,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

struct Slot<D> {
    generation: u32,
    node: Option<Node<D>>,
}

/// Slot storage for list nodes. Links between nodes are slot indices.
pub(crate) struct NodeArena<D> {
    id: u64,
    slots: Vec<Slot<D>>,
    vacant: Vec<u32>,
}

impl<D> NodeArena<D> {
    pub fn new() -> NodeArena<D> {
        NodeArena {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Stores the node and returns its slot index.
    pub fn insert(&mut self, node: Node<D>) -> Result<u32, Error> {
        if let Some(index) = self.vacant.pop() {
            self.slots[index as usize].node = Some(node);
            return Ok(index);
        }

        if self.slots.len() >= u32::MAX as usize {
            return Err(Error::BadAlloc);
        }
        if self.slots.len() == self.slots.capacity() {
            let additional = self.slots.len().max(4);
            self.slots.try_reserve(additional).map_err(|_| Error::BadAlloc)?;
            // keep room for every slot to become vacant, so `remove` never allocates
            let vacant_room = self.slots.capacity() - self.vacant.len();
            self.vacant.try_reserve(vacant_room).map_err(|_| Error::BadAlloc)?;
            trace!("node arena {} grown to {} slots", self.id, self.slots.capacity());
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        Ok(index)
    }

    /// Takes the node out of its slot. The slot's old handles stop resolving.
    ///
    /// A slot whose generation is exhausted is retired instead of reused, so a generation
    /// never wraps back to one an old handle still carries.
    pub fn remove(&mut self, index: u32) -> Node<D> {
        let slot = &mut self.slots[index as usize];
        match slot.node.take() {
            Some(node) => {
                match slot.generation.checked_add(1) {
                    Some(generation) => {
                        slot.generation = generation;
                        self.vacant.push(index);
                    }
                    None => {
                        trace!("node arena {} retired slot {}", self.id, index);
                    }
                }
                node
            }
            None => unreachable!("list link points to a vacant slot {}", index),
        }
    }

    #[inline(always)]
    pub fn node(&self, index: u32) -> &Node<D> {
        match &self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("list link points to a vacant slot {}", index),
        }
    }

    #[inline(always)]
    pub fn node_mut(&mut self, index: u32) -> &mut Node<D> {
        match &mut self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("list link points to a vacant slot {}", index),
        }
    }

    /// Both nodes at once, `a` and `b` must differ.
    pub fn pair_mut(&mut self, a: u32, b: u32) -> (&mut Node<D>, &mut Node<D>) {
        debug_assert_ne!(a, b, "pair_mut: same slot twice");
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.slots.split_at_mut(high as usize);
        let (low_node, high_node) = match (&mut left[low as usize].node, &mut right[0].node) {
            (Some(l), Some(h)) => (l, h),
            _ => unreachable!("pair_mut on a vacant slot"),
        };
        if a < b {
            (low_node, high_node)
        } else {
            (high_node, low_node)
        }
    }

    /// Slot index for a handle that belongs to this arena and is still live.
    pub fn resolve(&self, id: NodeId) -> Option<u32> {
        if id.arena != self.id {
            return None;
        }
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation && slot.node.is_some() {
            Some(id.index)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn handle(&self, index: u32) -> NodeId {
        NodeId {
            arena: self.id,
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Number of slots ever created, live or vacant.
    #[inline(always)]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
