use crate::arena::NodeArena;
use crate::NodeId;

/// Walks slot indices from both ends of a list until they meet.
struct Links<'a, D> {
    arena: &'a NodeArena<D>,
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
}

impl<'a, D> Links<'a, D> {
    #[inline(always)]
    fn next_index(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = self.arena.node(index).next;
        self.remaining -= 1;
        Some(index)
    }

    #[inline(always)]
    fn next_back_index(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.arena.node(index).prev;
        self.remaining -= 1;
        Some(index)
    }
}

/// Iterator over list data, head to tail.
pub struct Iter<'a, D> {
    links: Links<'a, D>,
}

impl<'a, D> Iter<'a, D> {
    pub(crate) fn new(arena: &'a NodeArena<D>, head: Option<u32>, tail: Option<u32>, len: usize) -> Iter<'a, D> {
        Iter {
            links: Links { arena, front: head, back: tail, remaining: len },
        }
    }
}

impl<'a, D> Iterator for Iter<'a, D> {
    type Item = &'a D;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.links.arena;
        self.links.next_index().map(|i| &arena.node(i).data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.links.remaining, Some(self.links.remaining))
    }
}

impl<'a, D> DoubleEndedIterator for Iter<'a, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let arena = self.links.arena;
        self.links.next_back_index().map(|i| &arena.node(i).data)
    }
}

impl<'a, D> ExactSizeIterator for Iter<'a, D> {
    fn len(&self) -> usize {
        self.links.remaining
    }
}

/// Iterator over node handles, head to tail.
pub struct Nodes<'a, D> {
    links: Links<'a, D>,
}

impl<'a, D> Nodes<'a, D> {
    pub(crate) fn new(arena: &'a NodeArena<D>, head: Option<u32>, tail: Option<u32>, len: usize) -> Nodes<'a, D> {
        Nodes {
            links: Links { arena, front: head, back: tail, remaining: len },
        }
    }
}

impl<'a, D> Iterator for Nodes<'a, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.links.arena;
        self.links.next_index().map(|i| arena.handle(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.links.remaining, Some(self.links.remaining))
    }
}

impl<'a, D> DoubleEndedIterator for Nodes<'a, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let arena = self.links.arena;
        self.links.next_back_index().map(|i| arena.handle(i))
    }
}

impl<'a, D> ExactSizeIterator for Nodes<'a, D> {
    fn len(&self) -> usize {
        self.links.remaining
    }
}
