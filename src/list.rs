use crate::arena::{Node, NodeArena};
use crate::{Error, Iter, NodeId, Nodes};
use std::cmp::Ordering;
use std::io::{self, Write};
use std::rc::Rc;

/// Longest label a list keeps, in bytes.
pub const MAX_LABEL_LEN: usize = 63;

/// Releases data the list no longer holds.
pub type FreeFn<D> = Rc<dyn Fn(D)>;
/// Duplicates data for deep copies, `None` means the copy failed.
pub type CopyFn<D> = Rc<dyn Fn(&D) -> Option<D>>;
/// Orders two data items for sorting.
pub type CompareFn<D> = Rc<dyn Fn(&D, &D) -> Ordering>;

/// Doubly linked list of opaque data items `D`.
///
/// `D` is whatever the owner wants the list to carry: a value, a `Box`, an `Rc` or a plain
/// reference. Nodes live in an internal arena and are addressed by [`NodeId`] handles, so
/// removing a node in the middle is O(1) and never invalidates the other handles.
///
/// Three callbacks are optional and independent:
///
/// - `free` releases data when the list deletes or clears it (also on drop). Without it the
///   data is simply dropped.
/// - `copy` duplicates data for deep copies. Without it deep copies fail with
///   `MissingCallback`.
/// - `compare` orders data. Without it sorting and sortedness checks fail with
///   `MissingCallback`.
///
/// Popping hands the data over to the caller and never calls `free`.
pub struct List<D> {
    nodes: NodeArena<D>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
    free: Option<FreeFn<D>>,
    copy: Option<CopyFn<D>>,
    compare: Option<CompareFn<D>>,
    label: String,
}

fn truncate_label(label: &str) -> String {
    let mut end = label.len().min(MAX_LABEL_LEN);
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    label[..end].to_string()
}

impl<D> List<D> {
    /// Empty list without callbacks.
    pub fn new(label: &str) -> List<D> {
        List::with_callbacks(None, None, None, label)
    }

    pub fn with_callbacks(
        free: Option<FreeFn<D>>,
        copy: Option<CopyFn<D>>,
        compare: Option<CompareFn<D>>,
        label: &str,
    ) -> List<D> {
        List {
            nodes: NodeArena::new(),
            head: None,
            tail: None,
            len: 0,
            free,
            copy,
            compare,
            label: truncate_label(label),
        }
    }

    pub fn with_free(mut self, free: impl Fn(D) + 'static) -> List<D> {
        self.free = Some(Rc::new(free));
        self
    }

    pub fn with_copy(mut self, copy: impl Fn(&D) -> Option<D> + 'static) -> List<D> {
        self.copy = Some(Rc::new(copy));
        self
    }

    pub fn with_compare(mut self, compare: impl Fn(&D, &D) -> Ordering + 'static) -> List<D> {
        self.compare = Some(Rc::new(compare));
        self
    }

    /// Empty list with the same label and callbacks, `free` only if asked for.
    fn empty_like(&self, keep_free: bool) -> List<D> {
        List::with_callbacks(
            if keep_free { self.free.clone() } else { None },
            self.copy.clone(),
            self.compare.clone(),
            &self.label,
        )
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_free(&self) -> bool {
        self.free.is_some()
    }

    pub fn has_copy(&self) -> bool {
        self.copy.is_some()
    }

    pub fn has_compare(&self) -> bool {
        self.compare.is_some()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(|i| self.nodes.handle(i))
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(|i| self.nodes.handle(i))
    }

    /// Node after `node`, `None` at the tail or when `node` is not in this list.
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        let index = self.nodes.resolve(node)?;
        self.nodes.node(index).next.map(|i| self.nodes.handle(i))
    }

    /// Node before `node`, `None` at the head or when `node` is not in this list.
    pub fn prev(&self, node: NodeId) -> Option<NodeId> {
        let index = self.nodes.resolve(node)?;
        self.nodes.node(index).prev.map(|i| self.nodes.handle(i))
    }

    /// Whether `node` is a live node of this list.
    #[inline(always)]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.resolve(node).is_some()
    }

    #[inline(always)]
    fn index_of(&self, node: NodeId) -> Result<u32, Error> {
        self.nodes.resolve(node).ok_or(Error::NotFound)
    }

    pub fn get(&self, node: NodeId) -> Result<&D, Error> {
        let index = self.index_of(node)?;
        Ok(&self.nodes.node(index).data)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Result<&mut D, Error> {
        let index = self.index_of(node)?;
        Ok(&mut self.nodes.node_mut(index).data)
    }

    pub fn iter(&self) -> Iter<'_, D> {
        Iter::new(&self.nodes, self.head, self.tail, self.len)
    }

    pub fn nodes(&self) -> Nodes<'_, D> {
        Nodes::new(&self.nodes, self.head, self.tail, self.len)
    }

    /// Puts `data` at the head. If no node can be allocated the data is dropped.
    pub fn push_front(&mut self, data: D) -> Result<NodeId, Error> {
        let index = self.nodes.insert(Node { data, prev: None, next: self.head })?;
        match self.head {
            Some(head) => self.nodes.node_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;
        Ok(self.nodes.handle(index))
    }

    /// Puts `data` at the tail. If no node can be allocated the data is dropped.
    pub fn push_back(&mut self, data: D) -> Result<NodeId, Error> {
        let index = self.nodes.insert(Node { data, prev: self.tail, next: None })?;
        match self.tail {
            Some(tail) => self.nodes.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        Ok(self.nodes.handle(index))
    }

    /// Takes the head data, the caller owns it from now on.
    pub fn pop_front(&mut self) -> Result<D, Error> {
        let head = self.head.ok_or(Error::NoData)?;
        Ok(self.unlink(head))
    }

    /// Takes the tail data, the caller owns it from now on.
    pub fn pop_back(&mut self) -> Result<D, Error> {
        let tail = self.tail.ok_or(Error::NoData)?;
        Ok(self.unlink(tail))
    }

    fn unlink(&mut self, index: u32) -> D {
        let node = self.nodes.remove(index);
        match node.prev {
            Some(prev) => self.nodes.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        node.data
    }

    fn release(&self, data: D, preserve_data: bool) {
        match &self.free {
            Some(free) if !preserve_data => free(data),
            _ => drop(data),
        }
    }

    /// Removes `node` and releases its data through `free` unless `preserve_data` is set
    /// or the list has no `free` callback.
    pub fn delete(&mut self, node: NodeId, preserve_data: bool) -> Result<(), Error> {
        let index = self.index_of(node)?;
        let data = self.unlink(index);
        self.release(data, preserve_data);
        Ok(())
    }

    /// Removes `node` and hands its data to the caller.
    pub fn remove(&mut self, node: NodeId) -> Result<D, Error> {
        let index = self.index_of(node)?;
        Ok(self.unlink(index))
    }

    /// Deletes every node from the head on, data is released like in [`List::delete`].
    pub fn clear(&mut self, preserve_data: bool) -> Result<(), Error> {
        if self.head.is_none() {
            return Err(Error::NoOp);
        }
        while let Some(head) = self.head {
            let data = self.unlink(head);
            self.release(data, preserve_data);
        }
        Ok(())
    }

    /// First node whose data `equals` the value.
    pub fn find<Q: ?Sized>(&self, value: &Q, equals: impl Fn(&D, &Q) -> bool) -> Result<NodeId, Error> {
        self.nodes()
            .zip(self.iter())
            .find(|(_, data)| equals(*data, value))
            .map(|(node, _)| node)
            .ok_or(Error::NotFound)
    }

    /// Orders the data of two nodes with the `compare` callback.
    pub fn compare_nodes(&self, a: NodeId, b: NodeId) -> Result<Ordering, Error> {
        let compare = self.compare.as_ref().ok_or(Error::MissingCallback)?;
        Ok(compare(self.get(a)?, self.get(b)?))
    }

    /// Whether every item compares less than or equal to its successor.
    pub fn is_sorted(&self) -> Result<bool, Error> {
        let compare = self.compare.as_ref().ok_or(Error::MissingCallback)?;
        let mut items = self.iter();
        let mut prev = match items.next() {
            Some(first) => first,
            None => return Ok(true),
        };
        for item in items {
            if compare(prev, item) == Ordering::Greater {
                return Ok(false);
            }
            prev = item;
        }
        Ok(true)
    }

    /// Sorts in place with the run-aware merge sort, see [`crate::sort::merge_sort`].
    pub fn sort(&mut self) -> Result<(), Error> {
        crate::sort::merge_sort(self)
    }

    /// Exchanges the data of two nodes. Handles and links stay where they are.
    pub fn node_swap(&mut self, a: NodeId, b: NodeId) -> Result<(), Error> {
        let a = self.index_of(a)?;
        let b = self.index_of(b)?;
        if a != b {
            let (node_a, node_b) = self.nodes.pair_mut(a, b);
            std::mem::swap(&mut node_a.data, &mut node_b.data);
        }
        Ok(())
    }

    /// Relinks the existing nodes in the given order.
    ///
    /// `order` must name every node of the list exactly once, otherwise nothing changes:
    /// a foreign, stale or repeated handle is `NotFound`, a wrong count is `OutOfBounds`.
    pub fn reorder(&mut self, order: impl IntoIterator<Item = NodeId>) -> Result<(), Error> {
        let mut indices = Vec::with_capacity(self.len);
        let mut seen = vec![false; self.nodes.slot_count()];
        for node in order {
            let index = self.index_of(node)?;
            if std::mem::replace(&mut seen[index as usize], true) {
                return Err(Error::NotFound);
            }
            indices.push(index);
        }
        if indices.len() != self.len {
            return Err(Error::OutOfBounds);
        }

        let mut prev = None;
        for (pos, &index) in indices.iter().enumerate() {
            let node = self.nodes.node_mut(index);
            node.prev = prev;
            node.next = indices.get(pos + 1).copied();
            prev = Some(index);
        }
        self.head = indices.first().copied();
        self.tail = indices.last().copied();
        Ok(())
    }

    /// Writes the node's slot and links, then its data through `print`.
    ///
    /// A foreign or stale handle fails with `io::ErrorKind::NotFound` wrapping
    /// `Error::NotFound`, and nothing is written.
    pub fn print_node<W, P>(&self, node: NodeId, w: &mut W, print: P) -> io::Result<()>
        where
            W: Write,
            P: Fn(&D, &mut W) -> io::Result<()>,
    {
        let index = self.index_of(node).map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
        self.write_node(index, w, &print)
    }

    /// Writes the label, then every node head to tail, each followed by a blank line.
    pub fn print_all<W, P>(&self, w: &mut W, print: P) -> io::Result<()>
        where
            W: Write,
            P: Fn(&D, &mut W) -> io::Result<()>,
    {
        writeln!(w, "list: {}\n", self.label)?;
        let mut cur = self.head;
        while let Some(index) = cur {
            self.write_node(index, w, &print)?;
            writeln!(w)?;
            cur = self.nodes.node(index).next;
        }
        Ok(())
    }

    fn write_node<W, P>(&self, index: u32, w: &mut W, print: &P) -> io::Result<()>
        where
            W: Write,
            P: Fn(&D, &mut W) -> io::Result<()>,
    {
        let node = self.nodes.node(index);
        writeln!(w, "cur: {}\nnext: {}\nprev: {}", index, link_name(node.next), link_name(node.prev))?;
        print(&node.data, w)
    }

    /// Calls `f` on every item in place.
    pub fn map(&mut self, mut f: impl FnMut(&mut D)) {
        let mut cur = self.head;
        while let Some(index) = cur {
            let node = self.nodes.node_mut(index);
            f(&mut node.data);
            cur = node.next;
        }
    }

    fn copy_data(&self, data: &D) -> Result<D, Error> {
        let copy = self.copy.as_ref().ok_or(Error::MissingCallback)?;
        copy(data).ok_or(Error::CopyFailed)
    }

    /// Duplicate of the data in `node` made by the `copy` callback.
    pub fn copy_node_deep(&self, node: NodeId) -> Result<D, Error> {
        let data = self.get(node)?;
        self.copy_data(data)
    }

    /// New list holding a `copy` of every item, with all callbacks inherited.
    ///
    /// If a copy fails, the copies made so far are released through `free` and the
    /// source list is left alone.
    pub fn deep_copy(&self) -> Result<List<D>, Error> {
        if self.copy.is_none() {
            return Err(Error::MissingCallback);
        }
        let mut copied = self.empty_like(true);
        for data in self.iter() {
            copied.push_back(self.copy_data(data)?)?;
        }
        Ok(copied)
    }

    /// Deep copy with `f` applied to each copied item. The source is not touched.
    pub fn map_new(&self, f: impl FnMut(&mut D)) -> Result<List<D>, Error> {
        let mut mapped = self.deep_copy()?;
        mapped.map(f);
        Ok(mapped)
    }

    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none(), "head and tail disagree on emptiness");
        assert_eq!(self.head.is_none(), self.len == 0, "head disagrees with len");

        let mut forward = Vec::new();
        let mut cur = self.head;
        let mut prev = None;
        while let Some(index) = cur {
            let node = self.nodes.node(index);
            assert_eq!(prev, node.prev, "broken prev link at slot {}", index);
            forward.push(index);
            assert!(forward.len() <= self.len, "forward walk longer than len");
            prev = cur;
            cur = node.next;
        }
        assert_eq!(self.tail, prev, "forward walk does not end at tail");

        let mut backward = Vec::new();
        let mut cur = self.tail;
        while let Some(index) = cur {
            backward.push(index);
            assert!(backward.len() <= self.len, "backward walk longer than len");
            cur = self.nodes.node(index).prev;
        }
        backward.reverse();
        assert_eq!(self.len, forward.len());
        assert_eq!(forward, backward);
    }
}

/// Shallow copies hand out clones of `D`. For `Rc` or reference data that means the copy
/// shares the items, so shallow copies never get a `free` callback.
impl<D: Clone> List<D> {
    /// Data of `node`, duplicated by `copy` when `deep`, cloned otherwise.
    pub fn copy_node(&self, node: NodeId, deep: bool) -> Result<D, Error> {
        if deep {
            self.copy_node_deep(node)
        } else {
            Ok(self.get(node)?.clone())
        }
    }

    /// Copy of the whole list. A shallow copy keeps `copy` and `compare` but drops `free`.
    pub fn copy(&self, deep: bool) -> Result<List<D>, Error> {
        if deep {
            return self.deep_copy();
        }
        let mut copied = self.empty_like(false);
        for data in self.iter() {
            copied.push_back(data.clone())?;
        }
        Ok(copied)
    }

    /// New list with the items matching `pred`, in order. Configuration is inherited the
    /// same way as for [`List::copy`].
    pub fn filter(&self, pred: impl Fn(&D) -> bool, deep: bool) -> Result<List<D>, Error> {
        if deep && self.copy.is_none() {
            return Err(Error::MissingCallback);
        }
        let mut filtered = self.empty_like(deep);
        for data in self.iter().filter(|d| pred(*d)) {
            let item = if deep { self.copy_data(data)? } else { data.clone() };
            filtered.push_back(item)?;
        }
        Ok(filtered)
    }
}

fn link_name(link: Option<u32>) -> String {
    match link {
        Some(index) => index.to_string(),
        None => "none".to_string(),
    }
}

impl<D> Drop for List<D> {
    fn drop(&mut self) {
        if self.free.is_some() {
            let _ = self.clear(false);
        }
    }
}

impl<D> std::fmt::Debug for List<D> where D: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for item in self.iter() {
            list.entry(item);
        }
        list.finish()
    }
}

#[cfg(test)]
mod list_tests {
    use crate::dropflag::{free_log, DropFlag, Tracked};
    use crate::{ContainerIterator, Error, List, MAX_LABEL_LEN};
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    fn values<D: Copy>(list: &List<D>) -> Vec<D> {
        list.iter().copied().collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list: List<i32> = List::new("empty");
        assert!(list.is_empty());
        assert_eq!(None, list.head());
        assert_eq!(None, list.tail());
        assert_eq!("empty", list.label());
        assert!(!list.has_free() && !list.has_copy() && !list.has_compare());
        list.check_links();
    }

    #[test]
    fn long_label_is_truncated_on_char_boundary() {
        let label = "é".repeat(40);
        let list: List<i32> = List::new(&label);
        assert!(list.label().len() <= MAX_LABEL_LEN);
        assert_eq!(31, list.label().chars().count());
    }

    #[test]
    fn front_push_and_pop_is_a_stack() {
        let mut list = List::new("stack");
        for i in 0..10 {
            list.push_front(i).unwrap();
        }
        list.check_links();
        let popped: Vec<i32> = (0..10).map(|_| list.pop_front().unwrap()).collect();
        assert_eq!((0..10).rev().collect::<Vec<_>>(), popped);
        assert!(list.is_empty());
        list.check_links();
    }

    #[test]
    fn front_push_and_back_pop_is_a_queue() {
        let mut list = List::new("queue");
        for i in 0..10 {
            list.push_front(i).unwrap();
        }
        let popped: Vec<i32> = (0..10).map(|_| list.pop_back().unwrap()).collect();
        assert_eq!((0..10).collect::<Vec<_>>(), popped);
        list.check_links();
    }

    #[test]
    fn pop_from_empty_reports_no_data() {
        let mut list: List<i32> = List::new("none");
        assert_eq!(Err(Error::NoData), list.pop_front());
        assert_eq!(Err(Error::NoData), list.pop_back());
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut list = List::new("order");
        let head = list.push_back("the head!").unwrap();
        for _ in 0..8 {
            list.push_back("middle").unwrap();
        }
        let tail = list.push_back("the tail!").unwrap();
        assert_eq!(10, list.len());
        assert_eq!(Some(head), list.head());
        assert_eq!(Some(tail), list.tail());
        assert_eq!(Ok(&"the head!"), list.get(head));
        assert_eq!(Ok(&"the tail!"), list.get(tail));
        list.check_links();
    }

    #[test]
    fn pop_never_calls_free() {
        let (freed, free) = free_log::<i32>();
        let mut list = List::new("pop").with_free(free);
        list.push_back(1).unwrap();
        list.push_back(2).unwrap();
        assert_eq!(Ok(1), list.pop_front());
        assert_eq!(Ok(2), list.pop_back());
        assert!(freed.borrow().is_empty());
    }

    #[test]
    fn delete_relinks_and_frees() {
        let (freed, free) = free_log::<i32>();
        let mut list = List::new("delete").with_free(free);
        let nodes: Vec<_> = (0..5).map(|i| list.push_back(i).unwrap()).collect();

        list.delete(nodes[2], false).unwrap();
        list.check_links();
        assert_eq!(vec![0, 1, 3, 4], values(&list));
        assert_eq!(Some(nodes[3]), list.next(nodes[1]));
        assert_eq!(Some(nodes[1]), list.prev(nodes[3]));

        list.delete(nodes[0], false).unwrap();
        list.delete(nodes[4], true).unwrap();
        list.check_links();
        assert_eq!(Some(nodes[1]), list.head());
        assert_eq!(Some(nodes[3]), list.tail());
        assert_eq!(vec![2, 0], *freed.borrow());
    }

    #[test]
    fn delete_rejects_stale_and_foreign_nodes() {
        let mut list = List::new("a");
        let mut other = List::new("b");
        let node = list.push_back(1).unwrap();
        let foreign = other.push_back(1).unwrap();

        assert!(!list.contains(foreign));
        assert_eq!(Err(Error::NotFound), list.delete(foreign, false));
        assert_eq!(1, other.len());

        list.delete(node, false).unwrap();
        assert!(!list.contains(node));
        assert_eq!(Err(Error::NotFound), list.delete(node, false));

        let reused = list.push_back(2).unwrap();
        assert_ne!(node, reused);
        assert_eq!(Err(Error::NotFound), list.get(node));
        assert_eq!(Ok(&2), list.get(reused));
    }

    #[test]
    fn delete_without_free_drops_data() {
        let flag = DropFlag::new(RefCell::new(Vec::new()));
        let mut list = List::new("drops");
        let node = list.push_back(Tracked { value: 7, drops: flag.clone() }).unwrap();
        list.delete(node, false).unwrap();
        assert_eq!(vec![7], *flag.borrow());
    }

    #[test]
    fn remove_hands_data_over() {
        let (freed, free) = free_log::<i32>();
        let mut list = List::new("remove").with_free(free);
        list.push_back(1).unwrap();
        let node = list.push_back(2).unwrap();
        assert_eq!(Ok(2), list.remove(node));
        assert!(freed.borrow().is_empty());
        assert_eq!(vec![1], values(&list));
    }

    #[test]
    fn find_returns_first_match() {
        let list = vec!["alpha", "beta", "beta", "gamma"].into_iter().collect_list("find").unwrap();
        let node = list.find("beta", |d, v| *d == v).unwrap();
        assert_eq!(list.nodes().nth(1), Some(node));
        assert_eq!(Err(Error::NotFound), list.find("delta", |d, v| *d == v));
    }

    #[test]
    fn clear_frees_or_preserves() {
        let (freed, free) = free_log::<i32>();
        let mut list = List::new("clear").with_free(free);
        for i in 0..3 {
            list.push_back(i).unwrap();
        }
        assert_eq!(Ok(()), list.clear(false));
        assert_eq!(vec![0, 1, 2], *freed.borrow());
        assert_eq!(Err(Error::NoOp), list.clear(false));

        list.push_back(9).unwrap();
        list.clear(true).unwrap();
        assert_eq!(3, freed.borrow().len());
        list.check_links();
    }

    #[test]
    fn drop_frees_remaining_data() {
        let (freed, free) = free_log::<i32>();
        {
            let mut list = List::new("drop").with_free(free);
            list.push_back(1).unwrap();
            list.push_back(2).unwrap();
        }
        assert_eq!(vec![1, 2], *freed.borrow());
    }

    #[test]
    fn shallow_copy_shares_items_and_drops_free() {
        let (freed, free) = free_log::<Rc<i32>>();
        let mut list = List::new("shallow").with_free(free).with_compare(|a: &Rc<i32>, b| a.cmp(b));
        let originals: Vec<Rc<i32>> = (0..3).map(Rc::new).collect();
        for item in &originals {
            list.push_back(item.clone()).unwrap();
        }

        let copy = list.copy(false).unwrap();
        assert!(!copy.has_free());
        assert!(copy.has_compare());
        for (a, b) in copy.iter().zip(originals.iter()) {
            assert!(Rc::ptr_eq(a, b));
        }
        drop(copy);
        assert!(freed.borrow().is_empty());
        copy_node_shallow_is_same_item(&list);
    }

    fn copy_node_shallow_is_same_item(list: &List<Rc<i32>>) {
        let head = list.head().unwrap();
        let item = list.copy_node(head, false).unwrap();
        assert!(Rc::ptr_eq(&item, list.get(head).unwrap()));
    }

    #[test]
    fn deep_copy_makes_new_items() {
        let mut list = List::new("deep").with_copy(|d: &Rc<i32>| Some(Rc::new(**d)));
        for i in 0..3 {
            list.push_back(Rc::new(i)).unwrap();
        }
        let copy = list.copy(true).unwrap();
        assert!(copy.has_copy());
        assert_eq!(3, copy.len());
        for (a, b) in copy.iter().zip(list.iter()) {
            assert_eq!(a, b);
            assert!(!Rc::ptr_eq(a, b));
        }
        let item = list.copy_node(list.tail().unwrap(), true).unwrap();
        assert_eq!(2, *item);
        assert!(!Rc::ptr_eq(&item, list.get(list.tail().unwrap()).unwrap()));
    }

    #[test]
    fn deep_copy_without_copy_callback_fails() {
        let mut list = List::new("no copy");
        list.push_back(1).unwrap();
        assert_eq!(Some(Error::MissingCallback), list.copy(true).err());
        assert_eq!(Some(Error::MissingCallback), list.deep_copy().err());
        assert_eq!(Err(Error::MissingCallback), list.copy_node(list.head().unwrap(), true));
        assert_eq!(Some(Error::MissingCallback), list.filter(|_| true, true).err());
        assert_eq!(Some(Error::MissingCallback), list.map_new(|_| {}).err());
    }

    #[test]
    fn failed_deep_copy_releases_only_new_items() {
        let (freed, free) = free_log::<i32>();
        let mut list = List::new("partial")
            .with_free(free)
            .with_copy(|d: &i32| if *d == 3 { None } else { Some(*d + 100) });
        for i in 1..=4 {
            list.push_back(i).unwrap();
        }
        assert_eq!(Some(Error::CopyFailed), list.deep_copy().err());
        assert_eq!(vec![101, 102], *freed.borrow());
        assert_eq!(vec![1, 2, 3, 4], values(&list));
    }

    #[test]
    fn map_mutates_in_place() {
        let mut list = (1..=3).collect_list("map").unwrap();
        list.map(|d| *d *= 2);
        assert_eq!(vec![2, 4, 6], values(&list));
    }

    #[test]
    fn map_new_leaves_source() {
        let mut list = (1..=3).collect_list("map new").unwrap().with_copy(|d| Some(*d));
        let mapped = list.map_new(|d| *d += 10).unwrap();
        assert_eq!(vec![1, 2, 3], values(&list));
        list.map(|d| *d = 0);
        assert_eq!(vec![11, 12, 13], values(&mapped));
    }

    #[test]
    fn filter_shallow_and_deep() {
        let (freed, free) = free_log::<i32>();
        let list = (1..=6)
            .collect_list("filter")
            .unwrap()
            .with_free(free)
            .with_copy(|d| Some(*d));

        let even = list.filter(|d| d % 2 == 0, false).unwrap();
        assert_eq!(vec![2, 4, 6], values(&even));
        assert!(!even.has_free());

        let odd = list.filter(|d| d % 2 == 1, true).unwrap();
        assert_eq!(vec![1, 3, 5], values(&odd));
        assert!(odd.has_free());
        assert_eq!(6, list.len());

        drop(odd);
        assert_eq!(vec![1, 3, 5], *freed.borrow());
    }

    #[test]
    fn filtered_lists_outlive_source_changes() {
        let mut list = (1..=5)
            .map(Rc::new)
            .collect_list("source")
            .unwrap()
            .with_copy(|d: &Rc<i32>| Some(Rc::new(**d)));

        let deep = list.filter(|d| **d % 2 == 0, true).unwrap();
        let shallow = list.filter(|d| **d % 2 == 0, false).unwrap();

        list.map(|d| *d = Rc::new(0));
        assert_eq!(Ok(()), list.clear(false));
        assert!(list.is_empty());

        let deep_values: Vec<i32> = deep.iter().map(|d| **d).collect();
        let shallow_values: Vec<i32> = shallow.iter().map(|d| **d).collect();
        assert_eq!(vec![2, 4], deep_values);
        assert_eq!(vec![2, 4], shallow_values);
        deep.check_links();
        shallow.check_links();
    }

    #[test]
    fn print_all_writes_label_links_and_data() {
        let list = (1..=2).collect_list("print").unwrap();
        let mut out = Vec::new();
        list.print_all(&mut out, |d: &i32, w: &mut Vec<u8>| writeln!(w, "data: {}", d)).unwrap();
        assert_eq!(
            "list: print\n\n\
             cur: 0\nnext: 1\nprev: none\ndata: 1\n\n\
             cur: 1\nnext: none\nprev: 0\ndata: 2\n\n",
            String::from_utf8(out).unwrap()
        );

        let empty: List<i32> = List::new("nothing");
        let mut out = Vec::new();
        empty.print_all(&mut out, |_: &i32, _: &mut Vec<u8>| Ok(())).unwrap();
        assert_eq!("list: nothing\n\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn print_node_rejects_foreign_handles() {
        let mut list = List::new("print node");
        list.push_back('a').unwrap();
        let b = list.push_back('b').unwrap();

        let mut out = Vec::new();
        list.print_node(b, &mut out, |d: &char, w: &mut Vec<u8>| writeln!(w, "{}", d)).unwrap();
        assert_eq!("cur: 1\nnext: none\nprev: 0\nb\n", String::from_utf8(out).unwrap());

        let mut other = List::new("other");
        let foreign = other.push_back('z').unwrap();
        let mut out = Vec::new();
        let err = list
            .print_node(foreign, &mut out, |d: &char, w: &mut Vec<u8>| writeln!(w, "{}", d))
            .unwrap_err();
        assert_eq!(std::io::ErrorKind::NotFound, err.kind());
        assert_eq!(Some(&Error::NotFound), err.get_ref().and_then(|e| e.downcast_ref::<Error>()));
        assert!(out.is_empty());
    }

    #[test]
    fn node_swap_keeps_handles_in_place() {
        let mut list = List::new("swap");
        let a = list.push_back('a').unwrap();
        let b = list.push_back('b').unwrap();
        let c = list.push_back('c').unwrap();
        list.node_swap(a, c).unwrap();
        assert_eq!(vec!['c', 'b', 'a'], values(&list));
        assert_eq!(Some(a), list.head());
        assert_eq!(Ok(&'c'), list.get(a));
        list.node_swap(b, b).unwrap();
        assert_eq!(vec!['c', 'b', 'a'], values(&list));
        list.check_links();

        let mut other = List::new("other");
        let foreign = other.push_back('z').unwrap();
        assert_eq!(Err(Error::NotFound), list.node_swap(a, foreign));
    }

    #[test]
    fn is_sorted_needs_compare() {
        let list = vec![1, 2, 2, 3].into_iter().collect_list("sorted").unwrap();
        assert_eq!(Err(Error::MissingCallback), list.is_sorted());
        let list = list.with_compare(|a, b| a.cmp(b));
        assert_eq!(Ok(true), list.is_sorted());

        let unsorted = vec![1, 3, 2].into_iter().collect_list("unsorted").unwrap().with_compare(|a, b| a.cmp(b));
        assert_eq!(Ok(false), unsorted.is_sorted());
        let empty = List::new("empty").with_compare(|a: &i32, b| a.cmp(b));
        assert_eq!(Ok(true), empty.is_sorted());
    }

    #[test]
    fn reorder_relinks_existing_nodes() {
        let mut list = (0..4).collect_list("reorder").unwrap();
        let nodes: Vec<_> = list.nodes().collect();
        list.reorder(nodes.iter().rev().copied()).unwrap();
        list.check_links();
        assert_eq!(vec![3, 2, 1, 0], values(&list));
        assert_eq!(Ok(&0), list.get(nodes[0]));

        assert_eq!(Err(Error::OutOfBounds), list.reorder(nodes[..3].iter().copied()));
        assert_eq!(Err(Error::NotFound), list.reorder(vec![nodes[0], nodes[0], nodes[1], nodes[2]]));
        assert_eq!(vec![3, 2, 1, 0], values(&list));
    }

    #[test]
    fn iterates_both_ways() {
        let list = (1..=4).collect_list("iter").unwrap();
        assert_eq!(vec![4, 3, 2, 1], list.iter().rev().copied().collect::<Vec<_>>());
        let mut it = list.iter();
        assert_eq!(Some(&1), it.next());
        assert_eq!(Some(&4), it.next_back());
        assert_eq!(2, it.len());
        assert_eq!(vec![&2, &3], it.collect::<Vec<_>>());
        assert_eq!(list.tail(), list.nodes().next_back());
        assert_eq!("[1, 2, 3, 4]", format!("{:?}", list));
    }
}
