/*!

Natural merge sort for [`List`].

The list is carved into runs, maximal stretches that are already non-decreasing, and the
runs are merged pairwise, bottom up, until one run is left:

```text
data:       [1, 1, 3, 7, 2, 4, 5, 6, 2, 3]
partition:  [[1, 1, 3, 7], [2, 4, 5, 6], [2, 3]]
pass 1:     [[1, 1, 2, 3, 4, 5, 6, 7], [2, 3]]
pass 2:     [[1, 1, 2, 2, 3, 3, 4, 5, 6, 7]]
```

Runs hold node handles, never data, so nothing is copied or released while sorting. The
final run is spliced back by relinking the list's own nodes: the list, its handles and its
data all survive the sort, only the order changes.

Sorted input is a single run and costs one linear pass. Otherwise the cost is
O(n log r) comparisons for r runs, with no recursion.

*/

use crate::{Error, List, NodeId};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Node handles of a non-decreasing stretch of a list, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    nodes: VecDeque<NodeId>,
}

impl Run {
    pub fn new() -> Run {
        Run::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Data behind the run's handles.
    pub fn values<'a, D>(&self, list: &'a List<D>) -> Result<Vec<&'a D>, Error> {
        self.nodes.iter().map(|node| list.get(*node)).collect()
    }
}

fn require_compare<D>(list: &List<D>) -> Result<(), Error> {
    if list.has_compare() {
        Ok(())
    } else {
        Err(Error::MissingCallback)
    }
}

/// First node after `start` that is smaller than its predecessor, `None` if the run
/// starting at `start` reaches the tail. The result is the exclusive end of the run.
pub fn run_stop<D>(list: &List<D>, start: NodeId) -> Result<Option<NodeId>, Error> {
    require_compare(list)?;
    if !list.contains(start) {
        return Err(Error::NotFound);
    }
    let mut cur = start;
    while let Some(next) = list.next(cur) {
        if list.compare_nodes(cur, next)? == Ordering::Greater {
            return Ok(Some(next));
        }
        cur = next;
    }
    Ok(None)
}

/// Handles of the nodes from `lower` up to, not including, `upper` (`None` is the end).
pub fn make_run<D>(list: &List<D>, lower: NodeId, upper: Option<NodeId>) -> Result<Run, Error> {
    if !list.contains(lower) {
        return Err(Error::NotFound);
    }
    let mut run = Run::new();
    let mut cur = Some(lower);
    while cur != upper {
        match cur {
            Some(node) => {
                run.nodes.push_back(node);
                cur = list.next(node);
            }
            // walked off the tail without meeting `upper`
            None => return Err(Error::NotFound),
        }
    }
    Ok(run)
}

/// Splits the list into its runs, in list order.
pub fn partition<D>(list: &List<D>) -> Result<VecDeque<Run>, Error> {
    let mut cur = list.head().ok_or(Error::EmptyContainer)?;
    require_compare(list)?;

    let mut runs = VecDeque::new();
    loop {
        let stop = run_stop(list, cur)?;
        runs.push_back(make_run(list, cur, stop)?);
        match stop {
            Some(next) => cur = next,
            None => break,
        }
    }

    debug!("partitioned '{}' ({} nodes) into {} runs", list.label(), list.len(), runs.len());
    Ok(runs)
}

/// Merges two runs of the same list into one.
///
/// The smaller front is taken each step, on a tie the left one, so equal items keep their
/// order. A missing side returns the other side untouched. Both inputs are consumed.
pub fn merge<D>(list: &List<D>, left: Option<Run>, right: Option<Run>) -> Result<Option<Run>, Error> {
    let (mut left, mut right) = match (left, right) {
        (None, None) => return Ok(None),
        (Some(left), None) => return Ok(Some(left)),
        (None, Some(right)) => return Ok(Some(right)),
        (Some(left), Some(right)) => (left, right),
    };
    require_compare(list)?;

    let mut merged = VecDeque::with_capacity(left.len() + right.len());
    while let (Some(&l), Some(&r)) = (left.nodes.front(), right.nodes.front()) {
        if list.compare_nodes(l, r)? == Ordering::Greater {
            merged.push_back(r);
            right.nodes.pop_front();
        } else {
            merged.push_back(l);
            left.nodes.pop_front();
        }
    }
    merged.append(&mut left.nodes);
    merged.append(&mut right.nodes);

    Ok(Some(Run { nodes: merged }))
}

/// Sorts `list` in place.
///
/// An empty list is left alone. A list without `compare` is `MissingCallback` and is not
/// touched.
pub fn merge_sort<D>(list: &mut List<D>) -> Result<(), Error> {
    if list.is_empty() {
        return Ok(());
    }
    require_compare(list)?;

    let mut runs = partition(list)?;
    while runs.len() > 1 {
        let mut merged = VecDeque::with_capacity((runs.len() + 1) / 2);
        while let Some(left) = runs.pop_front() {
            // odd run out passes through to the next round as is
            let right = runs.pop_front();
            if let Some(run) = merge(list, Some(left), right)? {
                merged.push_back(run);
            }
        }
        debug!("merge pass on '{}' left {} runs", list.label(), merged.len());
        runs = merged;
    }

    match runs.pop_front() {
        Some(sorted) => list.reorder(sorted.nodes),
        None => Ok(()),
    }
}

/// Adjacent swap sort, quadratic. Only good as a reference for small lists.
pub fn bubble_sort<D>(list: &mut List<D>) -> Result<(), Error> {
    if list.is_empty() {
        return Ok(());
    }
    require_compare(list)?;

    loop {
        let mut swapped = false;
        let mut cur = list.head();
        while let Some(node) = cur {
            let next = list.next(node);
            if let Some(next_node) = next {
                if list.compare_nodes(node, next_node)? == Ordering::Greater {
                    list.node_swap(node, next_node)?;
                    swapped = true;
                }
            }
            cur = next;
        }
        if !swapped {
            return Ok(());
        }
    }
}
