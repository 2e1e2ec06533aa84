//! The interval index -- an augmented AVL tree over half-open time ranges.
//!
//! Nodes are ordered by the composite key `(start, owner_id)` and each node
//! caches `max_end`, the maximum end time anywhere in its subtree. The cache
//! lets overlap queries prune whole subtrees: a left subtree whose `max_end`
//! is at or before the query start cannot contain an overlap, and once a
//! node's start reaches the query end nothing to its right can either.
//!
//! One index mirrors one calendar session's event set. The index is owned by
//! whoever owns that event collection and passed by reference to the query
//! layers -- it is never process-global state.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{Result, SlotError};
use crate::interval::Interval;

/// Augmented self-balancing search tree indexing intervals by start time.
///
/// All mutations keep three invariants: BST order on `(start, owner_id)`,
/// AVL balance (every node's subtree heights differ by at most one), and a
/// consistent `max_end` cache, recomputed bottom-up after every structural
/// change. Each owner id holds at most one interval at a time.
#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    root: Option<Box<Node>>,
    /// Owner id -> start time of the interval it currently holds. Gives O(1)
    /// location of the tree's sort key for removal by owner.
    owners: HashMap<String, DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct Node {
    interval: Interval,
    /// Max end time of any interval in this node's subtree, self included.
    max_end: DateTime<Utc>,
    height: i32,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(interval: Interval) -> Self {
        Self {
            max_end: interval.end,
            interval,
            height: 1,
            left: None,
            right: None,
        }
    }
}

impl IntervalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an interval, keyed by its owner id.
    ///
    /// If the owner already holds an interval, the old one is replaced -- the
    /// authoritative event store sends edits as fresh intervals under the same
    /// id, and the index must mirror the latest state.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidInterval` if `end <= start`.
    pub fn insert(&mut self, interval: Interval) -> Result<()> {
        if interval.end <= interval.start {
            return Err(SlotError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }
        if self.owners.contains_key(&interval.owner_id) {
            self.remove(&interval.owner_id);
        }
        trace!(owner = %interval.owner_id, start = %interval.start, "indexing interval");
        self.owners
            .insert(interval.owner_id.clone(), interval.start);
        self.root = Some(insert_node(self.root.take(), interval));
        Ok(())
    }

    /// Remove the interval held by `owner_id`. Returns whether one was removed.
    pub fn remove(&mut self, owner_id: &str) -> bool {
        let Some(start) = self.owners.remove(owner_id) else {
            return false;
        };
        let (root, removed) = remove_node(self.root.take(), start, owner_id);
        self.root = root;
        debug_assert!(removed, "owner table out of sync with tree");
        trace!(owner = %owner_id, "removed interval");
        removed
    }

    /// All stored intervals overlapping the half-open range `[query_start, query_end)`,
    /// sorted by start time.
    ///
    /// An interval `i` matches iff `i.start < query_end && i.end > query_start`,
    /// so intervals merely adjacent to the range are not returned.
    pub fn find_overlapping(
        &self,
        query_start: DateTime<Utc>,
        query_end: DateTime<Utc>,
    ) -> Vec<Interval> {
        collect_overlapping(&self.root, query_start, query_end)
    }

    /// Number of intervals currently indexed.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Drop every interval.
    pub fn clear(&mut self) {
        self.root = None;
        self.owners.clear();
    }

    /// All stored intervals in start-time order (in-order traversal).
    pub fn all_sorted_by_start(&self) -> Vec<Interval> {
        collect_in_order(&self.root)
    }

    /// Walk the whole tree and panic on any violated structural invariant:
    /// BST order, AVL balance, stale height, stale `max_end`, or an owner
    /// table inconsistent with the tree. Test and diagnostic support only.
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        check_structure(&self.root);
        let in_order = collect_in_order(&self.root);
        assert_eq!(
            in_order.len(),
            self.owners.len(),
            "owner table size diverges from tree size"
        );
        for pair in in_order.windows(2) {
            let a = (pair[0].start, pair[0].owner_id.as_str());
            let b = (pair[1].start, pair[1].owner_id.as_str());
            assert!(a < b, "in-order traversal out of order: {:?} before {:?}", a, b);
        }
        for interval in &in_order {
            assert_eq!(
                self.owners.get(&interval.owner_id),
                Some(&interval.start),
                "owner table entry stale for {}",
                interval.owner_id
            );
        }
    }
}

/// Order an incoming `(start, owner_id)` key against a node's interval.
fn cmp_key(start: DateTime<Utc>, owner_id: &str, node: &Node) -> Ordering {
    start
        .cmp(&node.interval.start)
        .then_with(|| owner_id.cmp(node.interval.owner_id.as_str()))
}

fn height(node: &Option<Box<Node>>) -> i32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn balance_factor(node: &Node) -> i32 {
    height(&node.left) - height(&node.right)
}

/// Recompute this node's cached height and `max_end` from its children.
fn update_cached(node: &mut Node) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    let mut max_end = node.interval.end;
    if let Some(left) = &node.left {
        max_end = max_end.max(left.max_end);
    }
    if let Some(right) = &node.right {
        max_end = max_end.max(right.max_end);
    }
    node.max_end = max_end;
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    match node.left.take() {
        None => node,
        Some(mut pivot) => {
            node.left = pivot.right.take();
            update_cached(&mut node);
            pivot.right = Some(node);
            update_cached(&mut pivot);
            pivot
        }
    }
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    match node.right.take() {
        None => node,
        Some(mut pivot) => {
            node.right = pivot.left.take();
            update_cached(&mut node);
            pivot.left = Some(node);
            update_cached(&mut pivot);
            pivot
        }
    }
}

/// Refresh caches and apply whichever single/double rotation restores the
/// AVL balance at this node.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    update_cached(&mut node);
    let bf = balance_factor(&node);
    if bf > 1 {
        // Left-heavy. A right-leaning left child needs the double rotation.
        if node.left.as_ref().is_some_and(|l| balance_factor(l) < 0) {
            if let Some(left) = node.left.take() {
                node.left = Some(rotate_left(left));
            }
        }
        rotate_right(node)
    } else if bf < -1 {
        if node.right.as_ref().is_some_and(|r| balance_factor(r) > 0) {
            if let Some(right) = node.right.take() {
                node.right = Some(rotate_right(right));
            }
        }
        rotate_left(node)
    } else {
        node
    }
}

fn insert_node(node: Option<Box<Node>>, interval: Interval) -> Box<Node> {
    let Some(mut node) = node else {
        return Box::new(Node::new(interval));
    };
    match cmp_key(interval.start, &interval.owner_id, &node) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), interval)),
        // Equal keys cannot occur: insert() removes an existing owner first.
        _ => node.right = Some(insert_node(node.right.take(), interval)),
    }
    rebalance(node)
}

fn remove_node(
    node: Option<Box<Node>>,
    start: DateTime<Utc>,
    owner_id: &str,
) -> (Option<Box<Node>>, bool) {
    let Some(mut node) = node else {
        return (None, false);
    };
    let removed = match cmp_key(start, owner_id, &node) {
        Ordering::Less => {
            let (child, removed) = remove_node(node.left.take(), start, owner_id);
            node.left = child;
            removed
        }
        Ordering::Greater => {
            let (child, removed) = remove_node(node.right.take(), start, owner_id);
            node.right = child;
            removed
        }
        Ordering::Equal => return (splice_out(node), true),
    };
    (Some(rebalance(node)), removed)
}

/// Remove this node from the tree, returning the subtree that replaces it.
/// With two children, the in-order successor's interval is spliced in and the
/// successor node itself is detached from the right subtree.
fn splice_out(mut node: Box<Node>) -> Option<Box<Node>> {
    match (node.left.take(), node.right.take()) {
        (None, right) => right,
        (left, None) => left,
        (left, Some(right)) => {
            let (rest, successor) = detach_min(right);
            node.interval = successor;
            node.left = left;
            node.right = rest;
            Some(rebalance(node))
        }
    }
}

/// Detach the minimum node of a subtree, returning the rebalanced remainder
/// and the detached interval.
fn detach_min(mut node: Box<Node>) -> (Option<Box<Node>>, Interval) {
    match node.left.take() {
        None => (node.right.take(), node.interval),
        Some(left) => {
            let (rest, min) = detach_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

/// Overlap search with subtree pruning. Each call returns its own result list
/// and the caller concatenates, so no accumulator is shared across the
/// recursion. Left-to-right visit order keeps results sorted by start.
fn collect_overlapping(
    node: &Option<Box<Node>>,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
) -> Vec<Interval> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut found = Vec::new();
    // Descend left only if something there can still end after the query start.
    if node.left.as_ref().is_some_and(|l| l.max_end > query_start) {
        found.extend(collect_overlapping(&node.left, query_start, query_end));
    }
    if node.interval.start < query_end && node.interval.end > query_start {
        found.push(node.interval.clone());
    }
    // Every start in the right subtree is >= this node's start.
    if node.interval.start < query_end {
        found.extend(collect_overlapping(&node.right, query_start, query_end));
    }
    found
}

fn collect_in_order(node: &Option<Box<Node>>) -> Vec<Interval> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut items = collect_in_order(&node.left);
    items.push(node.interval.clone());
    items.extend(collect_in_order(&node.right));
    items
}

/// Bottom-up structural check: returns subtree height, panics on any stale
/// cache or balance violation.
fn check_structure(node: &Option<Box<Node>>) -> i32 {
    let Some(node) = node else {
        return 0;
    };
    let left_height = check_structure(&node.left);
    let right_height = check_structure(&node.right);
    assert!(
        (left_height - right_height).abs() <= 1,
        "balance factor out of range at owner {}",
        node.interval.owner_id
    );
    assert_eq!(
        node.height,
        1 + left_height.max(right_height),
        "stale height at owner {}",
        node.interval.owner_id
    );
    let mut expected_max = node.interval.end;
    if let Some(left) = &node.left {
        expected_max = expected_max.max(left.max_end);
    }
    if let Some(right) = &node.right {
        expected_max = expected_max.max(right.max_end);
    }
    assert_eq!(
        node.max_end, expected_max,
        "stale max_end at owner {}",
        node.interval.owner_id
    );
    node.height
}
