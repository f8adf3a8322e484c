// Leftist heap: a meldable min-priority queue.
//
// Every node keeps `dist` = 1 + length of its right spine, and the left
// child's `dist` is never smaller than the right child's. Merging walks only
// right spines, so `merge`, `insert` and `extract_min` are O(log n).
//
// Nodes own their children; merge consumes both heaps and returns the
// combined one, so no node is ever detached without being dropped.

use std::cmp::Ordering;

use thiserror::Error;

/// Returned when reading from an empty queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority queue is empty")]
pub struct EmptyQueue;

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Strict ordering used by [`LeftistHeap`]; `less(a, b)` places `a` closer
/// to the top than `b`.
pub trait Comparator<T> {
    fn less(&self, a: &T, b: &T) -> bool;
}

/// Orders by `T: Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    fn less(&self, a: &T, b: &T) -> bool {
        a.cmp(b) == Ordering::Less
    }
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

// ---------------------------------------------------------------------------
// LeftistHeap
// ---------------------------------------------------------------------------

struct Node<T> {
    value: T,
    dist: usize,
    left: Link<T>,
    right: Link<T>,
}

type Link<T> = Option<Box<Node<T>>>;

fn dist<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |n| n.dist)
}

pub struct LeftistHeap<T, C = NaturalOrder> {
    root: Link<T>,
    len: usize,
    cmp: C,
}

impl<T: Ord> LeftistHeap<T, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for LeftistHeap<T, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> LeftistHeap<T, C> {
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn size(&self) -> usize {
        self.len
    }

    /// The minimum element, without removing it.
    pub fn top(&self) -> Result<&T, EmptyQueue> {
        self.root.as_ref().map(|n| &n.value).ok_or(EmptyQueue)
    }

    pub fn insert(&mut self, value: T) {
        let singleton = Box::new(Node {
            value,
            dist: 1,
            left: None,
            right: None,
        });
        let root = self.root.take();
        self.root = merge(Some(singleton), root, &self.cmp);
        self.len += 1;
    }

    /// Remove and return the minimum element.
    pub fn extract_min(&mut self) -> Result<T, EmptyQueue> {
        let node = self.root.take().ok_or(EmptyQueue)?;
        let Node {
            value, left, right, ..
        } = *node;
        self.root = merge(left, right, &self.cmp);
        self.len -= 1;
        Ok(value)
    }

    /// Absorb every element of `other`. `other`'s comparator is discarded.
    pub fn meld(&mut self, mut other: Self) {
        let root = self.root.take();
        self.root = merge(root, other.root.take(), &self.cmp);
        self.len += other.len;
    }
}

impl<T: Ord> FromIterator<T> for LeftistHeap<T, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::new();
        for value in iter {
            heap.insert(value);
        }
        heap
    }
}

fn merge<T, C: Comparator<T>>(x: Link<T>, y: Link<T>, cmp: &C) -> Link<T> {
    let (mut x, mut y) = match (x, y) {
        (None, y) => return y,
        (x, None) => return x,
        (Some(x), Some(y)) => (x, y),
    };
    if cmp.less(&y.value, &x.value) {
        std::mem::swap(&mut x, &mut y);
    }
    let right = x.right.take();
    x.right = merge(right, Some(y), cmp);
    if dist(&x.right) > dist(&x.left) {
        std::mem::swap(&mut x.left, &mut x.right);
    }
    x.dist = dist(&x.right) + 1;
    Some(x)
}

impl<T, C> Drop for LeftistHeap<T, C> {
    fn drop(&mut self) {
        // Left spines can be long; unlink iteratively.
        let mut stack: Vec<Box<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T, C: Comparator<T>>(heap: &mut LeftistHeap<T, C>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(v) = heap.extract_min() {
            out.push(v);
        }
        out
    }

    #[test]
    fn single_element_lifecycle() {
        let cmp = |a: &(&'static str, u32), b: &(&'static str, u32)| a.1 < b.1;
        let mut heap = LeftistHeap::with_comparator(cmp);
        assert!(heap.is_empty());
        assert_eq!(heap.size(), 0);

        heap.insert(("Shish", 1337));
        assert_eq!(heap.size(), 1);
        assert!(!heap.is_empty());
        assert_eq!(heap.top().unwrap(), &("Shish", 1337));
        assert_eq!(heap.extract_min().unwrap(), ("Shish", 1337));
        assert!(heap.is_empty());
    }

    #[test]
    fn empty_queue_errors() {
        let mut heap: LeftistHeap<u32> = LeftistHeap::new();
        assert_eq!(heap.top(), Err(EmptyQueue));
        assert_eq!(heap.extract_min(), Err(EmptyQueue));
    }

    #[test]
    fn extracts_in_sorted_order() {
        let values = vec![10, 4, 5, 10, 1, 7, 3, 3, 9];
        let mut heap: LeftistHeap<i32> = values.iter().copied().collect();
        let mut expected = values;
        expected.sort();
        assert_eq!(drain(&mut heap), expected);
    }

    #[test]
    fn custom_comparator_sum_order() {
        let cmp = |a: &(u32, u32), b: &(u32, u32)| a.0 + a.1 < b.0 + b.1;
        let mut heap = LeftistHeap::with_comparator(cmp);
        for v in [(5, 5), (2, 2), (4, 1), (5, 5), (0, 1)] {
            heap.insert(v);
        }
        let sums: Vec<u32> = drain(&mut heap).iter().map(|(a, b)| a + b).collect();
        assert_eq!(sums, [1, 4, 5, 10, 10]);
    }

    #[test]
    fn meld_combines_sizes_and_order() {
        let mut a: LeftistHeap<u32> = [8, 2, 6].into_iter().collect();
        let b: LeftistHeap<u32> = [7, 1, 9, 3].into_iter().collect();
        a.meld(b);
        assert_eq!(a.size(), 7);
        assert_eq!(drain(&mut a), [1, 2, 3, 6, 7, 8, 9]);
    }

    #[test]
    fn interleaved_insert_extract() {
        let mut heap = LeftistHeap::new();
        heap.insert(5u64);
        heap.insert(1);
        assert_eq!(heap.extract_min().unwrap(), 1);
        heap.insert(0);
        heap.insert(3);
        assert_eq!(*heap.top().unwrap(), 0);
        assert_eq!(drain(&mut heap), [0, 3, 5]);
    }

    #[test]
    fn right_spine_stays_short() {
        let mut heap: LeftistHeap<u32> = (0..4096).rev().collect();
        let root = heap.root.as_ref().unwrap();
        // dist(root) <= log2(n + 1)
        assert!(root.dist <= 13, "dist = {}", root.dist);
        assert_eq!(drain(&mut heap), (0..4096).collect::<Vec<_>>());
    }
}
