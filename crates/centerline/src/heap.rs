//! Indexed binary min-heap over point ids, keyed by an external value array.
//!
//! Purpose
//! - Drive Fast Marching: always hand out the Considered point with the
//!   smallest tentative arrival time, and re-sift a point in O(log N) after
//!   its value improved.
//!
//! Why this design
//! - Values live outside the heap (the solver owns them and mutates them
//!   between calls), so every ordering operation borrows the value slice.
//! - Heap slots and back-pointers sit behind `Slots`, whose only mutating
//!   primitives (`push`, `swap`, `truncate_last`) update both sides together.
//!   Nothing else can write a location, so `back[heap[k]] == Some(k)` holds
//!   after every call.
//! - Comparisons use `DOUBLE_TOL`: a child is not considered smaller than its
//!   parent unless the difference exceeds the tolerance.

use std::fmt;

use crate::cfg::DOUBLE_TOL;
use crate::mesh::PointId;

/// Errors reported by heap operations. The heap is left unchanged on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// The value slice does not match the size given to `initialize`.
    ValueArrayMismatch { expected: usize, got: usize },
    /// Id outside `[0, N)`.
    IdOutOfRange { id: PointId, size: usize },
    /// `update` on an id that is not in the heap.
    NotInHeap { id: PointId },
    /// `insert` on an id that is already in the heap.
    AlreadyInHeap { id: PointId },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::ValueArrayMismatch { expected, got } => write!(
                f,
                "heap values have {got} entries, heap was initialized for {expected}"
            ),
            HeapError::IdOutOfRange { id, size } => {
                write!(f, "id {id} exceeds heap value array dimension {size}")
            }
            HeapError::NotInHeap { id } => write!(f, "id {id} is not in the heap"),
            HeapError::AlreadyInHeap { id } => write!(f, "id {id} is already in the heap"),
        }
    }
}

impl std::error::Error for HeapError {}

/// Heap slots paired with back-pointers (id → slot).
#[derive(Clone, Debug, Default)]
struct Slots {
    heap: Vec<PointId>,
    back: Vec<Option<usize>>,
}

impl Slots {
    fn reset(&mut self, n: usize) {
        self.heap.clear();
        self.back.clear();
        self.back.resize(n, None);
    }

    fn push(&mut self, id: PointId) -> usize {
        let loc = self.heap.len();
        self.heap.push(id);
        self.back[id] = Some(loc);
        loc
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.back[self.heap[a]] = Some(a);
        self.back[self.heap[b]] = Some(b);
    }

    /// Drop the last slot and clear its back-pointer.
    fn truncate_last(&mut self) -> Option<PointId> {
        let id = self.heap.pop()?;
        self.back[id] = None;
        Some(id)
    }

    #[inline]
    fn id_at(&self, loc: usize) -> PointId {
        self.heap[loc]
    }

    #[inline]
    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Indexed min-heap over ids `0..N`.
#[derive(Clone, Debug, Default)]
pub struct MinHeap {
    slots: Slots,
}

impl MinHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the heap and size the back-pointers for `n` ids.
    ///
    /// Call once the value array length is fixed and before any insert.
    pub fn initialize(&mut self, n: usize) {
        self.slots.reset(n);
    }

    /// Number of ids the heap was initialized for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.back.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Current slot of `id`, `None` when absent or out of range.
    #[inline]
    pub fn location(&self, id: PointId) -> Option<usize> {
        self.slots.back.get(id).copied().flatten()
    }

    #[inline]
    pub fn contains(&self, id: PointId) -> bool {
        self.location(id).is_some()
    }

    /// Id at the root, without removing it.
    #[inline]
    pub fn peek_min(&self) -> Option<PointId> {
        self.slots.heap.first().copied()
    }

    /// Insert `id` and sift it up.
    pub fn insert(&mut self, id: PointId, values: &[f64]) -> Result<(), HeapError> {
        self.check_id(id, values)?;
        if self.contains(id) {
            return Err(HeapError::AlreadyInHeap { id });
        }
        let loc = self.slots.push(id);
        self.sift_up(loc, values);
        Ok(())
    }

    /// Restore order after the value of `id` decreased.
    pub fn update(&mut self, id: PointId, values: &[f64]) -> Result<(), HeapError> {
        self.check_id(id, values)?;
        let loc = self.location(id).ok_or(HeapError::NotInHeap { id })?;
        self.sift_up(loc, values);
        Ok(())
    }

    /// Remove and return the id at the root.
    pub fn pop_min(&mut self, values: &[f64]) -> Result<Option<PointId>, HeapError> {
        self.check_values(values)?;
        let n = self.slots.len();
        if n == 0 {
            return Ok(None);
        }
        self.slots.swap(0, n - 1);
        let min_id = self.slots.truncate_last();
        if !self.is_empty() {
            self.sift_down(0, values);
        }
        Ok(min_id)
    }

    fn check_values(&self, values: &[f64]) -> Result<(), HeapError> {
        if values.len() != self.capacity() {
            return Err(HeapError::ValueArrayMismatch {
                expected: self.capacity(),
                got: values.len(),
            });
        }
        Ok(())
    }

    fn check_id(&self, id: PointId, values: &[f64]) -> Result<(), HeapError> {
        self.check_values(values)?;
        if id >= self.capacity() {
            return Err(HeapError::IdOutOfRange {
                id,
                size: self.capacity(),
            });
        }
        Ok(())
    }

    #[inline]
    fn value_at(&self, loc: usize, values: &[f64]) -> f64 {
        values[self.slots.id_at(loc)]
    }

    fn sift_up(&mut self, mut loc: usize, values: &[f64]) {
        while loc > 0 {
            let parent = (loc - 1) / 2;
            if self.value_at(loc, values) - self.value_at(parent, values) > DOUBLE_TOL {
                return;
            }
            self.slots.swap(loc, parent);
            loc = parent;
        }
    }

    fn sift_down(&mut self, mut loc: usize, values: &[f64]) {
        let n = self.slots.len();
        // Leaves occupy [n/2, n).
        while loc < n / 2 {
            let left = 2 * loc + 1;
            let right = left + 1;
            let mut min_child = left;
            if right < n && self.value_at(left, values) - self.value_at(right, values) > DOUBLE_TOL
            {
                min_child = right;
            }
            if self.value_at(loc, values) - self.value_at(min_child, values) < -DOUBLE_TOL {
                return;
            }
            self.slots.swap(loc, min_child);
            loc = min_child;
        }
    }
}
