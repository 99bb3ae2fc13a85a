//! Fixed-capacity circular list with wraparound indexing
//!
//! A circular list never goes out of range: with four stored elements, index 4
//! refers to the same element as index 0, and index -1 to the last one. Adding
//! to a full list pushes out the element on the opposite end.
//!
//! ```
//! use circular_list::CircularList;
//!
//! let list = CircularList::new(4, vec![1, 2, 3, 4, 5]).unwrap();
//! assert_eq!(list.to_string(), "[2, 3, 4, 5] (4/4 items)");
//! assert_eq!(list.get(-1), Ok(&5));
//! ```

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CircularListError {
    #[error("cannot create a circular list of size 0")]
    InvalidCapacity,

    #[error("cannot index into an empty circular list")]
    EmptyList,
}

/// A ring buffer of at most `size` elements.
///
/// Logical index `i` lives in physical slot `(i + start) % data.len()`.
#[derive(Clone, PartialEq, Eq)]
pub struct CircularList<T> {
    size: usize,
    start: usize,
    data: Vec<T>,
}

impl<T> CircularList<T> {
    /// Create a list holding at most `size` elements.
    ///
    /// When `items` is longer than `size`, only its last `size` elements are
    /// kept, in their original order.
    pub fn new<I>(size: usize, items: I) -> Result<Self, CircularListError>
    where
        I: IntoIterator<Item = T>,
    {
        if size == 0 {
            return Err(CircularListError::InvalidCapacity);
        }

        let mut data: Vec<T> = items.into_iter().collect();
        if data.len() > size {
            data.drain(..data.len() - size);
        }

        Ok(Self {
            size,
            start: 0,
            data,
        })
    }

    /// Get the element at logical position `index`, wrapping in both directions
    pub fn get(&self, index: isize) -> Result<&T, CircularListError> {
        if self.data.is_empty() {
            return Err(CircularListError::EmptyList);
        }

        let len = self.data.len() as isize;
        let slot = (index.rem_euclid(len) + self.start as isize).rem_euclid(len);
        Ok(&self.data[slot as usize])
    }

    /// Add an element at the end, evicting the first one when full
    pub fn append(&mut self, value: T) {
        if self.is_full() {
            self.data[self.start] = value;
        } else {
            self.data.push(value);
        }
        self.start = (self.start + 1) % self.size;
    }

    /// Add an element at the front, evicting the last one when full.
    ///
    /// Below capacity the element is pushed to the backing storage and the
    /// start offset moved onto it, so it becomes first for iteration while
    /// the rest of the order is kept.
    pub fn prepend(&mut self, value: T) {
        if self.is_full() {
            self.start = (self.start + self.size - 1) % self.size;
            self.data[self.start] = value;
        } else {
            self.data.push(value);
            self.start = self.data.len() - 1;
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum number of elements
    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.size
    }

    /// Iterate from the logical first element to the logical last one
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (front, back) = self.data.split_at(self.start.min(self.data.len()));
        back.iter().chain(front.iter())
    }
}

impl<T: Clone> CircularList<T> {
    /// Copy the elements out in logical order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Display for CircularList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, " ({}/{} items)", self.data.len(), self.size)
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CircularList({}, ", self.size)?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}
