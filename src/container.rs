/*!

  A growable sequence with a hard capacity.

*/

use crate::error::{Error, Result};

/// An ordered collection that refuses to grow past a fixed capacity.
/// Gates keep their ports in one, circuits keep their gates in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedVec<T> {
    /// Creates an empty collection that holds at most `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Appends `item`. On overflow the collection is left untouched.
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() >= self.capacity {
            return Err(Error::ContainerOverflow {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the first item matching `f`, preserving the order of the rest
    pub fn remove_by(&mut self, f: impl Fn(&T) -> bool) -> Option<T> {
        let pos = self.items.iter().position(f)?;
        Some(self.items.remove(pos))
    }

    /// Returns the number of stored items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the maximum number of items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the item at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the item at `index` mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Iterates over the items in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates mutably over the items in insertion order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Drops every item, keeping the capacity
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Borrows the items as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> BoundedVec<T> {
    /// Removes the first item equal to `item`
    pub fn remove(&mut self, item: &T) -> Option<T> {
        self.remove_by(|x| x == item)
    }
}

impl<T: Clone> BoundedVec<T> {
    /// Appends every item of `src`. Either all of them fit or none are copied.
    pub fn copy_from(&mut self, src: &BoundedVec<T>) -> Result<()> {
        if self.items.len() + src.len() > self.capacity {
            return Err(Error::ContainerOverflow {
                capacity: self.capacity,
            });
        }
        self.items.extend(src.iter().cloned());
        Ok(())
    }
}

impl<T> std::ops::Index<usize> for BoundedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<T> std::ops::IndexMut<usize> for BoundedVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a BoundedVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
