// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::error::{RainError, RainResult};

/// Columns not currently held by a free-roaming stream.
///
/// `slots` holds the free columns in arbitrary order; `position[c]` is the
/// index of column `c` inside `slots`, so draw, take and release are all O(1).
#[derive(Clone, Debug)]
pub struct ColumnPool {
    slots: Vec<u16>,
    position: Vec<Option<usize>>,
}

impl ColumnPool {
    /// A pool holding every column in `0..width`.
    pub fn full(width: u16) -> Self {
        Self {
            slots: (0..width).collect(),
            position: (0..width as usize).map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, column: u16) -> bool {
        self.position
            .get(column as usize)
            .is_some_and(|p| p.is_some())
    }

    /// Removes and returns a uniformly random free column.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RainResult<u16> {
        if self.slots.is_empty() {
            return Err(RainError::ColumnPoolExhausted);
        }
        let i = rng.random_range(0..self.slots.len());
        Ok(self.remove_at(i))
    }

    /// Removes a specific column, failing if it is not free.
    pub fn take(&mut self, column: u16) -> RainResult<()> {
        match self.position.get(column as usize).copied().flatten() {
            Some(i) => {
                self.remove_at(i);
                Ok(())
            }
            None => Err(RainError::ColumnAlreadyOwned(column)),
        }
    }

    /// Returns a column to the pool. The caller guarantees it is not already free.
    pub fn release(&mut self, column: u16) {
        debug_assert!(!self.contains(column), "column {column} released twice");
        let idx = column as usize;
        if idx >= self.position.len() {
            self.position.resize(idx + 1, None);
        }
        self.position[idx] = Some(self.slots.len());
        self.slots.push(column);
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[u16] {
        &self.slots
    }

    fn remove_at(&mut self, i: usize) -> u16 {
        let column = self.slots.swap_remove(i);
        self.position[column as usize] = None;
        if let Some(&moved) = self.slots.get(i) {
            self.position[moved as usize] = Some(i);
        }
        column
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn draw_removes_each_column_once_then_exhausts() {
        let mut pool = ColumnPool::full(5);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen: Vec<u16> = (0..5).map(|_| pool.draw(&mut rng).unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(pool.draw(&mut rng), Err(RainError::ColumnPoolExhausted));
    }

    #[test]
    fn take_fails_for_owned_column() {
        let mut pool = ColumnPool::full(4);
        pool.take(2).unwrap();
        assert!(!pool.contains(2));
        assert_eq!(pool.take(2), Err(RainError::ColumnAlreadyOwned(2)));
        assert_eq!(pool.take(9), Err(RainError::ColumnAlreadyOwned(9)));
    }

    #[test]
    fn release_makes_column_drawable_again() {
        let mut pool = ColumnPool::full(3);
        pool.take(0).unwrap();
        pool.take(1).unwrap();
        pool.take(2).unwrap();
        assert!(pool.is_empty());
        pool.release(1);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pool.draw(&mut rng), Ok(1));
    }

    #[test]
    fn positions_stay_consistent_after_swap_remove() {
        let mut pool = ColumnPool::full(6);
        pool.take(0).unwrap();
        pool.take(3).unwrap();
        for &c in pool.columns() {
            assert!(pool.contains(c));
        }
        pool.take(5).unwrap();
        pool.take(4).unwrap();
        let mut left = pool.columns().to_vec();
        left.sort_unstable();
        assert_eq!(left, vec![1, 2]);
    }
}
