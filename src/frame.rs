// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use tracing::trace;

use crate::cell::{Cell, Style};
use crate::error::{RainError, RainResult};

/// In-memory character grid the rain draws into.
///
/// Cells written since the last commit are tracked so the terminal only
/// repaints what changed. Clearing bumps a generation counter instead of
/// touching every cell.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        let gen = 1u32;
        Self {
            width,
            height,
            cells: vec![blank; len],
            gen,
            cell_gen: vec![gen; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    fn locate(&self, row: u16, col: u16) -> RainResult<usize> {
        if row >= self.height || col >= self.width {
            return Err(RainError::OutOfBounds { row, col });
        }
        Ok(row as usize * self.width as usize + col as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, row: u16, col: u16) -> Option<Cell> {
        self.locate(row, col).ok().map(|i| self.cell_at_index(i))
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    /// Writes one glyph. Writes outside the grid are dropped.
    pub fn set_cell(&mut self, row: u16, col: u16, ch: char, style: Style) {
        let i = match self.locate(row, col) {
            Ok(i) => i,
            Err(e) => {
                trace!(%e, "dropping cell write");
                return;
            }
        };

        let cell = Cell {
            ch,
            style,
            bg: self.blank.bg,
        };
        if self.cell_at_index(i) == cell {
            return;
        }

        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Writes `text` left to right starting at (row, col), clipped at the right edge.
    pub fn put_str(&mut self, row: u16, col: u16, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            let Some(c) = col.checked_add(i as u16) else {
                break;
            };
            if c >= self.width {
                break;
            }
            self.set_cell(row, c, ch, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_makes_cells_effectively_blank() {
        let mut f = Frame::new(2, 2, None);
        f.set_cell(0, 0, 'x', Style::NEUTRAL);
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear();
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut f = Frame::new(3, 2, None);
        f.clear_dirty();
        f.set_cell(2, 0, 'x', Style::NEUTRAL);
        f.set_cell(0, 3, 'x', Style::NEUTRAL);
        assert!(f.dirty_indices().is_empty());
        assert!(f.get(2, 0).is_none());
    }

    #[test]
    fn rewriting_same_cell_is_not_marked_twice() {
        let mut f = Frame::new(4, 4, None);
        f.clear_dirty();
        f.set_cell(1, 2, 'a', Style::NEUTRAL);
        f.set_cell(1, 2, 'b', Style::NEUTRAL);
        assert_eq!(f.dirty_indices(), &[6]);
        assert_eq!(f.get(1, 2).unwrap().ch, 'b');
    }

    #[test]
    fn put_str_clips_at_right_edge() {
        let mut f = Frame::new(4, 1, None);
        f.put_str(0, 2, "abc", Style::NEUTRAL);
        assert_eq!(f.get(0, 2).unwrap().ch, 'a');
        assert_eq!(f.get(0, 3).unwrap().ch, 'b');
    }
}
