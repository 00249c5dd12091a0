// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    #[cfg(test)]
    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    pub fn set_index(&mut self, i: usize, cell: Cell) {
        let Some(cur) = self.cells.get_mut(i) else {
            return;
        };
        if *cur == cell {
            return;
        }
        *cur = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    #[cfg(test)]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.set_index(i, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char) -> Cell {
        Cell {
            ch,
            ..Cell::BLANK
        }
    }

    #[test]
    fn new_frame_starts_fully_dirty() {
        let mut f = Frame::new(3, 2);
        assert!(f.is_dirty_all());
        f.clear_dirty();
        assert!(!f.has_changes());
    }

    #[test]
    fn unchanged_cells_are_not_tracked() {
        let mut f = Frame::new(2, 2);
        f.clear_dirty();
        f.set(1, 1, Cell::BLANK);
        assert!(!f.has_changes());

        f.set(1, 1, glyph('x'));
        f.set(1, 1, glyph('y'));
        assert_eq!(f.dirty_indices(), &[3]);
        assert_eq!(f.get(1, 1).unwrap().ch, 'y');
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut f = Frame::new(2, 2);
        f.clear_dirty();
        f.set(5, 0, glyph('x'));
        f.set_index(99, glyph('x'));
        assert!(!f.has_changes());
    }
}
