use crate::components::{Cell, TerrainId};

/// Top terrain layer plus fog-of-war, stored row-major (`y * width + x`).
#[derive(Debug)]
pub struct TileMap {
    width: usize,
    height: usize,
    terrain: Vec<Option<TerrainId>>,
    fog: Vec<bool>,
}

impl TileMap {
    /// New map with no terrain and no fog.
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            terrain: vec![None; size],
            fog: vec![false; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Flat index of a cell, or None when outside the map.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        self.index(cell.x as usize, cell.y as usize)
    }

    /// Inverse of `index_of` for in-range indices.
    pub fn cell_at(&self, index: usize) -> Cell {
        cell_from_index(index, self.width)
    }

    pub fn terrain_at_index(&self, index: usize) -> Option<TerrainId> {
        self.terrain.get(index).copied().flatten()
    }

    pub fn fogged_at_index(&self, index: usize) -> bool {
        self.fog.get(index).copied().unwrap_or(true)
    }

    pub fn get_terrain(&self, x: usize, y: usize) -> Option<TerrainId> {
        self.index(x, y).and_then(|i| self.terrain[i])
    }

    pub fn set_terrain(&mut self, x: usize, y: usize, t: TerrainId) {
        if let Some(i) = self.index(x, y) {
            self.terrain[i] = Some(t);
        }
    }

    /// Fill the whole map with one terrain kind.
    pub fn fill_terrain(&mut self, t: TerrainId) {
        self.terrain.iter_mut().for_each(|slot| *slot = Some(t));
    }

    pub fn is_fogged(&self, x: usize, y: usize) -> bool {
        self.index(x, y).is_none_or(|i| self.fog[i])
    }

    pub fn set_fogged(&mut self, x: usize, y: usize, fogged: bool) {
        if let Some(i) = self.index(x, y) {
            self.fog[i] = fogged;
        }
    }
}

/// Convert a flat row-major index back to a cell for a grid of `width`.
pub fn cell_from_index(index: usize, width: usize) -> Cell {
    if width == 0 {
        return Cell { x: 0, y: 0 };
    }
    Cell {
        x: (index % width) as i32,
        y: (index / width) as i32,
    }
}
