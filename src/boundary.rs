use crate::grid::{BoundaryCondition, Grid};
use rayon::prelude::*;

pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// Toroidal wrap resolves every offset, even when several land on the same cell.
pub fn resolve(
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
    width: usize,
    height: usize,
    boundary: BoundaryCondition,
) -> Option<(usize, usize)> {
    let nx = x as isize + dx;
    let ny = y as isize + dy;
    match boundary {
        BoundaryCondition::Toroidal => Some((
            nx.rem_euclid(width as isize) as usize,
            ny.rem_euclid(height as isize) as usize,
        )),
        BoundaryCondition::Finite | BoundaryCondition::Infinite => {
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                None
            } else {
                Some((nx as usize, ny as usize))
            }
        }
    }
}

pub fn neighbors(
    grid: &Grid,
    x: usize,
    y: usize,
    boundary: BoundaryCondition,
) -> Vec<(usize, usize)> {
    MOORE_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| resolve(x, y, dx, dy, grid.width(), grid.height(), boundary))
        .collect()
}

pub fn live_neighbors(grid: &Grid, x: usize, y: usize, boundary: BoundaryCondition) -> u8 {
    MOORE_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| resolve(x, y, dx, dy, grid.width(), grid.height(), boundary))
        .filter(|&(nx, ny)| grid.get(nx, ny))
        .count() as u8
}

pub fn neighbor_counts(grid: &Grid, boundary: BoundaryCondition) -> Vec<u8> {
    let w = grid.width();
    let mut counts = vec![0u8; grid.cells().len()];
    if w == 0 {
        return counts;
    }
    counts.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, slot) in row.iter_mut().enumerate() {
            *slot = live_neighbors(grid, x, y, boundary);
        }
    });
    counts
}
