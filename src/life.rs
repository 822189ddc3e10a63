use crate::boundary::neighbor_counts;
use crate::grid::{BoundaryCondition, Expansion, Grid};

pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    if alive {
        live_neighbors == 2 || live_neighbors == 3
    } else {
        live_neighbors == 3
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub grid: Grid,
    pub expansion: Expansion,
}

// Under infinite boundaries the grid grows before counting, so edge births fit.
pub fn step(grid: &Grid, boundary: BoundaryCondition) -> Step {
    let expansion = match boundary {
        BoundaryCondition::Infinite => grid.needs_expansion(),
        _ => Expansion::NONE,
    };

    let expanded;
    let source = if expansion.is_empty() {
        grid
    } else {
        expanded = grid.expand(expansion);
        log::debug!(
            "grid expanded to {}x{} ({:?})",
            expanded.width(),
            expanded.height(),
            expansion
        );
        &expanded
    };

    let counts = neighbor_counts(source, boundary);
    let mut next = Grid::new(source.width(), source.height());
    for (i, (&alive, &n)) in source.cells().iter().zip(counts.iter()).enumerate() {
        if next_state(alive, n) {
            next.set(i % source.width(), i / source.width(), true);
        }
    }

    Step {
        grid: next,
        expansion,
    }
}

pub fn next_generation(grid: &Grid, boundary: BoundaryCondition) -> Grid {
    step(grid, boundary).grid
}
