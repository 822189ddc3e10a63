use crate::grid::{BoundaryCondition, Expansion};

pub const MIN_VIEWPORT_WIDTH: usize = 20;
pub const MIN_VIEWPORT_HEIGHT: usize = 10;
pub const VIEWPORT_STEP: usize = 4;

// Glyph plus a spacer.
pub const CELL_WIDTH: usize = 2;

pub const RESERVED_ROWS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn max_cells_wide(&self) -> usize {
        self.cols as usize / CELL_WIDTH
    }

    pub fn max_cells_high(&self) -> usize {
        (self.rows as usize).saturating_sub(RESERVED_ROWS)
    }
}

fn max_offset(grid_dim: usize, view_dim: usize) -> usize {
    grid_dim.saturating_sub(view_dim)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportState {
    pub width: usize,
    pub height: usize,
    pub offset_x: usize,
    pub offset_y: usize,
}

impl ViewportState {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(MIN_VIEWPORT_WIDTH),
            height: height.max(MIN_VIEWPORT_HEIGHT),
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub fn fit(grid_width: usize, grid_height: usize, term: TerminalSize) -> Self {
        Self::new(
            grid_width.min(term.max_cells_wide()),
            grid_height.min(term.max_cells_high()),
        )
    }

    pub fn clamped(self, grid_width: usize, grid_height: usize) -> Self {
        Self {
            offset_x: self.offset_x.min(max_offset(grid_width, self.width)),
            offset_y: self.offset_y.min(max_offset(grid_height, self.height)),
            ..self
        }
    }

    pub fn resize(
        self,
        expand: bool,
        term: TerminalSize,
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        let step = |v: usize, min: usize, max: usize| {
            let next = if expand {
                v + VIEWPORT_STEP
            } else {
                v.saturating_sub(VIEWPORT_STEP)
            };
            next.min(max.max(min)).max(min)
        };
        Self {
            width: step(self.width, MIN_VIEWPORT_WIDTH, term.max_cells_wide()),
            height: step(self.height, MIN_VIEWPORT_HEIGHT, term.max_cells_high()),
            ..self
        }
        .clamped(grid_width, grid_height)
    }

    pub fn pan(self, dx: isize, dy: isize, grid_width: usize, grid_height: usize) -> Self {
        let shift = |offset: usize, delta: isize, limit: usize| {
            (offset as isize + delta).clamp(0, limit as isize) as usize
        };
        Self {
            offset_x: shift(self.offset_x, dx, max_offset(grid_width, self.width)),
            offset_y: shift(self.offset_y, dy, max_offset(grid_height, self.height)),
            ..self
        }
    }

    pub fn absorb_expansion(self, by: Expansion, grid_width: usize, grid_height: usize) -> Self {
        Self {
            offset_x: self.offset_x + by.left,
            offset_y: self.offset_y + by.up,
            ..self
        }
        .clamped(grid_width, grid_height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibleBounds {
    pub start_x: usize,
    pub start_y: usize,
    pub width: usize,
    pub height: usize,
}

impl VisibleBounds {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.start_x
            && y >= self.start_y
            && x < self.start_x + self.width
            && y < self.start_y + self.height
    }
}

// Left/top growth since the last settle shifts the origin so cells stay put.
pub fn compute_visible_bounds(
    viewport: &ViewportState,
    term: TerminalSize,
    grid_width: usize,
    grid_height: usize,
    boundary: BoundaryCondition,
    expansion: Expansion,
) -> VisibleBounds {
    let width = viewport.width.min(term.max_cells_wide()).min(grid_width);
    let height = viewport.height.min(term.max_cells_high()).min(grid_height);
    let (shift_x, shift_y) = match boundary {
        BoundaryCondition::Infinite => (expansion.left, expansion.up),
        _ => (0, 0),
    };
    VisibleBounds {
        start_x: (viewport.offset_x + shift_x).min(max_offset(grid_width, width)),
        start_y: (viewport.offset_y + shift_y).min(max_offset(grid_height, height)),
        width,
        height,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenMap {
    pub origin_x: u16,
    pub origin_y: u16,
    pub bounds: VisibleBounds,
}

impl ScreenMap {
    pub fn centered(term: TerminalSize, bounds: VisibleBounds) -> Self {
        let total_w = bounds.width * CELL_WIDTH;
        let total_h = bounds.height;
        let cols = term.cols as usize;
        let usable_h = term.max_cells_high();

        let (origin_x, origin_y) = if cols <= total_w || usable_h <= total_h {
            (0, 0)
        } else {
            let x = (cols / 2).saturating_sub(total_w / 2).min(cols - total_w);
            let y = (usable_h / 2).saturating_sub(total_h / 2).min(usable_h - total_h);
            (x, y)
        };
        Self {
            origin_x: origin_x as u16,
            origin_y: origin_y as u16,
            bounds,
        }
    }

    pub fn to_screen(&self, x: usize, y: usize) -> Option<(u16, u16)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let sx = self.origin_x as usize + (x - self.bounds.start_x) * CELL_WIDTH;
        let sy = self.origin_y as usize + (y - self.bounds.start_y);
        Some((sx as u16, sy as u16))
    }

    pub fn to_grid(&self, sx: u16, sy: u16) -> Option<(usize, usize)> {
        let dx = (sx as usize).checked_sub(self.origin_x as usize)?;
        let dy = (sy as usize).checked_sub(self.origin_y as usize)?;
        let x = self.bounds.start_x + dx / CELL_WIDTH;
        let y = self.bounds.start_y + dy;
        self.bounds.contains(x, y).then_some((x, y))
    }
}
