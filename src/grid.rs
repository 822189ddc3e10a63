use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    Finite,
    Toroidal,
    Infinite,
}

impl BoundaryCondition {
    pub fn next(self) -> Self {
        match self {
            BoundaryCondition::Finite => BoundaryCondition::Toroidal,
            BoundaryCondition::Toroidal => BoundaryCondition::Infinite,
            BoundaryCondition::Infinite => BoundaryCondition::Finite,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BoundaryCondition::Finite => "finite",
            BoundaryCondition::Toroidal => "toroidal",
            BoundaryCondition::Infinite => "infinite",
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryCondition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finite" => Ok(BoundaryCondition::Finite),
            "toroidal" => Ok(BoundaryCondition::Toroidal),
            "infinite" => Ok(BoundaryCondition::Infinite),
            _ => Err(ConfigError::Boundary(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    width: usize,
    height: usize,
    density: f64,
    boundary: BoundaryCondition,
}

impl GridConfig {
    pub fn new(
        width: usize,
        height: usize,
        density: f64,
        boundary: BoundaryCondition,
    ) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::Density(density));
        }
        Ok(Self {
            width,
            height,
            density,
            boundary,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn density(&self) -> f64 {
        self.density
    }
    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    pub fn with_dimensions(&self, width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::new(width, height, self.density, self.boundary)
    }

    pub fn with_density(&self, density: f64) -> Result<Self, ConfigError> {
        Self::new(self.width, self.height, density, self.boundary)
    }

    pub fn with_boundary(&self, boundary: BoundaryCondition) -> Self {
        Self { boundary, ..*self }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    pub up: usize,
    pub right: usize,
    pub down: usize,
    pub left: usize,
}

impl Expansion {
    pub const NONE: Expansion = Expansion {
        up: 0,
        right: 0,
        down: 0,
        left: 0,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    pub fn merge(self, other: Expansion) -> Expansion {
        Expansion {
            up: self.up + other.up,
            right: self.right + other.right,
            down: self.down + other.down,
            left: self.left + other.left,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn random<R: Rng + ?Sized>(config: &GridConfig, rng: &mut R) -> Self {
        let n = config.width * config.height;
        let cells = (0..n).map(|_| rng.gen_bool(config.density)).collect();
        Self {
            width: config.width,
            height: config.height,
            cells,
        }
    }

    // `o`, `O`, `#` or `*` is alive; short rows are padded dead.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set(x, y, matches!(ch, 'o' | 'O' | '#' | '*'));
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[self.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            self.cells[i] = alive;
        }
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn cleared(&self) -> Self {
        Self::new(self.width, self.height)
    }

    pub fn resize(&self, new_width: usize, new_height: usize) -> Self {
        let mut out = Self::new(new_width, new_height);
        let copy_w = self.width.min(new_width);
        let copy_h = self.height.min(new_height);
        for y in 0..copy_h {
            let src = &self.row(y)[..copy_w];
            let start = out.idx(0, y);
            out.cells[start..start + copy_w].copy_from_slice(src);
        }
        out
    }

    pub fn expand(&self, by: Expansion) -> Self {
        if by.is_empty() {
            return self.clone();
        }
        let width = self.width + by.left + by.right;
        let height = self.height + by.up + by.down;
        let mut out = Self::new(width, height);
        for y in 0..self.height {
            let start = out.idx(by.left, y + by.up);
            out.cells[start..start + self.width].copy_from_slice(self.row(y));
        }
        out
    }

    pub fn needs_expansion(&self) -> Expansion {
        if self.width == 0 || self.height == 0 {
            return Expansion::NONE;
        }
        let flag = |b: bool| usize::from(b);
        let up = self.row(0).iter().any(|&c| c);
        let down = self.row(self.height - 1).iter().any(|&c| c);
        let left = (0..self.height).any(|y| self.get(0, y));
        let right = (0..self.height).any(|y| self.get(self.width - 1, y));
        Expansion {
            up: flag(up),
            right: flag(right),
            down: flag(down),
            left: flag(left),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn config_rejects_bad_values() {
        assert_eq!(
            GridConfig::new(0, 5, 0.3, BoundaryCondition::Finite),
            Err(ConfigError::ZeroWidth)
        );
        assert_eq!(
            GridConfig::new(5, 0, 0.3, BoundaryCondition::Finite),
            Err(ConfigError::ZeroHeight)
        );
        assert!(matches!(
            GridConfig::new(5, 5, 1.5, BoundaryCondition::Finite),
            Err(ConfigError::Density(_))
        ));
        let cfg = GridConfig::new(5, 5, 0.3, BoundaryCondition::Finite).unwrap();
        assert!(cfg.with_density(-0.1).is_err());
        assert!(cfg.with_dimensions(0, 3).is_err());
        assert_eq!(cfg.with_dimensions(8, 9).unwrap().width(), 8);
        assert_eq!(
            cfg.with_boundary(BoundaryCondition::Infinite).boundary(),
            BoundaryCondition::Infinite
        );
    }

    #[test]
    fn boundary_parses_and_cycles() {
        assert_eq!(
            "Toroidal".parse::<BoundaryCondition>().unwrap(),
            BoundaryCondition::Toroidal
        );
        assert!("mirror".parse::<BoundaryCondition>().is_err());
        let b = BoundaryCondition::Finite;
        assert_eq!(b.next().next().next(), b);
    }

    #[test]
    fn random_density_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty = GridConfig::new(10, 10, 0.0, BoundaryCondition::Finite).unwrap();
        assert_eq!(Grid::random(&empty, &mut rng).population(), 0);
        let full = empty.with_density(1.0).unwrap();
        assert_eq!(Grid::random(&full, &mut rng).population(), 100);
    }

    #[test]
    fn random_density_is_statistically_close() {
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = GridConfig::new(100, 100, 0.3, BoundaryCondition::Finite).unwrap();
        let pop = Grid::random(&cfg, &mut rng).population() as f64;
        let ratio = pop / 10_000.0;
        assert!((0.25..0.35).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn resize_copies_overlap_only() {
        let g = Grid::from_ascii(&["o.o", ".o.", "o.o"]);
        let small = g.resize(2, 2);
        assert_eq!(small, Grid::from_ascii(&["o.", ".o"]));
        let big = g.resize(4, 4);
        assert_eq!(big.width(), 4);
        assert_eq!(big.height(), 4);
        assert_eq!(big.population(), 5);
        assert!(!big.get(3, 3));
    }

    #[test]
    fn expand_up_shifts_rows_down() {
        let g = Grid::from_ascii(&[".o.", "...", "..."]);
        let e = Expansion {
            up: 1,
            ..Expansion::NONE
        };
        let out = g.expand(e);
        assert_eq!(out.height(), 4);
        assert_eq!(out.width(), 3);
        assert!(out.get(1, 1));
        assert!(!out.get(1, 0));
    }

    #[test]
    fn expand_every_side() {
        let g = Grid::from_ascii(&["o"]);
        let out = g.expand(Expansion {
            up: 1,
            right: 1,
            down: 1,
            left: 1,
        });
        assert_eq!(out, Grid::from_ascii(&["...", ".o.", "..."]));
    }

    #[test]
    fn needs_expansion_reports_edges() {
        let g = Grid::from_ascii(&["....", "...o", "....", ".o.."]);
        assert_eq!(
            g.needs_expansion(),
            Expansion {
                up: 0,
                right: 1,
                down: 1,
                left: 0
            }
        );
        let interior = Grid::from_ascii(&["...", ".o.", "..."]);
        assert!(interior.needs_expansion().is_empty());
        assert_eq!(interior.expand(interior.needs_expansion()), interior);
    }

    proptest! {
        #[test]
        fn resize_round_trip_preserves_original(
            w in 1usize..12,
            h in 1usize..12,
            dw in 0usize..6,
            dh in 0usize..6,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let cfg = GridConfig::new(w, h, 0.5, BoundaryCondition::Finite).unwrap();
            let g = Grid::random(&cfg, &mut rng);
            let back = g.resize(w + dw, h + dh).resize(w, h);
            prop_assert_eq!(back, g);
        }
    }
}
