use crate::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternCategory {
    StillLife,
    Oscillator,
    Spaceship,
    Gun,
    Methuselah,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMetadata {
    pub name: String,
    pub description: String,
    pub category: PatternCategory,
    pub author: Option<String>,
    pub period: Option<u32>,
    pub year: Option<u32>,
    pub tags: Vec<String>,
}

impl PatternMetadata {
    pub fn new(name: &str, description: &str, category: PatternCategory) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category,
            author: None,
            period: None,
            year: None,
            tags: Vec::new(),
        }
    }

    fn period(mut self, p: u32) -> Self {
        self.period = Some(p);
        self
    }

    fn year(mut self, y: u32) -> Self {
        self.year = Some(y);
        self
    }

    fn author(mut self, a: &str) -> Self {
        self.author = Some(a.to_string());
        self
    }

    fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub metadata: PatternMetadata,
    pub cells: Grid,
}

impl Pattern {
    pub fn new(metadata: PatternMetadata, cells: Grid) -> Self {
        Self { metadata, cells }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Right,
    Flip,
    Left,
}

impl Rotation {
    pub fn turns(self) -> usize {
        match self {
            Rotation::None => 0,
            Rotation::Right => 1,
            Rotation::Flip => 2,
            Rotation::Left => 3,
        }
    }

    pub fn from_turns(turns: usize) -> Self {
        match turns % 4 {
            0 => Rotation::None,
            1 => Rotation::Right,
            2 => Rotation::Flip,
            _ => Rotation::Left,
        }
    }

    pub fn next(self) -> Self {
        Self::from_turns(self.turns() + 1)
    }

    pub fn degrees(self) -> usize {
        self.turns() * 90
    }
}

pub fn rotate(pattern: &Pattern, turns: usize) -> Pattern {
    let mut cells = pattern.cells.clone();
    for _ in 0..turns % 4 {
        let (w, h) = (cells.width(), cells.height());
        let mut next = Grid::new(h, w);
        for y in 0..h {
            for x in 0..w {
                if cells.get(x, y) {
                    next.set(h - 1 - y, x, true);
                }
            }
        }
        cells = next;
    }
    Pattern {
        metadata: pattern.metadata.clone(),
        cells,
    }
}

pub fn centered_origin(
    anchor: (isize, isize),
    pattern: &Pattern,
    rotation: Rotation,
) -> (isize, isize) {
    let (w, h) = if rotation.turns() % 2 == 1 {
        (pattern.height(), pattern.width())
    } else {
        (pattern.width(), pattern.height())
    };
    (anchor.0 - (w / 2) as isize, anchor.1 - (h / 2) as isize)
}

pub fn stamp_cells(
    pattern: &Pattern,
    anchor: (isize, isize),
    rotation: Rotation,
    centered: bool,
) -> Vec<(isize, isize)> {
    let rotated = rotate(pattern, rotation.turns());
    let (ox, oy) = if centered {
        centered_origin(anchor, pattern, rotation)
    } else {
        anchor
    };
    let mut out = Vec::new();
    for y in 0..rotated.height() {
        for x in 0..rotated.width() {
            if rotated.cells.get(x, y) {
                out.push((ox + x as isize, oy + y as isize));
            }
        }
    }
    out
}

// Clipped at the edges whatever the boundary; the grid shape never changes.
pub fn place(
    grid: &Grid,
    pattern: &Pattern,
    anchor: (isize, isize),
    rotation: Rotation,
    centered: bool,
) -> Grid {
    let mut out = grid.clone();
    for (x, y) in stamp_cells(pattern, anchor, rotation, centered) {
        if x >= 0 && y >= 0 {
            out.set(x as usize, y as usize, true);
        }
    }
    out
}

pub fn extract(
    grid: &Grid,
    top_left: (usize, usize),
    bottom_right: (usize, usize),
    metadata: PatternMetadata,
) -> Pattern {
    let (x1, x2) = (top_left.0.min(bottom_right.0), top_left.0.max(bottom_right.0));
    let (y1, y2) = (top_left.1.min(bottom_right.1), top_left.1.max(bottom_right.1));
    let mut cells = Grid::new(x2 - x1 + 1, y2 - y1 + 1);
    for y in y1..=y2 {
        for x in x1..=x2 {
            cells.set(x - x1, y - y1, grid.get(x, y));
        }
    }
    Pattern::new(metadata, cells)
}

pub fn find(grid: &Grid, pattern: &Pattern) -> Vec<(usize, usize)> {
    let (pw, ph) = (pattern.width(), pattern.height());
    if pw == 0 || ph == 0 || pw > grid.width() || ph > grid.height() {
        return Vec::new();
    }
    let mut hits = Vec::new();
    for y in 0..=grid.height() - ph {
        for x in 0..=grid.width() - pw {
            let matches = (0..ph).all(|py| {
                grid.row(y + py)[x..x + pw] == *pattern.cells.row(py)
            });
            if matches {
                hits.push((x, y));
            }
        }
    }
    hits
}

fn builtin(meta: PatternMetadata, rows: &[&str]) -> Pattern {
    Pattern::new(meta, Grid::from_ascii(rows))
}

// Menu order, keys 1..=9.
pub fn builtins() -> Vec<Pattern> {
    use PatternCategory::*;
    vec![
        builtin(
            PatternMetadata::new("glider", "Classic glider that moves diagonally", Spaceship)
                .year(1970)
                .author("Richard K. Guy")
                .tags(&["spaceship", "common"]),
            &[".o.", "..o", "ooo"],
        ),
        builtin(
            PatternMetadata::new("blinker", "Simple period 2 oscillator", Oscillator)
                .period(2)
                .tags(&["oscillator", "common"]),
            &["ooo"],
        ),
        builtin(
            PatternMetadata::new("block", "Stable 2x2 block", StillLife)
                .tags(&["still life", "common"]),
            &["oo", "oo"],
        ),
        builtin(
            PatternMetadata::new("beehive", "Common stable formation", StillLife)
                .year(1970)
                .tags(&["still life", "common"]),
            &[".oo.", "o..o", ".oo."],
        ),
        builtin(
            PatternMetadata::new("pulsar", "Period 3 oscillator", Oscillator)
                .period(3)
                .year(1970)
                .tags(&["oscillator", "common"]),
            &[
                "..ooo...ooo..",
                ".............",
                "o....o.o....o",
                "o....o.o....o",
                "o....o.o....o",
                "..ooo...ooo..",
                ".............",
                "..ooo...ooo..",
                "o....o.o....o",
                "o....o.o....o",
                "o....o.o....o",
                ".............",
                "..ooo...ooo..",
            ],
        ),
        builtin(
            PatternMetadata::new("lwss", "Lightweight spaceship that moves horizontally", Spaceship)
                .period(4)
                .year(1970)
                .tags(&["spaceship", "common"]),
            &[".oooo", "o...o", "o....", "o..o."],
        ),
        builtin(
            PatternMetadata::new("pentadecathlon", "Period 15 oscillator", Oscillator)
                .period(15)
                .year(1970)
                .tags(&["oscillator", "common"]),
            &["..o....o..", "oo.oooo.oo", "..o....o.."],
        ),
        builtin(
            PatternMetadata::new(
                "rpentomino",
                "Methuselah that evolves for 1103 generations",
                Methuselah,
            )
            .year(1970)
            .tags(&["methuselah", "common"]),
            &[".oo", "oo.", ".o."],
        ),
        builtin(
            PatternMetadata::new("gosperglider", "First discovered gun pattern", Gun)
                .period(30)
                .year(1970)
                .author("Bill Gosper")
                .tags(&["gun", "glider"]),
            &[
                "........................o...........",
                "......................o.o...........",
                "............oo......oo............oo",
                "...........o...o....oo............oo",
                "oo........o.....o...oo..............",
                "oo........o...o.oo....o.o...........",
                "..........o.....o.......o...........",
                "...........o...o....................",
                "............oo......................",
            ],
        ),
    ]
}

#[derive(Clone, Debug)]
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self {
            patterns: builtins(),
        }
    }
}

impl PatternLibrary {
    pub fn add(&mut self, pattern: Pattern) {
        if let Some(slot) = self.patterns.iter_mut().find(|p| p.name() == pattern.name()) {
            *slot = pattern;
        } else {
            self.patterns.push(pattern);
        }
    }

    pub fn nth(&self, n: usize) -> Option<&Pattern> {
        n.checked_sub(1).and_then(|i| self.patterns.get(i))
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
