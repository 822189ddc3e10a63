use crate::config::RendererConfig;
use crate::grid::{BoundaryCondition, Expansion, Grid};
use crate::metrics::Metrics;
use crate::pattern::{stamp_cells, Pattern, Rotation};
use crate::viewport::{compute_visible_bounds, ScreenMap, TerminalSize, ViewportState};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Alive,
    Dead,
    Dim,
    PatternPreview,
    Status,
    Menu,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOp {
    ClearScreen,
    MoveAndWrite {
        x: u16,
        y: u16,
        text: String,
        style: Style,
    },
}

impl DrawOp {
    fn write(x: u16, y: u16, text: impl Into<String>, style: Style) -> Self {
        DrawOp::MoveAndWrite {
            x,
            y,
            text: text.into(),
            style,
        }
    }

    pub fn is_chrome(&self) -> bool {
        matches!(
            self,
            DrawOp::MoveAndWrite {
                style: Style::Status | Style::Menu | Style::Dim,
                ..
            }
        )
    }
}

pub type ScreenPos = (u16, u16);

#[derive(Clone, Debug, PartialEq)]
pub struct RendererState {
    // `None` forces the next frame to be a full redraw.
    pub previous_cells: Option<HashMap<ScreenPos, bool>>,
    pub previous_overlay: HashSet<ScreenPos>,
    pub previous_pattern_mode: bool,
    pub pattern_mode: bool,
    pub cursor: (isize, isize),
    pub selected: Option<Pattern>,
    pub rotation: Rotation,
    pub viewport: ViewportState,
    pub paused: bool,
    pub debug: bool,
    pub grid_origin: ScreenPos,
}

impl RendererState {
    pub fn new(viewport: ViewportState) -> Self {
        Self {
            previous_cells: None,
            previous_overlay: HashSet::new(),
            previous_pattern_mode: false,
            pattern_mode: false,
            cursor: (0, 0),
            selected: None,
            rotation: Rotation::None,
            viewport,
            paused: false,
            debug: false,
            grid_origin: (0, 0),
        }
    }

    pub fn invalidated(self) -> Self {
        Self {
            previous_cells: None,
            previous_overlay: HashSet::new(),
            ..self
        }
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.previous_cells.is_none()
    }
}

pub struct FrameInput<'a> {
    pub grid: &'a Grid,
    pub boundary: BoundaryCondition,
    pub expansion: Expansion,
    pub term: TerminalSize,
    pub config: &'a RendererConfig,
    pub generation: u64,
    pub now: Instant,
}

pub struct Frame {
    pub ops: Vec<DrawOp>,
    pub state: RendererState,
    pub metrics: Metrics,
}

fn overlay_cells(
    input: &FrameInput<'_>,
    state: &RendererState,
    map: &ScreenMap,
) -> HashSet<ScreenPos> {
    let Some(pattern) = state.selected.as_ref().filter(|_| state.pattern_mode) else {
        return HashSet::new();
    };
    let (shift_x, shift_y) = match input.boundary {
        BoundaryCondition::Infinite => (input.expansion.left as isize, input.expansion.up as isize),
        _ => (0, 0),
    };
    let anchor = (state.cursor.0 + shift_x, state.cursor.1 + shift_y);
    stamp_cells(pattern, anchor, state.rotation, true)
        .into_iter()
        .filter(|&(x, y)| x >= 0 && y >= 0)
        .filter_map(|(x, y)| map.to_screen(x as usize, y as usize))
        .collect()
}

fn cell_op(pos: ScreenPos, alive: bool, in_overlay: bool, config: &RendererConfig) -> DrawOp {
    let (glyph, style) = if in_overlay {
        (config.cell_alive, Style::PatternPreview)
    } else if alive {
        (config.cell_alive, Style::Alive)
    } else {
        (config.cell_dead, Style::Dead)
    };
    DrawOp::write(pos.0, pos.1, format!("{glyph} "), style)
}

fn fit_line(text: String, cols: usize) -> String {
    let mut line: String = text.chars().take(cols).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(cols - len));
    line
}

fn status_text(input: &FrameInput<'_>, state: &RendererState, m: &Metrics) -> String {
    [
        format!("Gen: {}", m.generation_count),
        format!("Cells: {} (Active: {})", m.total_cells, m.active_cells),
        format!("Births/s: {:.0}", m.birth_rate),
        format!("Deaths/s: {:.0}", m.death_rate),
        format!("FPS: {:.1}", m.actual_fps),
        format!(
            "Interval: {}ms ({:.1} gen/s)",
            input.config.update_interval_ms,
            input.config.generations_per_second()
        ),
        input.boundary.to_string(),
        (if state.paused { "PAUSED" } else { "RUNNING" }).to_string(),
    ]
    .join(" | ")
}

fn debug_text(input: &FrameInput<'_>, state: &RendererState, m: &Metrics) -> String {
    let v = &state.viewport;
    format!(
        " | fps {:.0}/{:.1}/{:.0} | frames {} | view {}x{}+{}+{} | grid {}x{}",
        m.min_fps,
        m.avg_fps,
        m.max_fps,
        m.total_frames,
        v.width,
        v.height,
        v.offset_x,
        v.offset_y,
        input.grid.width(),
        input.grid.height(),
    )
}

const PATTERN_KEYS: [&str; 5] =
    ["1-9 select", "r rotate", "space place", "arrows move", "esc exit"];

const MAIN_KEYS: [&str; 11] = [
    "space run/pause",
    "r restart",
    "c clear",
    "p patterns",
    "b boundary",
    "+/- grid",
    "[/] view",
    "hjkl pan",
    "up/down speed",
    "d debug",
    "q quit",
];

fn menu_text(state: &RendererState) -> String {
    if state.pattern_mode {
        let name = state.selected.as_ref().map(|p| p.name()).unwrap_or("none");
        let (x, y) = state.cursor;
        format!(
            "PATTERN {name} ({}°) at {x},{y} | {}",
            state.rotation.degrees(),
            PATTERN_KEYS.join(" | ")
        )
    } else {
        MAIN_KEYS.join(" | ")
    }
}

fn chrome_ops(input: &FrameInput<'_>, state: &RendererState, m: &Metrics) -> Vec<DrawOp> {
    let cols = input.term.cols as usize;
    let status_y = input.term.rows.saturating_sub(2);
    let menu_y = input.term.rows.saturating_sub(1);
    let status = status_text(input, state, m);
    let mut ops = Vec::with_capacity(3);
    if state.debug {
        let status_len = status.chars().count().min(cols);
        let debug = debug_text(input, state, m);
        let shown: String = status.chars().take(cols).collect();
        ops.push(DrawOp::write(0, status_y, shown, Style::Status));
        ops.push(DrawOp::write(
            status_len as u16,
            status_y,
            fit_line(debug, cols - status_len),
            Style::Dim,
        ));
    } else {
        ops.push(DrawOp::write(0, status_y, fit_line(status, cols), Style::Status));
    }
    ops.push(DrawOp::write(0, menu_y, fit_line(menu_text(state), cols), Style::Menu));
    ops
}

pub fn render_frame(input: &FrameInput<'_>, state: RendererState, metrics: Metrics) -> Frame {
    let grid = input.grid;
    let bounds = compute_visible_bounds(
        &state.viewport,
        input.term,
        grid.width(),
        grid.height(),
        input.boundary,
        input.expansion,
    );
    let map = ScreenMap::centered(input.term, bounds);
    let origin = (map.origin_x, map.origin_y);

    let overlay = overlay_cells(input, &state, &map);

    let mut current = HashMap::with_capacity(bounds.width * bounds.height);
    for y in bounds.start_y..bounds.start_y + bounds.height {
        for x in bounds.start_x..bounds.start_x + bounds.width {
            if let Some(pos) = map.to_screen(x, y) {
                current.insert(pos, grid.get(x, y));
            }
        }
    }

    let full = state.previous_cells.is_none()
        || state.grid_origin != origin
        || state.previous_pattern_mode != state.pattern_mode;

    let mut ops = Vec::new();
    let (mut births, mut deaths) = (0u64, 0u64);

    // Row-major emission keeps output stable between runs.
    let ordered = |map: &HashMap<ScreenPos, bool>| {
        let mut keys: Vec<ScreenPos> = map.keys().copied().collect();
        keys.sort_unstable_by_key(|&(x, y)| (y, x));
        keys
    };

    match state.previous_cells.as_ref().filter(|_| !full) {
        None => {
            ops.push(DrawOp::ClearScreen);
            for pos in ordered(&current) {
                ops.push(cell_op(pos, current[&pos], overlay.contains(&pos), input.config));
            }
        }
        Some(previous) => {
            for pos in ordered(&current) {
                let alive = current[&pos];
                let was_alive = previous.get(&pos).copied();
                let in_overlay = overlay.contains(&pos);
                let overlay_changed = in_overlay != state.previous_overlay.contains(&pos);
                if was_alive != Some(alive) || overlay_changed {
                    ops.push(cell_op(pos, alive, in_overlay, input.config));
                }
                match (was_alive, alive) {
                    (Some(false), true) => births += 1,
                    (Some(true), false) => deaths += 1,
                    _ => {}
                }
            }
        }
    }

    let active = current.values().filter(|&&alive| alive).count();
    let metrics = metrics
        .with_generation(input.generation)
        .record_cells(input.now, grid.width() * grid.height(), active, births, deaths)
        .record_frame(input.now);

    ops.extend(chrome_ops(input, &state, &metrics));

    let pattern_mode = state.pattern_mode;
    let state = RendererState {
        previous_cells: Some(current),
        previous_overlay: overlay,
        previous_pattern_mode: pattern_mode,
        grid_origin: origin,
        ..state
    };

    Frame { ops, state, metrics }
}
