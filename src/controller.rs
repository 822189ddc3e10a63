use crate::config::RendererConfig;
use crate::error::ConfigError;
use crate::grid::{BoundaryCondition, Expansion, Grid, GridConfig};
use crate::life::step;
use crate::metrics::Metrics;
use crate::pattern::{self, PatternLibrary, Rotation};
use crate::render::{render_frame, DrawOp, FrameInput, RendererState};
use crate::viewport::{TerminalSize, ViewportState};
use rand::Rng;
use std::time::Instant;

pub const MIN_GRID_DIM: usize = 10;
const GROW_FACTOR: f64 = 1.2;
const SHRINK_FACTOR: f64 = 0.8;
const SIDE_MARGIN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Restart,
    ClearGrid,
    ToggleSimulation,
    SpeedUp,
    SpeedDown,
    CycleBoundary,
    ResizeLarger,
    ResizeSmaller,
    ViewportExpand,
    ViewportShrink,
    ViewportPanLeft,
    ViewportPanRight,
    ViewportPanUp,
    ViewportPanDown,
    TogglePatternMode,
    SelectPattern(usize),
    RotatePattern,
    PlacePattern,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorUp,
    MoveCursorDown,
    ExitPatternMode,
    ToggleDebug,
    Continue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub grid: Grid,
    pub config: GridConfig,
    pub renderer: RendererConfig,
    pub view: RendererState,
    pub metrics: Metrics,
    pub generation: u64,
    pub pending_expansion: Expansion,
    pub term: TerminalSize,
    paused_before_pattern: bool,
}

impl Session {
    pub fn new(
        grid: Grid,
        config: GridConfig,
        renderer: RendererConfig,
        term: TerminalSize,
        now: Instant,
    ) -> Self {
        let viewport = ViewportState::fit(grid.width(), grid.height(), term);
        Self {
            grid,
            config,
            renderer,
            view: RendererState::new(viewport),
            metrics: Metrics::new(now),
            generation: 0,
            pending_expansion: Expansion::NONE,
            term,
            paused_before_pattern: false,
        }
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.config.boundary()
    }

    fn viewport(&self) -> ViewportState {
        self.view.viewport
    }

    fn with_viewport(self, viewport: ViewportState) -> Self {
        Self {
            view: RendererState {
                viewport,
                ..self.view
            },
            ..self
        }
    }

    fn invalidated(self) -> Self {
        Self {
            view: self.view.invalidated(),
            ..self
        }
    }

    fn with_grid(self, grid: Grid) -> Self {
        let viewport = self.viewport().clamped(grid.width(), grid.height());
        Self { grid, ..self }.with_viewport(viewport)
    }

    pub fn with_terminal(self, term: TerminalSize) -> Self {
        if term == self.term {
            return self;
        }
        log::info!("terminal resized to {}x{}", term.cols, term.rows);
        let (gw, gh) = (self.grid.width(), self.grid.height());
        let v = self.viewport();
        let viewport = ViewportState {
            offset_x: v.offset_x,
            offset_y: v.offset_y,
            ..ViewportState::new(
                v.width.min(term.max_cells_wide()),
                v.height.min(term.max_cells_high()),
            )
        }
        .clamped(gw, gh);
        Self { term, ..self }.with_viewport(viewport).invalidated()
    }

    pub fn advance(self) -> Self {
        let stepped = step(&self.grid, self.boundary());
        Self {
            grid: stepped.grid,
            generation: self.generation + 1,
            pending_expansion: self.pending_expansion.merge(stepped.expansion),
            ..self
        }
    }

    pub fn render(self, now: Instant) -> (Self, Vec<DrawOp>) {
        let Session {
            grid,
            config,
            renderer,
            view,
            metrics,
            generation,
            pending_expansion,
            term,
            paused_before_pattern,
        } = self;
        let frame = render_frame(
            &FrameInput {
                grid: &grid,
                boundary: config.boundary(),
                expansion: pending_expansion,
                term,
                config: &renderer,
                generation,
                now,
            },
            view,
            metrics,
        );
        let session = Session {
            grid,
            config,
            renderer,
            view: frame.state,
            metrics: frame.metrics,
            generation,
            pending_expansion,
            term,
            paused_before_pattern,
        };
        (session, frame.ops)
    }

    // Content re-indexed by growth up/left keeps its screen position.
    pub fn settle(self) -> Self {
        let by = self.pending_expansion;
        if by.is_empty() {
            return self;
        }
        let viewport = self
            .viewport()
            .absorb_expansion(by, self.grid.width(), self.grid.height());
        let cursor = (
            self.view.cursor.0 + by.left as isize,
            self.view.cursor.1 + by.up as isize,
        );
        let session = Self {
            pending_expansion: Expansion::NONE,
            ..self
        }
        .with_viewport(viewport);
        Self {
            view: RendererState {
                cursor,
                ..session.view
            },
            ..session
        }
    }

    pub fn is_paused(&self) -> bool {
        self.view.paused
    }
}

fn scaled(dim: usize, factor: f64, max: usize) -> usize {
    let requested = (dim as f64 * factor).round() as usize;
    requested.min(max).max(MIN_GRID_DIM)
}

fn toggle_simulation(s: Session) -> Session {
    Session {
        view: RendererState {
            paused: !s.view.paused,
            ..s.view
        },
        ..s
    }
}

fn cycle_boundary(s: Session) -> Result<Session, ConfigError> {
    let from = s.boundary();
    let to = from.next();
    log::info!("boundary {from} -> {to}");

    if from != BoundaryCondition::Infinite {
        let config = s.config.with_boundary(to);
        return Ok(Session { config, ..s }.invalidated());
    }

    // Leaving the infinite grid: keep the viewport-sized block at the grid origin.
    let v = s.viewport();
    let config = s.config.with_dimensions(v.width, v.height)?.with_boundary(to);
    let grid = s.grid.resize(v.width, v.height);
    log::info!("grid truncated to {}x{}", grid.width(), grid.height());
    let cursor = (
        s.view.cursor.0.rem_euclid(v.width as isize),
        s.view.cursor.1.rem_euclid(v.height as isize),
    );
    let s = Session {
        config,
        pending_expansion: Expansion::NONE,
        view: RendererState { cursor, ..s.view },
        ..s
    }
    .with_grid(grid)
    .with_viewport(ViewportState {
        offset_x: 0,
        offset_y: 0,
        ..v
    });
    Ok(s.invalidated())
}

fn resize_grid(s: Session, larger: bool) -> Result<Session, ConfigError> {
    let factor = if larger { GROW_FACTOR } else { SHRINK_FACTOR };
    let max_w = (s.term.cols as usize).saturating_sub(2 * SIDE_MARGIN) / 2;
    let max_h = s.term.max_cells_high();
    let w = scaled(s.grid.width(), factor, max_w);
    let h = scaled(s.grid.height(), factor, max_h);
    if (w, h) == (s.grid.width(), s.grid.height()) {
        return Ok(s);
    }
    log::info!("grid resized {}x{} -> {w}x{h}", s.grid.width(), s.grid.height());
    let config = s.config.with_dimensions(w, h)?;
    let grid = s.grid.resize(w, h);
    Ok(Session { config, ..s }.with_grid(grid).invalidated())
}

fn enter_pattern_mode(s: Session, library: &PatternLibrary) -> Session {
    let v = s.viewport();
    let cursor = (
        (v.offset_x + v.width.min(s.grid.width()) / 2) as isize,
        (v.offset_y + v.height.min(s.grid.height()) / 2) as isize,
    );
    let selected = s
        .view
        .selected
        .clone()
        .or_else(|| library.get("glider").or_else(|| library.nth(1)).cloned());
    Session {
        paused_before_pattern: s.view.paused,
        view: RendererState {
            pattern_mode: true,
            paused: true,
            cursor,
            selected,
            ..s.view
        },
        ..s
    }
    .invalidated()
}

fn exit_pattern_mode(s: Session) -> Session {
    if !s.view.pattern_mode {
        return s;
    }
    let paused = s.paused_before_pattern;
    Session {
        view: RendererState {
            pattern_mode: false,
            paused,
            selected: None,
            rotation: Rotation::None,
            ..s.view
        },
        ..s
    }
    .invalidated()
}

fn move_cursor(s: Session, dx: isize, dy: isize) -> Session {
    if !s.view.pattern_mode {
        return s;
    }
    let (x, y) = (s.view.cursor.0 + dx, s.view.cursor.1 + dy);
    let cursor = match s.boundary() {
        BoundaryCondition::Infinite => (x, y),
        _ => (
            x.rem_euclid(s.grid.width() as isize),
            y.rem_euclid(s.grid.height() as isize),
        ),
    };
    Session {
        view: RendererState { cursor, ..s.view },
        ..s
    }
}

fn place_pattern(s: Session) -> Session {
    let Some(selected) = s.view.selected.as_ref().filter(|_| s.view.pattern_mode) else {
        return s;
    };
    let grid = pattern::place(&s.grid, selected, s.view.cursor, s.view.rotation, true);
    log::info!(
        "placed {} at {:?} ({}°)",
        selected.name(),
        s.view.cursor,
        s.view.rotation.degrees()
    );
    Session { grid, ..s }
}

pub fn apply<R: Rng + ?Sized>(
    s: Session,
    command: Command,
    library: &PatternLibrary,
    rng: &mut R,
) -> Result<(Session, Flow), ConfigError> {
    let (gw, gh) = (s.grid.width(), s.grid.height());
    let pan = |s: Session, dx: isize, dy: isize| {
        let viewport = s.viewport().pan(dx, dy, gw, gh);
        s.with_viewport(viewport).invalidated()
    };
    let next = match command {
        Command::Quit => return Ok((s, Flow::Quit)),
        Command::Continue => s,
        Command::Restart => {
            log::info!("restart");
            let grid = Grid::random(&s.config, rng);
            Session {
                generation: 0,
                pending_expansion: Expansion::NONE,
                ..s
            }
            .with_grid(grid)
            .invalidated()
        }
        Command::ClearGrid => {
            let grid = s.grid.cleared();
            Session { grid, ..s }
        }
        Command::ToggleSimulation => toggle_simulation(s),
        Command::SpeedUp => Session {
            renderer: s.renderer.faster(),
            ..s
        },
        Command::SpeedDown => Session {
            renderer: s.renderer.slower(),
            ..s
        },
        Command::CycleBoundary => cycle_boundary(s)?,
        Command::ResizeLarger => resize_grid(s, true)?,
        Command::ResizeSmaller => resize_grid(s, false)?,
        Command::ViewportExpand | Command::ViewportShrink => {
            let expand = command == Command::ViewportExpand;
            let viewport = s.viewport().resize(expand, s.term, gw, gh);
            s.with_viewport(viewport).invalidated()
        }
        Command::ViewportPanLeft => pan(s, -1, 0),
        Command::ViewportPanRight => pan(s, 1, 0),
        Command::ViewportPanUp => pan(s, 0, -1),
        Command::ViewportPanDown => pan(s, 0, 1),
        Command::TogglePatternMode => {
            if s.view.pattern_mode {
                exit_pattern_mode(s)
            } else {
                enter_pattern_mode(s, library)
            }
        }
        Command::ExitPatternMode => exit_pattern_mode(s),
        Command::SelectPattern(n) => match library.nth(n).filter(|_| s.view.pattern_mode) {
            Some(p) => Session {
                view: RendererState {
                    selected: Some(p.clone()),
                    ..s.view
                },
                ..s
            },
            None => s,
        },
        Command::RotatePattern if s.view.pattern_mode && s.view.selected.is_some() => Session {
            view: RendererState {
                rotation: s.view.rotation.next(),
                ..s.view
            },
            ..s
        },
        Command::RotatePattern => s,
        Command::PlacePattern => place_pattern(s),
        Command::MoveCursorLeft => move_cursor(s, -1, 0),
        Command::MoveCursorRight => move_cursor(s, 1, 0),
        Command::MoveCursorUp => move_cursor(s, 0, -1),
        Command::MoveCursorDown => move_cursor(s, 0, 1),
        Command::ToggleDebug => Session {
            view: RendererState {
                debug: !s.view.debug,
                ..s.view
            },
            ..s
        },
    };
    Ok((next, Flow::Continue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TERM: TerminalSize = TerminalSize { cols: 200, rows: 60 };

    fn session(grid: Grid, boundary: BoundaryCondition) -> Session {
        let config = GridConfig::new(grid.width(), grid.height(), 0.3, boundary).unwrap();
        Session::new(grid, config, RendererConfig::default(), TERM, Instant::now())
    }

    fn run(s: Session, commands: &[Command]) -> Session {
        let library = PatternLibrary::default();
        let mut rng = StdRng::seed_from_u64(7);
        commands.iter().fold(s, |s, &c| {
            let (s, flow) = apply(s, c, &library, &mut rng).unwrap();
            assert_eq!(flow, Flow::Continue);
            s
        })
    }

    #[test]
    fn quit_stops_and_continue_is_a_no_op() {
        let s = session(Grid::new(12, 12), BoundaryCondition::Finite);
        let library = PatternLibrary::default();
        let mut rng = StdRng::seed_from_u64(1);
        let (s, flow) = apply(s, Command::Continue, &library, &mut rng).unwrap();
        assert_eq!(flow, Flow::Continue);
        let (_, flow) = apply(s, Command::Quit, &library, &mut rng).unwrap();
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn boundary_cycles_in_order_and_keeps_content() {
        let grid = Grid::from_ascii(&["o...", ".o..", "..o.", "...o"]);
        let s = session(grid.clone(), BoundaryCondition::Finite);
        let s = run(s, &[Command::CycleBoundary]);
        assert_eq!(s.boundary(), BoundaryCondition::Toroidal);
        assert_eq!(s.grid, grid);
        assert!(s.view.needs_full_redraw());
        let s = run(s, &[Command::CycleBoundary]);
        assert_eq!(s.boundary(), BoundaryCondition::Infinite);
        assert_eq!(s.grid, grid);
    }

    #[test]
    fn leaving_infinite_truncates_to_viewport() {
        let mut grid = Grid::new(60, 40);
        grid.set(0, 0, true);
        grid.set(19, 9, true);
        grid.set(25, 5, true);
        grid.set(3, 30, true);
        let mut s = session(grid, BoundaryCondition::Infinite);
        s = s.with_viewport(ViewportState {
            offset_x: 5,
            offset_y: 3,
            ..ViewportState::new(20, 10)
        });

        let s = run(s, &[Command::CycleBoundary]);
        assert_eq!(s.boundary(), BoundaryCondition::Finite);
        assert_eq!((s.grid.width(), s.grid.height()), (20, 10));
        assert_eq!((s.config.width(), s.config.height()), (20, 10));
        assert!(s.grid.get(0, 0));
        assert!(s.grid.get(19, 9));
        assert_eq!(s.grid.population(), 2);
        assert_eq!((s.view.viewport.offset_x, s.view.viewport.offset_y), (0, 0));
        assert!(s.view.needs_full_redraw());
    }

    #[test]
    fn resize_scales_and_clamps() {
        let s = session(Grid::new(30, 20), BoundaryCondition::Finite);
        let s = run(s, &[Command::ResizeLarger]);
        assert_eq!((s.grid.width(), s.grid.height()), (36, 24));
        assert_eq!(s.config.width(), 36);

        let s = run(s, &[Command::ResizeSmaller, Command::ResizeSmaller]);
        assert_eq!((s.grid.width(), s.grid.height()), (23, 15));
    }

    #[test]
    fn resize_at_limit_is_a_no_op() {
        let mut grid = Grid::new(10, 10);
        grid.set(4, 4, true);
        let drawn = session(grid.clone(), BoundaryCondition::Finite).render(Instant::now()).0;
        let s = run(drawn, &[Command::ResizeSmaller]);
        assert_eq!(s.grid, grid);
        assert!(!s.view.needs_full_redraw());

        // 96 columns leave room for (96 - 8) / 2 = 44 cells across.
        let mut small_term = session(Grid::new(44, 20), BoundaryCondition::Finite);
        small_term.term = TerminalSize::new(96, 60);
        let s = run(small_term, &[Command::ResizeLarger]);
        assert_eq!((s.grid.width(), s.grid.height()), (44, 24));
    }

    #[test]
    fn pattern_mode_pauses_and_restores() {
        let s = session(Grid::new(40, 30), BoundaryCondition::Finite);
        assert!(!s.is_paused());
        let s = run(s, &[Command::TogglePatternMode]);
        assert!(s.view.pattern_mode);
        assert!(s.is_paused());
        assert_eq!(s.view.selected.as_ref().map(|p| p.name()), Some("glider"));
        assert_eq!(s.view.cursor, (20, 15));
        let s = run(s, &[Command::TogglePatternMode]);
        assert!(!s.view.pattern_mode);
        assert!(!s.is_paused());
        assert!(s.view.selected.is_none());

        let s = run(
            s,
            &[Command::ToggleSimulation, Command::TogglePatternMode, Command::ExitPatternMode],
        );
        assert!(s.is_paused());
    }

    #[test]
    fn selection_and_rotation_need_pattern_mode() {
        let s = session(Grid::new(40, 30), BoundaryCondition::Finite);
        let s = run(s, &[Command::SelectPattern(3), Command::RotatePattern]);
        assert!(s.view.selected.is_none());
        assert_eq!(s.view.rotation, Rotation::None);

        let s = run(
            s,
            &[Command::TogglePatternMode, Command::SelectPattern(3), Command::RotatePattern],
        );
        assert_eq!(s.view.selected.as_ref().map(|p| p.name()), Some("block"));
        assert_eq!(s.view.rotation, Rotation::Right);

        let s = run(s, &[Command::SelectPattern(42)]);
        assert_eq!(s.view.selected.as_ref().map(|p| p.name()), Some("block"));
    }

    #[test]
    fn placing_stamps_at_cursor() {
        let s = session(Grid::new(40, 30), BoundaryCondition::Finite);
        let s = run(
            s,
            &[Command::TogglePatternMode, Command::SelectPattern(3), Command::PlacePattern],
        );
        assert_eq!(s.grid.population(), 4);
        // Block is 2x2, centered on (20, 15).
        assert!(s.grid.get(19, 14) && s.grid.get(20, 15));
        assert!(s.view.selected.is_some());

        let outside = run(s, &[Command::ExitPatternMode, Command::PlacePattern]);
        assert_eq!(outside.grid.population(), 4);
    }

    #[test]
    fn cursor_wraps_unless_infinite() {
        let finite = session(Grid::new(20, 12), BoundaryCondition::Toroidal);
        let mut s = run(finite, &[Command::TogglePatternMode]);
        s.view.cursor = (0, 0);
        let s = run(s, &[Command::MoveCursorLeft, Command::MoveCursorUp]);
        assert_eq!(s.view.cursor, (19, 11));
        let s = run(s, &[Command::MoveCursorRight, Command::MoveCursorDown]);
        assert_eq!(s.view.cursor, (0, 0));

        let infinite = session(Grid::new(20, 12), BoundaryCondition::Infinite);
        let mut s = run(infinite, &[Command::TogglePatternMode]);
        s.view.cursor = (0, 0);
        let s = run(s, &[Command::MoveCursorLeft, Command::MoveCursorUp, Command::MoveCursorUp]);
        assert_eq!(s.view.cursor, (-1, -2));
    }

    #[test]
    fn cursor_ignored_outside_pattern_mode() {
        let s = session(Grid::new(20, 12), BoundaryCondition::Finite);
        let s = run(s, &[Command::MoveCursorRight]);
        assert_eq!(s.view.cursor, (0, 0));
    }

    #[test]
    fn speed_and_debug_toggles() {
        let s = session(Grid::new(20, 12), BoundaryCondition::Finite);
        let s = run(s, &[Command::SpeedUp, Command::ToggleDebug]);
        assert_eq!(s.renderer.update_interval_ms, 160);
        assert!(s.view.debug);
        let s = run(s, &[Command::SpeedDown, Command::SpeedDown]);
        assert_eq!(s.renderer.update_interval_ms, 230);
    }

    #[test]
    fn restart_and_clear() {
        let s = session(Grid::new(30, 30), BoundaryCondition::Finite).advance().advance();
        assert_eq!(s.generation, 2);
        let s = run(s, &[Command::Restart]);
        assert_eq!(s.generation, 0);
        assert!(s.grid.population() > 0);
        assert!(s.view.needs_full_redraw());
        let s = run(s.advance(), &[Command::ClearGrid]);
        assert_eq!(s.grid.population(), 0);
        assert_eq!(s.generation, 1);
    }

    #[test]
    fn panning_moves_viewport() {
        let s = session(Grid::new(100, 100), BoundaryCondition::Finite);
        let s = s.with_viewport(ViewportState::new(20, 10));
        let s = run(
            s,
            &[Command::ViewportPanRight, Command::ViewportPanDown, Command::ViewportPanDown],
        );
        assert_eq!((s.view.viewport.offset_x, s.view.viewport.offset_y), (1, 2));
        let s = run(
            s,
            &[Command::ViewportPanLeft, Command::ViewportPanLeft, Command::ViewportPanUp],
        );
        assert_eq!((s.view.viewport.offset_x, s.view.viewport.offset_y), (0, 1));
        let s = run(s, &[Command::ViewportShrink]);
        assert_eq!(s.view.viewport.width, 20);
        let s = run(s, &[Command::ViewportExpand]);
        assert_eq!((s.view.viewport.width, s.view.viewport.height), (24, 14));
    }

    #[test]
    fn settle_follows_infinite_growth() {
        let mut grid = Grid::new(30, 30);
        // Blinker on the top-left edge.
        grid.set(0, 1, true);
        grid.set(0, 2, true);
        grid.set(0, 3, true);
        let mut s = session(grid, BoundaryCondition::Infinite);
        s = s.with_viewport(ViewportState {
            offset_x: 2,
            ..ViewportState::new(20, 10)
        });
        s.view.cursor = (5, 5);

        let s = s.advance();
        assert_eq!(s.pending_expansion, Expansion { left: 1, ..Expansion::NONE });
        assert_eq!(s.grid.width(), 31);
        let (s, _) = s.render(Instant::now());
        let s = s.settle();
        assert!(s.pending_expansion.is_empty());
        assert_eq!(s.view.viewport.offset_x, 3);
        assert_eq!(s.view.cursor, (6, 5));
    }

    #[test]
    fn terminal_shrink_reclamps_viewport() {
        let s = session(Grid::new(100, 60), BoundaryCondition::Finite);
        assert_eq!(s.view.viewport.width, 100);
        let (s, _) = s.render(Instant::now());
        let s = s.with_terminal(TerminalSize::new(80, 24));
        assert_eq!((s.view.viewport.width, s.view.viewport.height), (40, 22));
        assert!(s.view.needs_full_redraw());
    }
}
