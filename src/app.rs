use crate::config::{
    init_logging, load_settings, project_paths, resolve, save_settings, Args, Settings,
};
use crate::controller::{apply, Command, Flow, Session};
use crate::grid::Grid;
use crate::input::map_key;
use crate::pattern::PatternLibrary;
use crate::storage::{load_library, FilePatternStorage};
use crate::term::{self, CrosstermTerminal, Surface};
use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

const MAX_POLL: Duration = Duration::from_millis(16);

// One command, at most one generation, at most one frame per tick.
pub fn run_loop<R: Rng + ?Sized>(
    surface: &mut dyn Surface,
    mut session: Session,
    library: &PatternLibrary,
    rng: &mut R,
) -> Result<Session> {
    let frame_dt = Duration::from_secs_f64(1.0 / session.renderer.frame_cap_hz.max(1) as f64);
    let mut last_step = Instant::now();
    let mut last_frame: Option<Instant> = None;

    log::info!(
        "loop start: grid {}x{}, {}",
        session.grid.width(),
        session.grid.height(),
        session.boundary()
    );

    loop {
        session = session.with_terminal(surface.size()?);

        let now = Instant::now();
        let step_dt = Duration::from_millis(session.renderer.update_interval_ms);
        let until_step = step_dt.saturating_sub(now.saturating_duration_since(last_step));
        let until_frame = last_frame
            .map(|t| frame_dt.saturating_sub(now.saturating_duration_since(t)))
            .unwrap_or(Duration::ZERO);
        let timeout = until_step.min(until_frame).min(MAX_POLL);

        let command = match surface.poll_key(timeout)? {
            Some(key) => map_key(session.view.pattern_mode, key),
            None => Command::Continue,
        };
        let (next, flow) = apply(session, command, library, rng)?;
        session = next;
        if flow == Flow::Quit {
            break;
        }

        let now = Instant::now();
        if !session.is_paused() && now.saturating_duration_since(last_step) >= step_dt {
            session = session.advance();
            last_step = now;
        }

        let frame_due = last_frame.map_or(true, |t| now.saturating_duration_since(t) >= frame_dt);
        if frame_due || session.view.needs_full_redraw() {
            let (drawn, ops) = session.render(now);
            term::apply(surface, &ops)?;
            session = drawn.settle();
            last_frame = Some(now);
        }
    }

    log::info!("loop stop at generation {}", session.generation);
    Ok(session)
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let paths = project_paths()?;
    let settings = load_settings(&paths.settings_path);
    let (cols, rows) = crossterm::terminal::size()?;
    let (grid_config, renderer) = resolve(&args, &settings, cols, rows)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let library = load_library(&FilePatternStorage::new(&paths.patterns_dir));
    log::info!("{} patterns available", library.len());

    let grid = Grid::random(&grid_config, &mut rng);

    let session = {
        let mut terminal = CrosstermTerminal::begin()?;
        let session = Session::new(grid, grid_config, renderer, terminal.size()?, Instant::now());
        run_loop(&mut terminal, session, &library, &mut rng)?
    };

    if !args.no_save {
        let settings = Settings {
            interval_ms: session.renderer.update_interval_ms,
            density: session.config.density(),
            boundary: session.boundary(),
        };
        save_settings(&paths.settings_path, &settings)?;
    }
    Ok(())
}
