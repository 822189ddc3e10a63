use crate::grid::{BoundaryCondition, GridConfig};
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "lifeterm")]
#[command(about = "Conway's Game of Life in the terminal", long_about = None)]
pub struct Args {
    /// Grid width in cells (0 = fit terminal)
    #[arg(long, default_value_t = 0)]
    pub width: usize,

    /// Grid height in cells (0 = fit terminal)
    #[arg(long, default_value_t = 0)]
    pub height: usize,

    /// Update interval in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Initial density of live cells (0.0-1.0)
    #[arg(long)]
    pub density: Option<f64>,

    /// Boundary condition
    #[arg(long, value_enum)]
    pub boundary: Option<BoundaryCondition>,

    /// Seed for the initial random grid
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write log records to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Don't write settings back on exit
    #[arg(long, default_value_t = false)]
    pub no_save: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub interval_ms: u64,
    pub density: f64,
    pub boundary: BoundaryCondition,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            density: 0.3,
            boundary: BoundaryCondition::Finite,
        }
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub patterns_dir: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let dirs = ProjectDirs::from("org", "lifeterm", "lifeterm")
        .context("no home directory to keep settings in")?;
    let root = dirs.data_local_dir();
    Ok(Paths {
        settings_path: root.join("settings.json"),
        patterns_dir: root.join("patterns"),
    })
}

pub fn load_settings(path: &Path) -> Settings {
    let Ok(text) = fs::read_to_string(path) else {
        return Settings::default();
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("ignoring {}: {e}", path.display());
        Settings::default()
    })
}

pub fn save_settings(path: &Path, s: &Settings) -> Result<()> {
    write_atomic(path, &serde_json::to_vec_pretty(s)?)
}

// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
}

#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    pub cell_alive: char,
    pub cell_dead: char,
    pub update_interval_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub interval_step_ms: u64,
    pub interval_change_factor: f64,
    pub frame_cap_hz: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cell_alive: '■',
            cell_dead: '□',
            update_interval_ms: 200,
            min_interval_ms: 10,
            max_interval_ms: 1000,
            interval_step_ms: 10,
            interval_change_factor: 0.2,
            frame_cap_hz: 60,
        }
    }
}

impl RendererConfig {
    pub fn with_interval(&self, ms: u64) -> Self {
        Self {
            update_interval_ms: ms.clamp(self.min_interval_ms, self.max_interval_ms),
            ..self.clone()
        }
    }

    fn interval_change(&self) -> u64 {
        let proportional =
            (self.update_interval_ms as f64 * self.interval_change_factor).round() as u64;
        proportional.max(self.interval_step_ms)
    }

    fn round_to_step(&self, ms: u64) -> u64 {
        let step = self.interval_step_ms.max(1);
        ((ms as f64 / step as f64).round() as u64) * step
    }

    pub fn faster(&self) -> Self {
        let next = self.update_interval_ms.saturating_sub(self.interval_change());
        self.with_interval(self.round_to_step(next))
    }

    pub fn slower(&self) -> Self {
        let next = self.update_interval_ms + self.interval_change();
        self.with_interval(self.round_to_step(next))
    }

    pub fn generations_per_second(&self) -> f64 {
        1000.0 / self.update_interval_ms.max(1) as f64
    }
}

pub const MIN_AUTO_WIDTH: usize = 30;
pub const MIN_AUTO_HEIGHT: usize = 20;

pub fn auto_dimensions(
    width: usize,
    height: usize,
    term_cols: u16,
    term_rows: u16,
) -> (usize, usize) {
    let w = if width > 0 {
        width
    } else {
        ((term_cols as usize).saturating_sub(12) / 2).max(MIN_AUTO_WIDTH)
    };
    let h = if height > 0 {
        height
    } else {
        (term_rows as usize).saturating_sub(8).max(MIN_AUTO_HEIGHT)
    };
    (w, h)
}

pub fn resolve(
    args: &Args,
    settings: &Settings,
    term_cols: u16,
    term_rows: u16,
) -> Result<(GridConfig, RendererConfig)> {
    let (width, height) = auto_dimensions(args.width, args.height, term_cols, term_rows);
    let grid = GridConfig::new(
        width,
        height,
        args.density.unwrap_or(settings.density),
        args.boundary.unwrap_or(settings.boundary),
    )?;
    let renderer =
        RendererConfig::default().with_interval(args.interval.unwrap_or(settings.interval_ms));
    Ok((grid, renderer))
}

pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        // The UI owns the terminal; stay quiet unless RUST_LOG asks otherwise.
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
            .try_init();
        return Ok(());
    };
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}
