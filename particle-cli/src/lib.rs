use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use particle_core::sketches::SketchKind;
use particle_core::{Canvas, FrameInput, Hsla, PathStyle, Simulation, UpdateMode, Vector2D, Viewport};
use particle_shared::{FrameReport, SimulationSettings};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless runner for the particle sketches", long_about = None)]
pub struct Args {
    /// Sketch to run: leaves, fish or robots
    #[arg(short, long)]
    pub sketch: Option<SketchKind>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// Fixed frame step in seconds
    #[arg(long)]
    pub dt: Option<f32>,

    /// Seed for particle placement (the noise field uses it too unless the config sets one)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the sketch's population
    #[arg(short, long)]
    pub population: Option<usize>,

    /// Update order within a frame
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Viewport width
    #[arg(long)]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(long)]
    pub height: Option<f32>,

    /// JSON settings file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log flock statistics every N frames (0 disables)
    #[arg(short, long, default_value_t = 60)]
    pub report_every: u64,

    /// Run the same settings twice and compare the final state
    #[arg(long)]
    pub check_determinism: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Snapshot,
    Interleaved,
}

impl From<ModeArg> for UpdateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Snapshot => UpdateMode::Snapshot,
            ModeArg::Interleaved => UpdateMode::Interleaved,
        }
    }
}

impl Args {
    /// Settings from the config file (or defaults) with flags applied on top.
    pub fn settings(&self) -> Result<SimulationSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => SimulationSettings::default(),
        };

        if let Some(sketch) = self.sketch {
            settings.sketch = sketch;
        }
        if let Some(dt) = self.dt {
            settings.dt = dt;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
            if self.config.is_none() {
                settings.noise_seed = seed as u32;
            }
        }
        if self.population.is_some() {
            settings.population = self.population;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode.into();
        }
        if self.width.is_some() || self.height.is_some() {
            settings.viewport = Viewport {
                width: self.width.unwrap_or(settings.viewport.width),
                height: self.height.unwrap_or(settings.viewport.height),
            };
        }

        settings
            .validate()
            .context("Invalid simulation settings")?;
        Ok(settings)
    }
}

pub fn load_settings(path: &Path) -> Result<SimulationSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    SimulationSettings::from_json(&json)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Outcome of a headless run, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub label: &'static str,
    pub frames: u64,
    pub mean_speed: f32,
    /// Shapes issued by the last render pass.
    pub shapes_drawn: usize,
    pub deterministic: Option<bool>,
    pub report: FrameReport,
}

/// Step `settings` for `frames` fixed frames, logging flock statistics every
/// `report_every` frames.
pub fn run_headless(settings: &SimulationSettings, frames: u64, report_every: u64) -> Result<RunSummary> {
    let mut simulation = settings
        .build()
        .context("Failed to build simulation")?;

    log::info!(
        "Running {} ({}) with {} particles for {} frames, dt = {}, {:?} mode",
        settings.sketch,
        simulation.label(),
        simulation.population(),
        frames,
        settings.dt,
        settings.mode
    );

    let mut canvas = CountingCanvas::default();
    for i in 0..frames {
        simulation
            .update(&FrameInput::fixed(i, settings.dt))
            .with_context(|| format!("Frame {} failed", i))?;

        if report_every > 0 && (i + 1) % report_every == 0 {
            log_progress(simulation.as_ref());
        }
    }

    simulation.render(&mut canvas, false);

    let report = FrameReport::capture(settings.sketch, simulation.as_ref());
    if report.particles.iter().any(|b| !b.position.is_finite() || !b.velocity.is_finite()) {
        bail!("Simulation produced non-finite state after {} frames", frames);
    }

    Ok(RunSummary {
        label: simulation.label(),
        frames,
        mean_speed: report.mean_speed(),
        shapes_drawn: canvas.shapes,
        deterministic: None,
        report,
    })
}

/// Run the same settings twice and compare every particle's final state.
pub fn check_determinism(settings: &SimulationSettings, frames: u64) -> Result<bool> {
    let first = run_headless(settings, frames, 0)?;
    let second = run_headless(settings, frames, 0)?;
    let same = first.report.particles == second.report.particles;
    if !same {
        log::warn!("Runs diverged after {} frames", frames);
    }
    Ok(same)
}

fn log_progress(simulation: &dyn Simulation) {
    match simulation.flock() {
        Some(flock) => log::debug!(
            "frame {} t={:.2}s center={} velocity={}",
            simulation.frame_count(),
            simulation.elapsed(),
            flock.center,
            flock.velocity
        ),
        None => log::debug!(
            "frame {} t={:.2}s population={}",
            simulation.frame_count(),
            simulation.elapsed(),
            simulation.population()
        ),
    }
}

/// Canvas that only counts what it is asked to draw.
#[derive(Debug, Default)]
pub struct CountingCanvas {
    pub shapes: usize,
    pub backgrounds: usize,
    depth: usize,
    pub max_depth: usize,
}

impl CountingCanvas {
    /// Every push was matched by a pop.
    pub fn balanced(&self) -> bool {
        self.depth == 0
    }
}

impl Canvas for CountingCanvas {
    fn background(&mut self, _color: Hsla) {
        self.backgrounds += 1;
    }

    fn fill(&mut self, _color: Option<Hsla>) {}

    fn stroke(&mut self, _color: Option<Hsla>, _weight: f32) {}

    fn push(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn translate(&mut self, _offset: Vector2D) {}

    fn rotate(&mut self, _angle: f32) {}

    fn scale(&mut self, _sx: f32, _sy: f32) {}

    fn circle(&mut self, _center: Vector2D, _diameter: f32) {
        self.shapes += 1;
    }

    fn rect(&mut self, _origin: Vector2D, _width: f32, _height: f32) {
        self.shapes += 1;
    }

    fn polygon(&mut self, _points: &[Vector2D], _style: PathStyle) {
        self.shapes += 1;
    }

    fn line(&mut self, _from: Vector2D, _to: Vector2D) {
        self.shapes += 1;
    }

    fn text(&mut self, _text: &str, _at: Vector2D) {
        self.shapes += 1;
    }
}
