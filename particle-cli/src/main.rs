use anyhow::{Context, Result};
use clap::Parser;
use particle_cli::{check_determinism, run_headless, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let settings = args.settings()?;
    log::info!("Particle runner starting...");
    log::info!("Sketch: {} ({})", settings.sketch, settings.sketch.label());
    log::info!("Seed: {} / noise seed: {}", settings.seed, settings.noise_seed);

    let mut summary = run_headless(&settings, args.frames, args.report_every).context("Run failed")?;

    if args.check_determinism {
        let same = check_determinism(&settings, args.frames).context("Determinism check failed")?;
        log::info!("Deterministic: {}", same);
        summary.deterministic = Some(same);
    }

    log::info!(
        "Finished {} frames: mean speed {:.2}, {} shapes in final render",
        summary.frames,
        summary.mean_speed,
        summary.shapes_drawn
    );

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    println!("{}", json);

    if summary.deterministic == Some(false) {
        anyhow::bail!("Two runs with identical settings diverged");
    }

    Ok(())
}
