#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that validates and headlessly plays Isometric Dimension levels.

mod headless;
mod level_pack;
mod physics;
mod script;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use iso_dimension_core::{Intent, TileEvent};
use iso_dimension_rendering::{Color, Presentation, RenderingBackend, Scene, DEFAULT_VIEW_SIZE};
use iso_dimension_system_flow::{
    ActorModel, AudioBackend, AudioService, FlowConfig, FlowState, GameFlow, Preferences,
};

use self::{headless::HeadlessBackend, level_pack::LevelPack, physics::Body};

#[derive(Parser)]
#[command(
    name = "iso-dimension",
    about = "Validate and play Isometric Dimension level packs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every level of a pack and report its layout
    Validate {
        /// TOML manifest listing the pack's levels
        manifest: PathBuf,

        /// Only validate the numbered level
        #[arg(long)]
        level: Option<u32>,
    },
    /// Play a level headlessly from a scripted input sequence
    Run {
        /// TOML manifest listing the pack's levels
        manifest: PathBuf,

        /// Level number to play
        #[arg(long, default_value = "1")]
        level: u32,

        /// Comma separated `action:seconds` steps, e.g. "upRight:1.5,release:0.5"
        #[arg(long, default_value = "")]
        script: String,

        /// Duration of a simulated frame in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: u64,

        /// Droid model to play with (D42 or T33)
        #[arg(long, default_value = "D42")]
        actor: String,

        /// Keep the background music off
        #[arg(long)]
        no_music: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { manifest, level } => validate(&manifest, level),
        Commands::Run {
            manifest,
            level,
            script,
            frame_ms,
            actor,
            no_music,
        } => run(&manifest, level, &script, frame_ms, &actor, no_music),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn validate(manifest: &Path, only: Option<u32>) -> Result<()> {
    let pack = LevelPack::load(manifest)?;
    let numbers: Vec<u32> = match only {
        Some(number) => vec![number],
        None => pack.numbers().collect(),
    };

    let mut failures = 0;
    for number in numbers {
        let outcome = pack.load_level(number).and_then(|source| {
            iso_dimension_world::decode(&source.raw_map, &source.config)
                .with_context(|| format!("level {number} map is invalid"))
        });
        match outcome {
            Ok(level) => {
                let start = level.start();
                let finish = level.finish();
                println!(
                    "level {number}: {}x{} grid, start ({}, {}), finish ({}, {}), {} teleport pairs",
                    level.size().rows(),
                    level.size().columns(),
                    start.row(),
                    start.column(),
                    finish.row(),
                    finish.column(),
                    level.teleports().count(),
                );
                for (style, link) in level.teleports() {
                    let [first, second] = link.locations();
                    println!(
                        "  {} portals: ({}, {}) <-> ({}, {})",
                        style.name(),
                        first.row(),
                        first.column(),
                        second.row(),
                        second.column()
                    );
                }
            }
            Err(error) => {
                failures += 1;
                println!("level {number}: {error:#}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} level(s) failed validation");
    }
    Ok(())
}

fn run(
    manifest: &Path,
    number: u32,
    script: &str,
    frame_ms: u64,
    actor: &str,
    no_music: bool,
) -> Result<()> {
    let Some(actor_model) = ActorModel::from_name(actor) else {
        bail!("unknown droid model `{actor}`");
    };
    let frame = Duration::from_millis(frame_ms.max(1));
    let inputs = script::frame_inputs(&script::parse(script)?, frame);

    let pack = LevelPack::load(manifest)?;
    let source = pack.load_level(number)?;

    let preferences = Preferences {
        actor_model,
        music_enabled: !no_music,
    };
    let mut audio = AudioService::new(LoggingAudio::default(), preferences.music_enabled);
    audio.start();

    let mut flow = GameFlow::new(FlowConfig::default(), preferences);
    let _ = flow
        .handle(Intent::SelectLevel {
            config: source.config,
            raw_map: source.raw_map,
        })
        .with_context(|| format!("failed to start level {number}"))?;

    let (mut body, scene) = stage(&flow)?;
    let presentation = Presentation::new(
        format!("Isometric Dimension: level {number}"),
        Color::from_rgb_u8(0x1b, 0x1b, 0x2f),
        scene,
    );

    let backend = HeadlessBackend::new(frame, inputs);
    let outcome = backend.run(presentation, |dt, input, scene| {
        if matches!(flow.state(), FlowState::Playing(_)) {
            if input.pause_toggle {
                let intent = if flow.is_paused() {
                    Intent::Resume
                } else {
                    Intent::Pause
                };
                let _ = flow.handle(intent)?;
            }
            if let Some(direction) = input.steer {
                let _ = flow.handle(Intent::Steer(direction))?;
            }
            if input.release {
                let _ = flow.handle(Intent::ReleaseSteering)?;
            }
        }

        if !flow.is_paused() {
            body.step(dt);
        }

        let frame = flow.tick(body.position(), dt, scene.view())?;
        if let Some(impulse) = frame.impulse {
            body.apply_impulse(impulse);
        }
        if let Some(report) = &frame.report {
            scene.apply_visibility(&report.visibility_changes);
            scene.apply_paint_order(&report.paint_order_updates);
            match report.tile_event {
                Some(TileEvent::Teleport {
                    style,
                    from,
                    to,
                    target,
                }) => {
                    body.teleport_to(target);
                    println!(
                        "teleport {}: ({}, {}) -> ({}, {})",
                        style.name(),
                        from.row(),
                        from.column(),
                        to.row(),
                        to.column()
                    );
                }
                Some(TileEvent::Fail) => println!("fell off the level"),
                Some(TileEvent::Complete(summary)) => {
                    println!("reached the finish after {:?}", summary.elapsed);
                }
                None => {}
            }
        }
        for rating in &frame.rating_changes {
            println!("rating dropped to {} star(s)", rating.stars());
        }

        match &frame.transition {
            Some(FlowState::Playing(_)) => {
                println!("restarting level {number}");
                let (restarted, staged) = stage(&flow)?;
                body = restarted;
                *scene = staged;
            }
            Some(FlowState::Completed(summary)) => {
                println!(
                    "level {number} completed with {} star(s)",
                    summary.rating.stars()
                );
            }
            Some(FlowState::Menu) | None => {}
        }

        if let Some(facing) = flow.facing() {
            scene.set_actor(body.position(), facing);
        }
        Ok(())
    });
    audio.shutdown();
    outcome?;

    log::debug!(
        "actor rests at {} with velocity {}",
        body.position(),
        body.velocity()
    );
    match flow.state() {
        FlowState::Menu => println!("final state: menu"),
        FlowState::Playing(_) => {
            let elapsed = flow.clock().map(|clock| clock.elapsed()).unwrap_or_default();
            println!("final state: playing, {elapsed:?} elapsed");
        }
        FlowState::Completed(summary) => println!(
            "final state: completed in {:?} with {} star(s)",
            summary.elapsed,
            summary.rating.stars()
        ),
    }
    Ok(())
}

/// Builds the physics body and the scene of the flow's active run.
fn stage(flow: &GameFlow) -> Result<(Body, Scene)> {
    let simulation = flow.simulation().context("no level is being played")?;
    let spawn = simulation.spawn_position();
    let scene = Scene::from_level(
        simulation.level(),
        simulation.config().projection(),
        spawn,
        flow.preferences().actor_model.name(),
        Vec2::splat(DEFAULT_VIEW_SIZE),
    )?;
    Ok((Body::at(spawn), scene))
}

/// Audio device that only reports what it would play.
#[derive(Debug, Default)]
struct LoggingAudio {
    playing: bool,
}

impl AudioBackend for LoggingAudio {
    fn start_music(&mut self) {
        log::info!("background music started");
        self.playing = true;
    }

    fn stop_music(&mut self) {
        log::info!("background music stopped");
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
