//! `bbc` – run the behavior arbiter against the simulated robot.
//!
//! This binary is the host-side ignition switch for the control loop.  It:
//!
//! 1. Loads `~/.bbc/config.toml` (or `--config`) layered over the stock
//!    tuning of the selected profile, then applies `BBC_*` overrides.
//! 2. Builds a simulated robot, optionally scripted by a `--scenario` file,
//!    and renders its LCD on the terminal.
//! 3. Composes the arbiter for the profile and runs it until Ctrl-C or the
//!    `--iterations` limit, then brakes both wheels.
//!
//! A collaborator that fails to open is reported on the LCD and the process
//! parks until Ctrl-C, the same way the robot halts on a fatal fault.

mod config;
mod console;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bbc_hal::sim::SimWorld;
use bbc_hal::{Brake, Wheels};
use bbc_runtime::{ArbiterConfig, Profile, build_arbiter, init_tracing, report_fatal};
use bbc_types::BbcError;
use clap::Parser;
use colored::Colorize;
use tracing::{error, info, warn};

use crate::console::ConsoleDisplay;

#[derive(Parser, Debug)]
#[command(name = "bbc", version, about = "Behavior-based arbitration control loop")]
struct Cli {
    /// Deployment profile: homing, line, wall, or blob.  Overrides the
    /// config file and `BBC_PROFILE`.
    #[arg(short, long)]
    profile: Option<Profile>,

    /// Config file to load instead of `~/.bbc/config.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TOML file of timed environment events for the simulated robot.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Stop after this many loop iterations.
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Virtual time that passes between iterations, in milliseconds.
    #[arg(long, default_value_t = 1)]
    tick_ms: u64,

    /// Sleep through every simulated delay instead of skipping it.
    #[arg(long)]
    realtime: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if cli.print_config {
        return match config::render(&cfg) {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "Config error".red(), e);
                ExitCode::FAILURE
            }
        };
    }

    print_banner(&cfg);

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the loop …".yellow().bold());
        stop_handler.store(true, Ordering::Release);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; only --iterations will stop the loop");
    }

    match run(&cli, &cfg, &stop) {
        Ok(iterations) => {
            println!(
                "\n  {} {} iteration(s) on profile {}",
                "✓".green().bold(),
                iterations,
                cfg.profile.to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<ArbiterConfig, BbcError> {
    let path = cli.config.clone().unwrap_or_else(config::config_path);
    let profile = cli.profile.or_else(config::profile_from_env);
    let mut cfg = config::load_from(&path, profile)?;
    config::apply_env_overrides(&mut cfg);
    cfg.validate()?;
    info!(path = %path.display(), profile = %cfg.profile, "Configuration loaded");
    Ok(cfg)
}

/// Bring the simulated robot up and run the loop.  Returns the number of
/// iterations performed.
fn run(cli: &Cli, cfg: &ArbiterConfig, stop: &AtomicBool) -> Result<u64, BbcError> {
    let world = SimWorld::new();
    world.set_realtime(cli.realtime);
    if let Some(path) = &cli.scenario {
        let events = scenario::load_scenario(path)?;
        info!(path = %path.display(), events = events.len(), "Scenario loaded");
        for (at, event) in events {
            world.schedule(at, event);
        }
    }

    let mut hw = world
        .builder()
        .with_display(Box::new(ConsoleDisplay::stdout()))
        .build()?;
    let mut arbiter = build_arbiter(cfg);

    if let Err(e) = arbiter.start(&mut hw) {
        report_fatal(hw.display.as_mut(), &e);
        park(stop);
        return Err(e);
    }

    let tick = Duration::from_millis(cli.tick_ms);
    let count = arbiter.run_until(&mut hw, stop, cli.iterations, || world.advance(tick));
    info!(virtual_ms = world.now().as_millis() as u64, "Simulation finished");

    if let Err(e) = hw.motors.stop(Wheels::Both, Brake::On) {
        error!(error = %e, "Failed to brake on shutdown");
    }
    Ok(count)
}

/// Halt in place until the operator interrupts.
fn park(stop: &AtomicBool) {
    println!("  {}", "Halted. Press Ctrl-C to exit.".dimmed());
    while !stop.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(100));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner(cfg: &ArbiterConfig) {
    println!();
    println!("{}", r#"   ___  ___  _____"#.bold().cyan());
    println!("{}", r#"  / _ )/ _ )/ ___/"#.bold().cyan());
    println!("{}", r#" / _  / _  / /__  "#.bold().cyan());
    println!("{}", r#"/____/____/\___/  "#.bold().cyan());
    println!();
    println!(
        "  profile {}  startup {} ms  loop delay {} ms",
        cfg.profile.to_string().bold(),
        cfg.startup_delay_ms,
        cfg.loop_delay_ms
    );
    println!("  {}", "Press Ctrl-C to stop.".dimmed());
    println!();
}
