//! westfield — a morning push on a small west-side airfield.
//!
//! Five flights share one runway and two terminal corridors: three
//! departures push back in quick succession, then two arrivals taxi in
//! against the remaining outbound traffic.  The run writes per-tick CSV
//! snapshots to `output/westfield/`.
//!
//! Pass a JSON config path to override the built-in parameters:
//!
//! ```text
//! cargo run -p westfield -- my-config.json
//! RUST_LOG=asim_schedule=debug cargo run -p westfield
//! ```

mod surface;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use asim_core::{SimConfig, Tick};
use asim_ground::{Flight, FlightKind, GroundSnapshot, Scenario, TickOutcome};
use asim_motion::MotionProfile;
use asim_output::{CsvWriter, OutputWriter, SimOutputObserver};
use asim_schedule::SchedulerConfig;
use asim_sim::{SimBuilder, SimObserver};
use asim_surface::DijkstraRouter;

use surface::build_surface;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Everything numeric, hot-loaded once per run.
#[derive(Debug, Deserialize)]
struct DemoConfig {
    sim: SimConfig,
    motion: MotionProfile,
    scheduler: SchedulerConfig,
}

/// The built-in parameters, used when no config file is given.
const DEFAULT_CONFIG: &str = r#"{
  "sim": {
    "start_unix_secs": 1717225200,
    "tick_duration_secs": 1,
    "total_ticks": 1800,
    "seed": 20240601,
    "reschedule_interval_ticks": 30,
    "output_interval_ticks": 1,
    "close_node_tolerance_m": 3.0,
    "conflict_threshold_m": 30.0,
    "lock_lookahead_m": 120.0,
    "uncertainty_prob": 0.002,
    "departure_interval_ticks": 90,
    "max_active_aircraft": 16
  },
  "motion": {
    "max_speed_mps": 30.0,
    "ideal_taxi_speed_mps": 15.0,
    "ramp_speed_mps": 8.0,
    "pushback_speed_mps": 2.0,
    "accel_mps2": 1.0,
    "brake_mps2": 2.5,
    "min_separation_m": 30.0,
    "ideal_following_m": 120.0,
    "pilot_vision_m": 300.0,
    "follow_accel_gain": 0.6,
    "follow_brake_gain": 1.8,
    "follow_exponent": 0.5
  },
  "scheduler": {
    "lookahead_ticks": 60,
    "max_resolve_attempts": 6
  }
}"#;

fn load_config() -> Result<DemoConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))
        }
        None => Ok(serde_json::from_str(DEFAULT_CONFIG).expect("built-in config parses")),
    }
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Wraps the CSV observer and prints a progress line every simulated minute.
struct ProgressObserver<W: OutputWriter> {
    inner: SimOutputObserver<W>,
    last_active: usize,
}

impl<W: OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, _outcome: TickOutcome) {}

    fn on_snapshot(&mut self, snapshot: &GroundSnapshot) {
        self.last_active = snapshot.aircraft.len();
        if snapshot.tick.0 % 60 == 0 && !snapshot.aircraft.is_empty() {
            println!(
                "  t={:>4}  active={}  takeoffs={}  arrivals={}",
                snapshot.tick.0,
                snapshot.aircraft.len(),
                snapshot.takeoff_count,
                snapshot.arrival_count,
            );
        }
        self.inner.on_snapshot(snapshot);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config()?;

    println!("=== westfield — airport surface simulation ===");

    let field = build_surface();
    let [g51, g53, g55, g57] = field.gates;
    println!(
        "Surface: {} nodes, {} links, {} gates",
        field.surface.node_count(),
        field.surface.link_count(),
        field.surface.gates().len()
    );

    // The morning push: three departures, then two arrivals into the same
    // terminals while the last departure is still taxiing out.
    let scenario = Scenario::new(vec![
        departure("AAL12", g51, field.runway, 10),
        departure("UAL230", g53, field.runway, 15),
        departure("DAL88", g55, field.runway, 40),
        arrival("SWA402", g57, field.runway, 120),
        arrival("JBU516", g51, field.runway, 300),
    ]);
    println!("Scenario: {} flights over {} ticks", scenario.len(), config.sim.total_ticks);
    println!();

    let mut sim = SimBuilder::new(config.sim, field.surface, scenario, DijkstraRouter)
        .profile(config.motion)
        .scheduler_config(config.scheduler)
        .build()?;

    std::fs::create_dir_all("output/westfield")?;
    let writer = CsvWriter::new(Path::new("output/westfield"))?;
    let mut obs = ProgressObserver {
        inner: SimOutputObserver::new(writer),
        last_active: 0,
    };

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!();
    println!("=== done in {elapsed:.2?} ===");
    println!("Takeoffs:            {}", sim.ground.takeoff_count);
    println!("Arrivals at gate:    {}", sim.ground.arrival_count);
    println!("Scheduler delays:    {}", sim.delays_injected);
    println!("Uncertainty holds:   {}", sim.uncertainty_injected);
    println!("Still on surface:    {}", obs.last_active);
    println!("CSV output:          output/westfield/");
    Ok(())
}

fn departure(callsign: &str, gate: asim_core::NodeId, runway: asim_core::LinkId, at: u64) -> Flight {
    Flight {
        callsign: callsign.to_string(),
        kind: FlightKind::Departure,
        gate,
        runway,
        appears_at: Tick(at),
    }
}

fn arrival(callsign: &str, gate: asim_core::NodeId, runway: asim_core::LinkId, at: u64) -> Flight {
    Flight {
        callsign: callsign.to_string(),
        kind: FlightKind::Arrival,
        gate,
        runway,
        appears_at: Tick(at),
    }
}
