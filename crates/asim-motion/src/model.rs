//! The speed update rule.
//!
//! Two regimes:
//!
//! - **Free flow** (no visible leader): step toward the phase target speed,
//!   bounded by the acceleration/braking step per tick.
//! - **Car following**: a Gazis–Herman–Rothery-style rule.  The acceleration
//!   is a power law of own speed times the speed differential over the gap,
//!   with an asymmetric gain — closing in below the ideal following distance
//!   brakes harder than falling behind accelerates.  At the ideal gap with
//!   matched speeds the differential is zero and the speed holds.
//!
//! Safety overrides come first: a gap at or below the minimum separation, or
//! a leader broadcasting the non-positive "blocked" sentinel speed, brakes
//! the follower to a stop for this tick.
//!
//! Everything here is a pure function of its inputs.

use asim_core::AircraftState;

use crate::profile::MotionProfile;

/// What the follower knows about the nearest aircraft ahead on its path.
#[derive(Copy, Clone, Debug)]
pub struct Leader {
    /// The leader's current speed.  Non-positive values are the sentinel for
    /// "leader is blocked / entering a conflict": the follower must stop.
    pub speed_mps: f64,
    /// Path distance from follower to leader, in metres.
    pub gap_m: f64,
}

/// Compute the next tick's speed.
///
/// The result is always clamped to `[0, profile.max_speed_mps]`.
pub fn next_speed(
    profile: &MotionProfile,
    current_mps: f64,
    state: AircraftState,
    leader: Option<Leader>,
    dt_s: f64,
) -> f64 {
    let next = match leader {
        None => free_speed(profile, current_mps, state, dt_s),
        Some(l) => {
            if l.gap_m <= profile.min_separation_m || l.speed_mps <= 0.0 {
                0.0
            } else {
                following_speed(profile, current_mps, l, dt_s)
            }
        }
    };
    next.clamp(0.0, profile.max_speed_mps)
}

/// Per-tick travel distance at `speed_mps`.
#[inline]
pub fn tick_distance_m(speed_mps: f64, dt_s: f64) -> f64 {
    speed_mps.max(0.0) * dt_s
}

// ── Internals ─────────────────────────────────────────────────────────────────

fn free_speed(profile: &MotionProfile, current: f64, state: AircraftState, dt: f64) -> f64 {
    let target = profile.target_speed(state);
    if current < target {
        (current + profile.accel_mps2 * dt).min(target)
    } else {
        (current - profile.brake_mps2 * dt).max(target)
    }
}

fn following_speed(profile: &MotionProfile, current: f64, leader: Leader, dt: f64) -> f64 {
    let gain = if leader.gap_m < profile.ideal_following_m {
        profile.follow_brake_gain
    } else {
        profile.follow_accel_gain
    };
    let dv = leader.speed_mps - current;
    // Power-law term floors own speed at 1 m/s so a standing aircraft can
    // still pull away from a distant mover.
    let accel = gain * current.max(1.0).powf(profile.follow_exponent) * dv / leader.gap_m;
    current + accel * dt
}
