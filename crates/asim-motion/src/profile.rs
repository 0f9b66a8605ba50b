//! Numeric parameters of the speed model.

use asim_core::AircraftState;

/// All kinematic parameters, supplied externally once per run.
///
/// Speeds are m/s, accelerations m/s², distances metres.  The defaults are
/// plausible narrow-body taxi values; real runs load their own profile from
/// the application's config file.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionProfile {
    /// Absolute speed ceiling.
    pub max_speed_mps: f64,
    /// Target cruise speed while taxiing.
    pub ideal_taxi_speed_mps: f64,
    /// Target speed in the ramp area.
    pub ramp_speed_mps: f64,
    /// Target speed during pushback.
    pub pushback_speed_mps: f64,

    /// Acceleration step per second when below target.
    pub accel_mps2: f64,
    /// Deceleration step per second when above target.
    pub brake_mps2: f64,

    /// At or below this gap the follower brakes hard to a stop.
    pub min_separation_m: f64,
    /// The gap the car-following rule tries to maintain.
    pub ideal_following_m: f64,
    /// Aircraft further ahead than this are invisible to the follower.
    pub pilot_vision_m: f64,

    /// Car-following gain while further than the ideal gap.
    pub follow_accel_gain: f64,
    /// Car-following gain while closer than the ideal gap.  Stronger than
    /// `follow_accel_gain`: closing in decelerates harder than falling
    /// behind accelerates.
    pub follow_brake_gain: f64,
    /// Exponent on own speed in the power-law following term.
    pub follow_exponent: f64,
}

impl MotionProfile {
    /// The free-flow target speed for a given surface state.
    ///
    /// Non-moving states target zero so a paused aircraft's speed decays
    /// instead of freezing at its last value.
    pub fn target_speed(&self, state: AircraftState) -> f64 {
        match state {
            AircraftState::Pushback => self.pushback_speed_mps,
            AircraftState::Ramp     => self.ramp_speed_mps,
            AircraftState::Taxi     => self.ideal_taxi_speed_mps,
            AircraftState::Stopped | AircraftState::Holding => 0.0,
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            max_speed_mps:        30.0,
            ideal_taxi_speed_mps: 15.0,
            ramp_speed_mps:       8.0,
            pushback_speed_mps:   2.0,
            accel_mps2:           1.0,
            brake_mps2:           2.5,
            min_separation_m:     30.0,
            ideal_following_m:    120.0,
            pilot_vision_m:       300.0,
            follow_accel_gain:    0.6,
            follow_brake_gain:    1.8,
            follow_exponent:      0.5,
        }
    }
}
