//! Aircraft surface state shared across all movement-related crates.
//!
//! The state is *derived* each tick from the aircraft's itinerary position
//! (see `asim-ground`); only the previous-tick value is cached, to
//! disambiguate "still parked at the gate" from "holding mid-taxi" when the
//! cursor sits on a hold leg.

/// What an aircraft is doing on the surface right now.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AircraftState {
    /// Parked at a gate or runway exit with no route in progress (default).
    #[default]
    Stopped,
    /// Being pushed back from the gate onto the ramp.
    Pushback,
    /// Moving through the ramp area between gate and spot.
    Ramp,
    /// Taxiing on taxiways or a runway.
    Taxi,
    /// En route but paused on a hold slot this tick.
    Holding,
}

impl AircraftState {
    /// `true` for any state in which the aircraft is progressing along links.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            AircraftState::Pushback | AircraftState::Ramp | AircraftState::Taxi
        )
    }

    /// Human-readable label, useful for CSV/Parquet column values.
    pub fn as_str(self) -> &'static str {
        match self {
            AircraftState::Stopped  => "stopped",
            AircraftState::Pushback => "pushback",
            AircraftState::Ramp     => "ramp",
            AircraftState::Taxi     => "taxi",
            AircraftState::Holding  => "holding",
        }
    }
}

impl std::fmt::Display for AircraftState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
