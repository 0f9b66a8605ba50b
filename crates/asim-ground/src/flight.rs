//! Flights and the scenario that supplies them.
//!
//! Scenario ingestion (file formats, schedules) is an external concern; the
//! core only needs an in-memory collection answering "what is this
//! aircraft's origin, destination, and runway, and when does it appear".

use asim_core::{AircraftId, LinkId, NodeId, Tick};

/// Direction of a flight relative to the surface.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlightKind {
    /// Lands, exits the runway, taxis to its gate.
    Arrival,
    /// Pushes back from its gate, taxis to the runway threshold, departs.
    Departure,
}

impl FlightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlightKind::Arrival   => "arrival",
            FlightKind::Departure => "departure",
        }
    }
}

impl std::fmt::Display for FlightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled surface movement.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flight {
    /// Aircraft identity; unique within a scenario.
    pub callsign: String,
    pub kind: FlightKind,
    /// The flight's gate: origin for departures, destination for arrivals.
    pub gate: NodeId,
    /// The runway link.  Departures taxi to its start node (the threshold);
    /// arrivals enter the surface at its end node (the exit).
    pub runway: LinkId,
    /// Tick at which the aircraft shows up (at the gate or runway exit).
    pub appears_at: Tick,
}

/// The full set of flights for one simulated window.
///
/// `AircraftId`s are assigned positionally at construction and never change,
/// so the live simulation and every prediction sandbox agree on identities.
#[derive(Clone, Debug, Default)]
pub struct Scenario {
    flights: Vec<Flight>,
}

impl Scenario {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self { flights }
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// The flight belonging to `aircraft`.
    #[inline]
    pub fn flight(&self, aircraft: AircraftId) -> &Flight {
        &self.flights[aircraft.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (AircraftId, &Flight)> {
        self.flights
            .iter()
            .enumerate()
            .map(|(i, f)| (AircraftId(i as u32), f))
    }
}
