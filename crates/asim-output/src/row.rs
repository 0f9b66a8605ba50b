//! Plain data row types written by output backends.

/// One aircraft's externally visible state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSnapshotRow {
    pub tick: u64,
    pub callsign: String,
    /// `"arrival"` or `"departure"`.
    pub kind: &'static str,
    /// Derived surface state label (`"taxi"`, `"holding"`, …).
    pub state: &'static str,
    pub speed_mps: f64,
    pub lat: f64,
    pub lon: f64,
    /// Coarse location as a node index; `u32::MAX` before placement.
    pub node_id: u32,
    /// Distance left to the destination, metres.
    pub remaining_m: f64,
    pub scheduler_delays: u64,
    pub uncertainty_delays: u64,
}

/// Summary statistics for one snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick: u64,
    pub unix_time_secs: i64,
    pub active_aircraft: u64,
    pub takeoff_count: u64,
    pub arrival_count: u64,
    pub unresolved_conflicts: u64,
}
