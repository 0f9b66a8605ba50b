//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use asim_core::Tick;
use asim_ground::GroundSnapshot;
use asim_sim::SimObserver;

use crate::row::{AircraftSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes aircraft snapshots and tick summaries to
/// any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, snapshot: &GroundSnapshot) {
        let rows: Vec<AircraftSnapshotRow> = snapshot
            .aircraft
            .iter()
            .map(|a| AircraftSnapshotRow {
                tick: snapshot.tick.0,
                callsign: a.callsign.clone(),
                kind: a.kind.as_str(),
                state: a.state.as_str(),
                speed_mps: a.speed_mps,
                lat: a.position.lat,
                lon: a.position.lon,
                node_id: a.coarse_node.0,
                remaining_m: a.remaining_m,
                scheduler_delays: a.scheduler_delays as u64,
                uncertainty_delays: a.uncertainty_delays as u64,
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }

        let summary = TickSummaryRow {
            tick: snapshot.tick.0,
            unix_time_secs: snapshot.unix_time_secs,
            active_aircraft: snapshot.aircraft.len() as u64,
            takeoff_count: snapshot.takeoff_count,
            arrival_count: snapshot.arrival_count,
            unresolved_conflicts: snapshot.unresolved_conflicts,
        };
        let result = self.writer.write_tick_summary(&summary);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
