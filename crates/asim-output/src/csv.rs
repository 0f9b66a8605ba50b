//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `aircraft_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AircraftSnapshotRow, OutputResult, TickSummaryRow};

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("aircraft_snapshots.csv"))?;
        snapshots.write_record([
            "tick",
            "callsign",
            "kind",
            "state",
            "speed_mps",
            "lat",
            "lon",
            "node_id",
            "remaining_m",
            "scheduler_delays",
            "uncertainty_delays",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "unix_time_secs",
            "active_aircraft",
            "takeoff_count",
            "arrival_count",
            "unresolved_conflicts",
        ])?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AircraftSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.callsign.clone(),
                row.kind.to_string(),
                row.state.to_string(),
                row.speed_mps.to_string(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.node_id.to_string(),
                row.remaining_m.to_string(),
                row.scheduler_delays.to_string(),
                row.uncertainty_delays.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.active_aircraft.to_string(),
            row.takeoff_count.to_string(),
            row.arrival_count.to_string(),
            row.unresolved_conflicts.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
