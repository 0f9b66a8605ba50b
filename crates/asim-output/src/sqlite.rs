//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `aircraft_snapshots` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AircraftSnapshotRow, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS aircraft_snapshots (
                 tick               INTEGER NOT NULL,
                 callsign           TEXT    NOT NULL,
                 kind               TEXT    NOT NULL,
                 state              TEXT    NOT NULL,
                 speed_mps          REAL    NOT NULL,
                 lat                REAL    NOT NULL,
                 lon                REAL    NOT NULL,
                 node_id            INTEGER NOT NULL,
                 remaining_m        REAL    NOT NULL,
                 scheduler_delays   INTEGER NOT NULL,
                 uncertainty_delays INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick                 INTEGER PRIMARY KEY,
                 unix_time_secs       INTEGER NOT NULL,
                 active_aircraft      INTEGER NOT NULL,
                 takeoff_count        INTEGER NOT NULL,
                 arrival_count        INTEGER NOT NULL,
                 unresolved_conflicts INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AircraftSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO aircraft_snapshots \
                 (tick, callsign, kind, state, speed_mps, lat, lon, node_id, \
                  remaining_m, scheduler_delays, uncertainty_delays) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick,
                    row.callsign,
                    row.kind,
                    row.state,
                    row.speed_mps,
                    row.lat,
                    row.lon,
                    row.node_id,
                    row.remaining_m,
                    row.scheduler_delays,
                    row.uncertainty_delays,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, active_aircraft, takeoff_count, arrival_count, unresolved_conflicts) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                row.tick,
                row.unix_time_secs,
                row.active_aircraft,
                row.takeoff_count,
                row.arrival_count,
                row.unresolved_conflicts,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
