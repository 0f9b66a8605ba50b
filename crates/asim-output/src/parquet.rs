//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `aircraft_snapshots.parquet`
//! - `tick_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, Int64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{AircraftSnapshotRow, OutputResult, TickSummaryRow};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",               DataType::UInt64,  false),
        Field::new("callsign",           DataType::Utf8,    false),
        Field::new("kind",               DataType::Utf8,    false),
        Field::new("state",              DataType::Utf8,    false),
        Field::new("speed_mps",          DataType::Float64, false),
        Field::new("lat",                DataType::Float64, false),
        Field::new("lon",                DataType::Float64, false),
        Field::new("node_id",            DataType::UInt32,  false),
        Field::new("remaining_m",        DataType::Float64, false),
        Field::new("scheduler_delays",   DataType::UInt64,  false),
        Field::new("uncertainty_delays", DataType::UInt64,  false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",                 DataType::UInt64, false),
        Field::new("unix_time_secs",       DataType::Int64,  false),
        Field::new("active_aircraft",      DataType::UInt64, false),
        Field::new("takeoff_count",        DataType::UInt64, false),
        Field::new("arrival_count",        DataType::UInt64, false),
        Field::new("unresolved_conflicts", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes simulation output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots: Option<ArrowWriter<File>>,
    summaries: Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();

        let snap_file = File::create(dir.join("aircraft_snapshots.parquet"))?;
        let snapshots = ArrowWriter::try_new(
            snap_file,
            Arc::clone(&snap_schema),
            Some(snappy_props()),
        )?;

        let summ_file = File::create(dir.join("tick_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(
            summ_file,
            Arc::clone(&summ_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            snapshots: Some(snapshots),
            summaries: Some(summaries),
            snap_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AircraftSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut ticks = UInt64Builder::new();
        let mut callsigns = StringBuilder::new();
        let mut kinds = StringBuilder::new();
        let mut states = StringBuilder::new();
        let mut speeds = Float64Builder::new();
        let mut lats = Float64Builder::new();
        let mut lons = Float64Builder::new();
        let mut node_ids = UInt32Builder::new();
        let mut remainings = Float64Builder::new();
        let mut sched_delays = UInt64Builder::new();
        let mut unc_delays = UInt64Builder::new();

        for row in rows {
            ticks.append_value(row.tick);
            callsigns.append_value(&row.callsign);
            kinds.append_value(row.kind);
            states.append_value(row.state);
            speeds.append_value(row.speed_mps);
            lats.append_value(row.lat);
            lons.append_value(row.lon);
            node_ids.append_value(row.node_id);
            remainings.append_value(row.remaining_m);
            sched_delays.append_value(row.scheduler_delays);
            unc_delays.append_value(row.uncertainty_delays);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(callsigns.finish()),
                Arc::new(kinds.finish()),
                Arc::new(states.finish()),
                Arc::new(speeds.finish()),
                Arc::new(lats.finish()),
                Arc::new(lons.finish()),
                Arc::new(node_ids.finish()),
                Arc::new(remainings.finish()),
                Arc::new(sched_delays.finish()),
                Arc::new(unc_delays.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks = UInt64Builder::new();
        let mut unix_times = Int64Builder::new();
        let mut actives = UInt64Builder::new();
        let mut takeoffs = UInt64Builder::new();
        let mut arrivals = UInt64Builder::new();
        let mut unresolved = UInt64Builder::new();

        ticks.append_value(row.tick);
        unix_times.append_value(row.unix_time_secs);
        actives.append_value(row.active_aircraft);
        takeoffs.append_value(row.takeoff_count);
        arrivals.append_value(row.arrival_count);
        unresolved.append_value(row.unresolved_conflicts);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(unix_times.finish()),
                Arc::new(actives.finish()),
                Arc::new(takeoffs.finish()),
                Arc::new(arrivals.finish()),
                Arc::new(unresolved.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
