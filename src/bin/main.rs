// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use seat_ledger::{
    Allocation, Coordinator, CoordinatorConfig, EventId, Identity, JournalEntry, LoyaltyTier,
    MemoryStore, SeatCode, SeatStore, StoreError, UserId, Venue, VenueId,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Seat Ledger - Replay seat reservation requests
///
/// Loads venues and events from a catalogue CSV, replays reservation and
/// cancellation requests from an operations CSV, and writes per-event seat
/// stats to stdout.
#[derive(Parser, Debug)]
#[command(name = "seat-ledger")]
#[command(about = "A seat reservation engine that replays reservation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with venues and events
    ///
    /// Expected format: venue,rows,columns,event,name
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,

    /// Path to CSV file with operations
    ///
    /// Expected format: op,event,user,count,seats
    /// Example: cargo run -- --catalog events.csv ops.csv > stats.csv
    #[arg(value_name = "OPS")]
    operations: PathBuf,

    /// Write the journal of committed operations to this file
    #[arg(long, value_name = "FILE")]
    journal: Option<PathBuf>,

    /// Reject requests for more seats than this
    #[arg(long, value_name = "N")]
    max_seats: Option<u32>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Log to stderr so stdout carries only the stats CSV
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load venues and events
    let store = match open(&args.catalog).and_then(|file| {
        load_catalog(BufReader::new(file)).map_err(|e| format!("Error loading catalogue: {e}"))
    }) {
        Ok(store) => store,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let coordinator = Coordinator::with_config(
        store,
        CoordinatorConfig {
            max_seats_per_request: args.max_seats,
        },
    );

    // Replay operations from CSV
    let summary = match open(&args.operations).and_then(|file| {
        process_operations(&coordinator, BufReader::new(file))
            .map_err(|e| format!("Error processing operations: {e}"))
    }) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        skipped = summary.skipped,
        "operations replayed"
    );

    // Write results to stdout
    if let Err(e) = write_stats(coordinator.store(), std::io::stdout()) {
        error!("Error writing output: {e}");
        process::exit(1);
    }

    // Dump the journal if requested
    if let Some(path) = &args.journal {
        let result = File::create(path)
            .map_err(csv::Error::from)
            .and_then(|file| write_journal(&coordinator.journal().drain(), file));
        if let Err(e) = result {
            error!("Error writing journal '{}': {e}", path.display());
            process::exit(1);
        }
    }
}

fn open(path: &Path) -> Result<File, String> {
    File::open(path).map_err(|e| format!("Error opening file '{}': {e}", path.display()))
}

/// Catalogue row: one event and the venue it is held in.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    venue: u32,
    rows: u16,
    columns: u8,
    event: u32,
    name: String,
}

/// Builds a store from a catalogue CSV.
///
/// A venue may appear on several rows; its first layout wins. Rows that fail
/// to parse or describe an invalid layout are skipped with a warning.
///
/// # CSV Format
///
/// ```csv
/// venue,rows,columns,event,name
/// 1,10,8,1,Opening night
/// 1,10,8,2,Closing night
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_catalog<R: Read>(reader: R) -> Result<MemoryStore, csv::Error> {
    let store = MemoryStore::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace around names and numbers
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CatalogRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed catalogue row: {e}");
                continue;
            }
        };

        let venue_id = VenueId(record.venue);
        if let Err(StoreError::VenueNotFound(_)) = store.venue(venue_id) {
            match Venue::new(venue_id, record.rows, record.columns) {
                Ok(venue) => {
                    if let Err(e) = store.add_venue(venue) {
                        warn!("Skipping venue {venue_id}: {e}");
                    }
                }
                Err(e) => {
                    warn!("Skipping venue {venue_id}: {e}");
                    continue;
                }
            }
        }

        if let Err(e) = store.add_event(EventId(record.event), record.name, venue_id) {
            warn!("Skipping event {}: {e}", record.event);
        }
    }

    Ok(store)
}

/// Raw operations row.
///
/// Fields: `op, event, user, count, seats`
#[derive(Debug, Deserialize)]
struct OperationRecord {
    op: String,
    event: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    user: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    count: Option<u32>,
    #[serde(default)]
    seats: Option<String>,
}

enum Operation {
    Reserve(Allocation),
    Cancel,
}

impl Operation {
    fn kind(&self) -> &'static str {
        match self {
            Operation::Reserve(allocation) => allocation.kind(),
            Operation::Cancel => "cancel",
        }
    }
}

impl OperationRecord {
    /// Converts the row into an operation.
    ///
    /// Returns `None` for unknown operations, missing counts or unparsable
    /// seat codes.
    fn operation(&self) -> Option<Operation> {
        match self.op.to_lowercase().as_str() {
            "search" => Some(Operation::Reserve(Allocation::Search { count: self.count? })),
            "select" | "selection" => {
                let seats = self
                    .seats
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::parse::<SeatCode>)
                    .collect::<Result<Vec<_>, _>>()
                    .ok()?;
                Some(Operation::Reserve(Allocation::selection(seats)))
            }
            "cancel" => Some(Operation::Cancel),
            _ => None,
        }
    }

    fn identity(&self) -> Option<Identity> {
        self.user
            .map(|user| Identity::new(UserId(user), LoyaltyTier::Standard))
    }
}

/// Counts of how each operation row was handled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
    pub skipped: usize,
}

/// Replays operations through the coordinator in file order.
///
/// Rejected requests (contention, capacity, unknown event) are logged and
/// counted; they do not stop the replay.
///
/// # CSV Format
///
/// ```csv
/// op,event,user,count,seats
/// search,1,7,2,
/// select,1,8,,1C 1D
/// cancel,1,7,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn process_operations<R: Read, S: SeatStore>(
    coordinator: &Coordinator<S>,
    reader: R,
) -> Result<ReplaySummary, csv::Error> {
    let mut summary = ReplaySummary::default();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " search "
        .flexible(true) // Allow missing count and seats fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<OperationRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed row: {e}");
                summary.skipped += 1;
                continue;
            }
        };
        let Some(operation) = record.operation() else {
            warn!("Skipping invalid operation {:?}", record.op);
            summary.skipped += 1;
            continue;
        };

        let event = EventId(record.event);
        let identity = record.identity();
        let kind = operation.kind();
        let outcome = match operation {
            Operation::Reserve(allocation) => coordinator
                .reserve(identity.as_ref(), event, allocation)
                .map(|_| ()),
            Operation::Cancel => coordinator.cancel(identity.as_ref(), event).map(|_| ()),
        };

        match outcome {
            Ok(()) => summary.applied += 1,
            Err(e) => {
                warn!(event = %event, "Rejected {kind}: {e}");
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}

/// Writes per-event stats as CSV.
///
/// # CSV Format
///
/// Columns: `event, name, available, occupied, total`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_stats<W: Write>(store: &MemoryStore, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for ledger in store.ledgers() {
        wtr.serialize(&*ledger)?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JournalRow {
    sequence: u64,
    recorded_at: String,
    kind: seat_ledger::JournalKind,
    event: EventId,
    user: UserId,
    seats: String,
}

/// Writes journal entries as CSV, seats space-separated.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_journal<W: Write>(entries: &[JournalEntry], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for entry in entries {
        wtr.serialize(JournalRow {
            sequence: entry.sequence,
            recorded_at: entry.recorded_at.to_rfc3339(),
            kind: entry.kind,
            event: entry.event,
            user: entry.user,
            seats: entry
                .seats
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
