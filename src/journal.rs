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

//! Thread-safe log of committed reservations and cancellations.
//!
//! Only operations that changed the ledger are recorded: rolled-back
//! attempts and empty cancellations leave no entry.

use crate::base::{EventId, SeatCode, UserId};
use chrono::{DateTime, Utc};
use crossbeam::queue::SegQueue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    Reserved,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Commit order, starting at 1.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: JournalKind,
    pub event: EventId,
    pub user: UserId,
    pub seats: Vec<SeatCode>,
}

/// Lock-free append log backed by a [`SegQueue`].
///
/// Sequence numbers are taken from an atomic counter, so entries pushed by
/// racing threads can land in the queue slightly out of order;
/// [`drain`](Self::drain) restores sequence order.
#[derive(Debug, Default)]
pub struct ReservationJournal {
    entries: SegQueue<JournalEntry>,
    next_sequence: AtomicU64,
}

impl ReservationJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its sequence number.
    pub fn record(
        &self,
        kind: JournalKind,
        event: EventId,
        user: UserId,
        seats: Vec<SeatCode>,
    ) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.push(JournalEntry {
            sequence,
            recorded_at: Utc::now(),
            kind,
            event,
            user,
            seats,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every entry, ordered by sequence number.
    pub fn drain(&self) -> Vec<JournalEntry> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop() {
            drained.push(entry);
        }
        drained.sort_by_key(|entry| entry.sequence);
        drained
    }
}
