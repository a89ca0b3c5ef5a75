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

//! Per-event seat ledger.
//!
//! Seats have two durable states:
//!
//! ```text
//!   Free ──bind(user)──► Held(user)
//!     ▲                      │
//!     └──unbind / release────┘
//! ```
//!
//! Every mutation runs under one [`Mutex`] together with the event's
//! [`Availability`] counter, so a completed operation always leaves
//! `available == count(free seats)`.
//!
//! # Example
//!
//! ```
//! use seat_ledger::{EventId, EventLedger, UserId, Venue, VenueId};
//!
//! let venue = Venue::new(VenueId(1), 1, 3).unwrap();
//! let ledger = EventLedger::new(EventId(1), "Opening night", &venue);
//! let seats = ["1A".parse().unwrap(), "1B".parse().unwrap()];
//!
//! let bound = ledger.bind(&seats, UserId(7)).unwrap();
//! assert_eq!(bound.len(), 2);
//! assert_eq!(ledger.available(), 1);
//! ```

use crate::aggregate::Availability;
use crate::base::{EventId, SeatCode, UserId, VenueId};
use crate::error::StoreError;
use crate::venue::{EventInfo, Venue};
use parking_lot::Mutex;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Availability, occupancy and total seat counts of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStats {
    pub available: u32,
    pub occupied: u32,
    pub total: u32,
}

#[derive(Debug)]
struct LedgerData {
    event: EventId,
    name: String,
    venue: VenueId,
    /// Holder per seat, `None` when free.
    seats: BTreeMap<SeatCode, Option<UserId>>,
    availability: Availability,
}

impl LedgerData {
    fn new(event: EventId, name: String, venue: &Venue) -> Self {
        Self {
            event,
            name,
            venue: venue.id(),
            seats: venue.seat_codes().map(|seat| (seat, None)).collect(),
            availability: Availability::new(event, venue.capacity()),
        }
    }

    fn free_count(&self) -> u32 {
        self.seats.values().filter(|holder| holder.is_none()).count() as u32
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(
            self.availability.current(),
            self.free_count(),
            "Invariant violated: cached availability diverged from seat table for event {}",
            self.event
        );
    }

    /// Conditionally binds the requested seats that are currently free.
    ///
    /// Unknown seats and seats already held are skipped; the returned list
    /// holds exactly the seats whose holder changed.
    fn bind(&mut self, seats: &[SeatCode], user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        let mut bound: Vec<SeatCode> = Vec::with_capacity(seats.len());
        for seat in seats {
            if matches!(self.seats.get(seat), Some(None)) && !bound.contains(seat) {
                bound.push(*seat);
            }
        }

        // Counter first: if it refuses, no seat has been touched yet.
        self.availability.decrement(bound.len() as u32)?;
        for seat in &bound {
            self.seats.insert(*seat, Some(user));
        }
        self.assert_invariants();
        Ok(bound)
    }

    /// Frees the listed seats that are held by `user`.
    fn unbind(&mut self, seats: &[SeatCode], user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        let mut freed: Vec<SeatCode> = Vec::with_capacity(seats.len());
        for seat in seats {
            if self.seats.get(seat) == Some(&Some(user)) && !freed.contains(seat) {
                freed.push(*seat);
            }
        }
        self.free(freed)
    }

    /// Frees every seat held by `user`.
    fn release(&mut self, user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        let held: Vec<SeatCode> = self
            .seats
            .iter()
            .filter(|(_, holder)| **holder == Some(user))
            .map(|(seat, _)| *seat)
            .collect();
        self.free(held)
    }

    fn free(&mut self, seats: Vec<SeatCode>) -> Result<Vec<SeatCode>, StoreError> {
        self.availability.increment(seats.len() as u32)?;
        for seat in &seats {
            self.seats.insert(*seat, None);
        }
        self.assert_invariants();
        Ok(seats)
    }

    fn seats_where(&self, predicate: impl Fn(&Option<UserId>) -> bool) -> BTreeSet<SeatCode> {
        self.seats
            .iter()
            .filter(|(_, holder)| predicate(holder))
            .map(|(seat, _)| *seat)
            .collect()
    }

    fn stats(&self) -> SeatStats {
        let available = self.availability.current();
        let occupied = self.seats.len() as u32 - self.free_count();
        SeatStats {
            available,
            occupied,
            total: available + occupied,
        }
    }
}

/// Seat table and availability counter of one event, behind one lock.
#[derive(Debug)]
pub struct EventLedger {
    inner: Mutex<LedgerData>,
}

impl EventLedger {
    /// Creates a ledger with every seat of `venue` free.
    pub fn new(event: EventId, name: impl Into<String>, venue: &Venue) -> Self {
        Self {
            inner: Mutex::new(LedgerData::new(event, name.into(), venue)),
        }
    }

    pub fn event(&self) -> EventId {
        self.inner.lock().event
    }

    pub fn venue(&self) -> VenueId {
        self.inner.lock().venue
    }

    pub fn name(&self) -> String {
        self.inner.lock().name.clone()
    }

    /// Cached free-seat count.
    pub fn available(&self) -> u32 {
        self.inner.lock().availability.current()
    }

    pub fn info(&self) -> EventInfo {
        let data = self.inner.lock();
        EventInfo {
            id: data.event,
            name: data.name.clone(),
            venue: data.venue,
            available: data.availability.current(),
        }
    }

    pub fn free(&self) -> BTreeSet<SeatCode> {
        self.inner.lock().seats_where(Option::is_none)
    }

    pub fn occupied(&self) -> BTreeSet<SeatCode> {
        self.inner.lock().seats_where(Option::is_some)
    }

    pub fn held_by(&self, user: UserId) -> BTreeSet<SeatCode> {
        self.inner.lock().seats_where(|holder| *holder == Some(user))
    }

    /// Returns `available + occupied = total`, read under one lock.
    pub fn stats(&self) -> SeatStats {
        self.inner.lock().stats()
    }

    /// Binds every requested seat that is currently free to `user` and
    /// decrements the counter by the number bound, as one atomic unit.
    ///
    /// The result may be shorter than `seats` when some were already held.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityUnderflow`] if the counter disagrees with the
    /// seat table; nothing is changed in that case.
    pub fn bind(&self, seats: &[SeatCode], user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        self.inner.lock().bind(seats, user)
    }

    /// Frees those of `seats` still held by `user` and increments the counter,
    /// as one atomic unit. Used to roll back a rejected attempt.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityOverflow`] if the counter disagrees with the seat
    /// table; nothing is changed in that case.
    pub fn unbind(&self, seats: &[SeatCode], user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        self.inner.lock().unbind(seats, user)
    }

    /// Frees every seat held by `user` and increments the counter, as one
    /// atomic unit. Returns the released seats, empty if none were held.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityOverflow`] if the counter disagrees with the seat
    /// table; nothing is changed in that case.
    pub fn release(&self, user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        self.inner.lock().release(user)
    }
}

impl Serialize for EventLedger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let stats = data.stats();
        let mut state = serializer.serialize_struct("EventLedger", 5)?;
        state.serialize_field("event", &data.event)?;
        state.serialize_field("name", &data.name)?;
        state.serialize_field("available", &stats.available)?;
        state.serialize_field("occupied", &stats.occupied)?;
        state.serialize_field("total", &stats.total)?;
        state.end()
    }
}
