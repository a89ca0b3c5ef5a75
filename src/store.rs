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

//! Seat storage.
//!
//! [`SeatStore`] is the handle the coordinator and query façade are built
//! over. Implementations must run each of `bind`, `unbind` and `release`
//! as a single atomic unit covering both the seat rows and the availability
//! counter; reads must observe a state between completed units.
//!
//! [`MemoryStore`] keeps one [`EventLedger`] per event in a [`DashMap`], so
//! operations on different events proceed in parallel while operations on
//! the same event serialize on that ledger's lock.

use crate::base::{EventId, SeatCode, UserId, VenueId};
use crate::error::StoreError;
use crate::ledger::{EventLedger, SeatStats};
use crate::venue::{EventInfo, Venue};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Storage operations the reservation core depends on.
pub trait SeatStore: Send + Sync {
    fn venue(&self, venue: VenueId) -> Result<Venue, StoreError>;

    fn event(&self, event: EventId) -> Result<EventInfo, StoreError>;

    /// All events, ordered by identifier.
    fn events(&self) -> Result<Vec<EventInfo>, StoreError>;

    /// Cached free-seat count of an event.
    fn availability(&self, event: EventId) -> Result<u32, StoreError>;

    fn stats(&self, event: EventId) -> Result<SeatStats, StoreError>;

    fn free_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError>;

    fn occupied_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError>;

    fn held_by(&self, event: EventId, user: UserId) -> Result<BTreeSet<SeatCode>, StoreError>;

    /// Events in which `user` holds at least one seat, ordered by identifier.
    fn events_held_by(&self, user: UserId) -> Result<Vec<EventId>, StoreError>;

    /// Binds the currently free subset of `seats` to `user` and decrements
    /// the counter by its size. Returns the seats actually bound.
    fn bind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError>;

    /// Frees those of `seats` held by `user` and increments the counter.
    fn unbind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError>;

    /// Frees every seat held by `user` and increments the counter.
    fn release(&self, event: EventId, user: UserId) -> Result<Vec<SeatCode>, StoreError>;
}

/// In-memory seat store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    venues: DashMap<VenueId, Venue>,
    /// Ledgers are shared out as `Arc` so no map shard lock is held while a
    /// ledger lock is taken.
    ledgers: DashMap<EventId, Arc<EventLedger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a venue layout.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateVenue`] if the identifier is taken.
    pub fn add_venue(&self, venue: Venue) -> Result<(), StoreError> {
        match self.venues.entry(venue.id()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateVenue(venue.id())),
            Entry::Vacant(entry) => {
                entry.insert(venue);
                Ok(())
            }
        }
    }

    /// Schedules an event in a registered venue with every seat free.
    ///
    /// # Errors
    ///
    /// - [`StoreError::VenueNotFound`] if the venue is not registered.
    /// - [`StoreError::DuplicateEvent`] if the identifier is taken.
    pub fn add_event(
        &self,
        event: EventId,
        name: impl Into<String>,
        venue: VenueId,
    ) -> Result<(), StoreError> {
        let layout = self.venue(venue)?;
        match self.ledgers.entry(event) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEvent(event)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(EventLedger::new(event, name, &layout)));
                Ok(())
            }
        }
    }

    /// Shared handle to an event's ledger.
    pub fn ledger(&self, event: EventId) -> Result<Arc<EventLedger>, StoreError> {
        self.ledgers
            .get(&event)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(StoreError::EventNotFound(event))
    }

    /// Ledgers of every event, ordered by identifier.
    pub fn ledgers(&self) -> Vec<Arc<EventLedger>> {
        let mut ledgers: Vec<(EventId, Arc<EventLedger>)> = self
            .ledgers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        ledgers.sort_by_key(|(id, _)| *id);
        ledgers.into_iter().map(|(_, ledger)| ledger).collect()
    }
}

impl SeatStore for MemoryStore {
    fn venue(&self, venue: VenueId) -> Result<Venue, StoreError> {
        self.venues
            .get(&venue)
            .map(|entry| *entry.value())
            .ok_or(StoreError::VenueNotFound(venue))
    }

    fn event(&self, event: EventId) -> Result<EventInfo, StoreError> {
        Ok(self.ledger(event)?.info())
    }

    fn events(&self) -> Result<Vec<EventInfo>, StoreError> {
        Ok(self.ledgers().iter().map(|ledger| ledger.info()).collect())
    }

    fn availability(&self, event: EventId) -> Result<u32, StoreError> {
        Ok(self.ledger(event)?.available())
    }

    fn stats(&self, event: EventId) -> Result<SeatStats, StoreError> {
        Ok(self.ledger(event)?.stats())
    }

    fn free_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError> {
        Ok(self.ledger(event)?.free())
    }

    fn occupied_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError> {
        Ok(self.ledger(event)?.occupied())
    }

    fn held_by(&self, event: EventId, user: UserId) -> Result<BTreeSet<SeatCode>, StoreError> {
        Ok(self.ledger(event)?.held_by(user))
    }

    fn events_held_by(&self, user: UserId) -> Result<Vec<EventId>, StoreError> {
        Ok(self
            .ledgers()
            .iter()
            .filter(|ledger| !ledger.held_by(user).is_empty())
            .map(|ledger| ledger.event())
            .collect())
    }

    fn bind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError> {
        self.ledger(event)?.bind(seats, user)
    }

    fn unbind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError> {
        self.ledger(event)?.unbind(seats, user)
    }

    fn release(&self, event: EventId, user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        self.ledger(event)?.release(user)
    }
}

impl<S: SeatStore + ?Sized> SeatStore for Arc<S> {
    fn venue(&self, venue: VenueId) -> Result<Venue, StoreError> {
        (**self).venue(venue)
    }

    fn event(&self, event: EventId) -> Result<EventInfo, StoreError> {
        (**self).event(event)
    }

    fn events(&self) -> Result<Vec<EventInfo>, StoreError> {
        (**self).events()
    }

    fn availability(&self, event: EventId) -> Result<u32, StoreError> {
        (**self).availability(event)
    }

    fn stats(&self, event: EventId) -> Result<SeatStats, StoreError> {
        (**self).stats(event)
    }

    fn free_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError> {
        (**self).free_seats(event)
    }

    fn occupied_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, StoreError> {
        (**self).occupied_seats(event)
    }

    fn held_by(&self, event: EventId, user: UserId) -> Result<BTreeSet<SeatCode>, StoreError> {
        (**self).held_by(event, user)
    }

    fn events_held_by(&self, user: UserId) -> Result<Vec<EventId>, StoreError> {
        (**self).events_held_by(user)
    }

    fn bind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError> {
        (**self).bind(event, seats, user)
    }

    fn unbind(
        &self,
        event: EventId,
        seats: &[SeatCode],
        user: UserId,
    ) -> Result<Vec<SeatCode>, StoreError> {
        (**self).unbind(event, seats, user)
    }

    fn release(&self, event: EventId, user: UserId) -> Result<Vec<SeatCode>, StoreError> {
        (**self).release(event, user)
    }
}
