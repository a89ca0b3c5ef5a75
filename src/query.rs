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

//! Read-only projections for the presentation layer.
//!
//! Each projection reads one consistent snapshot of an event. Results may be
//! stale with respect to a write that commits right after; callers re-query.

use crate::base::{EventId, SeatCode, UserId};
use crate::error::ReservationError;
use crate::ledger::SeatStats;
use crate::store::SeatStore;
use crate::venue::{EventInfo, VenueGeometry};
use std::collections::BTreeSet;
use tracing::debug;

pub struct QueryFacade<'a, S: SeatStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SeatStore + ?Sized> QueryFacade<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every scheduled event with its cached availability.
    pub fn list_events(&self) -> Result<Vec<EventInfo>, ReservationError> {
        Ok(self.store.events()?)
    }

    pub fn event_name(&self, event: EventId) -> Result<String, ReservationError> {
        Ok(self.store.event(event)?.name)
    }

    /// `{available, occupied, total}` for an event.
    pub fn availability(&self, event: EventId) -> Result<SeatStats, ReservationError> {
        let stats = self.store.stats(event)?;
        debug!(event = %event, available = stats.available, occupied = stats.occupied, "stats read");
        Ok(stats)
    }

    pub fn occupied_seats(&self, event: EventId) -> Result<BTreeSet<SeatCode>, ReservationError> {
        Ok(self.store.occupied_seats(event)?)
    }

    /// Seats `user` holds in `event`; empty when there is no reservation.
    pub fn user_reservation(
        &self,
        event: EventId,
        user: UserId,
    ) -> Result<BTreeSet<SeatCode>, ReservationError> {
        Ok(self.store.held_by(event, user)?)
    }

    /// Events in which `user` holds at least one seat.
    pub fn user_events(&self, user: UserId) -> Result<Vec<EventId>, ReservationError> {
        Ok(self.store.events_held_by(user)?)
    }

    /// Rows and columns of the venue the event is held in.
    pub fn venue_geometry(&self, event: EventId) -> Result<VenueGeometry, ReservationError> {
        let info = self.store.event(event)?;
        let venue = self.store.venue(info.venue)?;
        Ok(VenueGeometry::from(&venue))
    }
}
