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

//! Reservation coordinator.
//!
//! The [`Coordinator`] is the only writer of seat state. It implements both
//! allocation strategies and cancellation on top of a [`SeatStore`].
//!
//! # Allocation Protocol
//!
//! 1. **Choose**: a search reads the free seats and takes the lowest `count`;
//!    a selection uses the caller's seats as given.
//! 2. **Bind**: one atomic unit binds whichever chosen seats are still free
//!    and decrements the availability counter by that number.
//! 3. **Verify**: if fewer seats were bound than chosen, a concurrent caller
//!    won the difference. The seats this attempt did bind are released in a
//!    second atomic unit and the caller gets
//!    [`ReservationError::PartialContention`] naming the lost seats.
//!
//! No lock is held between choosing and binding; contention is settled at
//! bind time only, so a caller either gets every seat it asked for or none.

use crate::allocation::{Allocation, Cancellation, Reservation};
use crate::auth::Identity;
use crate::base::{EventId, SeatCode};
use crate::error::ReservationError;
use crate::journal::{JournalKind, ReservationJournal};
use crate::query::QueryFacade;
use crate::store::SeatStore;
use tracing::{debug, error, info, warn};

/// Coordinator limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Upper bound on seats per allocation request; `None` for no limit.
    pub max_seats_per_request: Option<u32>,
}

/// Allocates and cancels reservations against a shared seat store.
///
/// # Invariants
///
/// - A successful allocation binds exactly the seats reported, all at once.
/// - A failed allocation leaves no seat bound by that attempt.
/// - Every bind and release moves the availability counter by the same
///   number of seats in the same atomic unit.
pub struct Coordinator<S: SeatStore> {
    store: S,
    journal: ReservationJournal,
    config: CoordinatorConfig,
}

impl<S: SeatStore> Coordinator<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, CoordinatorConfig::default())
    }

    pub fn with_config(store: S, config: CoordinatorConfig) -> Self {
        Coordinator {
            store,
            journal: ReservationJournal::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn journal(&self) -> &ReservationJournal {
        &self.journal
    }

    pub fn config(&self) -> CoordinatorConfig {
        self.config
    }

    /// Read-only view over the same store.
    pub fn query(&self) -> QueryFacade<'_, S> {
        QueryFacade::new(&self.store)
    }

    /// Lets the system pick the `count` lowest-ordered free seats.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::reserve`].
    pub fn reserve_by_search(
        &self,
        caller: Option<&Identity>,
        event: EventId,
        count: u32,
    ) -> Result<Reservation, ReservationError> {
        self.reserve(caller, event, Allocation::Search { count })
    }

    /// Claims exactly the given seats; repeated codes are ignored.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::reserve`].
    pub fn reserve_by_selection(
        &self,
        caller: Option<&Identity>,
        event: EventId,
        seats: impl IntoIterator<Item = SeatCode>,
    ) -> Result<Reservation, ReservationError> {
        self.reserve(caller, event, Allocation::selection(seats))
    }

    /// Runs an allocation request for `caller`.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotAuthenticated`] - No caller identity.
    /// - [`ReservationError::EmptyRequest`] - Zero seats requested.
    /// - [`ReservationError::TooManySeats`] - Above the configured limit.
    /// - [`ReservationError::NotFound`] - Unknown event or venue.
    /// - [`ReservationError::UnknownSeat`] - Selected seat outside the venue.
    /// - [`ReservationError::InsufficientCapacity`] - Search for more seats than are free.
    /// - [`ReservationError::PartialContention`] - Lost a race; fully rolled back.
    /// - [`ReservationError::StorageUnavailable`] - The store failed. If it
    ///   failed while rolling back a lost race, the seats this attempt bound
    ///   may still be held by `caller`; cancel before retrying.
    pub fn reserve(
        &self,
        caller: Option<&Identity>,
        event: EventId,
        allocation: Allocation,
    ) -> Result<Reservation, ReservationError> {
        let identity = caller.ok_or(ReservationError::NotAuthenticated)?;
        // Selections built directly or deserialized may repeat codes.
        let allocation = match allocation {
            Allocation::Selection { seats } => Allocation::selection(seats),
            search => search,
        };
        let requested = allocation.requested();
        if requested == 0 {
            return Err(ReservationError::EmptyRequest);
        }
        if let Some(limit) = self
            .config
            .max_seats_per_request
            .filter(|limit| requested > *limit)
        {
            return Err(ReservationError::TooManySeats { requested, limit });
        }

        let chosen = match allocation {
            Allocation::Search { count } => self.choose_cheapest(event, count)?,
            Allocation::Selection { seats } => {
                self.check_selection(event, &seats)?;
                seats
            }
        };

        self.commit(identity, event, chosen)
    }

    /// Releases every seat `caller` holds in `event`.
    ///
    /// Holding nothing yields an unsuccessful [`Cancellation`], not an error.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotAuthenticated`] - No caller identity.
    /// - [`ReservationError::NotFound`] - Unknown event.
    /// - [`ReservationError::StorageUnavailable`] - The store failed.
    pub fn cancel(
        &self,
        caller: Option<&Identity>,
        event: EventId,
    ) -> Result<Cancellation, ReservationError> {
        let identity = caller.ok_or(ReservationError::NotAuthenticated)?;
        let released = self.store.release(event, identity.user)?;

        if released.is_empty() {
            debug!(event = %event, user = %identity.user, "nothing to cancel");
        } else {
            info!(event = %event, user = %identity.user, seats = released.len(), "reservation cancelled");
            self.journal
                .record(JournalKind::Cancelled, event, identity.user, released.clone());
        }

        Ok(Cancellation {
            event,
            user: identity.user,
            released,
        })
    }

    /// Pre-checks the cached counter, then picks the lowest free seats.
    fn choose_cheapest(&self, event: EventId, count: u32) -> Result<Vec<SeatCode>, ReservationError> {
        let available = self.store.availability(event)?;
        if available < count {
            debug!(event = %event, available, requested = count, "search rejected by capacity check");
            return Err(ReservationError::InsufficientCapacity {
                available,
                requested: count,
            });
        }

        let chosen: Vec<SeatCode> = self
            .store
            .free_seats(event)?
            .into_iter()
            .take(count as usize)
            .collect();

        // Seats can disappear between the counter read and the seat read.
        if (chosen.len() as u32) < count {
            return Err(ReservationError::InsufficientCapacity {
                available: chosen.len() as u32,
                requested: count,
            });
        }
        Ok(chosen)
    }

    fn check_selection(&self, event: EventId, seats: &[SeatCode]) -> Result<(), ReservationError> {
        let info = self.store.event(event)?;
        let venue = self.store.venue(info.venue)?;
        match seats.iter().find(|seat| !venue.contains(**seat)) {
            Some(seat) => Err(ReservationError::UnknownSeat(*seat)),
            None => Ok(()),
        }
    }

    /// Binds `chosen` and either keeps all of it or rolls all of it back.
    fn commit(
        &self,
        identity: &Identity,
        event: EventId,
        chosen: Vec<SeatCode>,
    ) -> Result<Reservation, ReservationError> {
        let user = identity.user;
        let bound = self.store.bind(event, &chosen, user)?;

        if bound.len() == chosen.len() {
            info!(event = %event, user = %user, seats = bound.len(), "reservation committed");
            self.journal
                .record(JournalKind::Reserved, event, user, bound.clone());
            return Ok(Reservation {
                event,
                user,
                seats: bound,
            });
        }

        let contended: Vec<SeatCode> = chosen
            .iter()
            .filter(|seat| !bound.contains(*seat))
            .copied()
            .collect();
        warn!(
            event = %event,
            user = %user,
            lost = contended.len(),
            rolled_back = bound.len(),
            "seats taken concurrently, rolling back"
        );

        if !bound.is_empty() {
            self.store.unbind(event, &bound, user).map_err(|err| {
                error!(event = %event, user = %user, error = %err, "rollback failed");
                ReservationError::from(err)
            })?;
        }

        Err(ReservationError::PartialContention { contended })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoyaltyTier;
    use crate::base::{UserId, VenueId};
    use crate::store::MemoryStore;
    use crate::venue::Venue;

    fn coordinator() -> Coordinator<MemoryStore> {
        let store = MemoryStore::new();
        store.add_venue(Venue::new(VenueId(1), 2, 3).unwrap()).unwrap();
        store.add_event(EventId(1), "Test", VenueId(1)).unwrap();
        Coordinator::new(store)
    }

    fn user(id: u32) -> Identity {
        Identity::new(UserId(id), LoyaltyTier::Standard)
    }

    #[test]
    fn zero_count_search_is_rejected() {
        let coordinator = coordinator();
        assert_eq!(
            coordinator.reserve_by_search(Some(&user(1)), EventId(1), 0),
            Err(ReservationError::EmptyRequest)
        );
    }

    #[test]
    fn request_limit_is_enforced() {
        let store = MemoryStore::new();
        store.add_venue(Venue::new(VenueId(1), 2, 3).unwrap()).unwrap();
        store.add_event(EventId(1), "Test", VenueId(1)).unwrap();
        let coordinator = Coordinator::with_config(
            store,
            CoordinatorConfig {
                max_seats_per_request: Some(2),
            },
        );

        assert_eq!(
            coordinator.reserve_by_search(Some(&user(1)), EventId(1), 3),
            Err(ReservationError::TooManySeats {
                requested: 3,
                limit: 2
            })
        );
        assert!(coordinator.reserve_by_search(Some(&user(1)), EventId(1), 2).is_ok());
    }

    #[test]
    fn committed_operations_are_journaled() {
        let coordinator = coordinator();
        coordinator.reserve_by_search(Some(&user(1)), EventId(1), 2).unwrap();
        let _ = coordinator.reserve_by_search(Some(&user(2)), EventId(1), 10);
        coordinator.cancel(Some(&user(3)), EventId(1)).unwrap();
        coordinator.cancel(Some(&user(1)), EventId(1)).unwrap();

        let kinds: Vec<JournalKind> = coordinator.journal().drain().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [JournalKind::Reserved, JournalKind::Cancelled]);
    }
}
