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

//! # Seat Ledger
//!
//! This library provides a seat reservation engine for scheduled events. It
//! guarantees that no seat is ever held by two users, even when many callers
//! reserve and cancel concurrently.
//!
//! ## Core Components
//!
//! - [`EventLedger`]: Seats of one event plus its cached availability, behind one lock
//! - [`SeatStore`]: Storage handle the core is built over; [`MemoryStore`] implements it
//! - [`Coordinator`]: Search and selection allocation, cancellation, rollback on contention
//! - [`QueryFacade`]: Read-only projections (stats, occupied seats, user reservations)
//! - [`ReservationError`]: Failure taxonomy for reservation requests
//!
//! ## Example
//!
//! ```
//! use seat_ledger::{
//!     Coordinator, EventId, Identity, LoyaltyTier, MemoryStore, UserId, Venue, VenueId,
//! };
//!
//! let store = MemoryStore::new();
//! store.add_venue(Venue::new(VenueId(1), 10, 8).unwrap()).unwrap();
//! store.add_event(EventId(1), "Opening night", VenueId(1)).unwrap();
//!
//! let coordinator = Coordinator::new(store);
//! let alice = Identity::new(UserId(1), LoyaltyTier::Loyal);
//!
//! // The system picks the lowest-ordered free seats
//! let reservation = coordinator.reserve_by_search(Some(&alice), EventId(1), 2).unwrap();
//! let codes: Vec<String> = reservation.seats.iter().map(|s| s.to_string()).collect();
//! assert_eq!(codes, ["1A", "1B"]);
//!
//! let stats = coordinator.query().availability(EventId(1)).unwrap();
//! assert_eq!((stats.available, stats.occupied, stats.total), (78, 2, 80));
//! ```
//!
//! ## Thread Safety
//!
//! Events are kept in a concurrent map, each guarded by its own lock, so
//! requests for different events run in parallel and requests for the same
//! event serialize only for the duration of a single bind or release.

mod aggregate;
mod allocation;
mod auth;
mod base;
mod coordinator;
pub mod discount;
pub mod error;
mod journal;
mod ledger;
mod query;
mod store;
mod venue;

pub use aggregate::Availability;
pub use allocation::{Allocation, Cancellation, Reservation};
pub use auth::{AccessToken, Identity, LoyaltyTier};
pub use base::{EventId, SeatCode, UserId, VenueId};
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use discount::{DiscountCalculator, DiscountPercent, FlatDiscount};
pub use error::{DiscountError, ReservationError, SeatCodeError, StoreError};
pub use journal::{JournalEntry, JournalKind, ReservationJournal};
pub use ledger::{EventLedger, SeatStats};
pub use query::QueryFacade;
pub use store::{MemoryStore, SeatStore};
pub use venue::{EventInfo, Venue, VenueGeometry};
