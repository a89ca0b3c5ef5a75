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

//! Error types for seat storage, reservation and discount requests.

use crate::base::{EventId, SeatCode, VenueId};
use thiserror::Error;

/// Seat code parsing and construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeatCodeError {
    /// Text is not `<digits><letter>`
    #[error("malformed seat code {0:?}")]
    Malformed(String),

    /// Rows start at 1
    #[error("seat row must be at least 1")]
    InvalidRow,

    /// Columns run from `A` to `Z`
    #[error("seat column must be between A and Z")]
    InvalidColumn,
}

/// Errors raised by a [`SeatStore`](crate::SeatStore) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing storage could not be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// No event with this identifier
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// No venue with this identifier
    #[error("venue {0} not found")]
    VenueNotFound(VenueId),

    /// Event identifier already registered
    #[error("event {0} already exists")]
    DuplicateEvent(EventId),

    /// Venue identifier already registered
    #[error("venue {0} already exists")]
    DuplicateVenue(VenueId),

    /// Venue dimensions outside the addressable grid
    #[error("invalid venue layout {rows}x{columns}")]
    InvalidVenue { rows: u16, columns: u8 },

    /// Releasing seats would push the availability counter past the seat count
    #[error("availability counter overflow for event {0}")]
    CapacityOverflow(EventId),

    /// Binding seats would push the availability counter below zero
    #[error("availability counter underflow for event {0}")]
    CapacityUnderflow(EventId),
}

/// Reservation coordinator errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Fewer free seats than requested; nothing was changed
    #[error("not enough seats available, only {available} left")]
    InsufficientCapacity { available: u32, requested: u32 },

    /// A concurrent caller took some of the seats; the attempt was rolled back
    #[error("seats already occupied: {}", format_seats(.contended))]
    PartialContention { contended: Vec<SeatCode> },

    /// The seat store could not complete the request
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Referenced event or venue does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// No caller identity supplied for a mutating request
    #[error("not authenticated")]
    NotAuthenticated,

    /// Zero seats requested
    #[error("at least one seat must be requested")]
    EmptyRequest,

    /// Request exceeds the configured per-request seat limit
    #[error("requested {requested} seats, limit is {limit}")]
    TooManySeats { requested: u32, limit: u32 },

    /// Selected seat is outside the venue grid
    #[error("seat {0} does not exist in this venue")]
    UnknownSeat(SeatCode),
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::NotFound(format!("event {id}")),
            StoreError::VenueNotFound(id) => Self::NotFound(format!("venue {id}")),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Discount collaborator errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// Access token lifetime elapsed; re-issue and retry the discount only
    #[error("access token expired")]
    TokenExpired,

    /// Discount requested for no seats
    #[error("discount requires at least one seat")]
    EmptySeatList,
}

fn format_seats(seats: &[SeatCode]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
