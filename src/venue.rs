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

//! Venue layouts and event descriptors.

use crate::base::{EventId, SeatCode, VenueId};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Rectangular seat grid of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    id: VenueId,
    rows: u16,
    columns: u8,
}

impl Venue {
    /// Creates a venue layout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidVenue`] unless `rows >= 1` and
    /// `1 <= columns <= 26`.
    pub fn new(id: VenueId, rows: u16, columns: u8) -> Result<Self, StoreError> {
        if rows == 0 || columns == 0 || columns > SeatCode::MAX_COLUMNS {
            return Err(StoreError::InvalidVenue { rows, columns });
        }
        Ok(Self { id, rows, columns })
    }

    pub fn id(&self) -> VenueId {
        self.id
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn capacity(&self) -> u32 {
        u32::from(self.rows) * u32::from(self.columns)
    }

    /// Whether the seat lies inside this grid.
    pub fn contains(&self, seat: SeatCode) -> bool {
        seat.row() <= self.rows && seat.column() < self.columns
    }

    /// Every seat of the venue in ascending seat-code order.
    pub fn seat_codes(&self) -> impl Iterator<Item = SeatCode> + '_ {
        (1..=self.rows).flat_map(move |row| {
            (0..self.columns).filter_map(move |column| SeatCode::new(row, column).ok())
        })
    }
}

/// Catalogue entry for a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub id: EventId,
    pub name: String,
    pub venue: VenueId,
    /// Cached free-seat count at the time the entry was read.
    pub available: u32,
}

/// Venue dimensions as seen through an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueGeometry {
    pub venue: VenueId,
    pub rows: u16,
    pub columns: u8,
}

impl From<&Venue> for VenueGeometry {
    fn from(venue: &Venue) -> Self {
        Self {
            venue: venue.id,
            rows: venue.rows,
            columns: venue.columns,
        }
    }
}
