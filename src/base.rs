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

//! Core identifier types for events, venues, users and seats.

use crate::error::SeatCodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EventId(pub u32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a venue layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VenueId(pub u32);

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a single seat inside a venue, rendered as `<row><letter>`.
///
/// Rows are 1-based, columns are 0-based and rendered as `A`..`Z`, so the
/// first seat of a venue is `1A`. Ordering is by row first and column
/// second, which is the order seats are handed out by a search.
///
/// ```
/// use seat_ledger::SeatCode;
///
/// let seat: SeatCode = "12C".parse().unwrap();
/// assert_eq!(seat.row(), 12);
/// assert_eq!(seat.column(), 2);
/// assert_eq!(seat.to_string(), "12C");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatCode {
    row: u16,
    column: u8,
}

impl SeatCode {
    /// Number of distinct column letters.
    pub const MAX_COLUMNS: u8 = 26;

    /// Builds a seat code from a 1-based row and a 0-based column index.
    ///
    /// # Errors
    ///
    /// Returns [`SeatCodeError::InvalidRow`] for row 0 and
    /// [`SeatCodeError::InvalidColumn`] for a column past `Z`.
    pub fn new(row: u16, column: u8) -> Result<Self, SeatCodeError> {
        if row == 0 {
            return Err(SeatCodeError::InvalidRow);
        }
        if column >= Self::MAX_COLUMNS {
            return Err(SeatCodeError::InvalidColumn);
        }
        Ok(Self { row, column })
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    /// Column letter, `A` for column 0.
    pub fn letter(&self) -> char {
        char::from(b'A' + self.column)
    }
}

impl fmt::Display for SeatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.letter())
    }
}

impl FromStr for SeatCode {
    type Err = SeatCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(letter) = s.chars().last() else {
            return Err(SeatCodeError::Malformed(s.to_string()));
        };
        let digits = &s[..s.len() - letter.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SeatCodeError::Malformed(s.to_string()));
        }
        if !letter.is_ascii_alphabetic() {
            return Err(SeatCodeError::Malformed(s.to_string()));
        }

        let row: u16 = digits
            .parse()
            .map_err(|_| SeatCodeError::Malformed(s.to_string()))?;
        let column = letter.to_ascii_uppercase() as u8 - b'A';
        Self::new(row, column)
    }
}

impl TryFrom<String> for SeatCode {
    type Error = SeatCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatCode> for String {
    fn from(seat: SeatCode) -> Self {
        seat.to_string()
    }
}
