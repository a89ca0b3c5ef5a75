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

//! Allocation requests and their outcomes.
//!
//! Both allocation strategies share one bind-verify-rollback routine in the
//! [`Coordinator`](crate::Coordinator); they differ only in how the seats to
//! claim are chosen:
//! - [`Allocation::Search`]: the lowest-ordered free seats, `count` of them.
//! - [`Allocation::Selection`]: exactly the seats the caller picked.

use crate::base::{EventId, SeatCode, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Allocation {
    Search { count: u32 },
    Selection { seats: Vec<SeatCode> },
}

impl Allocation {
    /// Builds a selection, dropping repeated seat codes but keeping the
    /// caller's order.
    pub fn selection(seats: impl IntoIterator<Item = SeatCode>) -> Self {
        let mut unique: Vec<SeatCode> = Vec::new();
        for seat in seats {
            if !unique.contains(&seat) {
                unique.push(seat);
            }
        }
        Self::Selection { seats: unique }
    }

    /// Number of seats the request asks for.
    pub fn requested(&self) -> u32 {
        match self {
            Self::Search { count } => *count,
            Self::Selection { seats } => seats.len() as u32,
        }
    }

    /// Strategy name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Selection { .. } => "selection",
        }
    }
}

/// A successful allocation: every requested seat is now held by `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub event: EventId,
    pub user: UserId,
    pub seats: Vec<SeatCode>,
}

/// Outcome of a cancellation. Releasing nothing is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub event: EventId,
    pub user: UserId,
    pub released: Vec<SeatCode>,
}

impl Cancellation {
    pub fn released_count(&self) -> u32 {
        self.released.len() as u32
    }

    /// `false` when the user held nothing in this event.
    pub fn success(&self) -> bool {
        !self.released.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(code: &str) -> SeatCode {
        code.parse().unwrap()
    }

    #[test]
    fn selection_deduplicates_in_order() {
        let allocation = Allocation::selection([seat("2B"), seat("1A"), seat("2B")]);
        assert_eq!(
            allocation,
            Allocation::Selection {
                seats: vec![seat("2B"), seat("1A")]
            }
        );
        assert_eq!(allocation.requested(), 2);
    }

    #[test]
    fn deserializes_tagged_requests() {
        let search: Allocation = serde_json::from_str(r#"{"type":"search","count":3}"#).unwrap();
        assert_eq!(search, Allocation::Search { count: 3 });
        assert_eq!(search.kind(), "search");

        let selection: Allocation =
            serde_json::from_str(r#"{"type":"selection","seats":["1A","1C"]}"#).unwrap();
        assert_eq!(selection.requested(), 2);
        assert_eq!(selection.kind(), "selection");
    }

    #[test]
    fn empty_cancellation_is_not_successful() {
        let cancellation = Cancellation {
            event: EventId(1),
            user: UserId(1),
            released: Vec::new(),
        };
        assert!(!cancellation.success());
        assert_eq!(cancellation.released_count(), 0);
    }
}
