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

//! Event ledger public API integration tests.

use seat_ledger::{EventId, EventLedger, SeatCode, SeatStats, UserId, Venue, VenueId};
use std::sync::Arc;
use std::thread;

// === Helper Functions ===

fn seats(codes: &[&str]) -> Vec<SeatCode> {
    codes.iter().map(|c| c.parse().unwrap()).collect()
}

fn ledger(rows: u16, columns: u8) -> EventLedger {
    let venue = Venue::new(VenueId(1), rows, columns).unwrap();
    EventLedger::new(EventId(1), "Ledger test", &venue)
}

// === Basic Ledger Tests ===

#[test]
fn new_ledger_has_every_seat_free() {
    let ledger = ledger(2, 3);
    assert_eq!(ledger.available(), 6);
    assert_eq!(ledger.free().len(), 6);
    assert!(ledger.occupied().is_empty());
    assert_eq!(
        ledger.stats(),
        SeatStats {
            available: 6,
            occupied: 0,
            total: 6
        }
    );
}

#[test]
fn info_reflects_catalogue_fields() {
    let ledger = ledger(1, 1);
    let info = ledger.info();
    assert_eq!(info.id, EventId(1));
    assert_eq!(info.name, "Ledger test");
    assert_eq!(info.venue, VenueId(1));
    assert_eq!(info.available, 1);
}

#[test]
fn bind_moves_seats_to_occupied() {
    let ledger = ledger(2, 2);
    let bound = ledger.bind(&seats(&["1A", "2B"]), UserId(5)).unwrap();

    assert_eq!(bound, seats(&["1A", "2B"]));
    assert_eq!(ledger.available(), 2);
    assert_eq!(ledger.occupied().into_iter().collect::<Vec<_>>(), seats(&["1A", "2B"]));
    assert_eq!(ledger.free().into_iter().collect::<Vec<_>>(), seats(&["1B", "2A"]));
}

#[test]
fn bind_returns_fewer_rows_when_some_are_held() {
    let ledger = ledger(1, 3);
    ledger.bind(&seats(&["1B"]), UserId(1)).unwrap();

    let bound = ledger.bind(&seats(&["1A", "1B", "1C"]), UserId(2)).unwrap();
    assert_eq!(bound, seats(&["1A", "1C"]));
    assert_eq!(ledger.available(), 0);
    assert_eq!(ledger.held_by(UserId(1)).len(), 1);
}

#[test]
fn bind_of_nothing_free_changes_nothing() {
    let ledger = ledger(1, 1);
    ledger.bind(&seats(&["1A"]), UserId(1)).unwrap();

    let bound = ledger.bind(&seats(&["1A"]), UserId(2)).unwrap();
    assert!(bound.is_empty());
    assert_eq!(ledger.available(), 0);
    assert_eq!(ledger.held_by(UserId(1)).len(), 1);
}

#[test]
fn release_returns_zero_when_nothing_held() {
    let ledger = ledger(1, 2);
    assert!(ledger.release(UserId(3)).unwrap().is_empty());
    assert_eq!(ledger.available(), 2);
}

#[test]
fn unbind_ignores_seats_of_other_users() {
    let ledger = ledger(1, 2);
    ledger.bind(&seats(&["1A"]), UserId(1)).unwrap();

    assert!(ledger.unbind(&seats(&["1A"]), UserId(2)).unwrap().is_empty());
    assert_eq!(ledger.held_by(UserId(1)).len(), 1);
    assert_eq!(ledger.available(), 1);
}

// === Concurrency Tests ===

#[test]
fn concurrent_binds_for_same_seat_have_one_winner() {
    let ledger = Arc::new(ledger(1, 1));
    let handles: Vec<_> = (0..16)
        .map(|user| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.bind(&seats(&["1A"]), UserId(user)).unwrap().len())
        })
        .collect();

    let winners: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(winners, 1);
    assert_eq!(ledger.available(), 0);
}

#[test]
fn concurrent_bind_and_release_keep_counter_consistent() {
    let ledger = Arc::new(ledger(4, 4));
    let handles: Vec<_> = (0..8)
        .map(|user| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for round in 0..200u32 {
                    let free: Vec<SeatCode> = ledger.free().into_iter().take(2).collect();
                    ledger.bind(&free, UserId(user)).unwrap();
                    if round % 3 == 0 {
                        ledger.release(UserId(user)).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = ledger.stats();
    assert_eq!(stats.available as usize, ledger.free().len());
    assert_eq!(stats.total, 16);
}
