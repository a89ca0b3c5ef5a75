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

//! Property-based tests for the reservation coordinator.
//!
//! These tests verify invariants that should hold for any sequence of
//! reservations and cancellations.

use proptest::prelude::*;
use seat_ledger::{
    Coordinator, EventId, Identity, LoyaltyTier, MemoryStore, SeatCode, SeatStore, UserId, Venue,
    VenueId,
};
use std::collections::BTreeSet;

const EVENT: EventId = EventId(1);
const ROWS: u16 = 3;
const COLUMNS: u8 = 4;
const TOTAL: u32 = ROWS as u32 * COLUMNS as u32;

#[derive(Debug, Clone)]
enum Op {
    Search { user: u32, count: u32 },
    Select { user: u32, seats: Vec<SeatCode> },
    Cancel { user: u32 },
}

// =============================================================================
// Arbitrary Strategies
// =============================================================================

fn arb_seat() -> impl Strategy<Value = SeatCode> {
    (1..=ROWS, 0..COLUMNS).prop_map(|(row, column)| SeatCode::new(row, column).unwrap())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=4u32, 1..=5u32).prop_map(|(user, count)| Op::Search { user, count }),
        (1..=4u32, prop::collection::vec(arb_seat(), 1..5))
            .prop_map(|(user, seats)| Op::Select { user, seats }),
        (1..=4u32).prop_map(|user| Op::Cancel { user }),
    ]
}

fn coordinator() -> Coordinator<MemoryStore> {
    let store = MemoryStore::new();
    store.add_venue(Venue::new(VenueId(1), ROWS, COLUMNS).unwrap()).unwrap();
    store.add_event(EVENT, "Property", VenueId(1)).unwrap();
    Coordinator::new(store)
}

fn identity(user: u32) -> Identity {
    Identity::new(UserId(user), LoyaltyTier::Standard)
}

/// Holder of every occupied seat, as (user, seats) pairs.
fn holders(coordinator: &Coordinator<MemoryStore>) -> Vec<(u32, BTreeSet<SeatCode>)> {
    (1..=4)
        .map(|user| (user, coordinator.store().held_by(EVENT, UserId(user)).unwrap()))
        .collect()
}

/// Applies one operation, returning whether it succeeded.
fn apply(coordinator: &Coordinator<MemoryStore>, op: &Op) -> bool {
    match op {
        Op::Search { user, count } => coordinator
            .reserve_by_search(Some(&identity(*user)), EVENT, *count)
            .is_ok(),
        Op::Select { user, seats } => coordinator
            .reserve_by_selection(Some(&identity(*user)), EVENT, seats.clone())
            .is_ok(),
        Op::Cancel { user } => coordinator.cancel(Some(&identity(*user)), EVENT).is_ok(),
    }
}

// =============================================================================
// Ledger Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Available plus occupied always equals the venue size, and the cached
    /// counter always matches the free seats.
    #[test]
    fn conservation_holds_after_every_operation(
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        let coordinator = coordinator();

        for op in &ops {
            apply(&coordinator, op);
            let stats = coordinator.store().stats(EVENT).unwrap();
            prop_assert_eq!(stats.available + stats.occupied, TOTAL);
            prop_assert_eq!(stats.total, TOTAL);
            prop_assert_eq!(
                stats.available as usize,
                coordinator.store().free_seats(EVENT).unwrap().len()
            );
        }
    }

    /// Every occupied seat has exactly one holder.
    #[test]
    fn seats_never_have_two_holders(
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        let coordinator = coordinator();
        for op in &ops {
            apply(&coordinator, op);
        }

        let mut seen = BTreeSet::new();
        for (_, seats) in holders(&coordinator) {
            for seat in seats {
                prop_assert!(seen.insert(seat), "seat {} held twice", seat);
            }
        }
        prop_assert_eq!(seen, coordinator.store().occupied_seats(EVENT).unwrap());
    }

    /// A reservation that fails leaves the ledger exactly as it was.
    #[test]
    fn failed_reservations_change_nothing(
        setup in prop::collection::vec(arb_op(), 0..20),
        attempt in arb_op(),
    ) {
        let coordinator = coordinator();
        for op in &setup {
            apply(&coordinator, op);
        }

        let before = holders(&coordinator);
        let available_before = coordinator.store().availability(EVENT).unwrap();

        let succeeded = match &attempt {
            Op::Cancel { .. } => true,
            op => apply(&coordinator, op),
        };

        if !succeeded {
            prop_assert_eq!(holders(&coordinator), before);
            prop_assert_eq!(coordinator.store().availability(EVENT).unwrap(), available_before);
        }
    }

    /// A successful reservation holds exactly the requested number of seats.
    #[test]
    fn successful_reservations_are_complete(
        setup in prop::collection::vec(arb_op(), 0..20),
        user in 1..=4u32,
        count in 1..=5u32,
    ) {
        let coordinator = coordinator();
        for op in &setup {
            apply(&coordinator, op);
        }

        let free_before: Vec<SeatCode> =
            coordinator.store().free_seats(EVENT).unwrap().into_iter().collect();
        let held_before = coordinator.store().held_by(EVENT, UserId(user)).unwrap();

        match coordinator.reserve_by_search(Some(&identity(user)), EVENT, count) {
            Ok(reservation) => {
                // Lowest-ordered free seats, in order.
                prop_assert_eq!(&reservation.seats[..], &free_before[..count as usize]);
                let held_after = coordinator.store().held_by(EVENT, UserId(user)).unwrap();
                prop_assert_eq!(held_after.len(), held_before.len() + count as usize);
            }
            Err(_) => prop_assert!(free_before.len() < count as usize),
        }
    }
}

// =============================================================================
// Cancellation Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Cancelling twice releases nothing the second time and never errors.
    #[test]
    fn cancellation_is_idempotent(
        setup in prop::collection::vec(arb_op(), 0..20),
        user in 1..=4u32,
    ) {
        let coordinator = coordinator();
        for op in &setup {
            apply(&coordinator, op);
        }

        let held = coordinator.store().held_by(EVENT, UserId(user)).unwrap();
        let first = coordinator.cancel(Some(&identity(user)), EVENT).unwrap();
        prop_assert_eq!(first.released_count() as usize, held.len());

        let second = coordinator.cancel(Some(&identity(user)), EVENT).unwrap();
        prop_assert_eq!(second.released_count(), 0);
        prop_assert!(!second.success());
    }

    /// Cancelling restores the counter by exactly the seats released.
    #[test]
    fn cancellation_restores_availability(
        setup in prop::collection::vec(arb_op(), 0..20),
        user in 1..=4u32,
    ) {
        let coordinator = coordinator();
        for op in &setup {
            apply(&coordinator, op);
        }

        let before = coordinator.store().availability(EVENT).unwrap();
        let cancellation = coordinator.cancel(Some(&identity(user)), EVENT).unwrap();
        prop_assert_eq!(
            coordinator.store().availability(EVENT).unwrap(),
            before + cancellation.released_count()
        );
    }
}
