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

//! Cached free-seat counter for one event.
//!
//! The counter is denormalized from the seat table so availability checks do
//! not scan every seat. It lives inside the same lock as the seats it
//! summarizes (see [`EventLedger`](crate::EventLedger)); every change to it
//! is made in the same critical section as the seat mutation that caused it.

use crate::base::EventId;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    event: EventId,
    available: u32,
    capacity: u32,
}

impl Availability {
    /// A fresh counter with every seat free.
    pub fn new(event: EventId, capacity: u32) -> Self {
        Self {
            event,
            available: capacity,
            capacity,
        }
    }

    pub fn current(&self) -> u32 {
        self.available
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Records `n` seats leaving the free pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityUnderflow`] if fewer than `n` seats are
    /// counted as free. The counter is unchanged on error.
    pub fn decrement(&mut self, n: u32) -> Result<(), StoreError> {
        self.available = self
            .available
            .checked_sub(n)
            .ok_or(StoreError::CapacityUnderflow(self.event))?;
        Ok(())
    }

    /// Records `n` seats returning to the free pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityOverflow`] if the result would exceed the
    /// venue capacity. The counter is unchanged on error.
    pub fn increment(&mut self, n: u32) -> Result<(), StoreError> {
        let next = self
            .available
            .checked_add(n)
            .filter(|next| *next <= self.capacity)
            .ok_or(StoreError::CapacityOverflow(self.event))?;
        self.available = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full() {
        let counter = Availability::new(EventId(1), 12);
        assert_eq!(counter.current(), 12);
        assert_eq!(counter.capacity(), 12);
    }

    #[test]
    fn decrement_then_increment_round_trips() {
        let mut counter = Availability::new(EventId(1), 10);
        counter.decrement(4).unwrap();
        assert_eq!(counter.current(), 6);
        counter.increment(4).unwrap();
        assert_eq!(counter.current(), 10);
    }

    #[test]
    fn underflow_is_rejected_without_change() {
        let mut counter = Availability::new(EventId(3), 2);
        assert_eq!(counter.decrement(3), Err(StoreError::CapacityUnderflow(EventId(3))));
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn overflow_past_capacity_is_rejected() {
        let mut counter = Availability::new(EventId(3), 2);
        assert_eq!(counter.increment(1), Err(StoreError::CapacityOverflow(EventId(3))));
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn zero_is_a_no_op() {
        let mut counter = Availability::new(EventId(1), 5);
        counter.decrement(0).unwrap();
        counter.increment(0).unwrap();
        assert_eq!(counter.current(), 5);
    }
}
