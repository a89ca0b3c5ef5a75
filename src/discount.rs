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

//! Discount collaborator contract.
//!
//! A discount is requested after a reservation completes and is never part of
//! the reservation's atomic unit. An expired token only fails the discount
//! call; the caller re-issues the token and retries the discount alone.

use crate::auth::AccessToken;
use crate::base::SeatCode;
use crate::error::DiscountError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discount percentage, always within [`Self::MIN`]..=[`Self::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 50;

    /// Clamps `raw` into the allowed range.
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

pub trait DiscountCalculator {
    /// Computes the discount for `seats` under `token`'s tier.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::TokenExpired`] when `token` is expired at `now`.
    /// - [`DiscountError::EmptySeatList`] when `seats` is empty.
    fn discount(
        &self,
        token: &AccessToken,
        seats: &[SeatCode],
        now: DateTime<Utc>,
    ) -> Result<DiscountPercent, DiscountError>;
}

/// Checks shared by every calculator: a live token and at least one seat.
///
/// # Errors
///
/// See [`DiscountCalculator::discount`].
pub fn validate_request(
    token: &AccessToken,
    seats: &[SeatCode],
    now: DateTime<Utc>,
) -> Result<(), DiscountError> {
    if token.is_expired_at(now) {
        return Err(DiscountError::TokenExpired);
    }
    if seats.is_empty() {
        return Err(DiscountError::EmptySeatList);
    }
    Ok(())
}

/// Grants the same percentage to every valid request, whatever the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatDiscount {
    percent: DiscountPercent,
}

impl FlatDiscount {
    pub fn new(percent: DiscountPercent) -> Self {
        Self { percent }
    }
}

impl DiscountCalculator for FlatDiscount {
    fn discount(
        &self,
        token: &AccessToken,
        seats: &[SeatCode],
        now: DateTime<Utc>,
    ) -> Result<DiscountPercent, DiscountError> {
        validate_request(token, seats, now)?;
        Ok(self.percent)
    }
}
