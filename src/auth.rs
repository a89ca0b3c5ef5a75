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

//! Caller identity and short-lived access tokens.
//!
//! Authentication and token signing happen outside this crate. The core only
//! needs the already-verified user and loyalty tier, and the discount
//! collaborator only needs a tier-carrying token with an expiry.

use crate::base::UserId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoyaltyTier {
    Standard,
    Loyal,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user: UserId,
    pub tier: LoyaltyTier,
}

impl Identity {
    pub fn new(user: UserId, tier: LoyaltyTier) -> Self {
        Self { user, tier }
    }
}

/// Time-bounded token carrying the caller's identity and tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    identity: Identity,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub const DEFAULT_TTL_SECS: i64 = 60;

    /// Issues a token valid for [`Self::DEFAULT_TTL_SECS`] from `now`.
    pub fn issue(identity: Identity, now: DateTime<Utc>) -> Self {
        Self::issue_with_ttl(identity, now, Duration::seconds(Self::DEFAULT_TTL_SECS))
    }

    pub fn issue_with_ttl(identity: Identity, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            identity,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn tier(&self) -> LoyaltyTier {
        self.identity.tier
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is expired from its expiry instant onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_token_lives_sixty_seconds() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::issue(Identity::new(UserId(1), LoyaltyTier::Loyal), now);

        assert_eq!(token.tier(), LoyaltyTier::Loyal);
        assert!(!token.is_expired_at(now + Duration::seconds(59)));
        assert!(token.is_expired_at(now + Duration::seconds(60)));
    }
}
