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

//! Account management.
//!
//! Customers, drivers and owners share one [`Account`] shape and are told
//! apart by their [`Role`] tag.
//!
//! # Example
//!
//! ```
//! use cab_dispatch::{Account, Profile, RoleKind};
//!
//! let account = Account::customer("alice", "alice123", Profile::new("Alice", "alice@example.com"));
//! assert_eq!(account.kind(), RoleKind::Customer);
//! assert!(account.check_password("alice123"));
//! assert!(account.trips().is_empty());
//! ```

use crate::base::{CarId, TripId, Username};
use std::fmt;

/// Display name and contact details of a person behind an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub contact: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

/// Role-specific state of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Customer {
        /// Trips booked by this customer, oldest first.
        trips: Vec<TripId>,
    },
    Driver {
        /// Last car this driver was assigned to.
        car: Option<CarId>,
        /// Trips driven, oldest first.
        trips: Vec<TripId>,
    },
    Owner,
}

/// Fieldless tag of a [`Role`], for dispatching on the kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Customer,
    Driver,
    Owner,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Customer => "customer",
            Self::Driver => "driver",
            Self::Owner => "owner",
        };
        f.write_str(label)
    }
}

/// Login identity plus profile and role state.
#[derive(Clone)]
pub struct Account {
    username: Username,
    password: String,
    profile: Profile,
    role: Role,
}

impl Account {
    pub fn customer(
        username: impl Into<Username>,
        password: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self::with_role(username, password, profile, Role::Customer { trips: Vec::new() })
    }

    pub fn driver(
        username: impl Into<Username>,
        password: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self::with_role(
            username,
            password,
            profile,
            Role::Driver {
                car: None,
                trips: Vec::new(),
            },
        )
    }

    pub fn owner(
        username: impl Into<Username>,
        password: impl Into<String>,
        profile: Profile,
    ) -> Self {
        Self::with_role(username, password, profile, Role::Owner)
    }

    fn with_role(
        username: impl Into<Username>,
        password: impl Into<String>,
        profile: Profile,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            profile,
            role,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn kind(&self) -> RoleKind {
        match self.role {
            Role::Customer { .. } => RoleKind::Customer,
            Role::Driver { .. } => RoleKind::Driver,
            Role::Owner => RoleKind::Owner,
        }
    }

    /// Exact, case-sensitive comparison.
    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }

    /// Trip history in booking order. Always empty for owners.
    pub fn trips(&self) -> &[TripId] {
        match &self.role {
            Role::Customer { trips } | Role::Driver { trips, .. } => trips,
            Role::Owner => &[],
        }
    }

    pub fn assigned_car(&self) -> Option<&CarId> {
        match &self.role {
            Role::Driver { car, .. } => car.as_ref(),
            _ => None,
        }
    }

    /// Menu heading for this account. `car_name` is only shown for drivers.
    pub fn banner(&self, car_name: Option<&str>) -> String {
        match self.role {
            Role::Customer { .. } => format!("Customer menu for {} ({})", self.name(), self.username),
            Role::Driver { .. } => format!(
                "Driver menu for {} ({}) - Car: {}",
                self.name(),
                self.username,
                car_name.unwrap_or("None")
            ),
            Role::Owner => format!("Owner menu for {} ({})", self.name(), self.username),
        }
    }

    pub(crate) fn record_trip(&mut self, trip_id: TripId) {
        match &mut self.role {
            Role::Customer { trips } | Role::Driver { trips, .. } => trips.push(trip_id),
            Role::Owner => {}
        }
    }

    pub(crate) fn assign_car(&mut self, car_id: CarId) {
        if let Role::Driver { car, .. } = &mut self.role {
            *car = Some(car_id);
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("profile", &self.profile)
            .field("role", &self.role)
            .finish()
    }
}
