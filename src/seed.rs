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

//! Demo data loaded at startup.

use crate::error::BookingError;
use crate::service::BookingService;
use tracing::info;

/// Username and password of the seeded owner.
pub const OWNER_LOGIN: (&str, &str) = ("owner", "owner");

/// Registers the owner account, the only way an owner is ever created.
///
/// # Errors
///
/// [`BookingError::DuplicateUsername`] if the owner already exists.
pub fn seed_owner(service: &BookingService) -> Result<(), BookingError> {
    let (username, password) = OWNER_LOGIN;
    service.register_owner(username, password, "Super Owner", "owner@example.com")?;
    Ok(())
}

/// Seeds the owner, five cars, three drivers and one sample customer.
///
/// | Car | Name       | Pos | Driver          |
/// |-----|------------|-----|-----------------|
/// | C1  | Swift-101  | 2   | driver1 Ramesh  |
/// | C2  | Dzire-202  | 5   | driver2 Suresh  |
/// | C3  | Alto-303   | 1   | -               |
/// | C4  | Innova-404 | 8   | driver3 Mahesh  |
/// | C5  | Baleno-505 | 10  | -               |
///
/// # Errors
///
/// Fails if any seeded name or id is already taken.
pub fn seed_demo_fleet(service: &BookingService) -> Result<(), BookingError> {
    seed_owner(service)?;

    for (id, name, position) in [
        ("C1", "Swift-101", 2),
        ("C2", "Dzire-202", 5),
        ("C3", "Alto-303", 1),
        ("C4", "Innova-404", 8),
        ("C5", "Baleno-505", 10),
    ] {
        service.add_car(id, name, position)?;
    }

    for (username, password, name, contact, car) in [
        ("driver1", "pass1", "Ramesh", "9990001", "C1"),
        ("driver2", "pass2", "Suresh", "9990002", "C2"),
        ("driver3", "pass3", "Mahesh", "9990003", "C4"),
    ] {
        service.add_driver_and_assign(username, password, name, contact, car)?;
    }

    service.register_customer("alice", "alice123", "Alice", "alice@example.com")?;

    info!("seeded owner, 5 cars, 3 drivers, 1 sample customer (alice/alice123)");
    Ok(())
}
