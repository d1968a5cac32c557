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

//! # Cab Dispatch
//!
//! This library provides an in-memory cab booking service: customers book the
//! nearest available car for a ride between two points on a 1-10 line, and
//! owners manage the fleet and its drivers.
//!
//! ## Core Components
//!
//! - [`BookingService`]: Registries of accounts, cars and trips plus the booking flow
//! - [`Account`]: Customer, driver or owner identity tagged by [`Role`]
//! - [`Car`]: Fleet car with its availability state machine
//! - [`Trip`]: Ride record from booking to completion
//! - [`BookingError`]: Error types for booking and fleet failures
//!
//! ## Example
//!
//! ```
//! use cab_dispatch::{BookingService, Fare, TripId};
//!
//! let service = BookingService::new();
//! service.add_car("C1", "Swift-101", 2).unwrap();
//! service.add_driver_and_assign("driver1", "pass1", "Ramesh", "9990001", "C1").unwrap();
//! service.register_customer("alice", "alice123", "Alice", "alice@example.com").unwrap();
//!
//! // Nearest car first, every quote carries the same fare
//! let quotes = service.find_available_cars(3, 7).unwrap();
//! assert_eq!(quotes[0].fare, Fare(4));
//!
//! let trip = service.book_trip("alice", "C1", 3, 7).unwrap();
//! assert_eq!(trip.id(), TripId(1));
//! assert!(!service.car("C1").unwrap().available);
//!
//! service.complete_trip(trip.id(), 7).unwrap();
//! assert_eq!(service.car("C1").unwrap().position.get(), 7);
//! ```
//!
//! ## Thread Safety
//!
//! The service can be shared between threads; claiming a car and allocating a
//! trip id are atomic, so concurrent bookings never share a car or an id.

pub mod account;
mod base;
pub mod car;
pub mod error;
pub mod seed;
mod service;
pub mod trip;

pub use account::{Account, Profile, Role, RoleKind};
pub use base::{CarId, Fare, Position, TripId, Username};
pub use car::{AssignedDriver, Car, CarState, CarStatus};
pub use error::BookingError;
pub use seed::{seed_demo_fleet, seed_owner};
pub use service::{BookingService, CarQuote};
pub use trip::{Trip, TripLog};
