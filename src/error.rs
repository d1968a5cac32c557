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

//! Error types for booking and fleet operations.

use thiserror::Error;

/// Booking service errors.
///
/// Every variant is recoverable: the registry is left untouched when one is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Username is already taken by a customer, driver or owner
    #[error("username already exists")]
    DuplicateUsername,

    /// Car id is already registered
    #[error("car id already exists")]
    DuplicateCarId,

    /// No account matches the username
    #[error("account not found")]
    AccountNotFound,

    /// Password does not match
    #[error("invalid password")]
    InvalidCredentials,

    /// Pickup and drop are the same point
    #[error("pickup and drop cannot be the same")]
    InvalidRoute,

    /// Point outside the service line
    #[error("position must be between 1 and 10")]
    InvalidPosition,

    /// Every car is currently on a trip
    #[error("no cars available right now")]
    NoCarsAvailable,

    /// Referenced car id does not exist
    #[error("car not found")]
    CarNotFound,

    /// Car is already on a trip
    #[error("car is not available")]
    CarUnavailable,

    /// Car has nobody to drive it
    #[error("selected car has no assigned driver")]
    DriverUnassigned,

    /// Referenced trip id does not exist
    #[error("trip not found")]
    TripNotFound,

    /// Trip already has an end time
    #[error("trip already completed")]
    AlreadyCompleted,

    /// Only customers can book trips
    #[error("account is not a customer")]
    NotACustomer,
}
