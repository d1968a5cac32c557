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

//! Fleet cars.
//!
//! A car is `Available` until a booking claims it, and returns to
//! `Available` at the drop point when the trip completes:
//!
//! ```text
//!  Available ──book──► InTrip ──complete(end)──► Available (position = end)
//! ```

use crate::base::{CarId, Position, Username};
use crate::error::BookingError;
use parking_lot::Mutex;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Availability of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarState {
    Available,
    InTrip,
}

/// Driver currently assigned to a car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedDriver {
    pub username: Username,
    pub name: String,
}

#[derive(Debug)]
struct CarData {
    position: Position,
    state: CarState,
    driver: Option<AssignedDriver>,
}

/// A car in the fleet.
///
/// Identity fields are immutable; position, state and driver sit behind a
/// lock so that checking and claiming availability is a single step.
#[derive(Debug)]
pub struct Car {
    id: CarId,
    name: String,
    /// Registration order, used to keep listings stable.
    seq: u32,
    inner: Mutex<CarData>,
}

impl Car {
    pub(crate) fn new(id: CarId, name: impl Into<String>, position: Position, seq: u32) -> Self {
        Self {
            id,
            name: name.into(),
            seq,
            inner: Mutex::new(CarData {
                position,
                state: CarState::Available,
                driver: None,
            }),
        }
    }

    pub fn id(&self) -> &CarId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn seq(&self) -> u32 {
        self.seq
    }

    pub fn position(&self) -> Position {
        self.inner.lock().position
    }

    pub fn is_available(&self) -> bool {
        self.inner.lock().state == CarState::Available
    }

    pub fn driver(&self) -> Option<AssignedDriver> {
        self.inner.lock().driver.clone()
    }

    /// Consistent snapshot of the car.
    pub fn status(&self) -> CarStatus {
        let data = self.inner.lock();
        CarStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            position: data.position,
            available: data.state == CarState::Available,
            driver: data.driver.clone(),
        }
    }

    /// Replaces the assigned driver, returning the previous one.
    pub(crate) fn assign_driver(&self, driver: AssignedDriver) -> Option<AssignedDriver> {
        self.inner.lock().driver.replace(driver)
    }

    /// Moves the car into a trip and returns its driver.
    ///
    /// # Errors
    ///
    /// - [`BookingError::CarUnavailable`] if the car is already on a trip.
    /// - [`BookingError::DriverUnassigned`] if nobody drives the car; the car
    ///   stays available.
    pub(crate) fn claim(&self) -> Result<AssignedDriver, BookingError> {
        let mut data = self.inner.lock();
        if data.state != CarState::Available {
            return Err(BookingError::CarUnavailable);
        }
        let driver = data.driver.clone().ok_or(BookingError::DriverUnassigned)?;
        data.state = CarState::InTrip;
        Ok(driver)
    }

    /// Ends the current trip, parking the car at `position`.
    pub(crate) fn release(&self, position: Position) {
        let mut data = self.inner.lock();
        data.state = CarState::Available;
        data.position = position;
    }
}

/// Point-in-time view of a [`Car`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarStatus {
    pub id: CarId,
    pub name: String,
    pub position: Position,
    pub available: bool,
    pub driver: Option<AssignedDriver>,
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Id:{}) Pos:{} Available:{} Driver:{}",
            self.name,
            self.id,
            self.position,
            self.available,
            self.driver.as_ref().map_or("Unassigned", |d| d.name.as_str())
        )
    }
}

impl Serialize for CarStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Car", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("available", &self.available)?;
        state.serialize_field("driver", &self.driver.as_ref().map(|d| &d.username))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swift() -> Car {
        Car::new(CarId::from("C1"), "Swift-101", Position::new(2).unwrap(), 0)
    }

    fn ramesh() -> AssignedDriver {
        AssignedDriver {
            username: Username::from("driver1"),
            name: "Ramesh".to_string(),
        }
    }

    #[test]
    fn new_car_is_available_and_unassigned() {
        let car = swift();
        assert!(car.is_available());
        assert!(car.driver().is_none());
        assert_eq!(car.position().get(), 2);
    }

    #[test]
    fn claim_without_driver_keeps_car_available() {
        let car = swift();
        assert_eq!(car.claim(), Err(BookingError::DriverUnassigned));
        assert!(car.is_available());
    }

    #[test]
    fn claim_then_release() {
        let car = swift();
        car.assign_driver(ramesh());

        assert_eq!(car.claim(), Ok(ramesh()));
        assert!(!car.is_available());
        assert_eq!(car.claim(), Err(BookingError::CarUnavailable));

        car.release(Position::new(7).unwrap());
        assert!(car.is_available());
        assert_eq!(car.position().get(), 7);
    }

    #[test]
    fn assign_driver_is_last_write_wins() {
        let car = swift();
        assert!(car.assign_driver(ramesh()).is_none());
        let suresh = AssignedDriver {
            username: Username::from("driver2"),
            name: "Suresh".to_string(),
        };
        assert_eq!(car.assign_driver(suresh.clone()), Some(ramesh()));
        assert_eq!(car.driver(), Some(suresh));
    }

    #[test]
    fn status_display_matches_console_format() {
        let car = swift();
        assert_eq!(
            car.status().to_string(),
            "Swift-101 (Id:C1) Pos:2 Available:true Driver:Unassigned"
        );
        car.assign_driver(ramesh());
        assert_eq!(
            car.status().to_string(),
            "Swift-101 (Id:C1) Pos:2 Available:true Driver:Ramesh"
        );
    }

    #[test]
    fn status_serializes_driver_username() {
        let car = swift();
        car.assign_driver(ramesh());
        let json = serde_json::to_value(car.status()).unwrap();
        assert_eq!(json["id"], "C1");
        assert_eq!(json["position"], 2);
        assert_eq!(json["available"], true);
        assert_eq!(json["driver"], "driver1");
    }
}
