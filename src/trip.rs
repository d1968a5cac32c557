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

//! Trip records and the trip log.
//!
//! A trip is created when a booking claims a car and is completed exactly
//! once, when the car is released at the drop point.

use crate::base::{CarId, Fare, Position, TripId, Username};
use crate::error::BookingError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

/// A ride linking a customer, a driver and a car.
///
/// Participants are referenced by key; the registry owns the entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    #[serde(rename = "trip")]
    id: TripId,
    customer: Username,
    driver: Username,
    car: CarId,
    pickup: Position,
    drop: Position,
    price: Fare,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Trip {
    pub(crate) fn start(
        id: TripId,
        customer: Username,
        driver: Username,
        car: CarId,
        pickup: Position,
        drop: Position,
    ) -> Self {
        Self {
            id,
            customer,
            driver,
            car,
            pickup,
            drop,
            price: Fare::between(pickup, drop),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn id(&self) -> TripId {
        self.id
    }

    pub fn customer(&self) -> &Username {
        &self.customer
    }

    pub fn driver(&self) -> &Username {
        &self.driver
    }

    pub fn car(&self) -> &CarId {
        &self.car
    }

    pub fn pickup(&self) -> Position {
        self.pickup
    }

    pub fn drop_point(&self) -> Position {
        self.drop
    }

    pub fn price(&self) -> Fare {
        self.price
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_completed(&self) -> bool {
        self.ended_at.is_some()
    }

    fn complete(&mut self, at: DateTime<Utc>) -> Result<(), BookingError> {
        if self.ended_at.is_some() {
            return Err(BookingError::AlreadyCompleted);
        }
        self.ended_at = Some(at);
        Ok(())
    }
}

/// Thread-safe trip store handing out sequential ids.
///
/// Ids start at 1 and are only consumed by [`TripLog::record`], so a
/// rejected booking never leaves a gap.
#[derive(Debug)]
pub struct TripLog {
    trips: DashMap<TripId, Trip>,
    last_id: AtomicU32,
}

impl TripLog {
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
            last_id: AtomicU32::new(0),
        }
    }

    /// Allocates the next id, builds the trip with it and stores it.
    pub(crate) fn record(&self, build: impl FnOnce(TripId) -> Trip) -> Trip {
        let id = TripId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let trip = build(id);
        self.trips.insert(id, trip.clone());
        trip
    }

    /// Stamps the end time of a trip.
    ///
    /// # Errors
    ///
    /// - [`BookingError::TripNotFound`] for an unknown id.
    /// - [`BookingError::AlreadyCompleted`] if the trip already ended.
    pub(crate) fn complete(&self, id: TripId) -> Result<Trip, BookingError> {
        let mut trip = self.trips.get_mut(&id).ok_or(BookingError::TripNotFound)?;
        trip.complete(Utc::now())?;
        Ok(trip.clone())
    }

    pub fn get(&self, id: TripId) -> Option<Trip> {
        self.trips.get(&id).map(|trip| trip.clone())
    }

    /// All trips in id order.
    pub fn all(&self) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self.trips.iter().map(|entry| entry.value().clone()).collect();
        trips.sort_by_key(Trip::id);
        trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl Default for TripLog {
    fn default() -> Self {
        Self::new()
    }
}
