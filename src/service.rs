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

//! Ride booking service.
//!
//! The [`BookingService`] owns every registry (accounts, cars and trips) and
//! implements the booking flow on top of them:
//!
//! - **Accounts**: registration with case-insensitive unique usernames, login
//!   with an exact password match.
//! - **Search**: available cars ordered by distance to the pickup point, each
//!   quoted the same fare (`|pickup - drop|`).
//! - **Booking**: claims a car, records a trip on the customer and driver.
//! - **Completion**: stamps the trip and parks the car at the drop point.
//! - **Fleet**: owners add cars and drivers; assigning a driver to a car
//!   replaces whoever drove it before.
//!
//! # Thread Safety
//!
//! Registries are [`DashMap`]s and each car guards its own state, so claiming
//! a car is atomic even with many callers. Nested locks are always taken in
//! the order accounts, cars, trips.

use crate::account::{Account, Profile, RoleKind};
use crate::base::{CarId, Fare, Position, TripId, Username};
use crate::car::{AssignedDriver, Car, CarStatus};
use crate::error::BookingError;
use crate::trip::{Trip, TripLog};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

/// An available car offered for a requested route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarQuote {
    pub car: CarStatus,
    /// Points between the car and the pickup.
    pub distance: u8,
    pub fare: Fare,
}

/// Booking service over in-memory registries.
///
/// # Invariants
///
/// - Usernames are unique across customers, drivers and owners, ignoring case.
/// - Car ids are unique, ignoring case.
/// - A car is unavailable exactly while one of its trips is in progress.
/// - Trip ids are sequential from `T001` and never reused.
pub struct BookingService {
    /// Accounts of every role, keyed by username.
    accounts: DashMap<Username, Account>,
    /// Fleet, keyed by car id.
    cars: DashMap<CarId, Car>,
    trips: TripLog,
    /// Registration counter keeping car listings in insertion order.
    car_seq: AtomicU32,
}

impl BookingService {
    /// Creates a service with empty registries.
    pub fn new() -> Self {
        BookingService {
            accounts: DashMap::new(),
            cars: DashMap::new(),
            trips: TripLog::new(),
            car_seq: AtomicU32::new(0),
        }
    }

    /// Looks up an account of any role by username, ignoring case.
    pub fn find_account(&self, username: &str) -> Option<Account> {
        let found = self
            .accounts
            .get(&Username::from(username))
            .map(|account| account.clone());
        debug!(username, found = found.is_some(), "account lookup");
        found
    }

    /// Registers a customer with an empty trip history.
    ///
    /// # Errors
    ///
    /// [`BookingError::DuplicateUsername`] if any account already uses the name.
    pub fn register_customer(
        &self,
        username: &str,
        password: &str,
        name: &str,
        contact: &str,
    ) -> Result<Account, BookingError> {
        let account = Account::customer(username, password, Profile::new(name, contact));
        self.insert_account(account)
    }

    /// Registers an owner account. Only used when seeding.
    ///
    /// # Errors
    ///
    /// [`BookingError::DuplicateUsername`] if any account already uses the name.
    pub fn register_owner(
        &self,
        username: &str,
        password: &str,
        name: &str,
        contact: &str,
    ) -> Result<Account, BookingError> {
        let account = Account::owner(username, password, Profile::new(name, contact));
        self.insert_account(account)
    }

    fn insert_account(&self, account: Account) -> Result<Account, BookingError> {
        // Entry API keeps the uniqueness check and the insert atomic.
        match self.accounts.entry(account.username().clone()) {
            Entry::Occupied(_) => {
                warn!(username = %account.username(), "username already taken");
                Err(BookingError::DuplicateUsername)
            }
            Entry::Vacant(entry) => {
                entry.insert(account.clone());
                info!(username = %account.username(), role = %account.kind(), "account registered");
                Ok(account)
            }
        }
    }

    /// Authenticates an account.
    ///
    /// # Errors
    ///
    /// - [`BookingError::AccountNotFound`] - No account has this username.
    /// - [`BookingError::InvalidCredentials`] - Password does not match exactly.
    pub fn login(&self, username: &str, password: &str) -> Result<Account, BookingError> {
        let account = self
            .find_account(username)
            .ok_or(BookingError::AccountNotFound)?;
        if !account.check_password(password) {
            warn!(username, "login rejected: wrong password");
            return Err(BookingError::InvalidCredentials);
        }
        info!(username = %account.username(), role = %account.kind(), "logged in");
        Ok(account)
    }

    /// Lists available cars for a route, nearest to the pickup first.
    ///
    /// Ties on distance fall back to the fare, which is the same for every
    /// car on a given route, and then to registration order.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidPosition`] - A point is outside `1..=10`.
    /// - [`BookingError::InvalidRoute`] - Pickup equals drop.
    pub fn find_available_cars(&self, pickup: u8, drop: u8) -> Result<Vec<CarQuote>, BookingError> {
        let (pickup, drop) = validate_route(pickup, drop)?;
        let fare = Fare::between(pickup, drop);

        let mut candidates: Vec<(u32, CarQuote)> = self
            .cars
            .iter()
            .filter_map(|car| {
                let status = car.status();
                status.available.then(|| {
                    let quote = CarQuote {
                        distance: status.position.distance(pickup),
                        fare,
                        car: status,
                    };
                    (car.seq(), quote)
                })
            })
            .collect();
        candidates.sort_by_key(|(seq, quote)| (quote.distance, quote.fare, *seq));

        debug!(%pickup, %drop, candidates = candidates.len(), "searched available cars");
        Ok(candidates.into_iter().map(|(_, quote)| quote).collect())
    }

    /// Books `car_id` for a customer and starts the trip.
    ///
    /// On success the car is unavailable and the trip is appended to both the
    /// customer's and the driver's history.
    ///
    /// # Errors
    ///
    /// Checked in this order, before anything is changed:
    /// - [`BookingError::InvalidPosition`] - A point is outside `1..=10`.
    /// - [`BookingError::InvalidRoute`] - Pickup equals drop.
    /// - [`BookingError::AccountNotFound`] - Unknown customer.
    /// - [`BookingError::NotACustomer`] - The account is a driver or owner.
    /// - [`BookingError::NoCarsAvailable`] - Every car is on a trip.
    /// - [`BookingError::CarNotFound`] - Unknown car id.
    /// - [`BookingError::CarUnavailable`] - The car is on a trip.
    /// - [`BookingError::DriverUnassigned`] - Nobody drives the car.
    pub fn book_trip(
        &self,
        customer: &str,
        car_id: &str,
        pickup: u8,
        drop: u8,
    ) -> Result<Trip, BookingError> {
        let (pickup, drop) = validate_route(pickup, drop)?;

        let customer = self
            .find_account(customer)
            .ok_or(BookingError::AccountNotFound)?;
        if customer.kind() != RoleKind::Customer {
            return Err(BookingError::NotACustomer);
        }

        if !self.cars.iter().any(|car| car.is_available()) {
            warn!(customer = %customer.username(), "booking rejected: no cars available");
            return Err(BookingError::NoCarsAvailable);
        }

        let (car_key, driver) = {
            let car = self
                .cars
                .get(&CarId::from(car_id))
                .ok_or(BookingError::CarNotFound)?;
            let driver = car.claim().inspect_err(|e| {
                warn!(car = %car.id(), error = %e, "booking rejected");
            })?;
            (car.id().clone(), driver)
        };

        let trip = self.trips.record(|id| {
            Trip::start(
                id,
                customer.username().clone(),
                driver.username.clone(),
                car_key,
                pickup,
                drop,
            )
        });

        for username in [trip.customer(), trip.driver()] {
            if let Some(mut account) = self.accounts.get_mut(username) {
                account.record_trip(trip.id());
            }
        }

        info!(
            trip = %trip.id(),
            customer = %trip.customer(),
            driver = %trip.driver(),
            car = %trip.car(),
            price = %trip.price(),
            "trip booked"
        );
        Ok(trip)
    }

    /// Completes a trip and makes its car available again at `end`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidPosition`] - `end` is outside `1..=10`.
    /// - [`BookingError::TripNotFound`] - Unknown trip id.
    /// - [`BookingError::AlreadyCompleted`] - The trip already ended.
    pub fn complete_trip(&self, trip_id: TripId, end: u8) -> Result<Trip, BookingError> {
        let end = Position::new(end)?;
        let trip = self.trips.complete(trip_id)?;

        if let Some(car) = self.cars.get(trip.car()) {
            car.release(end);
        }

        info!(trip = %trip.id(), car = %trip.car(), %end, "trip completed");
        Ok(trip)
    }

    /// Adds an available car without a driver.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidPosition`] - `position` is outside `1..=10`.
    /// - [`BookingError::DuplicateCarId`] - The id exists, ignoring case.
    pub fn add_car(&self, id: &str, name: &str, position: u8) -> Result<CarStatus, BookingError> {
        let position = Position::new(position)?;
        match self.cars.entry(CarId::from(id)) {
            Entry::Occupied(_) => {
                warn!(car = id, "car id already taken");
                Err(BookingError::DuplicateCarId)
            }
            Entry::Vacant(entry) => {
                let seq = self.car_seq.fetch_add(1, Ordering::SeqCst);
                let car = entry.insert(Car::new(CarId::from(id), name, position, seq));
                info!(car = id, car_name = name, %position, "car added");
                Ok(car.status())
            }
        }
    }

    /// Creates a driver account and assigns it to `car_id` in both directions.
    ///
    /// Any driver previously on the car is replaced without notice; that
    /// driver keeps pointing at the car.
    ///
    /// # Errors
    ///
    /// - [`BookingError::DuplicateUsername`] - Any account already uses the name.
    /// - [`BookingError::CarNotFound`] - Unknown car id.
    pub fn add_driver_and_assign(
        &self,
        username: &str,
        password: &str,
        name: &str,
        contact: &str,
        car_id: &str,
    ) -> Result<Account, BookingError> {
        let Entry::Vacant(entry) = self.accounts.entry(Username::from(username)) else {
            warn!(username, "username already taken");
            return Err(BookingError::DuplicateUsername);
        };

        let car = self
            .cars
            .get(&CarId::from(car_id))
            .ok_or(BookingError::CarNotFound)?;

        let mut driver = Account::driver(username, password, Profile::new(name, contact));
        driver.assign_car(car.id().clone());
        let replaced = car.assign_driver(AssignedDriver {
            username: driver.username().clone(),
            name: driver.name().to_string(),
        });
        entry.insert(driver.clone());

        match replaced {
            Some(previous) => info!(
                driver = username,
                car = %car.id(),
                replaced = %previous.username,
                "driver assigned, replacing previous driver"
            ),
            None => info!(driver = username, car = %car.id(), "driver assigned"),
        }
        Ok(driver)
    }

    /// Snapshot of one car.
    pub fn car(&self, id: &str) -> Option<CarStatus> {
        self.cars.get(&CarId::from(id)).map(|car| car.status())
    }

    /// Snapshot of every car in registration order.
    pub fn cars(&self) -> Vec<CarStatus> {
        let mut cars: Vec<(u32, CarStatus)> = self
            .cars
            .iter()
            .map(|car| (car.seq(), car.status()))
            .collect();
        cars.sort_by_key(|(seq, _)| *seq);
        cars.into_iter().map(|(_, status)| status).collect()
    }

    pub fn trip(&self, id: TripId) -> Option<Trip> {
        self.trips.get(id)
    }

    /// Every trip in id order.
    pub fn trips(&self) -> Vec<Trip> {
        self.trips.all()
    }

    /// Trips of a customer or driver, in booking order. Empty for owners.
    ///
    /// # Errors
    ///
    /// [`BookingError::AccountNotFound`] for an unknown username.
    pub fn trip_history(&self, username: &str) -> Result<Vec<Trip>, BookingError> {
        let account = self
            .find_account(username)
            .ok_or(BookingError::AccountNotFound)?;
        Ok(account
            .trips()
            .iter()
            .filter_map(|id| self.trips.get(*id))
            .collect())
    }
}

impl Default for BookingService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_route(pickup: u8, drop: u8) -> Result<(Position, Position), BookingError> {
    let pickup = Position::new(pickup)?;
    let drop = Position::new(drop)?;
    if pickup == drop {
        return Err(BookingError::InvalidRoute);
    }
    Ok((pickup, drop))
}
