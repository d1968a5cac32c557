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

//! Property-based tests for the booking service.
//!
//! These tests verify invariants that should hold for any fleet layout and
//! any sequence of valid requests.

use cab_dispatch::{BookingError, BookingService, Fare, TripId};
use proptest::prelude::*;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = u8> {
    1u8..=10
}

/// A pickup and a different drop point.
fn arb_route() -> impl Strategy<Value = (u8, u8)> {
    (arb_point(), arb_point()).prop_filter("pickup must differ from drop", |(p, d)| p != d)
}

/// Car positions, each car with or without a driver.
fn arb_fleet() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((arb_point(), any::<bool>()), 1..12)
}

fn arb_username() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,11}"
}

fn build_service(fleet: &[(u8, bool)]) -> BookingService {
    let service = BookingService::new();
    for (i, (position, staffed)) in fleet.iter().enumerate() {
        let car_id = format!("C{}", i + 1);
        service.add_car(&car_id, &format!("Car-{}", i + 1), *position).unwrap();
        if *staffed {
            service
                .add_driver_and_assign(&format!("driver{}", i + 1), "pass", "Driver", "000", &car_id)
                .unwrap();
        }
    }
    service
        .register_customer("alice", "alice123", "Alice", "alice@example.com")
        .unwrap();
    service
}

// =============================================================================
// Account Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A registered name can be found, and re-registering it in any case fails.
    #[test]
    fn registration_is_case_insensitive_unique(username in arb_username()) {
        let service = BookingService::new();
        service.register_customer(&username, "pw", "Name", "contact").unwrap();

        prop_assert!(service.find_account(&username.to_uppercase()).is_some());
        prop_assert_eq!(
            service.register_customer(&username.to_lowercase(), "pw2", "Other", "c").unwrap_err(),
            BookingError::DuplicateUsername
        );
        prop_assert_eq!(
            service.register_customer(&username.to_uppercase(), "pw2", "Other", "c").unwrap_err(),
            BookingError::DuplicateUsername
        );
    }

    /// Only the exact password logs in.
    #[test]
    fn login_requires_exact_password(
        username in arb_username(),
        password in "[a-z]{1,8}",
        wrong in "[A-Z0-9]{1,8}",
    ) {
        let service = BookingService::new();
        service.register_customer(&username, &password, "Name", "contact").unwrap();

        prop_assert!(service.login(&username, &password).is_ok());
        prop_assert_eq!(
            service.login(&username, &wrong).unwrap_err(),
            BookingError::InvalidCredentials
        );
        prop_assert_eq!(
            service.login(&format!("{}x", username), &password).unwrap_err(),
            BookingError::AccountNotFound
        );
    }
}

// =============================================================================
// Search Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Quotes cover every available car, nearest first, all at the route fare.
    #[test]
    fn search_is_sorted_and_complete(fleet in arb_fleet(), (pickup, drop) in arb_route()) {
        let service = build_service(&fleet);
        let quotes = service.find_available_cars(pickup, drop).unwrap();

        prop_assert_eq!(quotes.len(), fleet.len());
        for pair in quotes.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
        for quote in &quotes {
            prop_assert_eq!(quote.distance, quote.car.position.get().abs_diff(pickup));
            prop_assert_eq!(quote.fare, Fare(u32::from(pickup.abs_diff(drop))));
        }
    }
}

// =============================================================================
// Booking Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The fare is the route length no matter which car is chosen.
    #[test]
    fn price_is_route_distance(
        fleet in arb_fleet(),
        (pickup, drop) in arb_route(),
        pick in any::<prop::sample::Index>(),
    ) {
        let service = build_service(&fleet);
        let cars = service.cars();
        let car = &cars[pick.index(fleet.len())];
        match service.book_trip("alice", car.id.as_str(), pickup, drop) {
            Ok(trip) => {
                prop_assert!(car.driver.is_some());
                prop_assert_eq!(trip.price(), Fare(u32::from(pickup.abs_diff(drop))));
            }
            Err(e) => {
                prop_assert!(car.driver.is_none());
                prop_assert_eq!(e, BookingError::DriverUnassigned);
            }
        }
    }

    /// pickup == drop never creates a trip or touches a car.
    #[test]
    fn same_point_route_is_rejected(fleet in arb_fleet(), point in arb_point()) {
        let service = build_service(&fleet);
        for car in service.cars() {
            prop_assert_eq!(
                service.book_trip("alice", car.id.as_str(), point, point).unwrap_err(),
                BookingError::InvalidRoute
            );
        }
        prop_assert!(service.trips().is_empty());
        prop_assert!(service.cars().iter().all(|c| c.available));
    }

    /// Booking takes the car out of service; completion returns it at the drop.
    #[test]
    fn car_availability_follows_trip(fleet in arb_fleet(), (pickup, drop) in arb_route()) {
        let service = build_service(&fleet);
        for car in service.cars().into_iter().filter(|c| c.driver.is_some()) {
            let trip = service.book_trip("alice", car.id.as_str(), pickup, drop).unwrap();
            prop_assert!(!service.car(car.id.as_str()).unwrap().available);

            service.complete_trip(trip.id(), drop).unwrap();
            let after = service.car(car.id.as_str()).unwrap();
            prop_assert!(after.available);
            prop_assert_eq!(after.position.get(), drop);
        }
    }

    /// Ids count up from T001 with no gaps, even when bookings fail in between.
    #[test]
    fn trip_ids_are_gapless(fleet in arb_fleet(), routes in prop::collection::vec(arb_route(), 1..20)) {
        let service = build_service(&fleet);
        let cars = service.cars();
        let mut booked = 0u32;

        for (i, (pickup, drop)) in routes.iter().enumerate() {
            let car = &cars[i % cars.len()];
            if let Ok(trip) = service.book_trip("alice", car.id.as_str(), *pickup, *drop) {
                booked += 1;
                prop_assert_eq!(trip.id(), TripId(booked));
                prop_assert_eq!(trip.id().to_string(), format!("T{:03}", booked));
                service.complete_trip(trip.id(), *drop).unwrap();
            }
        }

        prop_assert_eq!(service.trips().len(), booked as usize);
        prop_assert_eq!(service.trip_history("alice").unwrap().len(), booked as usize);
    }

    /// A trip can be completed exactly once.
    #[test]
    fn completion_is_single_shot((pickup, drop) in arb_route(), end in arb_point()) {
        let service = build_service(&[(pickup, true)]);
        let trip = service.book_trip("alice", "C1", pickup, drop).unwrap();

        prop_assert!(service.complete_trip(trip.id(), end).is_ok());
        prop_assert_eq!(
            service.complete_trip(trip.id(), end).unwrap_err(),
            BookingError::AlreadyCompleted
        );
        prop_assert_eq!(service.car("C1").unwrap().position.get(), end);
    }
}
