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

use cab_dispatch::{
    Account, BookingError, BookingService, RoleKind, Trip, seed_demo_fleet, seed_owner,
};
use clap::{ArgAction, Parser};
use csv::Writer;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Cab Dispatch - Interactive cab booking console
///
/// Customers book the nearest car, drivers review their trips and the owner
/// manages the fleet. All state lives in memory for the session.
#[derive(Parser, Debug)]
#[command(name = "cab-dispatch")]
#[command(about = "An interactive cab booking console", long_about = None)]
struct Args {
    /// Start with only the owner account (owner/owner) instead of the demo fleet
    #[arg(long)]
    no_seed: bool,

    /// Write the trip log as CSV to FILE when the session ends
    ///
    /// Columns: trip,customer,driver,car,pickup,drop,price,started_at,ended_at
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let service = BookingService::new();
    let seeded = if args.no_seed {
        seed_owner(&service)
    } else {
        seed_demo_fleet(&service)
    };
    if let Err(e) = seeded {
        eprintln!("Error seeding data: {}", e);
        process::exit(1);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(&service, stdin.lock(), stdout.lock());
    if let Err(e) = console.run() {
        eprintln!("Error running console: {}", e);
        process::exit(1);
    }

    if let Some(path) = &args.export {
        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error creating file '{}': {}", path.display(), e);
                process::exit(1);
            }
        };
        if let Err(e) = write_trips(&service, file) {
            eprintln!("Error writing trips: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Write the trip log to a CSV writer, in trip id order.
///
/// # CSV Format
///
/// Columns: `trip, customer, driver, car, pickup, drop, price, started_at, ended_at`
///
/// ```csv
/// trip,customer,driver,car,pickup,drop,price,started_at,ended_at
/// T001,alice,driver1,C1,3,7,4,2025-01-01T10:00:00Z,2025-01-01T10:05:00Z
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_trips<W: Write>(service: &BookingService, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for trip in service.trips() {
        wtr.serialize(&trip)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Menu-driven front end over a [`BookingService`].
///
/// Reads answers line by line from `input`; running out of input ends the
/// session as if the user chose Exit.
struct Console<'a, R, W> {
    service: &'a BookingService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    fn new(service: &'a BookingService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "=== Welcome to Cab Dispatch ===")?;
        match self.main_loop() {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                writeln!(self.output)?;
                writeln!(self.output, "Goodbye!")
            }
            other => other,
        }
    }

    fn main_loop(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\nSelect:")?;
            writeln!(self.output, "1) Register (Customer)")?;
            writeln!(self.output, "2) Login")?;
            writeln!(self.output, "3) Exit")?;
            match self.read_line("Choice: ")?.as_str() {
                "1" => self.register_customer()?,
                "2" => self.login()?,
                "3" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid choice. Try again.")?,
            }
        }
    }

    fn register_customer(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Customer Registration ---")?;
        let username = self.read_non_empty("Choose username: ")?;
        if self.service.find_account(&username).is_some() {
            return writeln!(self.output, "Username already exists. Choose another.");
        }
        let password = self.read_non_empty("Choose password: ")?;
        let name = self.read_non_empty("Your full name: ")?;
        let contact = self.read_non_empty("Contact (phone/email): ")?;

        match self
            .service
            .register_customer(&username, &password, &name, &contact)
        {
            Ok(_) => writeln!(
                self.output,
                "Customer '{}' created. You can login now.",
                username
            ),
            Err(e) => self.report(&e),
        }
    }

    fn login(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Login ---")?;
        let username = self.read_non_empty("Username: ")?;
        if self.service.find_account(&username).is_none() {
            return writeln!(self.output, "Account not found.");
        }
        let password = self.read_non_empty("Password: ")?;

        let account = match self.service.login(&username, &password) {
            Ok(account) => account,
            Err(e) => return self.report(&e),
        };

        writeln!(self.output, "Welcome, {}!", account.username())?;
        match account.kind() {
            RoleKind::Customer => self.customer_menu(&account),
            RoleKind::Driver => self.driver_menu(&account),
            RoleKind::Owner => self.owner_menu(&account),
        }
    }

    fn customer_menu(&mut self, customer: &Account) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Customer: {} ---", customer.name())?;
            writeln!(self.output, "1) Book a Cab")?;
            writeln!(self.output, "2) View My Trips")?;
            writeln!(self.output, "3) Logout")?;
            match self.read_line("Choice: ")?.as_str() {
                "1" => self.book_cab(customer)?,
                "2" => self.show_history(customer)?,
                "3" => return writeln!(self.output, "Logging out..."),
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }
    }

    fn driver_menu(&mut self, driver: &Account) -> io::Result<()> {
        loop {
            // Re-read so a reassignment made by the owner shows up.
            let car_name = self
                .service
                .find_account(driver.username().as_str())
                .and_then(|a| a.assigned_car().cloned())
                .and_then(|car| self.service.car(car.as_str()))
                .map(|car| car.name);
            writeln!(self.output, "\n{}", driver.banner(car_name.as_deref()))?;
            writeln!(self.output, "1) View My Trips")?;
            writeln!(self.output, "2) Logout")?;
            match self.read_line("Choice: ")?.as_str() {
                "1" => self.show_history(driver)?,
                "2" => return writeln!(self.output, "Logging out..."),
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }
    }

    fn owner_menu(&mut self, owner: &Account) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n{}", owner.banner(None))?;
            writeln!(self.output, "1) View All Trips")?;
            writeln!(self.output, "2) View Car Status")?;
            writeln!(self.output, "3) Add Car")?;
            writeln!(self.output, "4) Add Driver & Assign to Car")?;
            writeln!(self.output, "5) Logout")?;
            match self.read_line("Choice: ")?.as_str() {
                "1" => self.show_all_trips()?,
                "2" => self.show_cars()?,
                "3" => self.add_car()?,
                "4" => self.add_driver()?,
                "5" => return writeln!(self.output, "Logging out..."),
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }
    }

    fn book_cab(&mut self, customer: &Account) -> io::Result<()> {
        writeln!(self.output, "\n--- Book a Cab ---")?;
        let pickup = self.read_number("Enter your pickup point (1-10): ", 1, 10)?;
        let drop = self.read_number("Enter your drop point (1-10): ", 1, 10)?;

        let quotes = match self.service.find_available_cars(pickup, drop) {
            Ok(quotes) if quotes.is_empty() => {
                return writeln!(self.output, "No cars available right now.");
            }
            Ok(quotes) => quotes,
            Err(e) => return self.report(&e),
        };

        writeln!(self.output, "\nAvailable cars near you (sorted by distance):")?;
        for (i, quote) in quotes.iter().enumerate() {
            writeln!(
                self.output,
                "{}) {} (Id:{}) Pos:{} Driver:{} Distance:{} Price:{}",
                i + 1,
                quote.car.name,
                quote.car.id,
                quote.car.position,
                quote.car.driver.as_ref().map_or("Unassigned", |d| d.name.as_str()),
                quote.distance,
                quote.fare
            )?;
        }

        let prompt = format!("Select car (1-{}) or 0 to cancel: ", quotes.len());
        let selection = self.read_number(&prompt, 0, quotes.len())?;
        if selection == 0 {
            return writeln!(self.output, "Cancelled booking.");
        }
        let chosen = &quotes[selection - 1].car;

        let trip = match self.service.book_trip(
            customer.username().as_str(),
            chosen.id.as_str(),
            pickup,
            drop,
        ) {
            Ok(trip) => trip,
            Err(e) => return self.report(&e),
        };

        let driver = self.display_name(trip.driver().as_str());
        writeln!(
            self.output,
            "Booked {} with Driver {}. Trip id: {}. Price: {}",
            chosen.name,
            driver,
            trip.id(),
            trip.price()
        )?;
        writeln!(self.output, "Simulating trip... (press Enter to complete trip)")?;
        self.wait_for_enter()?;

        match self.service.complete_trip(trip.id(), drop) {
            Ok(trip) => writeln!(
                self.output,
                "Trip {} completed. Car now at position {} and available.",
                trip.id(),
                trip.drop_point()
            ),
            Err(e) => self.report(&e),
        }
    }

    fn show_history(&mut self, account: &Account) -> io::Result<()> {
        writeln!(self.output, "\n--- Trip History for {} ---", account.name())?;
        let trips = match self.service.trip_history(account.username().as_str()) {
            Ok(trips) => trips,
            Err(e) => return self.report(&e),
        };
        if trips.is_empty() {
            return writeln!(self.output, "No trips yet.");
        }
        for trip in &trips {
            let line = self.describe_trip(trip);
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    fn show_all_trips(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- All Trips (Owner view) ---")?;
        let trips = self.service.trips();
        if trips.is_empty() {
            return writeln!(self.output, "No trips recorded yet.");
        }
        for trip in &trips {
            let line = self.describe_trip(trip);
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    fn show_cars(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Cars Status ---")?;
        for car in self.service.cars() {
            writeln!(self.output, "{}", car)?;
        }
        Ok(())
    }

    fn add_car(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Add New Car ---")?;
        let id = loop {
            let id = self.read_non_empty("Car unique Id: ")?;
            if self.service.car(&id).is_none() {
                break id;
            }
            writeln!(self.output, "Id already exists. Provide another.")?;
        };
        let name = self.read_non_empty("Car name/model: ")?;
        let position = self.read_number("Initial position (1-10): ", 1, 10)?;

        match self.service.add_car(&id, &name, position) {
            Ok(car) => writeln!(
                self.output,
                "Added car {} at position {}.",
                car.name, car.position
            ),
            Err(e) => self.report(&e),
        }
    }

    fn add_driver(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Add Driver and Assign to Car ---")?;
        let username = self.read_non_empty("Driver username: ")?;
        if self.service.find_account(&username).is_some() {
            return writeln!(self.output, "Username already exists.");
        }
        let password = self.read_non_empty("Driver password: ")?;
        let name = self.read_non_empty("Driver full name: ")?;
        let contact = self.read_non_empty("Driver contact: ")?;

        let cars = self.service.cars();
        writeln!(self.output, "Available cars to assign:")?;
        for (i, car) in cars.iter().enumerate() {
            writeln!(
                self.output,
                "{}) {} Id:{} Driver:{} Pos:{}",
                i + 1,
                car.name,
                car.id,
                car.driver.as_ref().map_or("None", |d| d.name.as_str()),
                car.position
            )?;
        }

        let prompt = format!("Select car to assign (1-{}) or 0 to cancel: ", cars.len());
        let selection = self.read_number(&prompt, 0, cars.len())?;
        if selection == 0 {
            return writeln!(self.output, "Cancelled.");
        }
        let car = &cars[selection - 1];

        match self.service.add_driver_and_assign(
            &username,
            &password,
            &name,
            &contact,
            car.id.as_str(),
        ) {
            Ok(driver) => writeln!(
                self.output,
                "Driver {} added and assigned to {}.",
                driver.name(),
                car.name
            ),
            Err(e) => self.report(&e),
        }
    }

    /// One-line summary of a trip with participant names resolved.
    fn describe_trip(&self, trip: &Trip) -> String {
        let car = self
            .service
            .car(trip.car().as_str())
            .map_or_else(|| trip.car().to_string(), |car| car.name);
        let ended = trip.ended_at().map_or_else(
            || "In-Progress".to_string(),
            |at| at.format("%Y-%m-%d %H:%M").to_string(),
        );
        format!(
            "Trip:{} Cust:{} Driver:{} Car:{} P:{} D:{} Price:{} Start:{} End:{}",
            trip.id(),
            self.display_name(trip.customer().as_str()),
            self.display_name(trip.driver().as_str()),
            car,
            trip.pickup(),
            trip.drop_point(),
            trip.price(),
            trip.started_at().format("%Y-%m-%d %H:%M"),
            ended
        )
    }

    fn display_name(&self, username: &str) -> String {
        self.service
            .find_account(username)
            .map_or_else(|| username.to_string(), |a| a.name().to_string())
    }

    fn report(&mut self, error: &BookingError) -> io::Result<()> {
        let message = match error {
            BookingError::DriverUnassigned => {
                "Selected car has no assigned driver. Owner must assign a driver first.".to_string()
            }
            BookingError::InvalidRoute => "Pickup and drop cannot be the same.".to_string(),
            BookingError::NoCarsAvailable => "No cars available right now.".to_string(),
            BookingError::InvalidCredentials => "Invalid password.".to_string(),
            BookingError::AccountNotFound => "Account not found.".to_string(),
            other => format!("Error: {}", other),
        };
        writeln!(self.output, "{}", message)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        Ok(line.trim().to_string())
    }

    fn read_non_empty(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let value = self.read_line(prompt)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "Cannot be empty.")?;
        }
    }

    fn read_number<T>(&mut self, prompt: &str, min: T, max: T) -> io::Result<T>
    where
        T: std::str::FromStr + PartialOrd + Copy + std::fmt::Display,
    {
        loop {
            if let Ok(value) = self.read_line(prompt)?.parse::<T>() {
                if value >= min && value <= max {
                    return Ok(value);
                }
            }
            writeln!(
                self.output,
                "Enter a valid number between {} and {}.",
                min, max
            )?;
        }
    }

    fn wait_for_enter(&mut self) -> io::Result<()> {
        let mut line = String::new();
        // End of input still lets the trip finish.
        self.input.read_line(&mut line)?;
        Ok(())
    }
}
