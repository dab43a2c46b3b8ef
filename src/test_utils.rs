//! Shared test utilities for hotel-desk.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::app::ReservationConfig,
    core::{
        clock::FixedClock,
        context::RequestContext,
        hr::{self, NewEmployee},
        policy::{self, CancellationPolicy, NewRatePlan},
        reservation::{self, NewReservation},
        room::{self, NewRoom},
        service::{self, NewPropertyService},
    },
    entities::{self, BookingChannel, HousekeepingStatus},
    errors::Result,
};
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Property every test helper works in
pub const TEST_PROPERTY_ID: i64 = 1;

/// Room type used by test reservations and rooms
pub const TEST_ROOM_TYPE_ID: i64 = 10;

/// Nightly rate of the default test rate plan
pub const TEST_NIGHTLY_RATE: i64 = 1_250_000;

/// Context for [`TEST_PROPERTY_ID`] with a named actor.
#[must_use]
pub fn test_context() -> RequestContext {
    RequestContext {
        property_id: TEST_PROPERTY_ID,
        actor: Some("test_user".to_string()),
    }
}

/// A clock frozen at 2025-06-01 10:00 UTC, well before the test stays.
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock(
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
            .single()
            .unwrap_or_default(),
    )
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates the "Best Available Rate" plan: free until 24h, 50% late, 100% no-show.
pub async fn create_test_rate_plan(db: &DatabaseConnection) -> Result<entities::rate_plan::Model> {
    policy::create_rate_plan(
        db,
        &test_context(),
        &test_clock(),
        NewRatePlan {
            nightly_rate: TEST_NIGHTLY_RATE,
            policy: CancellationPolicy::best_available_rate(),
        },
    )
    .await
}

/// Creates a rate plan with custom terms.
pub async fn create_custom_rate_plan(
    db: &DatabaseConnection,
    name: &str,
    nightly_rate: i64,
    free_until_hours: i32,
    early_fee_percent: i32,
    late_fee_percent: i32,
    no_show_fee_percent: i32,
) -> Result<entities::rate_plan::Model> {
    policy::create_rate_plan(
        db,
        &test_context(),
        &test_clock(),
        NewRatePlan {
            nightly_rate,
            policy: CancellationPolicy {
                name: name.to_string(),
                free_until_hours,
                early_fee_percent,
                late_fee_percent,
                no_show_fee_percent,
            },
        },
    )
    .await
}

/// Reservation input with sensible defaults.
///
/// # Defaults
/// * stay: 2025-06-10 to 2025-06-12 (2 nights)
/// * `room_type_id`: [`TEST_ROOM_TYPE_ID`]
/// * `total_amount`: computed from the rate plan
/// * `channel`: website
#[must_use]
pub fn new_test_reservation(rate_plan_id: i64) -> NewReservation {
    NewReservation {
        guest_id: 500,
        room_type_id: TEST_ROOM_TYPE_ID,
        rate_plan_id,
        check_in: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap_or_default(),
        check_out: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap_or_default(),
        total_amount: None,
        currency: None,
        channel: BookingChannel::Website,
    }
}

/// Creates a pending reservation from [`new_test_reservation`].
pub async fn create_test_reservation(
    db: &DatabaseConnection,
    rate_plan_id: i64,
) -> Result<entities::reservation::Model> {
    reservation::create_reservation(
        db,
        &test_context(),
        &test_clock(),
        &ReservationConfig::default(),
        new_test_reservation(rate_plan_id),
    )
    .await
}

/// Sets up a complete test environment with a rate plan and a pending reservation.
/// Returns (db, `rate_plan`, reservation) for common test scenarios.
pub async fn setup_with_reservation() -> Result<(
    DatabaseConnection,
    entities::rate_plan::Model,
    entities::reservation::Model,
)> {
    let db = setup_test_db().await?;
    let plan = create_test_rate_plan(&db).await?;
    let reservation = create_test_reservation(&db, plan.id).await?;
    Ok((db, plan, reservation))
}

/// Creates a clean, available room.
pub async fn create_test_room(
    db: &DatabaseConnection,
    number: &str,
    room_type_id: i64,
) -> Result<entities::room::Model> {
    room::create_room(
        db,
        &test_context(),
        NewRoom {
            room_type_id,
            number: number.to_string(),
            housekeeping: HousekeepingStatus::Clean,
        },
    )
    .await
}

/// Creates a property service.
pub async fn create_test_service(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    tax_rate_percent: i32,
) -> Result<entities::property_service::Model> {
    service::create_property_service(
        db,
        &test_context(),
        NewPropertyService {
            name: name.to_string(),
            price,
            tax_rate_percent,
        },
    )
    .await
}

/// Creates an employee.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    full_name: &str,
    hourly_rate: i64,
) -> Result<entities::employee::Model> {
    hr::create_employee(
        db,
        &test_context(),
        NewEmployee {
            full_name: full_name.to_string(),
            hourly_rate,
        },
    )
    .await
}
