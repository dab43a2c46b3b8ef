//! Restaurant tables and table bookings.
//!
//! ```text
//! pending --seat--> seated --complete--> completed
//!    |
//!    +----cancel---> cancelled
//! ```
//!
//! Tables are claimed the same way rooms are: a conditional update on
//! `held_by_booking_id IS NULL`, so a table is never handed to two bookings.

use crate::{
    core::{
        assignment::{eligible_statuses, find_table_candidate},
        clock::Clock,
        context::RequestContext,
    },
    entities::{
        HousekeepingStatus, OperationalStatus, RestaurantTable, TableBooking, TableBookingStatus,
        restaurant_table, table_booking,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Something that can happen to a table booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableBookingEvent {
    /// Party arrived and sat down
    Seat,
    /// Party left
    Complete,
    /// Booking called off before seating
    Cancel,
}

impl fmt::Display for TableBookingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Seat => "seat",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        })
    }
}

impl TableBookingStatus {
    /// Status reached by `event`, or [`Error::InvalidTransition`].
    pub fn apply(self, event: TableBookingEvent) -> Result<Self> {
        match (self, event) {
            (Self::Pending, TableBookingEvent::Seat) => Ok(Self::Seated),
            (Self::Seated, TableBookingEvent::Complete) => Ok(Self::Completed),
            (Self::Pending, TableBookingEvent::Cancel) => Ok(Self::Cancelled),
            _ => Err(Error::InvalidTransition {
                from: self.to_value(),
                event: event.to_string(),
                reason: "table booking transition not allowed".to_string(),
            }),
        }
    }
}

/// Input for a new restaurant table
#[derive(Debug, Clone, Deserialize)]
pub struct NewTable {
    /// Label shown to staff, e.g. "Patio 4"
    pub name: String,
    /// Seats at the table
    pub capacity: i32,
}

/// Input for a new table booking
#[derive(Debug, Clone, Deserialize)]
pub struct NewTableBooking {
    /// Name the booking is under
    pub guest_name: String,
    /// Number of diners
    pub party_size: i32,
    /// Requested time
    pub booked_for: DateTime<Utc>,
}

/// Booking plus the table it now holds
#[derive(Debug, Clone, Serialize)]
pub struct TableAssignment {
    /// Updated booking
    pub booking: table_booking::Model,
    /// Claimed table
    pub table: restaurant_table::Model,
}

/// Adds an available, clean table to the context's property.
pub async fn create_table(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_table: NewTable,
) -> Result<restaurant_table::Model> {
    let name = new_table.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Table name cannot be empty"));
    }
    if new_table.capacity < 1 {
        return Err(Error::validation(format!(
            "Table capacity must be at least 1, got {}",
            new_table.capacity
        )));
    }

    let table = restaurant_table::ActiveModel {
        property_id: Set(ctx.property_id),
        name: Set(name),
        capacity: Set(new_table.capacity),
        status: Set(OperationalStatus::Available),
        housekeeping: Set(HousekeepingStatus::Clean),
        held_by_booking_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        property_id = ctx.property_id,
        table_id = table.id,
        capacity = table.capacity,
        "Restaurant table created"
    );
    Ok(table)
}

/// Tables of the context's property, smallest first.
pub async fn list_tables<C>(conn: &C, ctx: &RequestContext) -> Result<Vec<restaurant_table::Model>>
where
    C: ConnectionTrait,
{
    RestaurantTable::find()
        .filter(restaurant_table::Column::PropertyId.eq(ctx.property_id))
        .order_by_asc(restaurant_table::Column::Capacity)
        .order_by_asc(restaurant_table::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Creates a pending booking with no table yet.
pub async fn create_table_booking(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    new_booking: NewTableBooking,
) -> Result<table_booking::Model> {
    let guest_name = new_booking.guest_name.trim().to_string();
    if guest_name.is_empty() {
        return Err(Error::validation("Guest name cannot be empty"));
    }
    if new_booking.party_size < 1 {
        return Err(Error::validation(format!(
            "Party size must be at least 1, got {}",
            new_booking.party_size
        )));
    }

    let booking = table_booking::ActiveModel {
        property_id: Set(ctx.property_id),
        guest_name: Set(guest_name),
        party_size: Set(new_booking.party_size),
        booked_for: Set(new_booking.booked_for),
        status: Set(TableBookingStatus::Pending),
        assigned_table_id: Set(None),
        created_at: Set(clock.now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        property_id = ctx.property_id,
        booking_id = booking.id,
        party_size = booking.party_size,
        "Table booking created"
    );
    Ok(booking)
}

/// Finds a booking of the context's property.
pub async fn get_table_booking<C>(
    conn: &C,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<Option<table_booking::Model>>
where
    C: ConnectionTrait,
{
    TableBooking::find_by_id(booking_id)
        .filter(table_booking::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

async fn require_booking<C>(
    conn: &C,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<table_booking::Model>
where
    C: ConnectionTrait,
{
    get_table_booking(conn, ctx, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("table booking", booking_id))
}

async fn claim_table<C>(
    conn: &C,
    table_id: i64,
    booking_id: i64,
    override_maintenance: bool,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = RestaurantTable::update_many()
        .col_expr(
            restaurant_table::Column::HeldByBookingId,
            Expr::value(booking_id),
        )
        .filter(restaurant_table::Column::Id.eq(table_id))
        .filter(restaurant_table::Column::HeldByBookingId.is_null())
        .filter(restaurant_table::Column::Status.is_in(eligible_statuses(override_maintenance)))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Clears a booking's hold; a table that was in use is left available and dirty.
async fn release_table<C>(conn: &C, table_id: i64, booking_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(table) = RestaurantTable::find_by_id(table_id)
        .filter(restaurant_table::Column::HeldByBookingId.eq(booking_id))
        .one(conn)
        .await?
    else {
        return Ok(());
    };

    let was_occupied = table.status == OperationalStatus::Occupied;
    let mut table: restaurant_table::ActiveModel = table.into();
    table.held_by_booking_id = Set(None);
    if was_occupied {
        table.status = Set(OperationalStatus::Available);
        table.housekeeping = Set(HousekeepingStatus::Dirty);
    }
    table.update(conn).await?;
    debug!(table_id, booking_id, was_occupied, "Table released");
    Ok(())
}

/// Matches and claims the smallest free table that seats the party.
pub async fn assign_table(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    booking_id: i64,
    override_maintenance: bool,
) -> Result<TableAssignment> {
    let txn = db.begin().await?;
    let booking = require_booking(&txn, ctx, booking_id).await?;
    if booking.status != TableBookingStatus::Pending {
        return Err(Error::InvalidTransition {
            from: booking.status.to_value(),
            event: "assign_table".to_string(),
            reason: "only pending bookings can be assigned".to_string(),
        });
    }

    let mut tables = list_tables(&txn, ctx).await?;
    let table_id = loop {
        let Some(candidate) =
            find_table_candidate(&tables, booking.party_size, override_maintenance).map(|t| t.id)
        else {
            return Err(Error::ResourceUnavailable {
                resource: "table",
                requirement: format!("party of {}", booking.party_size),
            });
        };
        if claim_table(&txn, candidate, booking.id, override_maintenance).await? {
            break candidate;
        }
        tables.retain(|t| t.id != candidate);
    };

    if let Some(previous) = booking.assigned_table_id.filter(|id| *id != table_id) {
        release_table(&txn, previous, booking.id).await?;
    }

    let mut booking: table_booking::ActiveModel = booking.into();
    booking.assigned_table_id = Set(Some(table_id));
    let booking = booking.update(&txn).await?;
    let table = RestaurantTable::find_by_id(table_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("table", table_id))?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        booking_id,
        table_id,
        party_size = booking.party_size,
        capacity = table.capacity,
        "Table assigned"
    );
    Ok(TableAssignment { booking, table })
}

async fn apply_event(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    booking_id: i64,
    event: TableBookingEvent,
) -> Result<table_booking::Model> {
    let txn = db.begin().await?;
    let booking = require_booking(&txn, ctx, booking_id).await?;
    let next = booking.status.apply(event)?;

    match (event, booking.assigned_table_id) {
        (TableBookingEvent::Seat, None) => {
            return Err(Error::InvalidTransition {
                from: booking.status.to_value(),
                event: event.to_string(),
                reason: "no table assigned".to_string(),
            });
        }
        (TableBookingEvent::Seat, Some(table_id)) => {
            let seated = RestaurantTable::update_many()
                .col_expr(
                    restaurant_table::Column::Status,
                    Expr::value(OperationalStatus::Occupied),
                )
                .filter(restaurant_table::Column::Id.eq(table_id))
                .filter(restaurant_table::Column::HeldByBookingId.eq(booking.id))
                .exec(&txn)
                .await?;
            if seated.rows_affected == 0 {
                return Err(Error::ResourceUnavailable {
                    resource: "table",
                    requirement: format!("booking {} (hold on table {table_id} lost)", booking.id),
                });
            }
        }
        (TableBookingEvent::Complete | TableBookingEvent::Cancel, Some(table_id)) => {
            release_table(&txn, table_id, booking.id).await?;
        }
        (_, None) => {}
    }

    let result = TableBooking::update_many()
        .col_expr(table_booking::Column::Status, Expr::value(next))
        .filter(table_booking::Column::Id.eq(booking.id))
        .filter(table_booking::Column::Status.eq(booking.status))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: booking.status.to_value(),
            event: event.to_string(),
            reason: "table booking was modified concurrently".to_string(),
        });
    }
    let booking = require_booking(&txn, ctx, booking_id).await?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        booking_id,
        %event,
        status = %booking.status.to_value(),
        "Table booking updated"
    );
    Ok(booking)
}

/// `pending -> seated`; the assigned table becomes occupied.
pub async fn seat_booking(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<table_booking::Model> {
    apply_event(db, ctx, booking_id, TableBookingEvent::Seat).await
}

/// `seated -> completed`; the table is released available and dirty.
pub async fn complete_booking(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<table_booking::Model> {
    apply_event(db, ctx, booking_id, TableBookingEvent::Complete).await
}

/// `pending -> cancelled`; any held table is released.
pub async fn cancel_booking(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<table_booking::Model> {
    apply_event(db, ctx, booking_id, TableBookingEvent::Cancel).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    async fn booking_for(db: &DatabaseConnection, party_size: i32) -> Result<table_booking::Model> {
        create_table_booking(
            db,
            &test_context(),
            &test_clock(),
            NewTableBooking {
                guest_name: "Tran Thi B".to_string(),
                party_size,
                booked_for: test_clock().now(),
            },
        )
        .await
    }

    async fn table(db: &DatabaseConnection, name: &str, capacity: i32) -> Result<restaurant_table::Model> {
        create_table(
            db,
            &test_context(),
            NewTable {
                name: name.to_string(),
                capacity,
            },
        )
        .await
    }

    #[test]
    fn test_booking_transitions() {
        use TableBookingEvent as E;
        use TableBookingStatus as S;
        assert_eq!(S::Pending.apply(E::Seat).ok(), Some(S::Seated));
        assert_eq!(S::Seated.apply(E::Complete).ok(), Some(S::Completed));
        assert_eq!(S::Pending.apply(E::Cancel).ok(), Some(S::Cancelled));
        assert!(S::Seated.apply(E::Cancel).is_err());
        assert!(S::Completed.apply(E::Seat).is_err());
        assert!(S::Cancelled.apply(E::Complete).is_err());
    }

    #[tokio::test]
    async fn test_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let ctx = test_context();
        let result = create_table(
            &db,
            &ctx,
            NewTable {
                name: "T1".to_string(),
                capacity: 0,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_table_booking(
            &db,
            &ctx,
            &test_clock(),
            NewTableBooking {
                guest_name: String::new(),
                party_size: 2,
                booked_for: test_clock().now(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_dining_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        table(&db, "Window", 2).await?;
        let four_top = table(&db, "Patio", 4).await?;
        table(&db, "Hall", 8).await?;
        let booking = booking_for(&db, 3).await?;

        let assignment = assign_table(&db, &ctx, booking.id, false).await?;
        assert_eq!(assignment.table.id, four_top.id);
        assert_eq!(assignment.table.held_by_booking_id, Some(booking.id));

        let seated = seat_booking(&db, &ctx, booking.id).await?;
        assert_eq!(seated.status, TableBookingStatus::Seated);

        let completed = complete_booking(&db, &ctx, booking.id).await?;
        assert_eq!(completed.status, TableBookingStatus::Completed);

        let tables = list_tables(&db, &ctx).await?;
        let patio = tables.iter().find(|t| t.id == four_top.id).unwrap();
        assert_eq!(patio.status, OperationalStatus::Available);
        assert_eq!(patio.housekeeping, HousekeepingStatus::Dirty);
        assert_eq!(patio.held_by_booking_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_table_large_enough() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        table(&db, "Window", 2).await?;
        let booking = booking_for(&db, 6).await?;

        let result = assign_table(&db, &ctx, booking.id, false).await;
        assert!(matches!(
            result,
            Err(Error::ResourceUnavailable {
                resource: "table",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_seat_requires_table_and_cancel_releases() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let two_top = table(&db, "Window", 2).await?;
        let booking = booking_for(&db, 2).await?;

        let result = seat_booking(&db, &ctx, booking.id).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        assign_table(&db, &ctx, booking.id, false).await?;
        let other = booking_for(&db, 2).await?;
        assert!(assign_table(&db, &ctx, other.id, false).await.is_err());

        cancel_booking(&db, &ctx, booking.id).await?;
        let assignment = assign_table(&db, &ctx, other.id, false).await?;
        assert_eq!(assignment.table.id, two_top.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_seat_fails_when_table_hold_is_gone() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let two_top = table(&db, "Window", 2).await?;
        let booking = booking_for(&db, 2).await?;
        assign_table(&db, &ctx, booking.id, false).await?;

        RestaurantTable::update_many()
            .col_expr(
                restaurant_table::Column::HeldByBookingId,
                Expr::value(Option::<i64>::None),
            )
            .filter(restaurant_table::Column::Id.eq(two_top.id))
            .exec(&db)
            .await?;

        let result = seat_booking(&db, &ctx, booking.id).await;
        assert!(matches!(
            result,
            Err(Error::ResourceUnavailable {
                resource: "table",
                ..
            })
        ));
        let unchanged = get_table_booking(&db, &ctx, booking.id).await?.unwrap();
        assert_eq!(unchanged.status, TableBookingStatus::Pending);
        let table = RestaurantTable::find_by_id(two_top.id).one(&db).await?.unwrap();
        assert_eq!(table.status, OperationalStatus::Available);
        Ok(())
    }
}
