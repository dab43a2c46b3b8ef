//! Room inventory and room claims.
//!
//! A room is claimed for a reservation by setting `held_by_reservation_id` with a
//! conditional `UPDATE ... WHERE held_by_reservation_id IS NULL`, so two concurrent
//! assignments can never both win the same room. A room carries at most one hold at a
//! time regardless of stay dates.

use crate::{
    core::{
        assignment::eligible_statuses,
        context::RequestContext,
        page::{Page, PageRequest, fetch_page},
    },
    entities::{HousekeepingStatus, OperationalStatus, Room, room},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info};

/// Input for a new room
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    /// Rate plan that doubles as the room type
    pub room_type_id: i64,
    /// Door number, unique per property by convention
    pub number: String,
    /// Starting housekeeping state, clean unless given
    #[serde(default = "default_housekeeping")]
    pub housekeeping: HousekeepingStatus,
}

const fn default_housekeeping() -> HousekeepingStatus {
    HousekeepingStatus::Clean
}

/// Adds an available room to the context's property.
pub async fn create_room(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_room: NewRoom,
) -> Result<room::Model> {
    let number = new_room.number.trim().to_string();
    if number.is_empty() {
        return Err(Error::validation("Room number cannot be empty"));
    }

    let room = room::ActiveModel {
        property_id: Set(ctx.property_id),
        room_type_id: Set(new_room.room_type_id),
        number: Set(number),
        status: Set(OperationalStatus::Available),
        housekeeping: Set(new_room.housekeeping),
        held_by_reservation_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        property_id = ctx.property_id,
        room_id = room.id,
        number = %room.number,
        "Room created"
    );
    Ok(room)
}

/// Looks up a room of the context's property.
pub async fn get_room<C>(conn: &C, ctx: &RequestContext, room_id: i64) -> Result<Option<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id)
        .filter(room::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

async fn require_room<C>(conn: &C, ctx: &RequestContext, room_id: i64) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    get_room(conn, ctx, room_id)
        .await?
        .ok_or_else(|| Error::not_found("room", room_id))
}

/// Rooms of the context's property ordered by number.
pub async fn list_rooms(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    request: PageRequest,
) -> Result<Page<room::Model>> {
    let select = Room::find()
        .filter(room::Column::PropertyId.eq(ctx.property_id))
        .order_by_asc(room::Column::Number);
    fetch_page(db, select, request).await
}

/// Every room of one type, the input of the assignment matcher.
pub async fn rooms_of_type<C>(
    conn: &C,
    ctx: &RequestContext,
    room_type_id: i64,
) -> Result<Vec<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find()
        .filter(room::Column::PropertyId.eq(ctx.property_id))
        .filter(room::Column::RoomTypeId.eq(room_type_id))
        .order_by_asc(room::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Records a housekeeping inspection result.
pub async fn set_housekeeping_status(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    room_id: i64,
    housekeeping: HousekeepingStatus,
) -> Result<room::Model> {
    let room = require_room(db, ctx, room_id).await?;
    let mut room: room::ActiveModel = room.into();
    room.housekeeping = Set(housekeeping);
    let room = room.update(db).await?;
    debug!(room_id, housekeeping = ?room.housekeeping, "Housekeeping status updated");
    Ok(room)
}

/// Changes a room's operational status.
///
/// A room held by a reservation cannot be taken out of service.
pub async fn set_room_status(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    room_id: i64,
    status: OperationalStatus,
) -> Result<room::Model> {
    let room = require_room(db, ctx, room_id).await?;
    if status == OperationalStatus::Maintenance {
        if let Some(reservation_id) = room.held_by_reservation_id {
            return Err(Error::InvalidTransition {
                from: room.status.to_value(),
                event: "set_maintenance".to_string(),
                reason: format!("room is held by reservation {reservation_id}"),
            });
        }
    }

    let mut room: room::ActiveModel = room.into();
    room.status = Set(status);
    let room = room.update(db).await?;
    info!(room_id, status = ?room.status, "Room status updated");
    Ok(room)
}

/// Claims a room for a reservation.
///
/// The claim only succeeds if the room is unheld and in an eligible status at the
/// moment of the update; otherwise [`Error::ResourceUnavailable`] is returned and the
/// room is untouched.
pub async fn claim_room<C>(
    conn: &C,
    room_id: i64,
    reservation_id: i64,
    override_maintenance: bool,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Room::update_many()
        .col_expr(room::Column::HeldByReservationId, Expr::value(reservation_id))
        .filter(room::Column::Id.eq(room_id))
        .filter(room::Column::HeldByReservationId.is_null())
        .filter(room::Column::Status.is_in(eligible_statuses(override_maintenance)))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ResourceUnavailable {
            resource: "room",
            requirement: format!("room {room_id}"),
        });
    }
    debug!(room_id, reservation_id, "Room claimed");
    Ok(())
}

/// Marks the room held by a reservation as occupied.
pub async fn occupy_room<C>(conn: &C, room_id: i64, reservation_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Room::update_many()
        .col_expr(room::Column::Status, Expr::value(OperationalStatus::Occupied))
        .filter(room::Column::Id.eq(room_id))
        .filter(room::Column::HeldByReservationId.eq(reservation_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ResourceUnavailable {
            resource: "room",
            requirement: format!("room {room_id} held by reservation {reservation_id}"),
        });
    }
    Ok(())
}

/// Clears a reservation's hold on a room.
///
/// An occupied room goes back to `available` and `dirty`; a room that was only held
/// keeps its status. Releasing a room the reservation does not hold is a no-op.
pub async fn release_room<C>(conn: &C, room_id: i64, reservation_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(room) = Room::find_by_id(room_id)
        .filter(room::Column::HeldByReservationId.eq(reservation_id))
        .one(conn)
        .await?
    else {
        return Ok(());
    };

    let was_occupied = room.status == OperationalStatus::Occupied;
    let mut room: room::ActiveModel = room.into();
    room.held_by_reservation_id = Set(None);
    if was_occupied {
        room.status = Set(OperationalStatus::Available);
        room.housekeeping = Set(HousekeepingStatus::Dirty);
    }
    room.update(conn).await?;
    debug!(room_id, reservation_id, was_occupied, "Room released");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_room_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_room(
            &db,
            &test_context(),
            NewRoom {
                room_type_id: 1,
                number: " ".to_string(),
                housekeeping: HousekeepingStatus::Clean,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() -> Result<()> {
        let db = setup_test_db().await?;
        let room = create_test_room(&db, "101", TEST_ROOM_TYPE_ID).await?;

        claim_room(&db, room.id, 1, false).await?;
        let second = claim_room(&db, room.id, 2, false).await;
        assert!(matches!(
            second,
            Err(Error::ResourceUnavailable {
                resource: "room",
                ..
            })
        ));

        let stored = get_room(&db, &test_context(), room.id).await?.unwrap();
        assert_eq!(stored.held_by_reservation_id, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_maintenance_needs_override() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let room = create_test_room(&db, "102", TEST_ROOM_TYPE_ID).await?;
        set_room_status(&db, &ctx, room.id, OperationalStatus::Maintenance).await?;

        assert!(claim_room(&db, room.id, 7, false).await.is_err());
        claim_room(&db, room.id, 7, true).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_held_room_cannot_enter_maintenance() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let room = create_test_room(&db, "103", TEST_ROOM_TYPE_ID).await?;
        claim_room(&db, room.id, 3, false).await?;

        let result = set_room_status(&db, &ctx, room.id, OperationalStatus::Maintenance).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_release_after_occupancy_marks_dirty() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let room = create_test_room(&db, "104", TEST_ROOM_TYPE_ID).await?;
        set_housekeeping_status(&db, &ctx, room.id, HousekeepingStatus::Inspected).await?;

        claim_room(&db, room.id, 5, false).await?;
        occupy_room(&db, room.id, 5).await?;
        let occupied = get_room(&db, &ctx, room.id).await?.unwrap();
        assert_eq!(occupied.status, OperationalStatus::Occupied);

        // Another reservation cannot release it
        release_room(&db, room.id, 6).await?;
        assert!(get_room(&db, &ctx, room.id).await?.unwrap().held_by_reservation_id.is_some());

        release_room(&db, room.id, 5).await?;
        let released = get_room(&db, &ctx, room.id).await?.unwrap();
        assert_eq!(released.status, OperationalStatus::Available);
        assert_eq!(released.housekeeping, HousekeepingStatus::Dirty);
        assert_eq!(released.held_by_reservation_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_rooms_paginates() -> Result<()> {
        let db = setup_test_db().await?;
        for number in ["201", "202", "203"] {
            create_test_room(&db, number, TEST_ROOM_TYPE_ID).await?;
        }
        let page = list_rooms(&db, &test_context(), PageRequest { page: 2, limit: 2 }).await?;
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].number, "203");

        let other = RequestContext::for_property(TEST_PROPERTY_ID + 1);
        assert_eq!(list_rooms(&db, &other, PageRequest::default()).await?.total, 0);
        Ok(())
    }
}
