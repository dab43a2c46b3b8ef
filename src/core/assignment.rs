//! Room/table assignment matcher - Picks a candidate resource for a booking.
//!
//! Matching is pure and returns `None` when nothing fits; the caller decides whether to
//! retry with the maintenance override or give up. Claiming the candidate is a separate,
//! database-level step (`core::room::claim_room`, `core::dining::assign_table`).

use crate::entities::{HousekeepingStatus, OperationalStatus, RestaurantTableModel, RoomModel};

/// A room or table that can be handed to a booking
pub trait Assignable {
    /// Primary key
    fn id(&self) -> i64;
    /// Whether the resource is usable right now
    fn operational_status(&self) -> OperationalStatus;
    /// Cleanliness, used to rank otherwise equal candidates
    fn housekeeping_status(&self) -> HousekeepingStatus;
    /// Whether another booking already holds the resource
    fn is_held(&self) -> bool;
}

impl Assignable for RoomModel {
    fn id(&self) -> i64 {
        self.id
    }

    fn operational_status(&self) -> OperationalStatus {
        self.status
    }

    fn housekeeping_status(&self) -> HousekeepingStatus {
        self.housekeeping
    }

    fn is_held(&self) -> bool {
        self.held_by_reservation_id.is_some()
    }
}

impl Assignable for RestaurantTableModel {
    fn id(&self) -> i64 {
        self.id
    }

    fn operational_status(&self) -> OperationalStatus {
        self.status
    }

    fn housekeeping_status(&self) -> HousekeepingStatus {
        self.housekeeping
    }

    fn is_held(&self) -> bool {
        self.held_by_booking_id.is_some()
    }
}

/// Operational statuses a candidate may have.
#[must_use]
pub fn eligible_statuses(override_maintenance: bool) -> Vec<OperationalStatus> {
    if override_maintenance {
        vec![OperationalStatus::Available, OperationalStatus::Maintenance]
    } else {
        vec![OperationalStatus::Available]
    }
}

const fn housekeeping_rank(status: HousekeepingStatus) -> u8 {
    match status {
        HousekeepingStatus::Inspected => 0,
        HousekeepingStatus::Clean => 1,
        HousekeepingStatus::Dirty => 2,
    }
}

const fn operational_rank(status: OperationalStatus) -> u8 {
    match status {
        OperationalStatus::Available => 0,
        OperationalStatus::Maintenance => 1,
        OperationalStatus::Occupied => 2,
    }
}

/// Returns the best unheld resource satisfying `fits`.
///
/// Eligible resources are `available`, or also `maintenance` when
/// `override_maintenance` is set. Among them, available beats maintenance, then
/// inspected beats clean beats dirty, then the lowest id wins.
pub fn find_candidate<'a, R, F>(
    resources: &'a [R],
    fits: F,
    override_maintenance: bool,
) -> Option<&'a R>
where
    R: Assignable,
    F: Fn(&R) -> bool,
{
    let eligible = eligible_statuses(override_maintenance);
    resources
        .iter()
        .filter(|resource| !resource.is_held())
        .filter(|resource| eligible.contains(&resource.operational_status()))
        .filter(|resource| fits(*resource))
        .min_by_key(|resource| {
            (
                operational_rank(resource.operational_status()),
                housekeeping_rank(resource.housekeeping_status()),
                resource.id(),
            )
        })
}

/// Best room of the requested type.
#[must_use]
pub fn find_room_candidate(
    rooms: &[RoomModel],
    room_type_id: i64,
    override_maintenance: bool,
) -> Option<&RoomModel> {
    find_candidate(
        rooms,
        |room| room.room_type_id == room_type_id,
        override_maintenance,
    )
}

/// Smallest table that seats the party; ties resolved like [`find_candidate`].
#[must_use]
pub fn find_table_candidate(
    tables: &[RestaurantTableModel],
    party_size: i32,
    override_maintenance: bool,
) -> Option<&RestaurantTableModel> {
    let eligible = eligible_statuses(override_maintenance);
    let smallest_fit = tables
        .iter()
        .filter(|table| table.capacity >= party_size)
        .filter(|table| !table.is_held())
        .filter(|table| eligible.contains(&table.status))
        .map(|table| table.capacity)
        .min()?;

    find_candidate(
        tables,
        |table| table.capacity == smallest_fit,
        override_maintenance,
    )
}
