//! Reservation business logic - Persisted lifecycle operations.
//!
//! Each operation loads the reservation scoped to the request's property, asks the
//! state machine in [`crate::core::lifecycle`] whether the event is allowed, and then
//! writes every status change, room claim and folio posting inside ONE database
//! transaction. Status updates are conditional on the status that was read, so a
//! concurrent transition makes the loser fail instead of overwriting the winner.

use crate::{
    config::app::{AppConfig, ReservationConfig},
    core::{
        assignment::find_room_candidate,
        clock::Clock,
        context::RequestContext,
        finance::{self, CancellationAction, CancellationQuote},
        folio::{
            LineItem, adjust_reservation_amounts, get_folio_for_reservation, load_for_update,
            lock_folio, open_folio, post_line_item,
        },
        lifecycle::ReservationEvent,
        page::{Page, PageRequest, fetch_page},
        policy::{ResolvedPolicy, get_rate_plan, resolve_policy},
        room,
    },
    entities::{BookingChannel, Reservation, ReservationStatus, reservation, room as room_entity},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Input for a new reservation
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    /// Guest the stay is booked for
    pub guest_id: i64,
    /// Requested room type
    pub room_type_id: i64,
    /// Rate plan that prices the stay and supplies its cancellation policy
    pub rate_plan_id: i64,
    /// Arrival date
    pub check_in: NaiveDate,
    /// Departure date, after `check_in`
    pub check_out: NaiveDate,
    /// Agreed price for the stay; computed from the rate plan when absent
    #[serde(default)]
    pub total_amount: Option<i64>,
    /// Currency code; the configured default when absent
    #[serde(default)]
    pub currency: Option<String>,
    /// Where the booking came from
    pub channel: BookingChannel,
}

/// A reservation with the events its status currently accepts
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    /// The reservation row, inlined
    #[serde(flatten)]
    pub reservation: reservation::Model,
    /// Lifecycle actions a client may offer next
    pub allowed_events: Vec<ReservationEvent>,
}

impl From<reservation::Model> for ReservationDetail {
    fn from(reservation: reservation::Model) -> Self {
        Self {
            allowed_events: reservation.status.allowed_events(),
            reservation,
        }
    }
}

/// Reservation plus the room it now holds
#[derive(Debug, Clone, Serialize)]
pub struct RoomAssignment {
    /// Updated reservation
    pub reservation: reservation::Model,
    /// Room now held by it
    pub room: room_entity::Model,
}

/// Fee and refund preview for a cancellation or no-show
#[derive(Debug, Clone, Serialize)]
pub struct CancellationPreview {
    /// Fee and refund that would apply now
    pub quote: CancellationQuote,
    /// Policy the quote was computed from
    pub policy: ResolvedPolicy,
}

/// Result of a cancellation or no-show
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    /// Reservation in its terminal status
    pub reservation: reservation::Model,
    /// Fee charged and refund owed
    pub quote: CancellationQuote,
    /// Policy the fee was computed from
    pub policy: ResolvedPolicy,
}

/// Confirmation code shown to the guest, e.g. `HD-000042`.
#[must_use]
pub fn confirmation_code(prefix: &str, reservation_id: i64) -> String {
    format!("{prefix}-{reservation_id:06}")
}

/// The instant a stay starts: the arrival date at the configured check-in time (UTC).
#[must_use]
pub fn check_in_instant(reservation: &reservation::Model, settings: &ReservationConfig) -> DateTime<Utc> {
    reservation
        .check_in
        .and_time(settings.check_in_time)
        .and_utc()
}

/// Creates a pending reservation, opens its folio and posts the room charge.
///
/// When `total_amount` is given, a missing rate plan is tolerated with a warning;
/// otherwise the rate plan must exist and the total is `nights * nightly_rate`.
pub async fn create_reservation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    settings: &ReservationConfig,
    new_reservation: NewReservation,
) -> Result<reservation::Model> {
    let nights = finance::nights(new_reservation.check_in, new_reservation.check_out)?;
    if let Some(total) = new_reservation.total_amount {
        finance::check_amount("Total amount", total)?;
    }
    let currency = new_reservation
        .currency
        .as_deref()
        .unwrap_or(&settings.default_currency)
        .trim()
        .to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::validation(format!(
            "Currency must be a three-letter code, got '{currency}'"
        )));
    }

    let txn = db.begin().await?;

    let plan = get_rate_plan(&txn, ctx, new_reservation.rate_plan_id).await?;
    let total_amount = match (new_reservation.total_amount, plan) {
        (Some(total), Some(_)) => total,
        (Some(total), None) => {
            warn!(
                property_id = ctx.property_id,
                rate_plan_id = new_reservation.rate_plan_id,
                "Creating reservation against a missing rate plan"
            );
            total
        }
        (None, Some(plan)) => {
            let total = plan
                .nightly_rate
                .checked_mul(nights)
                .ok_or_else(|| Error::validation("Reservation total overflows"))?;
            finance::check_amount("Reservation total", total)?;
            total
        }
        (None, None) => {
            return Err(Error::not_found("rate plan", new_reservation.rate_plan_id));
        }
    };

    let now = clock.now();
    let placeholder = format!(
        "{}-PENDING-{}-{}",
        settings.confirmation_prefix,
        new_reservation.guest_id,
        now.timestamp_nanos_opt().unwrap_or_default()
    );
    let created = reservation::ActiveModel {
        property_id: Set(ctx.property_id),
        guest_id: Set(new_reservation.guest_id),
        room_type_id: Set(new_reservation.room_type_id),
        rate_plan_id: Set(new_reservation.rate_plan_id),
        assigned_room_id: Set(None),
        check_in: Set(new_reservation.check_in),
        check_out: Set(new_reservation.check_out),
        status: Set(ReservationStatus::Pending),
        total_amount: Set(total_amount),
        amount_paid: Set(0),
        currency: Set(currency),
        channel: Set(new_reservation.channel),
        confirmation_code: Set(placeholder),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let code = confirmation_code(&settings.confirmation_prefix, created.id);
    let mut created: reservation::ActiveModel = created.into();
    created.confirmation_code = Set(code);
    let created = created.update(&txn).await?;

    let folio = open_folio(&txn, created.id).await?;
    if total_amount > 0 {
        post_line_item(
            &txn,
            clock,
            folio.id,
            LineItem::charge(
                clock.today(),
                format!("Room charge, {nights} night(s)"),
                total_amount,
            ),
        )
        .await?;
    }

    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id = created.id,
        confirmation_code = %created.confirmation_code,
        total_amount,
        "Reservation created"
    );
    Ok(created)
}

/// Finds a reservation of the context's property.
pub async fn get_reservation<C>(
    conn: &C,
    ctx: &RequestContext,
    reservation_id: i64,
) -> Result<Option<reservation::Model>>
where
    C: ConnectionTrait,
{
    Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Like [`get_reservation`] but a missing reservation is [`Error::NotFound`].
pub async fn require_reservation<C>(
    conn: &C,
    ctx: &RequestContext,
    reservation_id: i64,
) -> Result<reservation::Model>
where
    C: ConnectionTrait,
{
    get_reservation(conn, ctx, reservation_id)
        .await?
        .ok_or_else(|| Error::not_found("reservation", reservation_id))
}

/// Reservations of the context's property, newest first, optionally by status.
pub async fn list_reservations(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    status: Option<ReservationStatus>,
    request: PageRequest,
) -> Result<Page<reservation::Model>> {
    let mut select = Reservation::find()
        .filter(reservation::Column::PropertyId.eq(ctx.property_id))
        .order_by_desc(reservation::Column::Id);
    if let Some(status) = status {
        select = select.filter(reservation::Column::Status.eq(status));
    }
    fetch_page(db, select, request).await
}

/// Applies `event` and persists the new status if nobody changed it meanwhile.
async fn transition<C>(
    conn: &C,
    current: &reservation::Model,
    event: ReservationEvent,
    next: ReservationStatus,
    now: DateTime<Utc>,
) -> Result<reservation::Model>
where
    C: ConnectionTrait,
{
    let result = Reservation::update_many()
        .set(reservation::ActiveModel {
            status: Set(next),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(reservation::Column::Id.eq(current.id))
        .filter(reservation::Column::Status.eq(current.status))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: current.status.to_value(),
            event: event.to_string(),
            reason: "reservation was modified concurrently".to_string(),
        });
    }

    Reservation::find_by_id(current.id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("reservation", current.id))
}

fn log_transition(
    ctx: &RequestContext,
    reservation: &reservation::Model,
    from: ReservationStatus,
    event: ReservationEvent,
) {
    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id = reservation.id,
        from = %from.to_value(),
        to = %reservation.status.to_value(),
        %event,
        "Reservation transitioned"
    );
}

/// `pending -> confirmed`.
pub async fn confirm_reservation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let txn = db.begin().await?;
    let current = require_reservation(&txn, ctx, reservation_id).await?;
    let next = current.status.apply(ReservationEvent::Confirm)?;
    let updated = transition(&txn, &current, ReservationEvent::Confirm, next, clock.now()).await?;
    txn.commit().await?;

    log_transition(ctx, &updated, current.status, ReservationEvent::Confirm);
    Ok(updated)
}

/// Matches and claims a room of the reserved type.
///
/// Candidates are tried best-first; a candidate lost to a concurrent claim is skipped.
/// If the reservation already holds a room, that hold is released once the new claim
/// succeeds.
pub async fn assign_room(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
    override_maintenance: bool,
) -> Result<RoomAssignment> {
    let txn = db.begin().await?;
    let current = require_reservation(&txn, ctx, reservation_id).await?;
    current.status.apply(ReservationEvent::AssignRoom)?;

    let mut rooms = room::rooms_of_type(&txn, ctx, current.room_type_id).await?;
    let room_id = loop {
        let Some(candidate) =
            find_room_candidate(&rooms, current.room_type_id, override_maintenance).map(|r| r.id)
        else {
            return Err(Error::ResourceUnavailable {
                resource: "room",
                requirement: format!("room type {}", current.room_type_id),
            });
        };
        match room::claim_room(&txn, candidate, current.id, override_maintenance).await {
            Ok(()) => break candidate,
            Err(Error::ResourceUnavailable { .. }) => rooms.retain(|r| r.id != candidate),
            Err(other) => return Err(other),
        }
    };

    if let Some(previous) = current.assigned_room_id.filter(|id| *id != room_id) {
        room::release_room(&txn, previous, current.id).await?;
    }

    let result = Reservation::update_many()
        .set(reservation::ActiveModel {
            assigned_room_id: Set(Some(room_id)),
            updated_at: Set(clock.now()),
            ..Default::default()
        })
        .filter(reservation::Column::Id.eq(current.id))
        .filter(reservation::Column::Status.eq(current.status))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: current.status.to_value(),
            event: ReservationEvent::AssignRoom.to_string(),
            reason: "reservation was modified concurrently".to_string(),
        });
    }

    let updated = require_reservation(&txn, ctx, reservation_id).await?;
    let room = room::get_room(&txn, ctx, room_id)
        .await?
        .ok_or_else(|| Error::not_found("room", room_id))?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id,
        room_id,
        room_number = %room.number,
        override_maintenance,
        "Room assigned"
    );
    Ok(RoomAssignment {
        reservation: updated,
        room,
    })
}

/// `confirmed -> checked_in`; the assigned room becomes occupied.
///
/// An outstanding balance does not block arrival, it is only logged.
pub async fn check_in_reservation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let txn = db.begin().await?;
    let current = require_reservation(&txn, ctx, reservation_id).await?;
    let next = current.status.apply(ReservationEvent::CheckIn)?;
    let Some(room_id) = current.assigned_room_id else {
        return Err(Error::InvalidTransition {
            from: current.status.to_value(),
            event: ReservationEvent::CheckIn.to_string(),
            reason: "no room assigned".to_string(),
        });
    };

    room::occupy_room(&txn, room_id, current.id).await?;
    let updated = transition(&txn, &current, ReservationEvent::CheckIn, next, clock.now()).await?;
    txn.commit().await?;

    if updated.balance_due() > 0 {
        warn!(
            property_id = ctx.property_id,
            reservation_id,
            balance_due = updated.balance_due(),
            "Guest checked in with a balance due"
        );
    }
    log_transition(ctx, &updated, current.status, ReservationEvent::CheckIn);
    Ok(updated)
}

/// `checked_in -> checked_out`.
///
/// Refused while the folio balance is positive. The balance is read under the folio
/// row lock, so no posting can slip in between the check and the lock. On success the
/// folio is locked and the room is released as available and dirty.
pub async fn check_out_reservation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let txn = db.begin().await?;
    let current = require_reservation(&txn, ctx, reservation_id).await?;
    let folio = get_folio_for_reservation(&txn, ctx, reservation_id).await?;
    let (_, ledger) = load_for_update(&txn, folio.id).await?;
    let next = current.status.check_out(ledger.balance()?.balance)?;

    lock_folio(&txn, clock, folio.id).await?;
    if let Some(room_id) = current.assigned_room_id {
        room::release_room(&txn, room_id, current.id).await?;
    }
    let updated = transition(&txn, &current, ReservationEvent::CheckOut, next, clock.now()).await?;
    txn.commit().await?;

    log_transition(ctx, &updated, current.status, ReservationEvent::CheckOut);
    Ok(updated)
}

/// Previews the fee and refund a cancellation or no-show would produce right now.
pub async fn quote_cancellation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    config: &AppConfig,
    reservation_id: i64,
    action: CancellationAction,
) -> Result<CancellationPreview> {
    let current = require_reservation(db, ctx, reservation_id).await?;
    current.status.apply(event_for(action))?;
    let policy = resolve_policy(db, ctx, current.rate_plan_id, &config.cancellation).await?;
    let quote = quote_for(&current, &policy, config, clock, action)?;
    Ok(CancellationPreview { quote, policy })
}

/// Cancels a confirmed or in-house reservation, posting fee and refund atomically.
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    config: &AppConfig,
    reservation_id: i64,
) -> Result<CancellationOutcome> {
    settle(db, ctx, clock, config, reservation_id, CancellationAction::Cancel).await
}

/// Marks a confirmed reservation as a no-show, posting fee and refund atomically.
pub async fn mark_no_show(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    config: &AppConfig,
    reservation_id: i64,
) -> Result<CancellationOutcome> {
    settle(db, ctx, clock, config, reservation_id, CancellationAction::NoShow).await
}

const fn event_for(action: CancellationAction) -> ReservationEvent {
    match action {
        CancellationAction::Cancel => ReservationEvent::Cancel,
        CancellationAction::NoShow => ReservationEvent::NoShow,
    }
}

fn quote_for(
    reservation: &reservation::Model,
    policy: &ResolvedPolicy,
    config: &AppConfig,
    clock: &dyn Clock,
    action: CancellationAction,
) -> Result<CancellationQuote> {
    let hours_remaining = finance::hours_until(
        check_in_instant(reservation, &config.reservations),
        clock.now(),
    );
    finance::calculate_cancellation_fee(
        reservation.total_amount,
        reservation.amount_paid,
        &policy.policy,
        action,
        hours_remaining,
    )
}

/// Closes a reservation out early.
///
/// Postings: the outstanding charges are reversed, the fee is charged and the refund
/// is posted as a positive payment line. Afterwards `total_amount == fee` and
/// `amount_paid` is reduced by the refund, so the folio still reconciles.
async fn settle(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    config: &AppConfig,
    reservation_id: i64,
    action: CancellationAction,
) -> Result<CancellationOutcome> {
    let event = event_for(action);
    let txn = db.begin().await?;

    let current = require_reservation(&txn, ctx, reservation_id).await?;
    let next = current.status.apply(event)?;
    let policy = resolve_policy(&txn, ctx, current.rate_plan_id, &config.cancellation).await?;
    let quote = quote_for(&current, &policy, config, clock, action)?;

    let folio = get_folio_for_reservation(&txn, ctx, reservation_id).await?;
    let today = clock.today();
    let fee_label = match action {
        CancellationAction::Cancel => "Cancellation fee",
        CancellationAction::NoShow => "No-show fee",
    };

    if current.total_amount != 0 {
        post_line_item(
            &txn,
            clock,
            folio.id,
            LineItem::charge(today, "Reversal of outstanding charges", -current.total_amount),
        )
        .await?;
    }
    if quote.fee != 0 {
        post_line_item(
            &txn,
            clock,
            folio.id,
            LineItem::charge(today, format!("{fee_label} ({})", policy.policy.name), quote.fee),
        )
        .await?;
    }
    if quote.refund != 0 {
        post_line_item(
            &txn,
            clock,
            folio.id,
            LineItem::payment(today, "Refund", quote.refund),
        )
        .await?;
    }
    adjust_reservation_amounts(
        &txn,
        current.id,
        quote.fee - current.total_amount,
        -quote.refund,
        clock.now(),
    )
    .await?;

    if let Some(room_id) = current.assigned_room_id {
        room::release_room(&txn, room_id, current.id).await?;
    }
    let updated = transition(&txn, &current, event, next, clock.now()).await?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id,
        %event,
        fee = quote.fee,
        refund = quote.refund,
        tier = ?quote.tier,
        hours_remaining = quote.hours_remaining,
        policy = %policy.policy.name,
        "Reservation settled"
    );
    Ok(CancellationOutcome {
        reservation: updated,
        quote,
        policy,
    })
}
