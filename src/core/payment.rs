//! Payments against a reservation.
//!
//! ```text
//! authorized --capture--> captured --refund--> refunded
//!      |
//!      +------void------> voided
//! ```
//!
//! Only captured money touches the folio: capture posts a negative `payment` line and
//! raises `amount_paid`; refund posts the compensating positive line and lowers it.
//! Status changes are conditional updates, so a payment is refunded at most once even
//! under concurrent requests.

use crate::{
    core::{
        clock::Clock,
        context::RequestContext,
        folio::{LineItem, adjust_reservation_amounts, get_folio_for_reservation, post_line_item},
        reservation::require_reservation,
    },
    entities::{Payment, PaymentMethod, PaymentStatus, payment, reservation},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Something that can happen to a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEvent {
    /// Authorized to captured
    Capture,
    /// Authorized to voided
    Void,
    /// Captured to refunded
    Refund,
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Capture => "capture",
            Self::Void => "void",
            Self::Refund => "refund",
        })
    }
}

impl PaymentStatus {
    /// Status reached by `event`, or [`Error::InvalidTransition`].
    pub fn apply(self, event: PaymentEvent) -> Result<Self> {
        match (self, event) {
            (Self::Authorized, PaymentEvent::Capture) => Ok(Self::Captured),
            (Self::Authorized, PaymentEvent::Void) => Ok(Self::Voided),
            (Self::Captured, PaymentEvent::Refund) => Ok(Self::Refunded),
            _ => Err(Error::InvalidTransition {
                from: self.to_value(),
                event: event.to_string(),
                reason: "payment transition not allowed".to_string(),
            }),
        }
    }
}

/// Input for a new payment
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Amount, must be positive and at most the balance due
    pub amount: i64,
    /// How the guest pays
    pub method: PaymentMethod,
    /// Capture immediately (the usual desk flow) or only authorize
    #[serde(default = "default_capture")]
    pub capture: bool,
    /// Reference from the card terminal or bank
    #[serde(default)]
    pub transaction_id: Option<String>,
}

const fn default_capture() -> bool {
    true
}

fn check_amount(amount: i64, reservation: &reservation::Model) -> Result<()> {
    if amount <= 0 {
        return Err(Error::validation(format!(
            "Payment amount must be positive, got {amount}"
        )));
    }
    let balance_due = reservation.balance_due();
    if amount > balance_due {
        return Err(Error::validation(format!(
            "Payment of {amount} exceeds the balance due of {balance_due}"
        )));
    }
    Ok(())
}

/// Posts captured money to the folio and mirrors it on the reservation.
async fn post_capture<C>(
    conn: &C,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
    amount: i64,
    method: PaymentMethod,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let folio = get_folio_for_reservation(conn, ctx, reservation_id).await?;
    post_line_item(
        conn,
        clock,
        folio.id,
        LineItem::payment(clock.today(), format!("Payment ({})", method.to_value()), -amount),
    )
    .await?;
    adjust_reservation_amounts(conn, reservation_id, 0, amount, clock.now()).await
}

/// Records a payment. Captured payments are posted to the folio immediately.
///
/// The amount must be positive and no larger than the reservation's balance due.
pub async fn record_payment(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
    new_payment: NewPayment,
) -> Result<payment::Model> {
    if new_payment.amount <= 0 {
        return Err(Error::validation(format!(
            "Payment amount must be positive, got {}",
            new_payment.amount
        )));
    }

    let txn = db.begin().await?;
    let reservation = require_reservation(&txn, ctx, reservation_id).await?;
    check_amount(new_payment.amount, &reservation)?;

    let status = if new_payment.capture {
        PaymentStatus::Captured
    } else {
        PaymentStatus::Authorized
    };
    let now = clock.now();
    let payment = payment::ActiveModel {
        reservation_id: Set(reservation_id),
        amount: Set(new_payment.amount),
        method: Set(new_payment.method),
        status: Set(status),
        transaction_id: Set(new_payment.transaction_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if new_payment.capture {
        post_capture(
            &txn,
            ctx,
            clock,
            reservation_id,
            payment.amount,
            payment.method,
        )
        .await?;
    }
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id,
        payment_id = payment.id,
        amount = payment.amount,
        status = %payment.status.to_value(),
        "Payment recorded"
    );
    Ok(payment)
}

/// Loads a payment whose reservation belongs to the context's property.
pub async fn get_payment<C>(
    conn: &C,
    ctx: &RequestContext,
    payment_id: i64,
) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    let Some(payment) = Payment::find_by_id(payment_id).one(conn).await? else {
        return Ok(None);
    };
    match require_reservation(conn, ctx, payment.reservation_id).await {
        Ok(_) => Ok(Some(payment)),
        Err(Error::NotFound { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Moves a payment to its next status if it is still in the status that was read.
async fn set_status<C>(
    conn: &C,
    payment: &payment::Model,
    event: PaymentEvent,
    clock: &dyn Clock,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let next = payment.status.apply(event)?;
    let result = Payment::update_many()
        .set(payment::ActiveModel {
            status: Set(next),
            updated_at: Set(clock.now()),
            ..Default::default()
        })
        .filter(payment::Column::Id.eq(payment.id))
        .filter(payment::Column::Status.eq(payment.status))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: payment.status.to_value(),
            event: event.to_string(),
            reason: "payment was modified concurrently".to_string(),
        });
    }

    Payment::find_by_id(payment.id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment.id))
}

async fn change_status(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    payment_id: i64,
    event: PaymentEvent,
) -> Result<payment::Model> {
    let txn = db.begin().await?;
    let payment = get_payment(&txn, ctx, payment_id)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment_id))?;

    match event {
        PaymentEvent::Capture => {
            let reservation = require_reservation(&txn, ctx, payment.reservation_id).await?;
            payment.status.apply(event)?;
            check_amount(payment.amount, &reservation)?;
            post_capture(
                &txn,
                ctx,
                clock,
                payment.reservation_id,
                payment.amount,
                payment.method,
            )
            .await?;
        }
        PaymentEvent::Refund => {
            payment.status.apply(event)?;
            // A settlement refund may already have handed this money back
            let reservation = require_reservation(&txn, ctx, payment.reservation_id).await?;
            if payment.amount > reservation.amount_paid {
                return Err(Error::validation(format!(
                    "Refund of {} exceeds the {} still held for reservation {}",
                    payment.amount, reservation.amount_paid, reservation.id
                )));
            }
            let folio = get_folio_for_reservation(&txn, ctx, payment.reservation_id).await?;
            post_line_item(
                &txn,
                clock,
                folio.id,
                LineItem::payment(
                    clock.today(),
                    format!("Refund of payment {}", payment.id),
                    payment.amount,
                ),
            )
            .await?;
            adjust_reservation_amounts(
                &txn,
                payment.reservation_id,
                0,
                -payment.amount,
                clock.now(),
            )
            .await?;
        }
        PaymentEvent::Void => {}
    }

    let updated = set_status(&txn, &payment, event, clock).await?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        payment_id,
        reservation_id = updated.reservation_id,
        %event,
        amount = updated.amount,
        "Payment updated"
    );
    Ok(updated)
}

/// `authorized -> captured`, posting the payment to the folio.
pub async fn capture_payment(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    payment_id: i64,
) -> Result<payment::Model> {
    change_status(db, ctx, clock, payment_id, PaymentEvent::Capture).await
}

/// `authorized -> voided`. Nothing was posted, so nothing is reversed.
pub async fn void_payment(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    payment_id: i64,
) -> Result<payment::Model> {
    change_status(db, ctx, clock, payment_id, PaymentEvent::Void).await
}

/// `captured -> refunded`, exactly once, with a compensating folio line.
pub async fn refund_payment(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    payment_id: i64,
) -> Result<payment::Model> {
    change_status(db, ctx, clock, payment_id, PaymentEvent::Refund).await
}

/// Payments of a reservation, oldest first.
pub async fn list_payments(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    reservation_id: i64,
) -> Result<Vec<payment::Model>> {
    require_reservation(db, ctx, reservation_id).await?;
    Payment::find()
        .filter(payment::Column::ReservationId.eq(reservation_id))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
