//! Folio ledger - Append-only line items for one reservation.
//!
//! Every monetary event on a reservation (room charge, fee, service, tax, payment,
//! refund) is a signed line item on its folio. Items are never updated or deleted;
//! corrections are compensating items. Once a folio is locked (at check-out) it
//! accepts nothing further.
//!
//! The reservation's `total_amount` and `amount_paid` columns mirror the folio, so
//! any posting that changes the balance also adjusts them inside the same database
//! transaction (see [`adjust_reservation_amounts`]).
//!
//! Every write goes through [`load_for_update`], which holds the folio row lock until
//! the surrounding transaction ends. Postings and check-out therefore serialize per
//! folio, and the lock rule itself is enforced by the in-memory [`Folio`].

use crate::{
    core::{
        clock::Clock,
        context::RequestContext,
        finance::{self, FolioBalance, ServiceTotal},
        reservation::require_reservation,
        service::get_property_service,
    },
    entities::{
        Folio as FolioEntity, FolioLineItem, LineItemType, Reservation, folio, folio_line_item,
        reservation,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::info;

/// A line item that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Business date of the posting
    pub posted_on: NaiveDate,
    /// Free-text description shown on the statement
    pub description: String,
    /// Signed amount: positive is owed by the guest, negative was paid
    pub amount: i64,
    /// Category of the posting
    pub item_type: LineItemType,
}

impl LineItem {
    fn new(
        item_type: LineItemType,
        posted_on: NaiveDate,
        description: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self {
            posted_on,
            description: description.into(),
            amount,
            item_type,
        }
    }

    /// A room or fee charge. Negative amounts reverse earlier charges.
    pub fn charge(posted_on: NaiveDate, description: impl Into<String>, amount: i64) -> Self {
        Self::new(LineItemType::Charge, posted_on, description, amount)
    }

    /// Money in (negative) or money handed back (positive).
    pub fn payment(posted_on: NaiveDate, description: impl Into<String>, amount: i64) -> Self {
        Self::new(LineItemType::Payment, posted_on, description, amount)
    }

    /// A property service. Complimentary services are posted at zero.
    pub fn service(posted_on: NaiveDate, description: impl Into<String>, amount: i64) -> Self {
        Self::new(LineItemType::Service, posted_on, description, amount)
    }

    /// Tax on a service.
    pub fn tax(posted_on: NaiveDate, description: impl Into<String>, amount: i64) -> Self {
        Self::new(LineItemType::Tax, posted_on, description, amount)
    }

    /// Rejects blank descriptions, and zero amounts on anything but a service.
    pub fn validate(&self) -> Result<()> {
        if self.amount == 0 && self.item_type != LineItemType::Service {
            return Err(Error::validation("Line item amount cannot be zero"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::validation("Line item description cannot be empty"));
        }
        Ok(())
    }
}

impl From<&folio_line_item::Model> for LineItem {
    fn from(model: &folio_line_item::Model) -> Self {
        Self {
            posted_on: model.posted_on,
            description: model.description.clone(),
            amount: model.amount,
            item_type: model.item_type,
        }
    }
}

/// In-memory view of a folio and its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folio {
    /// ID of the persisted folio
    pub id: i64,
    locked: bool,
    items: Vec<LineItem>,
}

impl Folio {
    /// Rebuilds the value from its persisted rows.
    #[must_use]
    pub fn from_parts(model: &folio::Model, items: &[folio_line_item::Model]) -> Self {
        Self {
            id: model.id,
            locked: model.locked,
            items: items.iter().map(LineItem::from).collect(),
        }
    }

    /// Appends an item, failing with [`Error::FolioLocked`] once the folio is locked.
    pub fn append_line_item(&mut self, item: LineItem) -> Result<()> {
        if self.locked {
            return Err(Error::FolioLocked { folio_id: self.id });
        }
        item.validate()?;
        self.items.push(item);
        Ok(())
    }

    /// Locks the folio. Returns `false` if it was already locked; locking is irreversible.
    pub const fn lock(&mut self) -> bool {
        let newly_locked = !self.locked;
        self.locked = true;
        newly_locked
    }

    /// Totals over every item.
    pub fn balance(&self) -> Result<FolioBalance> {
        finance::compute_folio_balance(self.items.iter().map(|item| (item.item_type, item.amount)))
    }
}

/// A folio with its items and totals, as shown to the desk
#[derive(Debug, Clone, Serialize)]
pub struct FolioStatement {
    /// The folio row
    pub folio: folio::Model,
    /// Items in posting order
    pub items: Vec<folio_line_item::Model>,
    /// Totals over `items`
    pub balance: FolioBalance,
    /// Whether the folio balance matches `total_amount - amount_paid`
    pub reconciled: bool,
}

/// Lines created by a service posting
#[derive(Debug, Clone, Serialize)]
pub struct ServicePosting {
    /// The `service` line
    pub service_item: folio_line_item::Model,
    /// Absent for untaxed services
    pub tax_item: Option<folio_line_item::Model>,
    /// Subtotal, tax and total that were posted
    pub total: ServiceTotal,
}

/// Opens the folio of a freshly created reservation.
pub async fn open_folio<C>(conn: &C, reservation_id: i64) -> Result<folio::Model>
where
    C: ConnectionTrait,
{
    let folio = folio::ActiveModel {
        reservation_id: Set(reservation_id),
        locked: Set(false),
        locked_at: Set(None),
        ..Default::default()
    };
    folio.insert(conn).await.map_err(Into::into)
}

/// Returns the folio of a reservation belonging to the context's property.
pub async fn get_folio_for_reservation<C>(
    conn: &C,
    ctx: &RequestContext,
    reservation_id: i64,
) -> Result<folio::Model>
where
    C: ConnectionTrait,
{
    require_reservation(conn, ctx, reservation_id).await?;
    FolioEntity::find()
        .filter(folio::Column::ReservationId.eq(reservation_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("folio", reservation_id))
}

/// Items of a folio in posting order.
pub async fn list_line_items<C>(conn: &C, folio_id: i64) -> Result<Vec<folio_line_item::Model>>
where
    C: ConnectionTrait,
{
    FolioLineItem::find()
        .filter(folio_line_item::Column::FolioId.eq(folio_id))
        .order_by_asc(folio_line_item::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Loads a folio and its items, holding the row lock until the transaction ends.
///
/// `SELECT ... FOR UPDATE` on `PostgreSQL`; `SQLite` already serializes writers.
pub(crate) async fn load_for_update<C>(conn: &C, folio_id: i64) -> Result<(folio::Model, Folio)>
where
    C: ConnectionTrait,
{
    let model = FolioEntity::find_by_id(folio_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("folio", folio_id))?;
    let items = list_line_items(conn, folio_id).await?;
    let ledger = Folio::from_parts(&model, &items);
    Ok((model, ledger))
}

/// Appends one item to a folio.
///
/// The item is checked against the locked-row view of the folio, so a posting that
/// races a check-out either lands before the lock or fails with [`Error::FolioLocked`].
pub async fn post_line_item<C>(
    conn: &C,
    clock: &dyn Clock,
    folio_id: i64,
    item: LineItem,
) -> Result<folio_line_item::Model>
where
    C: ConnectionTrait,
{
    let (_, mut ledger) = load_for_update(conn, folio_id).await?;
    ledger.append_line_item(item.clone())?;

    let line = folio_line_item::ActiveModel {
        folio_id: Set(folio_id),
        posted_on: Set(item.posted_on),
        description: Set(item.description),
        amount: Set(item.amount),
        item_type: Set(item.item_type),
        created_at: Set(clock.now()),
        ..Default::default()
    };
    line.insert(conn).await.map_err(Into::into)
}

/// Locks a folio. Already-locked folios are returned unchanged.
pub async fn lock_folio<C>(conn: &C, clock: &dyn Clock, folio_id: i64) -> Result<folio::Model>
where
    C: ConnectionTrait,
{
    let (model, mut ledger) = load_for_update(conn, folio_id).await?;
    if !ledger.lock() {
        return Ok(model);
    }

    let mut folio: folio::ActiveModel = model.into();
    folio.locked = Set(true);
    folio.locked_at = Set(Some(clock.now()));
    let folio = folio.update(conn).await?;
    info!(folio_id, reservation_id = folio.reservation_id, "Folio locked");
    Ok(folio)
}

/// Atomically shifts a reservation's mirrored totals.
///
/// ```text
/// UPDATE reservations
///    SET total_amount = total_amount + ?, amount_paid = amount_paid + ?
///  WHERE id = ? AND 0 <= amount_paid + ? AND amount_paid + ? <= total_amount + ?
/// ```
///
/// A shift that would leave `amount_paid` outside `0..=total_amount` touches no row and
/// fails with [`Error::Validation`], even when the caller's balance check read stale data.
pub(crate) async fn adjust_reservation_amounts<C>(
    conn: &C,
    reservation_id: i64,
    total_delta: i64,
    paid_delta: i64,
    now: DateTime<Utc>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let new_paid = || Expr::expr(Expr::col(reservation::Column::AmountPaid).add(paid_delta));
    let result = Reservation::update_many()
        .col_expr(
            reservation::Column::TotalAmount,
            Expr::col(reservation::Column::TotalAmount).add(total_delta),
        )
        .col_expr(
            reservation::Column::AmountPaid,
            Expr::col(reservation::Column::AmountPaid).add(paid_delta),
        )
        .col_expr(reservation::Column::UpdatedAt, Expr::value(now))
        .filter(reservation::Column::Id.eq(reservation_id))
        .filter(new_paid().gte(0_i64))
        .filter(new_paid().lte(Expr::col(reservation::Column::TotalAmount).add(total_delta)))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::validation(format!(
            "Amount paid on reservation {reservation_id} would fall outside 0..=total amount"
        )));
    }
    Ok(())
}

/// Posts a property service (and its tax) to an active reservation's folio.
///
/// The service line, the tax line and the `total_amount` increase are written in one
/// transaction.
pub async fn post_service_charge(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    reservation_id: i64,
    service_id: i64,
    quantity: i64,
) -> Result<ServicePosting> {
    let txn = db.begin().await?;

    let reservation = require_reservation(&txn, ctx, reservation_id).await?;
    if reservation.status.is_terminal() {
        return Err(Error::InvalidTransition {
            from: reservation.status.to_value(),
            event: "post_service".to_string(),
            reason: "reservation is closed".to_string(),
        });
    }

    let service = get_property_service(&txn, ctx, service_id)
        .await?
        .ok_or_else(|| Error::not_found("property service", service_id))?;
    let total = finance::compute_service_total(service.price, quantity, service.tax_rate_percent)?;

    let folio = get_folio_for_reservation(&txn, ctx, reservation_id).await?;
    let today = clock.today();

    let service_item = post_line_item(
        &txn,
        clock,
        folio.id,
        LineItem::service(today, format!("{} x{quantity}", service.name), total.subtotal),
    )
    .await?;
    let tax_item = if total.tax > 0 {
        Some(
            post_line_item(
                &txn,
                clock,
                folio.id,
                LineItem::tax(
                    today,
                    format!("Tax {}% on {}", service.tax_rate_percent, service.name),
                    total.tax,
                ),
            )
            .await?,
        )
    } else {
        None
    };

    adjust_reservation_amounts(&txn, reservation_id, total.total, 0, clock.now()).await?;
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        actor = ctx.actor_name(),
        reservation_id,
        service = %service.name,
        quantity,
        total = total.total,
        "Service charge posted"
    );

    Ok(ServicePosting {
        service_item,
        tax_item,
        total,
    })
}

/// Folio, items and balance of a reservation.
pub async fn folio_statement<C>(
    conn: &C,
    ctx: &RequestContext,
    reservation_id: i64,
) -> Result<FolioStatement>
where
    C: ConnectionTrait,
{
    let reservation = require_reservation(conn, ctx, reservation_id).await?;
    let folio = get_folio_for_reservation(conn, ctx, reservation_id).await?;
    let items = list_line_items(conn, folio.id).await?;
    let balance = Folio::from_parts(&folio, &items).balance()?;

    Ok(FolioStatement {
        reconciled: balance.balance == reservation.balance_due(),
        folio,
        items,
        balance,
    })
}
