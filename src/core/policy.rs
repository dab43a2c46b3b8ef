//! Rate & policy resolver - Rate plans and the cancellation terms they carry.
//!
//! A rate plan's cancellation columns are exposed as a typed [`CancellationPolicy`].
//! Resolution never silently invents terms: when a plan is missing, the configured
//! [`PolicyFallback`] decides between a logged default and a hard `NotFound`.

use crate::{
    config::app::{CancellationConfig, PolicyFallback},
    core::{clock::Clock, context::RequestContext, finance},
    entities::{RatePlan, Reservation, ReservationStatus, rate_plan, reservation},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Cancellation thresholds and fee percentages of a rate plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPolicy {
    /// Name of the rate plan the policy belongs to
    pub name: String,
    /// Hours before arrival at or beyond which the early fee applies
    pub free_until_hours: i32,
    /// Fee percent for early cancellation (usually 0)
    pub early_fee_percent: i32,
    /// Fee percent for late cancellation
    pub late_fee_percent: i32,
    /// Fee percent for a no-show
    pub no_show_fee_percent: i32,
}

impl CancellationPolicy {
    /// The "Best Available Rate" terms: free until 24h, 50% late, 100% no-show.
    #[must_use]
    pub fn best_available_rate() -> Self {
        Self {
            name: "Best Available Rate".to_string(),
            free_until_hours: 24,
            early_fee_percent: 0,
            late_fee_percent: 50,
            no_show_fee_percent: 100,
        }
    }

    /// Reads the policy columns of a rate plan.
    #[must_use]
    pub fn from_rate_plan(plan: &rate_plan::Model) -> Self {
        Self {
            name: plan.name.clone(),
            free_until_hours: plan.free_until_hours,
            early_fee_percent: plan.early_fee_percent,
            late_fee_percent: plan.late_fee_percent,
            no_show_fee_percent: plan.no_show_fee_percent,
        }
    }

    /// Checks that the threshold is non-negative and every percent is in `0..=100`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Policy name cannot be empty"));
        }
        if self.free_until_hours < 0 {
            return Err(Error::validation(format!(
                "Free-cancellation window cannot be negative: {}",
                self.free_until_hours
            )));
        }
        for (label, percent) in [
            ("early", self.early_fee_percent),
            ("late", self.late_fee_percent),
            ("no-show", self.no_show_fee_percent),
        ] {
            if !(0..=100).contains(&percent) {
                return Err(Error::validation(format!(
                    "The {label} fee percent must be between 0 and 100, got {percent}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::best_available_rate()
    }
}

/// Where a resolved policy came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PolicySource {
    /// Read from the reservation's rate plan
    RatePlan {
        /// ID of the rate plan
        rate_plan_id: i64,
    },
    /// Rate plan missing; the configured default was used
    Fallback,
}

/// A policy together with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPolicy {
    /// Terms to apply
    pub policy: CancellationPolicy,
    /// Provenance of the terms
    pub source: PolicySource,
}

/// Input for a new rate plan
#[derive(Debug, Clone, Deserialize)]
pub struct NewRatePlan {
    /// Price per night
    pub nightly_rate: i64,
    /// Plan name and cancellation terms
    #[serde(flatten)]
    pub policy: CancellationPolicy,
}

/// Resolves the cancellation policy attached to a rate plan.
///
/// When the plan does not exist for the context's property, [`PolicyFallback::UseDefault`]
/// logs a warning and returns the configured default; [`PolicyFallback::Reject`] fails.
pub async fn resolve_policy<C>(
    conn: &C,
    ctx: &RequestContext,
    rate_plan_id: i64,
    settings: &CancellationConfig,
) -> Result<ResolvedPolicy>
where
    C: ConnectionTrait,
{
    let plan = RatePlan::find_by_id(rate_plan_id)
        .filter(rate_plan::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await?;

    match (plan, settings.fallback) {
        (Some(plan), _) => Ok(ResolvedPolicy {
            policy: CancellationPolicy::from_rate_plan(&plan),
            source: PolicySource::RatePlan {
                rate_plan_id: plan.id,
            },
        }),
        (None, PolicyFallback::UseDefault) => {
            warn!(
                property_id = ctx.property_id,
                rate_plan_id,
                fallback = %settings.default_policy.name,
                "Rate plan not found, falling back to default cancellation policy"
            );
            Ok(ResolvedPolicy {
                policy: settings.default_policy.clone(),
                source: PolicySource::Fallback,
            })
        }
        (None, PolicyFallback::Reject) => Err(Error::not_found("rate plan", rate_plan_id)),
    }
}

/// Creates a rate plan for the context's property after validating its terms.
pub async fn create_rate_plan(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    clock: &dyn Clock,
    new_plan: NewRatePlan,
) -> Result<rate_plan::Model> {
    new_plan.policy.validate()?;
    finance::check_amount("Nightly rate", new_plan.nightly_rate)?;

    let NewRatePlan {
        nightly_rate,
        policy,
    } = new_plan;
    let plan = rate_plan::ActiveModel {
        property_id: Set(ctx.property_id),
        name: Set(policy.name.trim().to_string()),
        nightly_rate: Set(nightly_rate),
        free_until_hours: Set(policy.free_until_hours),
        early_fee_percent: Set(policy.early_fee_percent),
        late_fee_percent: Set(policy.late_fee_percent),
        no_show_fee_percent: Set(policy.no_show_fee_percent),
        created_at: Set(clock.now()),
        ..Default::default()
    };
    let plan = plan.insert(db).await?;
    info!(
        property_id = ctx.property_id,
        rate_plan_id = plan.id,
        name = %plan.name,
        "Rate plan created"
    );
    Ok(plan)
}

/// Finds a rate plan of the context's property.
pub async fn get_rate_plan<C>(
    conn: &C,
    ctx: &RequestContext,
    rate_plan_id: i64,
) -> Result<Option<rate_plan::Model>>
where
    C: ConnectionTrait,
{
    RatePlan::find_by_id(rate_plan_id)
        .filter(rate_plan::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Finds a rate plan by its name within the context's property.
pub async fn get_rate_plan_by_name(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    name: &str,
) -> Result<Option<rate_plan::Model>> {
    RatePlan::find()
        .filter(rate_plan::Column::PropertyId.eq(ctx.property_id))
        .filter(rate_plan::Column::Name.eq(name.trim()))
        .order_by_asc(rate_plan::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces a rate plan's cancellation terms.
///
/// Policies apply prospectively only, so the update is refused while any pending,
/// confirmed or in-house reservation still references the plan.
pub async fn update_rate_plan_policy(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    rate_plan_id: i64,
    policy: CancellationPolicy,
) -> Result<rate_plan::Model> {
    policy.validate()?;

    let plan = get_rate_plan(db, ctx, rate_plan_id)
        .await?
        .ok_or_else(|| Error::not_found("rate plan", rate_plan_id))?;

    let active_references = Reservation::find()
        .filter(reservation::Column::RatePlanId.eq(rate_plan_id))
        .filter(reservation::Column::Status.is_in([
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::CheckedIn,
        ]))
        .count(db)
        .await?;
    if active_references > 0 {
        return Err(Error::PolicyInUse { rate_plan_id });
    }

    let mut plan: rate_plan::ActiveModel = plan.into();
    plan.name = Set(policy.name.trim().to_string());
    plan.free_until_hours = Set(policy.free_until_hours);
    plan.early_fee_percent = Set(policy.early_fee_percent);
    plan.late_fee_percent = Set(policy.late_fee_percent);
    plan.no_show_fee_percent = Set(policy.no_show_fee_percent);
    plan.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_best_available_rate_defaults() {
        let policy = CancellationPolicy::default();
        assert_eq!(policy.name, "Best Available Rate");
        assert_eq!(policy.free_until_hours, 24);
        assert_eq!(policy.early_fee_percent, 0);
        assert_eq!(policy.late_fee_percent, 50);
        assert_eq!(policy.no_show_fee_percent, 100);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_validation() {
        let negative_window = CancellationPolicy {
            free_until_hours: -1,
            ..CancellationPolicy::default()
        };
        assert!(matches!(
            negative_window.validate(),
            Err(Error::Validation { .. })
        ));

        let over_hundred = CancellationPolicy {
            no_show_fee_percent: 101,
            ..CancellationPolicy::default()
        };
        assert!(matches!(
            over_hundred.validate(),
            Err(Error::Validation { .. })
        ));

        let unnamed = CancellationPolicy {
            name: "  ".to_string(),
            ..CancellationPolicy::default()
        };
        assert!(matches!(unnamed.validate(), Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_rate_plan_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_rate_plan(
            &db,
            &test_context(),
            &test_clock(),
            NewRatePlan {
                nightly_rate: -5,
                policy: CancellationPolicy::default(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_policy_from_rate_plan() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();
        let plan = create_custom_rate_plan(&db, "Non-refundable", 900_000, 0, 100, 100, 100).await?;

        let resolved = resolve_policy(&db, &ctx, plan.id, &CancellationConfig::default()).await?;
        assert_eq!(
            resolved.source,
            PolicySource::RatePlan {
                rate_plan_id: plan.id
            }
        );
        assert_eq!(resolved.policy.name, "Non-refundable");
        assert_eq!(resolved.policy.late_fee_percent, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_policy_fallback_modes() -> Result<()> {
        let db = setup_test_db().await?;
        let ctx = test_context();

        let lenient = CancellationConfig::default();
        let resolved = resolve_policy(&db, &ctx, 999, &lenient).await?;
        assert_eq!(resolved.source, PolicySource::Fallback);
        assert_eq!(resolved.policy, CancellationPolicy::best_available_rate());

        let strict = CancellationConfig {
            fallback: PolicyFallback::Reject,
            ..CancellationConfig::default()
        };
        let result = resolve_policy(&db, &ctx, 999, &strict).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "rate plan",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_plans_are_property_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;

        let other_property = RequestContext::for_property(TEST_PROPERTY_ID + 1);
        assert!(get_rate_plan(&db, &other_property, plan.id).await?.is_none());
        assert!(get_rate_plan(&db, &test_context(), plan.id).await?.is_some());
        assert!(
            get_rate_plan_by_name(&db, &test_context(), "Best Available Rate")
                .await?
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_policy_blocked_while_referenced() -> Result<()> {
        let (db, plan, reservation) = setup_with_reservation().await?;
        let ctx = test_context();

        let stricter = CancellationPolicy {
            late_fee_percent: 80,
            ..CancellationPolicy::from_rate_plan(&plan)
        };
        let result = update_rate_plan_policy(&db, &ctx, plan.id, stricter.clone()).await;
        assert!(matches!(result, Err(Error::PolicyInUse { rate_plan_id }) if rate_plan_id == plan.id));

        // Once the reservation is terminal the plan may change for future bookings
        crate::core::reservation::confirm_reservation(&db, &ctx, &test_clock(), reservation.id)
            .await?;
        crate::core::reservation::cancel_reservation(
            &db,
            &ctx,
            &test_clock(),
            &crate::config::app::AppConfig::default(),
            reservation.id,
        )
        .await?;

        let updated = update_rate_plan_policy(&db, &ctx, plan.id, stricter).await?;
        assert_eq!(updated.late_fee_percent, 80);
        Ok(())
    }
}
