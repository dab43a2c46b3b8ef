//! Rate plan seeding from config.toml
//!
//! The rate plans defined under `[[rate_plans]]` are inserted on startup when a plan
//! with the same name does not yet exist for the property. Existing plans are never
//! modified, so seeding is idempotent and safe to run on every start.

use crate::{
    core::{
        clock::Clock,
        context::RequestContext,
        finance,
        policy::{CancellationPolicy, NewRatePlan, create_rate_plan, get_rate_plan_by_name},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::info;

/// Configuration for a single rate plan
#[derive(Debug, Clone, Deserialize)]
pub struct RatePlanSeed {
    /// Property the plan belongs to
    pub property_id: i64,
    /// Price per night
    pub nightly_rate: i64,
    /// Plan name and cancellation terms
    #[serde(flatten)]
    pub policy: CancellationPolicy,
}

impl RatePlanSeed {
    /// Checks the nightly rate and the policy terms.
    pub fn validate(&self) -> Result<()> {
        finance::check_amount("Nightly rate", self.nightly_rate)?;
        self.policy.validate()
    }
}

/// Inserts every configured rate plan that is missing. Returns how many were created.
pub async fn seed_rate_plans(
    db: &DatabaseConnection,
    clock: &dyn Clock,
    seeds: &[RatePlanSeed],
) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        let ctx = RequestContext::for_property(seed.property_id);
        if get_rate_plan_by_name(db, &ctx, &seed.policy.name)
            .await?
            .is_some()
        {
            continue;
        }
        create_rate_plan(
            db,
            &ctx,
            clock,
            NewRatePlan {
                nightly_rate: seed.nightly_rate,
                policy: seed.policy.clone(),
            },
        )
        .await?;
        created += 1;
    }
    info!(created, configured = seeds.len(), "Rate plans seeded");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::RatePlan, errors::Error, test_utils::*};
    use sea_orm::{EntityTrait, PaginatorTrait};

    fn seed(name: &str, late_fee_percent: i32) -> RatePlanSeed {
        RatePlanSeed {
            property_id: TEST_PROPERTY_ID,
            nightly_rate: 1_000_000,
            policy: CancellationPolicy {
                name: name.to_string(),
                late_fee_percent,
                ..CancellationPolicy::best_available_rate()
            },
        }
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();
        let seeds = vec![seed("Best Available Rate", 50), seed("Advance Purchase", 100)];

        assert_eq!(seed_rate_plans(&db, &clock, &seeds).await?, 2);
        assert_eq!(seed_rate_plans(&db, &clock, &seeds).await?, 0);
        assert_eq!(RatePlan::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_plans_are_not_modified() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();
        seed_rate_plans(&db, &clock, &[seed("Flexible", 20)]).await?;
        seed_rate_plans(&db, &clock, &[seed("Flexible", 90)]).await?;

        let plan = get_rate_plan_by_name(&db, &test_context(), "Flexible")
            .await?
            .ok_or_else(|| Error::not_found("rate plan", "Flexible"))?;
        assert_eq!(plan.late_fee_percent, 20);
        Ok(())
    }

    #[test]
    fn test_seed_validation() {
        let mut bad = seed("Broken", 50);
        bad.nightly_rate = -1;
        assert!(matches!(bad.validate(), Err(Error::Validation { .. })));
        assert!(matches!(
            seed("Broken", 101).validate(),
            Err(Error::Validation { .. })
        ));
    }
}
