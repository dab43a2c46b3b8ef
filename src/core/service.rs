//! Property services (laundry, minibar, spa) that can be posted to a folio.

use crate::{
    core::context::RequestContext,
    entities::{PropertyService, property_service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Input for a new property service
#[derive(Debug, Clone, Deserialize)]
pub struct NewPropertyService {
    /// Catalogue name
    pub name: String,
    /// Unit price before tax
    pub price: i64,
    /// Tax added on top of the price, 0 to 100
    #[serde(default)]
    pub tax_rate_percent: i32,
}

/// Creates a service for the context's property.
pub async fn create_property_service(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_service: NewPropertyService,
) -> Result<property_service::Model> {
    let name = new_service.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Service name cannot be empty"));
    }
    if new_service.price < 0 {
        return Err(Error::validation(format!(
            "Service price cannot be negative: {}",
            new_service.price
        )));
    }
    if !(0..=100).contains(&new_service.tax_rate_percent) {
        return Err(Error::validation(format!(
            "Tax rate must be between 0 and 100, got {}",
            new_service.tax_rate_percent
        )));
    }

    let service = property_service::ActiveModel {
        property_id: Set(ctx.property_id),
        name: Set(name),
        price: Set(new_service.price),
        tax_rate_percent: Set(new_service.tax_rate_percent),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        property_id = ctx.property_id,
        service_id = service.id,
        name = %service.name,
        "Property service created"
    );
    Ok(service)
}

/// Looks up a service of the context's property.
pub async fn get_property_service<C>(
    conn: &C,
    ctx: &RequestContext,
    service_id: i64,
) -> Result<Option<property_service::Model>>
where
    C: ConnectionTrait,
{
    PropertyService::find_by_id(service_id)
        .filter(property_service::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// All services of the context's property, by name.
pub async fn list_property_services(
    db: &DatabaseConnection,
    ctx: &RequestContext,
) -> Result<Vec<property_service::Model>> {
    PropertyService::find()
        .filter(property_service::Column::PropertyId.eq(ctx.property_id))
        .order_by_asc(property_service::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_service_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let ctx = test_context();
        for (name, price, tax) in [("", 10, 0), ("Spa", -1, 0), ("Spa", 10, 101)] {
            let result = create_property_service(
                &db,
                &ctx,
                NewPropertyService {
                    name: name.to_string(),
                    price,
                    tax_rate_percent: tax,
                },
            )
            .await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_services_are_property_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let spa = create_test_service(&db, "Spa", 500_000, 8).await?;
        create_test_service(&db, "Laundry", 150_000, 10).await?;

        let names: Vec<String> = list_property_services(&db, &test_context())
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Laundry", "Spa"]);

        let other = RequestContext::for_property(TEST_PROPERTY_ID + 1);
        assert!(get_property_service(&db, &other, spa.id).await?.is_none());
        Ok(())
    }
}
