//! Request-scoped [`RequestContext`] extraction.
//!
//! The property comes from the `X-Property-Id` header and the acting staff member
//! from the optional `X-Actor` header.

use crate::{core::context::RequestContext, errors::Error};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header naming the property a request operates on
pub const PROPERTY_HEADER: &str = "x-property-id";

/// Header naming the staff member performing the request
pub const ACTOR_HEADER: &str = "x-actor";

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PROPERTY_HEADER)
            .ok_or_else(|| Error::validation("Missing X-Property-Id header"))?;
        let property_id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| Error::validation("X-Property-Id must be a positive integer"))?;

        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        Ok(Self { property_id, actor })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<RequestContext, Error> {
        let (mut parts, ()) = request.into_parts();
        RequestContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_property_and_actor() {
        let request = Request::builder()
            .header(PROPERTY_HEADER, "3")
            .header(ACTOR_HEADER, "night_audit")
            .body(())
            .unwrap();
        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx.property_id, 3);
        assert_eq!(ctx.actor_name(), "night_audit");
    }

    #[tokio::test]
    async fn test_actor_is_optional() {
        let request = Request::builder()
            .header(PROPERTY_HEADER, "1")
            .body(())
            .unwrap();
        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx, RequestContext::for_property(1));
    }

    #[tokio::test]
    async fn test_missing_or_invalid_property_is_rejected() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(missing).await,
            Err(Error::Validation { .. })
        ));

        for bad in ["abc", "0", "-4"] {
            let request = Request::builder()
                .header(PROPERTY_HEADER, bad)
                .body(())
                .unwrap();
            assert!(matches!(
                extract(request).await,
                Err(Error::Validation { .. })
            ));
        }
    }
}
