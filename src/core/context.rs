//! Request-scoped context passed explicitly into every core operation.

use serde::{Deserialize, Serialize};

/// Who is acting and for which property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Property every read and write is scoped to
    pub property_id: i64,
    /// Staff member performing the action, for log lines
    pub actor: Option<String>,
}

impl RequestContext {
    /// Context for a property with no named actor.
    #[must_use]
    pub const fn for_property(property_id: i64) -> Self {
        Self {
            property_id,
            actor: None,
        }
    }

    /// Actor name for logs, `"system"` when unknown.
    #[must_use]
    pub fn actor_name(&self) -> &str {
        self.actor.as_deref().unwrap_or("system")
    }
}
