//! Paginated collection results: `{ data, total, page, limit, totalPages }`.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Requested page (1-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Clamps page to at least 1 and limit to `1..=100`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Total items across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub limit: u64,
    /// Number of pages
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page, deriving `total_pages` from `total` and `limit`.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.limit == 0 {
            0
        } else {
            total.div_ceil(request.limit)
        };
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }
}

/// Runs `select` through `SeaORM`'s paginator and wraps the result.
pub async fn fetch_page<E, C>(
    conn: &C,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let request = request.normalized();
    let paginator = select.paginate(conn, request.limit);
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(request.page - 1).await?;
    Ok(Page::new(data, total, request))
}
