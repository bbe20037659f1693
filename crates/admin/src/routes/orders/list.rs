//! Orders list page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tracing::instrument;

use clipjoint_core::{MasterId, OrderStatus};

use crate::db::masters::{Master, MasterAdminRepository};
use crate::db::orders::{OrderAdminRepository, OrderListItem, PriceBucket};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::CurrentStaff;
use crate::state::AppState;

use super::types::OrdersQuery;

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub staff: CurrentStaff,
    pub current_path: &'static str,
    /// Rows on this page.
    pub orders: Vec<OrderListItem>,
    /// Total rows across all pages for the active filter.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Total number of pages.
    pub pages: i64,
    /// Status dropdown entries.
    pub statuses: &'static [OrderStatus],
    /// Price bucket dropdown entries.
    pub buckets: &'static [PriceBucket],
    /// Master dropdown entries, inactive ones included.
    pub masters: Vec<Master>,
    /// The raw query, echoed back into the filter form.
    pub query: OrdersQuery,
    /// Parameters to preserve in pagination links.
    pub preserve_params: String,
}

impl OrdersIndexTemplate {
    /// Whether this status option is the active filter.
    fn status_selected(&self, status: &OrderStatus) -> bool {
        self.query.status.as_deref() == Some(status.as_str())
    }

    /// Whether this master option is the active filter.
    fn master_selected(&self, id: &MasterId) -> bool {
        self.query
            .master
            .as_deref()
            .is_some_and(|raw| raw == id.to_string())
    }

    /// Whether this price bucket option is the active filter.
    fn bucket_selected(&self, bucket: &PriceBucket) -> bool {
        self.query.price.as_deref() == Some(bucket.as_param())
    }
}

/// Display the filtered, paginated orders table.
#[instrument(skip(state, staff, query))]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersIndexTemplate> {
    let filter = query.to_filter();
    let order_page = OrderAdminRepository::new(state.pool())
        .list(&filter, query.page())
        .await?;
    let masters = MasterAdminRepository::new(state.pool()).list_all().await?;

    let preserve_params = query.preserve_params();

    Ok(OrdersIndexTemplate {
        staff,
        current_path: "/orders",
        orders: order_page.items,
        total: order_page.total,
        page: order_page.page,
        pages: order_page.pages,
        statuses: &OrderStatus::ALL,
        buckets: &PriceBucket::ALL,
        masters,
        query,
        preserve_params,
    })
}
