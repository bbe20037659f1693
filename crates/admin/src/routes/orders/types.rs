//! Query types and helpers for the order pages.

use serde::Deserialize;

use clipjoint_core::OrderStatus;

use crate::db::orders::{OrderFilter, PriceBucket};

/// Query parameters for the orders list.
///
/// Everything arrives as an optional string; unknown or malformed values
/// are dropped rather than rejected, so a stale filter link still renders
/// the page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OrdersQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Free-text search over name, phone, and comment.
    pub q: Option<String>,
    /// Status filter value.
    pub status: Option<String>,
    /// Master id filter value.
    pub master: Option<String>,
    /// Price bucket filter value.
    pub price: Option<String>,
    /// Submission date range start, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Submission date range end, `YYYY-MM-DD`.
    pub date_to: Option<String>,
}

impl OrdersQuery {
    /// Requested page, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Translate the raw query into a repository filter.
    #[must_use]
    pub fn to_filter(&self) -> OrderFilter {
        OrderFilter {
            status: self
                .status
                .as_deref()
                .and_then(|raw| raw.parse::<OrderStatus>().ok()),
            master_id: self
                .master
                .as_deref()
                .and_then(|raw| raw.parse::<i32>().ok())
                .map(Into::into),
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(ToOwned::to_owned),
            date_from: self.date_from.as_deref().and_then(parse_date),
            date_to: self.date_to.as_deref().and_then(parse_date),
            price_bucket: self.price.as_deref().and_then(PriceBucket::from_param),
        }
    }

    /// URL parameters for preserving filters across pagination links.
    ///
    /// The page number is set explicitly in those links, so it is excluded
    /// here.
    #[must_use]
    pub fn preserve_params(&self) -> String {
        let mut params = Vec::new();

        if let Some(q) = &self.q
            && !q.is_empty()
        {
            params.push(format!("q={}", urlencoding::encode(q)));
        }
        if let Some(status) = &self.status
            && !status.is_empty()
        {
            params.push(format!("status={status}"));
        }
        if let Some(master) = &self.master
            && !master.is_empty()
        {
            params.push(format!("master={master}"));
        }
        if let Some(price) = &self.price
            && !price.is_empty()
        {
            params.push(format!("price={price}"));
        }
        if let Some(from) = &self.date_from
            && !from.is_empty()
        {
            params.push(format!("date_from={from}"));
        }
        if let Some(to) = &self.date_to
            && !to.is_empty()
        {
            params.push(format!("date_to={to}"));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("&{}", params.join("&"))
        }
    }
}

fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_to_filter_parses_known_values() {
        let query = OrdersQuery {
            page: Some(2),
            q: Some("  Ivan ".to_owned()),
            status: Some("confirmed".to_owned()),
            master: Some("4".to_owned()),
            price: Some("500to999".to_owned()),
            date_from: Some("2026-02-01".to_owned()),
            date_to: Some("2026-02-28".to_owned()),
        };

        let filter = query.to_filter();
        assert_eq!(filter.status, Some(OrderStatus::Confirmed));
        assert_eq!(filter.master_id.map(|m| m.as_i32()), Some(4));
        assert_eq!(filter.search.as_deref(), Some("Ivan"));
        assert_eq!(filter.price_bucket, Some(PriceBucket::From500));
        assert_eq!(
            filter.date_from,
            Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
        );
        assert_eq!(
            filter.date_to,
            Some(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap())
        );
    }

    #[test]
    fn test_to_filter_drops_malformed_values() {
        let query = OrdersQuery {
            page: None,
            q: Some(String::new()),
            status: Some("paid".to_owned()),
            master: Some("soon".to_owned()),
            price: Some("free".to_owned()),
            date_from: Some("February".to_owned()),
            date_to: None,
        };

        let filter = query.to_filter();
        assert!(filter.status.is_none());
        assert!(filter.master_id.is_none());
        assert!(filter.search.is_none());
        assert!(filter.price_bucket.is_none());
        assert!(filter.date_from.is_none());
    }

    #[test]
    fn test_preserve_params_skips_page_and_empties() {
        let query = OrdersQuery {
            page: Some(3),
            q: Some("beard trim".to_owned()),
            status: Some("new".to_owned()),
            master: None,
            price: Some(String::new()),
            date_from: None,
            date_to: None,
        };

        assert_eq!(query.preserve_params(), "&q=beard%20trim&status=new");
    }

    #[test]
    fn test_preserve_params_empty_query() {
        assert_eq!(OrdersQuery::default().preserve_params(), "");
    }

    #[test]
    fn test_page_clamps_to_one() {
        let query = OrdersQuery {
            page: Some(-2),
            ..OrdersQuery::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(OrdersQuery::default().page(), 1);
    }
}
