//! Analytics route handlers.

use axum::{Json, extract::State};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::db::orders::{DailySales, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const DAILY_WINDOW_DAYS: i32 = 7;

/// Lifetime store totals.
#[derive(Debug, Serialize)]
pub struct AnalyticsTotals {
    pub users: i64,
    pub products: i64,
    pub total_sales: i64,
    pub total_revenue: Decimal,
}

/// Analytics response: totals plus a zero-filled daily breakdown.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub analytics: AnalyticsTotals,
    pub daily_sales: Vec<DailySales>,
}

/// Store totals and the last week of daily sales (admin).
#[instrument(skip_all)]
pub async fn overview(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>> {
    let users = UserRepository::new(state.pool()).count().await?;
    let products = ProductRepository::new(state.pool()).count().await?;

    let orders = OrderRepository::new(state.pool());
    let (total_sales, total_revenue) = orders.totals().await?;

    let rows = orders.daily_sales(DAILY_WINDOW_DAYS).await?;
    let today = Utc::now().date_naive();
    let daily_sales = zero_fill(rows, today, i64::from(DAILY_WINDOW_DAYS));

    Ok(Json(AnalyticsResponse {
        analytics: AnalyticsTotals {
            users,
            products,
            total_sales,
            total_revenue,
        },
        daily_sales,
    }))
}

/// Expand sparse per-day rows into a dense trailing window ending today.
///
/// Days with no orders become explicit zero rows so charts don't skip
/// them.
fn zero_fill(rows: Vec<DailySales>, today: NaiveDate, window_days: i64) -> Vec<DailySales> {
    (0..window_days)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .map(|date| {
            rows.iter()
                .find(|row| row.date == date)
                .map_or_else(
                    || DailySales {
                        date,
                        orders: 0,
                        revenue: Decimal::ZERO,
                    },
                    |row| DailySales {
                        date: row.date,
                        orders: row.orders,
                        revenue: row.revenue,
                    },
                )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_zero_fill_empty_window() {
        let filled = zero_fill(Vec::new(), day("2026-08-30"), 7);

        assert_eq!(filled.len(), 7);
        assert_eq!(filled.first().unwrap().date, day("2026-08-24"));
        assert_eq!(filled.last().unwrap().date, day("2026-08-30"));
        assert!(filled.iter().all(|d| d.orders == 0));
        assert!(filled.iter().all(|d| d.revenue == Decimal::ZERO));
    }

    #[test]
    fn test_zero_fill_merges_sparse_rows() {
        let rows = vec![
            DailySales {
                date: day("2026-08-26"),
                orders: 3,
                revenue: Decimal::new(14999, 2),
            },
            DailySales {
                date: day("2026-08-30"),
                orders: 1,
                revenue: Decimal::new(999, 2),
            },
        ];

        let filled = zero_fill(rows, day("2026-08-30"), 7);

        assert_eq!(filled.len(), 7);
        assert_eq!(filled.get(2).unwrap().orders, 3);
        assert_eq!(filled.get(2).unwrap().revenue, Decimal::new(14999, 2));
        assert_eq!(filled.last().unwrap().orders, 1);
        assert_eq!(filled.first().unwrap().orders, 0);
    }
}
