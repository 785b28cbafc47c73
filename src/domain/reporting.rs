//! Sales aggregation and dashboard figures.
//!
//! [`aggregate`] buckets orders into a fixed trailing calendar window ending
//! at `now` (UTC). Every bucket in the window is present even when empty, in
//! chronological order. Orders dated outside the window fall into no bucket
//! and are dropped.

use std::collections::HashMap;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Order, OrderStatus};
use crate::domain::value_objects::{Money, MoneyError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period { #[default] Daily, Weekly, Monthly, Yearly }

impl Period {
    /// Number of buckets in the trailing window.
    pub const fn window(self) -> u32 {
        match self { Self::Daily => 7, Self::Weekly => 8, Self::Monthly => 12, Self::Yearly => 5 }
    }

    /// Grouping key of the bucket containing `date`.
    pub fn key_for(self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
            Self::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Self::Yearly => format!("{:04}", date.year()),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("invalid period: {s}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    pub key: String,
    pub label: String,
    pub sales: Money,
    pub orders: u32,
}

/// Monday of the ISO week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_start(year: i32, month0: i32, back: i32) -> Option<NaiveDate> {
    let total = year * 12 + month0 - back;
    let month = u32::try_from(total.rem_euclid(12) + 1).ok()?;
    NaiveDate::from_ymd_opt(total.div_euclid(12), month, 1)
}

fn seed(period: Period, today: NaiveDate) -> Vec<SalesBucket> {
    let n = period.window();
    let bucket = |key: String, label: String| SalesBucket { key, label, sales: Money::zero(), orders: 0 };
    (0..n)
        .rev()
        .filter_map(|back| {
            let back_days = i64::from(back);
            match period {
                Period::Daily => {
                    let day = today - Duration::days(back_days);
                    Some(bucket(period.key_for(day), day.format("%b %-d").to_string()))
                }
                Period::Weekly => {
                    let start = week_start(today) - Duration::weeks(back_days);
                    Some(bucket(period.key_for(start), format!("Week {}", n - back)))
                }
                Period::Monthly => {
                    let back = i32::try_from(back).ok()?;
                    let first = month_start(today.year(), i32::try_from(today.month0()).ok()?, back)?;
                    Some(bucket(period.key_for(first), first.format("%b %Y").to_string()))
                }
                Period::Yearly => {
                    let year = today.year() - i32::try_from(back).ok()?;
                    Some(bucket(format!("{year:04}"), year.to_string()))
                }
            }
        })
        .collect()
}

/// Buckets `orders` for `period` over the trailing window ending at `now`.
pub fn aggregate(orders: &[Order], period: Period, now: DateTime<Utc>) -> Result<Vec<SalesBucket>, MoneyError> {
    let mut buckets = seed(period, now.date_naive());
    let index: HashMap<String, usize> = buckets.iter().enumerate().map(|(i, b)| (b.key.clone(), i)).collect();
    for order in orders {
        let key = period.key_for(order.created_at.date_naive());
        if let Some(&i) = index.get(&key) {
            buckets[i].sales = buckets[i].sales.checked_add(order.total)?;
            buckets[i].orders += 1;
        }
    }
    Ok(buckets)
}

/// Per-status tallies shown above order tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts { pub all: usize, pub pending: usize, pub shipped: usize, pub delivered: usize }

impl StatusCounts {
    pub fn of<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut c, o| {
            c.all += 1;
            match o.status {
                OrderStatus::Pending => c.pending += 1,
                OrderStatus::Shipped => c.shipped += 1,
                OrderStatus::Delivered => c.delivered += 1,
            }
            c
        })
    }
}

pub fn revenue<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Result<Money, MoneyError> {
    Money::checked_sum(orders.into_iter().map(|o| o.total))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanDashboard { pub total_revenue: Money, pub total_products: usize, pub total_orders: usize, pub pending_orders: usize }

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantDashboard { pub total_exhibitions: usize, pub active_exhibitions: usize, pub bulk_orders: usize, pub total_value: Money }

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_users: usize,
    pub blocked_users: usize,
    pub total_products: usize,
    pub total_orders: usize,
    pub total_exhibitions: usize,
    pub platform_revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDashboard { pub total_orders: usize, pub total_spent: Money, pub cart_items: usize }

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Admin(AdminDashboard),
    Artisan(ArtisanDashboard),
    Customer(CustomerDashboard),
    Consultant(ConsultantDashboard),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::aggregates::{Actor, LineItem, Role};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap() }

    fn order(id: &str, total: i64, created_at: DateTime<Utc>) -> Order {
        let buyer = Actor { id: "k1".into(), name: "Amit".into(), role: Role::Consultant };
        let mut o = Order::bulk(id, &buyer, "stock", vec![LineItem::new("p1", "Basket", 1, Money::from_major(total)).unwrap()]).unwrap();
        o.created_at = created_at;
        o
    }

    #[test]
    fn test_empty_input_yields_zeroed_window() {
        let now = at(2026, 10, 18);
        for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly] {
            let buckets = aggregate(&[], period, now).unwrap();
            assert_eq!(buckets.len() as u32, period.window());
            assert!(buckets.iter().all(|b| b.sales == Money::zero() && b.orders == 0));
            let keys: Vec<_> = buckets.iter().map(|b| b.key.clone()).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted, "{period:?} buckets out of order");
        }
    }
    #[test]
    fn test_daily_window_labels_and_sums() {
        let now = at(2026, 10, 18);
        let orders = vec![order("a", 500, at(2026, 10, 18)), order("b", 250, at(2026, 10, 18)), order("c", 100, at(2026, 10, 12)), order("old", 999, at(2026, 10, 11))];
        let buckets = aggregate(&orders, Period::Daily, now).unwrap();
        assert_eq!(buckets.first().unwrap().key, "2026-10-12");
        assert_eq!(buckets.first().unwrap().label, "Oct 12");
        assert_eq!(buckets.first().unwrap().sales, Money::from_major(100));
        let last = buckets.last().unwrap();
        assert_eq!((last.key.as_str(), last.label.as_str(), last.orders), ("2026-10-18", "Oct 18", 2));
        assert_eq!(last.sales, Money::from_major(750));
        let counted: u32 = buckets.iter().map(|b| b.orders).sum();
        assert_eq!(counted, 3);
    }
    #[test]
    fn test_weekly_buckets_start_on_monday() {
        // 2026-10-18 is a Sunday, so its week starts Monday 2026-10-12.
        let buckets = aggregate(&[order("a", 10, at(2026, 10, 12)), order("b", 5, at(2026, 10, 11))], Period::Weekly, at(2026, 10, 18)).unwrap();
        assert_eq!(buckets.last().unwrap().key, "2026-10-12");
        assert_eq!(buckets.last().unwrap().label, "Week 8");
        assert_eq!(buckets.last().unwrap().orders, 1);
        assert_eq!(buckets[6].key, "2026-10-05");
        assert_eq!(buckets[6].orders, 1);
        assert_eq!(buckets[0].label, "Week 1");
    }
    #[test]
    fn test_monthly_window_crosses_year_boundary() {
        let buckets = aggregate(&[order("a", 70, at(2025, 11, 30))], Period::Monthly, at(2026, 10, 18)).unwrap();
        assert_eq!(buckets[0].key, "2025-11");
        assert_eq!(buckets[0].label, "Nov 2025");
        assert_eq!(buckets[0].sales, Money::from_major(70));
        assert_eq!(buckets[11].key, "2026-10");
    }
    #[test]
    fn test_yearly_and_idempotence() {
        let orders = vec![order("a", 1, at(2022, 1, 1)), order("b", 2, at(2021, 12, 31))];
        let first = aggregate(&orders, Period::Yearly, at(2026, 10, 18)).unwrap();
        assert_eq!(first.iter().map(|b| b.label.as_str()).collect::<Vec<_>>(), vec!["2022", "2023", "2024", "2025", "2026"]);
        assert_eq!(first[0].orders, 1);
        assert_eq!(first, aggregate(&orders, Period::Yearly, at(2026, 10, 18)).unwrap());
    }
    #[test]
    fn test_status_counts() {
        let mut shipped = order("s", 1, at(2026, 1, 1));
        shipped.transition_to(OrderStatus::Shipped).unwrap();
        let orders = [order("p", 1, at(2026, 1, 1)), shipped];
        assert_eq!(StatusCounts::of(&orders), StatusCounts { all: 2, pending: 1, shipped: 1, delivered: 0 });
        assert_eq!(revenue(&orders), Ok(Money::from_major(2)));
    }
    #[test]
    fn test_unrepresentable_sums_are_errors() {
        let mut a = order("a", 1, at(2026, 10, 18));
        let mut b = order("b", 1, at(2026, 10, 18));
        a.total = Money::new(rust_decimal::Decimal::MAX);
        b.total = Money::new(rust_decimal::Decimal::MAX);
        let orders = [a, b];
        assert_eq!(revenue(&orders), Err(MoneyError::Overflow));
        assert_eq!(aggregate(&orders, Period::Daily, at(2026, 10, 18)), Err(MoneyError::Overflow));
    }
}
