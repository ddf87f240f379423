//! Admin order list filter and dashboard counters

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Client, EventRequest, EventStatus, Order, OrderStatus};

/// Filter of the admin order list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    /// `None` keeps every status
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the order number or client link
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some() && order.status != self.status {
            return false;
        }

        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        let contains = |value: Option<&str>| {
            value.is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        contains(order.number.as_deref()) || contains(order.client.as_deref())
    }

    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

/// Counters shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Orders awaiting confirmation
    pub pending_orders: usize,
    /// Orders to pick up today
    pub orders_today: usize,
    /// Event requests not yet handled
    pub new_event_requests: usize,
    pub total_clients: usize,
    pub total_orders: usize,
    pub total_events: usize,
    /// Revenue of the current month, cancelled orders excluded
    pub month_revenue: Decimal,
    pub computed_at: DateTime<Utc>,
}

impl DashboardStats {
    /// Compute counters as seen at `now` in the restaurant's timezone
    pub fn compute<Tz: TimeZone>(
        orders: &[Order],
        events: &[EventRequest],
        clients: &[Client],
        now: &DateTime<Tz>,
    ) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let local_date = |at: DateTime<Utc>| -> NaiveDate { at.with_timezone(&tz).date_naive() };

        let pending_orders = orders
            .iter()
            .filter(|o| o.status == Some(OrderStatus::Pending))
            .count();

        let orders_today = orders
            .iter()
            .filter_map(|o| o.pickup_at)
            .filter(|at| local_date(*at) == today)
            .count();

        let new_event_requests = events
            .iter()
            .filter(|e| e.status == Some(EventStatus::InitialRequest))
            .count();

        let month_revenue = orders
            .iter()
            .filter(|o| !o.status.as_ref().is_some_and(OrderStatus::is_cancelled))
            .filter(|o| {
                o.pickup_at
                    .or(o.taken_at)
                    .or(o.created_at)
                    .map(local_date)
                    .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
            })
            .map(|o| o.total)
            .sum::<Decimal>()
            .round_dp(2);

        Self {
            pending_orders,
            orders_today,
            new_event_requests,
            total_clients: clients.len(),
            total_orders: orders.len(),
            total_events: events.len(),
            month_revenue,
            computed_at: now.with_timezone(&Utc),
        }
    }
}
