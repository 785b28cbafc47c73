//! Order Aggregate
//!
//! Retail checkouts and consultant bulk orders share one order collection and
//! one identity space, told apart by [`OrderKind`]. Line prices and the order
//! total are snapshots taken at creation and are never recomputed.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Actor, Cart};
use crate::domain::value_objects::{Money, MoneyError};
use crate::domain::events::{DomainEvent, OrderEvent};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "orderKind")]
    pub kind: OrderKind,
    pub buyer_id: String,
    pub buyer_name: String,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Bumped on every status change; writers compare-and-swap on it.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem { pub product_id: String, pub name: String, pub quantity: u32, pub price: Money, pub total: Money }

impl LineItem {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, quantity: u32, price: Money) -> Result<Self, MoneyError> {
        Ok(Self { product_id: product_id.into(), name: name.into(), quantity, price, total: price.checked_mul(quantity)? })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind { #[default] Retail, Bulk }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Shipped, Delivered }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod { #[default] Cod, Upi, Card, Bank }

/// Legal fulfilment moves. Everything not listed is rejected.
const TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Pending, OrderStatus::Shipped),
    (OrderStatus::Shipped, OrderStatus::Delivered),
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Pending, Self::Shipped, Self::Delivered];

    pub fn can_transition_to(self, next: OrderStatus) -> bool { TRANSITIONS.contains(&(self, next)) }
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub const fn as_str(&self) -> &'static str { match self { $(Self::$variant => $s),+ } }
        }
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
        }
        impl std::str::FromStr for $ty {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s { $($s => Ok(Self::$variant),)+ _ => Err(format!("invalid {}: {s}", stringify!($ty))) }
            }
        }
    };
}

str_enum!(OrderKind { Retail => "retail", Bulk => "bulk" });
str_enum!(OrderStatus { Pending => "pending", Shipped => "shipped", Delivered => "delivered" });
str_enum!(PaymentMethod { Cod => "cod", Upi => "upi", Card => "card", Bank => "bank" });

/// Delivery details collected at checkout.
#[derive(Clone, Debug, Default)]
pub struct Delivery { pub address: String, pub phone: String, pub payment_method: PaymentMethod }

impl Order {
    /// Snapshot a cart into a pending retail order.
    pub fn checkout(id: impl Into<String>, customer: &Actor, cart: &Cart, delivery: Delivery) -> Result<Self, OrderError> {
        let address = delivery.address.trim();
        let phone = delivery.phone.trim();
        if address.is_empty() { return Err(OrderError::MissingAddress); }
        if phone.is_empty() { return Err(OrderError::MissingPhone); }
        let items = cart.items().iter()
            .map(|i| LineItem::new(i.product_id.clone(), i.name.clone(), i.quantity, i.price))
            .collect::<Result<Vec<_>, _>>()?;
        let mut order = Self::place(id.into(), OrderKind::Retail, customer, items)?;
        order.payment_method = Some(delivery.payment_method);
        order.address = Some(address.to_string());
        order.phone = Some(phone.to_string());
        Ok(order)
    }

    /// A pending consultant bulk order over already-resolved lines.
    pub fn bulk(id: impl Into<String>, consultant: &Actor, purpose: &str, items: Vec<LineItem>) -> Result<Self, OrderError> {
        let purpose = purpose.trim();
        if purpose.is_empty() { return Err(OrderError::MissingPurpose); }
        let mut order = Self::place(id.into(), OrderKind::Bulk, consultant, items)?;
        order.purpose = Some(purpose.to_string());
        Ok(order)
    }

    fn place(id: String, kind: OrderKind, buyer: &Actor, items: Vec<LineItem>) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        let total = Money::checked_sum(items.iter().map(|i| i.total))?;
        let mut order = Self {
            id, kind, buyer_id: buyer.id.clone(), buyer_name: buyer.name.clone(), items, total,
            status: OrderStatus::Pending, payment_method: None, address: None, phone: None, purpose: None,
            version: 1, created_at: Utc::now(), events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: order.id.clone(), kind, buyer_id: order.buyer_id.clone(), total }));
        Ok(order)
    }

    /// Rebuild an order from storage without raising events.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: String, kind: OrderKind, buyer_id: String, buyer_name: String, items: Vec<LineItem>, total: Money,
        status: OrderStatus, payment_method: Option<PaymentMethod>, address: Option<String>, phone: Option<String>,
        purpose: Option<String>, version: i64, created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, kind, buyer_id, buyer_name, items, total, status, payment_method, address, phone, purpose, version, created_at, events: vec![] }
    }

    /// Moves the order along the fulfilment table and bumps its version.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition { from: self.status, to: next });
        }
        let from = self.status;
        self.status = next;
        self.version += 1;
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id.clone(), from, to: next, version: self.version }));
        Ok(())
    }

    pub fn contains_any(&self, product_ids: &HashSet<&str>) -> bool {
        self.items.iter().any(|i| product_ids.contains(i.product_id.as_str()))
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError { NoItems, MissingAddress, MissingPhone, MissingPurpose, TotalTooLarge, InvalidTransition { from: OrderStatus, to: OrderStatus } }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "order has no items"),
            Self::MissingAddress => write!(f, "delivery address is required"),
            Self::MissingPhone => write!(f, "phone number is required"),
            Self::MissingPurpose => write!(f, "purpose of bulk order is required"),
            Self::TotalTooLarge => write!(f, "order total is too large"),
            Self::InvalidTransition { from, to } => write!(f, "cannot move order from {from} to {to}"),
        }
    }
}
impl From<MoneyError> for OrderError {
    fn from(_: MoneyError) -> Self { Self::TotalTooLarge }
}
