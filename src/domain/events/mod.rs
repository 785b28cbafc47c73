//! Domain events
use crate::domain::aggregates::{OrderKind, OrderStatus, Role};
use crate::domain::value_objects::Money;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    User(UserEvent),
    Exhibition(ExhibitionEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: String, artisan_id: String },
    Updated { product_id: String },
    Deleted { product_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, kind: OrderKind, buyer_id: String, total: Money },
    StatusChanged { order_id: String, from: OrderStatus, to: OrderStatus, version: i64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    Registered { user_id: String, role: Role },
    BlockToggled { user_id: String, blocked: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExhibitionEvent {
    Created { exhibition_id: String, consultant_id: String },
    InterestRegistered { exhibition_id: String, visitors: u64 },
}

impl DomainEvent {
    /// NATS subject the event is published on, e.g. `tribal.order.placed`.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            Self::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Updated { .. } => "updated",
                ProductEvent::Deleted { .. } => "deleted",
            }),
            Self::Order(e) => ("order", match e {
                OrderEvent::Placed { .. } => "placed",
                OrderEvent::StatusChanged { .. } => "status_changed",
            }),
            Self::User(e) => ("user", match e {
                UserEvent::Registered { .. } => "registered",
                UserEvent::BlockToggled { .. } => "block_toggled",
            }),
            Self::Exhibition(e) => ("exhibition", match e {
                ExhibitionEvent::Created { .. } => "created",
                ExhibitionEvent::InterestRegistered { .. } => "interest_registered",
            }),
        };
        format!("tribal.{aggregate}.{name}")
    }
}
