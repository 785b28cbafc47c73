use std::collections::{BTreeMap, HashMap, HashSet};
use serde::Serialize;
use crate::domain::aggregates::{Actor, Delivery, LineItem, Order, OrderError, OrderKind, OrderStatus, Role};
use crate::domain::reporting::StatusCounts;
use crate::error::{Result, StorefrontError};
use super::{new_id, require_role, Storefront};

/// A consultant's bulk selection: product id to requested quantity.
#[derive(Debug, Clone, Default)]
pub struct BulkRequest {
    pub purpose: String,
    pub selections: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListing {
    pub orders: Vec<Order>,
    /// Tallies over every order the caller can see, before the status filter.
    pub counts: StatusCounts,
}

impl Storefront {
    /// Turns the customer's cart into a pending retail order and empties the cart.
    ///
    /// The cart is read after the processing delay, and the insert only goes
    /// through if the cart is still at the version that was read. A cart
    /// changed in between fails with `Conflict` and keeps its lines.
    pub async fn place_order(&self, actor: &Actor, delivery: Delivery) -> Result<Order> {
        require_role(actor, &[Role::Customer])?;
        if !self.checkout_delay.is_zero() {
            tokio::time::sleep(self.checkout_delay).await;
        }
        let mut cart = self.repos.carts.load(&actor.id).await?;
        let mut order = Order::checkout(new_id(), actor, &cart, delivery).map_err(|e| match e {
            OrderError::NoItems => StorefrontError::validation("cart is empty"),
            other => other.into(),
        })?;
        let read_version = cart.version();
        cart.clear();
        self.repos.orders.insert_checkout(&order, &cart, read_version).await?;
        tracing::info!(order_id = %order.id, customer_id = %actor.id, total = %order.total, items = order.items.len(), "order placed");
        self.events.publish(order.take_events()).await;
        Ok(order)
    }

    /// Resolves each selected product at today's price into a pending bulk order.
    pub async fn place_bulk_order(&self, actor: &Actor, request: BulkRequest) -> Result<Order> {
        require_role(actor, &[Role::Consultant])?;
        let selections = request.selections.into_iter()
            .filter(|(_, qty)| *qty > 0)
            .map(|(id, qty)| match u32::try_from(qty) {
                Ok(qty) => Ok((id, qty)),
                Err(_) => Err(StorefrontError::validation(format!("quantity for {id} is too large"))),
            })
            .collect::<Result<BTreeMap<String, u32>>>()?;
        if selections.is_empty() {
            return Err(StorefrontError::validation("select at least one product with a quantity above zero"));
        }
        let mut items = Vec::with_capacity(selections.len());
        for (product_id, quantity) in selections {
            let product = self.product(&product_id).await?;
            items.push(LineItem::new(product.id, product.name, quantity, product.price)?);
        }
        let mut order = Order::bulk(new_id(), actor, &request.purpose, items)?;
        self.repos.orders.insert(&order).await?;
        tracing::info!(order_id = %order.id, consultant_id = %actor.id, total = %order.total, "bulk order placed");
        self.events.publish(order.take_events()).await;
        Ok(order)
    }

    async fn artisan_product_ids(&self, artisan_id: &str) -> Result<HashSet<String>> {
        Ok(self.repos.products.list().await?.into_iter()
            .filter(|p| p.is_owned_by(artisan_id))
            .map(|p| p.id)
            .collect())
    }

    /// The orders `actor` is allowed to see, newest first.
    pub(crate) async fn visible_orders(&self, actor: &Actor) -> Result<Vec<Order>> {
        let orders = self.repos.orders.list().await?;
        Ok(match actor.role {
            Role::Admin => orders,
            Role::Artisan => {
                let owned = self.artisan_product_ids(&actor.id).await?;
                let owned: HashSet<&str> = owned.iter().map(String::as_str).collect();
                orders.into_iter().filter(|o| o.contains_any(&owned)).collect()
            }
            Role::Customer => orders.into_iter().filter(|o| o.kind == OrderKind::Retail && o.buyer_id == actor.id).collect(),
            Role::Consultant => orders.into_iter().filter(|o| o.kind == OrderKind::Bulk && o.buyer_id == actor.id).collect(),
        })
    }

    pub async fn list_orders(&self, actor: &Actor, status: Option<OrderStatus>) -> Result<OrderListing> {
        let orders = self.visible_orders(actor).await?;
        let counts = StatusCounts::of(&orders);
        let orders = match status {
            Some(s) => orders.into_iter().filter(|o| o.status == s).collect(),
            None => orders,
        };
        Ok(OrderListing { orders, counts })
    }

    /// Advances an order one step along its fulfilment workflow.
    ///
    /// Artisans may only move orders that include one of their products. When
    /// `expected_version` is given it must match the stored version; the write
    /// itself is conditional on the version read here either way.
    pub async fn set_order_status(&self, actor: &Actor, order_id: &str, next: OrderStatus, expected_version: Option<i64>) -> Result<Order> {
        require_role(actor, &[Role::Artisan, Role::Admin])?;
        let mut order = self.repos.orders.find(order_id).await?
            .ok_or_else(|| StorefrontError::not_found(format!("order {order_id}")))?;
        if actor.role == Role::Artisan {
            let owned = self.artisan_product_ids(&actor.id).await?;
            if !order.contains_any(&owned.iter().map(String::as_str).collect()) {
                return Err(StorefrontError::forbidden("this order has none of your products"));
            }
        }
        if let Some(expected) = expected_version {
            if expected != order.version {
                return Err(StorefrontError::conflict(format!(
                    "order {order_id} is at version {}, not {expected}", order.version
                )));
            }
        }
        let read_version = order.version;
        let from = order.status;
        order.transition_to(next)?;
        self.repos.orders.update_status(&order, read_version).await?;
        tracing::info!(order_id = %order.id, %from, to = %next, version = order.version, by = %actor.id, "order status changed");
        self.events.publish(order.take_events()).await;
        Ok(order)
    }
}
