//! Cart Aggregate

use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, MoneyError};

/// A customer's cart. Lines hold a snapshot of the product taken when it was first added.
///
/// `version` counts successful mutations; stores only accept a save whose
/// read version matches what they hold.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    customer_id: String,
    items: Vec<CartItem>,
    subtotal: Money,
    updated_at: DateTime<Utc>,
    version: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "id")]
    pub product_id: String,
    pub artisan_id: String,
    pub artisan_name: String,
    pub name: String,
    pub price: Money,
    pub mrp: Money,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(), artisan_id: product.artisan_id.clone(),
            artisan_name: product.artisan_name.clone(), name: product.name.clone(),
            price: product.price, mrp: product.mrp, category: product.category.clone(),
            image_url: product.image_url.clone(), quantity: 1,
        }
    }
    pub fn line_total(&self) -> Result<Money, MoneyError> { self.price.checked_mul(self.quantity) }
}

fn subtotal_of(items: &[CartItem]) -> Result<Money, CartError> {
    let totals = items.iter().map(CartItem::line_total).collect::<Result<Vec<_>, _>>()?;
    Ok(Money::checked_sum(totals)?)
}

impl Cart {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self { customer_id: customer_id.into(), items: vec![], subtotal: Money::zero(), updated_at: Utc::now(), version: 0 }
    }

    pub fn restore(customer_id: impl Into<String>, items: Vec<CartItem>, updated_at: DateTime<Utc>, version: i64) -> Result<Self, CartError> {
        let subtotal = subtotal_of(&items)?;
        Ok(Self { customer_id: customer_id.into(), items, subtotal, updated_at, version })
    }

    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> Money { self.subtotal }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn version(&self) -> i64 { self.version }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Adds one unit, merging with an existing line for the same product.
    pub fn add_product(&mut self, product: &Product) -> Result<(), CartError> {
        let mut items = self.items.clone();
        if let Some(existing) = items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity = existing.quantity.checked_add(1).ok_or(CartError::QuantityTooLarge)?;
        } else {
            items.push(CartItem::snapshot(product));
        }
        self.commit(items)
    }

    /// Sets a line's quantity. Zero or less removes the line; unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(product_id)?;
            return Ok(());
        }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge)?;
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity = quantity,
            None => return Ok(()),
        }
        self.commit(items)
    }

    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> Result<bool, CartError> {
        let mut items = self.items.clone();
        items.retain(|i| i.product_id != product_id);
        if items.len() == self.items.len() { return Ok(false); }
        self.commit(items)?;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.subtotal = Money::zero();
        self.touch();
    }

    /// Replaces the lines only if their subtotal is representable.
    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), CartError> {
        self.subtotal = subtotal_of(&items)?;
        self.items = items;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartError { QuantityTooLarge, TotalTooLarge }
impl std::error::Error for CartError {}
impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityTooLarge => write!(f, "quantity is too large"),
            Self::TotalTooLarge => write!(f, "cart total is too large"),
        }
    }
}
impl From<MoneyError> for CartError {
    fn from(_: MoneyError) -> Self { Self::TotalTooLarge }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::{artisan, basket_draft};
    use crate::domain::aggregates::ProductDraft;

    fn basket() -> Product { Product::create("p1", &artisan(), basket_draft()).unwrap() }
    fn pot() -> Product {
        Product::create("p2", &artisan(), ProductDraft { name: "Clay Pot".into(), price: Money::from_major(250), mrp: Money::from_major(300), ..basket_draft() }).unwrap()
    }

    #[test]
    fn test_repeat_adds_merge() {
        let mut cart = Cart::new("c1");
        for _ in 0..5 { cart.add_product(&basket()).unwrap(); }
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.subtotal(), Money::from_major(2500));
        assert_eq!(cart.version(), 5);
    }
    #[test]
    fn test_zero_quantity_equals_remove() {
        let mut updated = Cart::new("c1");
        updated.add_product(&basket()).unwrap();
        updated.add_product(&pot()).unwrap();
        let mut removed = updated.clone();
        updated.update_quantity("p1", 0).unwrap();
        removed.remove_item("p1").unwrap();
        assert_eq!(updated.items(), removed.items());
        assert_eq!(updated.subtotal(), Money::from_major(250));
    }
    #[test]
    fn test_set_quantity_directly() {
        let mut cart = Cart::new("c1");
        cart.add_product(&pot()).unwrap();
        cart.update_quantity("p2", 40).unwrap();
        assert_eq!(cart.items()[0].quantity, 40);
        cart.update_quantity("missing", 3).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert!(!cart.remove_item("missing").unwrap());
    }
    #[test]
    fn test_price_snapshotted_at_add() {
        let mut cart = Cart::new("c1");
        let mut product = basket();
        cart.add_product(&product).unwrap();
        product.price = Money::from_major(100);
        cart.add_product(&product).unwrap();
        assert_eq!(cart.items()[0].price, Money::from_major(500));
        assert_eq!(cart.items()[0].quantity, 2);
    }
    #[test]
    fn test_line_serialized_with_product_id_as_id() {
        let mut cart = Cart::new("c1");
        cart.add_product(&basket()).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["id"], "p1");
        assert_eq!(json["items"][0]["quantity"], 1);
    }
    #[test]
    fn test_oversized_quantity_rejected_without_change() {
        let mut cart = Cart::new("c1");
        cart.add_product(&basket()).unwrap();
        let before = cart.clone();
        assert_eq!(cart.update_quantity("p1", i64::from(u32::MAX) + 1), Err(CartError::QuantityTooLarge));
        assert_eq!(cart, before);
    }
    #[test]
    fn test_total_overflow_rejected_without_change() {
        let mut cart = Cart::new("c1");
        let mut pricey = basket();
        pricey.price = Money::new(rust_decimal::Decimal::MAX);
        cart.add_product(&pricey).unwrap();
        let before = cart.clone();
        assert_eq!(cart.update_quantity("p1", 3), Err(CartError::TotalTooLarge));
        assert_eq!(cart.add_product(&pricey), Err(CartError::TotalTooLarge));
        assert_eq!(cart, before);
    }
}
