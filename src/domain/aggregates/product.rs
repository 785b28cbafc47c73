//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Actor;
use crate::domain::value_objects::Money;
use crate::domain::events::{DomainEvent, ProductEvent};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub artisan_id: String,
    /// Snapshot of the artisan's name at listing time.
    pub artisan_name: String,
    pub name: String,
    pub price: Money,
    pub mrp: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Highest accepted price or MRP, in rupees.
pub const MAX_PRICE: i64 = 10_000_000;

/// Editable product fields, shared by create and update.
#[derive(Clone, Debug, Default)]
pub struct ProductDraft {
    pub name: String,
    pub price: Money,
    pub mrp: Money,
    pub discount: Option<Decimal>,
    pub category: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl ProductDraft {
    fn check(mut self) -> Result<Self, ProductError> {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.description = self.description.trim().to_string();
        self.image_url = self.image_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        if self.name.is_empty() { return Err(ProductError::MissingName); }
        if self.category.is_empty() { return Err(ProductError::MissingCategory); }
        if self.description.is_empty() { return Err(ProductError::MissingDescription); }
        if self.price.is_negative() { return Err(ProductError::NegativePrice); }
        if self.price > self.mrp { return Err(ProductError::PriceAboveMrp); }
        if self.mrp > Money::from_major(MAX_PRICE) { return Err(ProductError::PriceTooHigh); }
        if let Some(d) = self.discount {
            if d < Decimal::ZERO || d > Decimal::ONE_HUNDRED { return Err(ProductError::InvalidDiscount); }
        }
        if let Some(url) = &self.image_url {
            if !validator::validate_url(url.as_str()) { return Err(ProductError::InvalidImageUrl); }
        }
        Ok(self)
    }
}

impl Product {
    pub fn create(id: impl Into<String>, artisan: &Actor, draft: ProductDraft) -> Result<Self, ProductError> {
        let draft = draft.check()?;
        let now = Utc::now();
        let mut product = Self {
            id: id.into(), artisan_id: artisan.id.clone(), artisan_name: artisan.name.clone(),
            name: draft.name, price: draft.price, mrp: draft.mrp, discount: draft.discount,
            category: draft.category, description: draft.description, image_url: draft.image_url,
            created_at: now, updated_at: now, events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: product.id.clone(), artisan_id: product.artisan_id.clone() }));
        Ok(product)
    }

    /// Rebuild a product from storage without validation or events.
    pub fn restore(id: String, artisan_id: String, artisan_name: String, draft: ProductDraft, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id, artisan_id, artisan_name, name: draft.name, price: draft.price, mrp: draft.mrp,
            discount: draft.discount, category: draft.category, description: draft.description,
            image_url: draft.image_url, created_at, updated_at, events: vec![],
        }
    }

    pub fn is_owned_by(&self, artisan_id: &str) -> bool { self.artisan_id == artisan_id }

    pub fn apply(&mut self, draft: ProductDraft) -> Result<(), ProductError> {
        let draft = draft.check()?;
        self.name = draft.name;
        self.price = draft.price;
        self.mrp = draft.mrp;
        self.discount = draft.discount;
        self.category = draft.category;
        self.description = draft.description;
        self.image_url = draft.image_url;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Updated { product_id: self.id.clone() }));
        Ok(())
    }

    pub fn mark_deleted(&mut self) {
        self.raise_event(DomainEvent::Product(ProductEvent::Deleted { product_id: self.id.clone() }));
    }

    /// Whole-percent discount badge. Only an explicit discount counts; none is derived from `mrp`.
    pub fn discount_percent(&self) -> u32 {
        self.discount
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_u32())
            .unwrap_or(0)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductError { MissingName, MissingCategory, MissingDescription, NegativePrice, PriceAboveMrp, PriceTooHigh, InvalidDiscount, InvalidImageUrl }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "product name is required"),
            Self::MissingCategory => write!(f, "category is required"),
            Self::MissingDescription => write!(f, "description is required"),
            Self::NegativePrice => write!(f, "price cannot be negative"),
            Self::PriceAboveMrp => write!(f, "price cannot exceed MRP"),
            Self::PriceTooHigh => write!(f, "price and MRP cannot exceed {MAX_PRICE}"),
            Self::InvalidDiscount => write!(f, "discount must be between 0 and 100"),
            Self::InvalidImageUrl => write!(f, "image URL is not a valid URL"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::aggregates::Role;

    pub(crate) fn artisan() -> Actor { Actor { id: "a1".into(), name: "Ramesh Kumar".into(), role: Role::Artisan } }

    pub(crate) fn basket_draft() -> ProductDraft {
        ProductDraft {
            name: "Handwoven Basket".into(), price: Money::from_major(500), mrp: Money::from_major(700),
            discount: Some(Decimal::new(2857, 2)), category: "handicrafts".into(),
            description: "Handwoven basket made from natural fibers".into(), image_url: None,
        }
    }

    #[test]
    fn test_product_create() {
        let mut p = Product::create("p1", &artisan(), basket_draft()).unwrap();
        assert_eq!(p.artisan_name, "Ramesh Kumar");
        assert_eq!(p.discount_percent(), 29);
        assert_eq!(p.take_events().len(), 1);
    }
    #[test]
    fn test_price_above_mrp_rejected() {
        let draft = ProductDraft { price: Money::from_major(800), ..basket_draft() };
        assert_eq!(Product::create("p1", &artisan(), draft).unwrap_err(), ProductError::PriceAboveMrp);
        let mut p = Product::create("p1", &artisan(), basket_draft()).unwrap();
        let draft = ProductDraft { mrp: Money::from_major(100), ..basket_draft() };
        assert_eq!(p.apply(draft), Err(ProductError::PriceAboveMrp));
        assert_eq!(p.mrp, Money::from_major(700));
    }
    #[test]
    fn test_price_capped() {
        let huge = Money::new(Decimal::MAX);
        let draft = ProductDraft { price: huge, mrp: huge, ..basket_draft() };
        assert_eq!(Product::create("p1", &artisan(), draft).unwrap_err(), ProductError::PriceTooHigh);
        let at_cap = Money::from_major(MAX_PRICE);
        assert!(Product::create("p1", &artisan(), ProductDraft { price: at_cap, mrp: at_cap, ..basket_draft() }).is_ok());
    }
    #[test]
    fn test_discount_is_never_derived() {
        let p = Product::create("p1", &artisan(), ProductDraft { discount: None, ..basket_draft() }).unwrap();
        assert_eq!(p.discount_percent(), 0);
    }
    #[test]
    fn test_bad_image_url_rejected() {
        let draft = ProductDraft { image_url: Some("not a url".into()), ..basket_draft() };
        assert_eq!(Product::create("p1", &artisan(), draft).unwrap_err(), ProductError::InvalidImageUrl);
        let draft = ProductDraft { image_url: Some("   ".into()), ..basket_draft() };
        assert_eq!(Product::create("p1", &artisan(), draft).unwrap().image_url, None);
    }
}
