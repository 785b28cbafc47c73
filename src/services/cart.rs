use crate::domain::aggregates::{Actor, Cart, Role};
use crate::error::Result;
use super::{require_role, Storefront};

impl Storefront {
    pub async fn cart(&self, actor: &Actor) -> Result<Cart> {
        require_role(actor, &[Role::Customer])?;
        self.repos.carts.load(&actor.id).await
    }

    /// Adds one unit of a catalog product, snapshotting its current price.
    pub async fn add_to_cart(&self, actor: &Actor, product_id: &str) -> Result<Cart> {
        require_role(actor, &[Role::Customer])?;
        let product = self.product(product_id).await?;
        let mut cart = self.repos.carts.load(&actor.id).await?;
        let read_version = cart.version();
        cart.add_product(&product)?;
        self.repos.carts.save(&cart, read_version).await?;
        Ok(cart)
    }

    /// Zero or less removes the line. Absent lines are left alone.
    pub async fn update_cart_quantity(&self, actor: &Actor, product_id: &str, quantity: i64) -> Result<Cart> {
        require_role(actor, &[Role::Customer])?;
        let mut cart = self.repos.carts.load(&actor.id).await?;
        let read_version = cart.version();
        cart.update_quantity(product_id, quantity)?;
        self.repos.carts.save(&cart, read_version).await?;
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, actor: &Actor, product_id: &str) -> Result<Cart> {
        require_role(actor, &[Role::Customer])?;
        let mut cart = self.repos.carts.load(&actor.id).await?;
        let read_version = cart.version();
        if cart.remove_item(product_id)? {
            self.repos.carts.save(&cart, read_version).await?;
        }
        Ok(cart)
    }

    pub async fn clear_cart(&self, actor: &Actor) -> Result<Cart> {
        require_role(actor, &[Role::Customer])?;
        let mut cart = self.repos.carts.load(&actor.id).await?;
        let read_version = cart.version();
        cart.clear();
        self.repos.carts.save(&cart, read_version).await?;
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::basket_draft;
    use crate::domain::aggregates::ProductDraft;
    use crate::domain::value_objects::Money;
    use crate::error::StorefrontError;
    use crate::services::testing::{actor, storefront};

    #[tokio::test]
    async fn test_cart_persists_between_calls() {
        let store = storefront();
        let product = store.create_product(&actor("a1", Role::Artisan), basket_draft()).await.unwrap();
        let priya = actor("c1", Role::Customer);
        for _ in 0..3 { store.add_to_cart(&priya, &product.id).await.unwrap(); }
        let cart = store.cart(&priya).await.unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), Money::from_major(1500));
        store.update_cart_quantity(&priya, &product.id, 7).await.unwrap();
        assert_eq!(store.cart(&priya).await.unwrap().items()[0].quantity, 7);
    }
    #[tokio::test]
    async fn test_zero_quantity_equals_remove() {
        let store = storefront();
        let product = store.create_product(&actor("a1", Role::Artisan), basket_draft()).await.unwrap();
        let priya = actor("c1", Role::Customer);
        store.add_to_cart(&priya, &product.id).await.unwrap();
        let zeroed = store.update_cart_quantity(&priya, &product.id, 0).await.unwrap();
        store.add_to_cart(&priya, &product.id).await.unwrap();
        let removed = store.remove_from_cart(&priya, &product.id).await.unwrap();
        assert_eq!(zeroed.items(), removed.items());
        assert!(store.cart(&priya).await.unwrap().is_empty());
    }
    #[tokio::test]
    async fn test_price_is_snapshotted_at_add_time() {
        let store = storefront();
        let ramesh = actor("a1", Role::Artisan);
        let product = store.create_product(&ramesh, basket_draft()).await.unwrap();
        let priya = actor("c1", Role::Customer);
        store.add_to_cart(&priya, &product.id).await.unwrap();
        store.update_product(&ramesh, &product.id, ProductDraft { price: Money::from_major(100), ..basket_draft() }).await.unwrap();
        assert_eq!(store.cart(&priya).await.unwrap().items()[0].price, Money::from_major(500));
    }
    #[tokio::test]
    async fn test_huge_quantity_is_a_validation_error() {
        let store = storefront();
        let ramesh = actor("a1", Role::Artisan);
        let cap = Money::from_major(crate::domain::aggregates::product::MAX_PRICE);
        let pricey = store.create_product(&ramesh, ProductDraft { price: cap, mrp: cap, ..basket_draft() }).await.unwrap();
        let priya = actor("c1", Role::Customer);
        store.add_to_cart(&priya, &pricey.id).await.unwrap();
        let err = store.update_cart_quantity(&priya, &pricey.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        let at_limit = store.update_cart_quantity(&priya, &pricey.id, i64::from(u32::MAX)).await.unwrap();
        assert_eq!(at_limit.items()[0].quantity, u32::MAX);
        assert!(matches!(store.add_to_cart(&priya, &pricey.id).await, Err(StorefrontError::Validation(_))));
        let too_pricey = ProductDraft { price: Money::from_major(20_000_000), mrp: Money::from_major(20_000_000), ..basket_draft() };
        assert!(matches!(store.create_product(&ramesh, too_pricey).await, Err(StorefrontError::Validation(_))));
    }
    #[tokio::test]
    async fn test_unknown_product_and_wrong_role() {
        let store = storefront();
        let priya = actor("c1", Role::Customer);
        assert!(matches!(store.add_to_cart(&priya, "ghost").await, Err(StorefrontError::NotFound(_))));
        assert!(matches!(store.cart(&actor("k1", Role::Consultant)).await, Err(StorefrontError::Forbidden(_))));
        store.clear_cart(&priya).await.unwrap();
        assert!(store.cart(&priya).await.unwrap().is_empty());
    }
}
