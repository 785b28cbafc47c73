use crate::domain::aggregates::{Actor, Product, ProductDraft, Role};
use crate::domain::catalog;
use crate::error::{Result, StorefrontError};
use super::{new_id, require_role, Storefront};

impl Storefront {
    pub async fn search_products(&self, category: Option<&str>, query: Option<&str>) -> Result<Vec<Product>> {
        let products = self.repos.products.list().await?;
        Ok(catalog::search(&products, category, query).into_iter().cloned().collect())
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(catalog::categories(&self.repos.products.list().await?))
    }

    pub async fn product(&self, id: &str) -> Result<Product> {
        self.repos.products.find(id).await?.ok_or_else(|| StorefrontError::not_found(format!("product {id}")))
    }

    pub async fn artisan_products(&self, actor: &Actor) -> Result<Vec<Product>> {
        require_role(actor, &[Role::Artisan])?;
        let products = self.repos.products.list().await?;
        Ok(products.into_iter().filter(|p| p.is_owned_by(&actor.id)).collect())
    }

    pub async fn create_product(&self, actor: &Actor, draft: ProductDraft) -> Result<Product> {
        require_role(actor, &[Role::Artisan])?;
        let mut product = Product::create(new_id(), actor, draft)?;
        self.repos.products.insert(&product).await?;
        tracing::info!(product_id = %product.id, artisan_id = %actor.id, "product listed");
        self.events.publish(product.take_events()).await;
        Ok(product)
    }

    pub async fn update_product(&self, actor: &Actor, id: &str, draft: ProductDraft) -> Result<Product> {
        let mut product = self.product(id).await?;
        if !product.is_owned_by(&actor.id) {
            return Err(StorefrontError::forbidden("only the listing artisan can edit this product"));
        }
        product.apply(draft)?;
        self.repos.products.update(&product).await?;
        self.events.publish(product.take_events()).await;
        Ok(product)
    }

    /// Removes a listing. Carts and orders keep their snapshots.
    pub async fn delete_product(&self, actor: &Actor, id: &str) -> Result<()> {
        let mut product = self.product(id).await?;
        if !(product.is_owned_by(&actor.id) || actor.role == Role::Admin) {
            return Err(StorefrontError::forbidden("only the listing artisan or an admin can remove this product"));
        }
        if !self.repos.products.delete(id).await? {
            return Err(StorefrontError::not_found(format!("product {id}")));
        }
        tracing::info!(product_id = %id, by = %actor.id, "product removed");
        product.mark_deleted();
        self.events.publish(product.take_events()).await;
        Ok(())
    }
}
