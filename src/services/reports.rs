use chrono::Utc;
use crate::domain::aggregates::{Actor, ExhibitionStatus, OrderKind, OrderStatus, Role};
use crate::domain::reporting::{
    self, AdminDashboard, ArtisanDashboard, ConsultantDashboard, CustomerDashboard, Dashboard, Period, SalesBucket,
};
use crate::error::Result;
use super::Storefront;

impl Storefront {
    /// Sales over the caller's visible orders for the trailing `period` window.
    pub async fn sales_report(&self, actor: &Actor, period: Period) -> Result<Vec<SalesBucket>> {
        let orders = self.visible_orders(actor).await?;
        Ok(reporting::aggregate(&orders, period, Utc::now())?)
    }

    pub async fn dashboard(&self, actor: &Actor) -> Result<Dashboard> {
        let orders = self.visible_orders(actor).await?;
        Ok(match actor.role {
            Role::Artisan => {
                let products = self.repos.products.list().await?;
                Dashboard::Artisan(ArtisanDashboard {
                    total_revenue: reporting::revenue(&orders)?,
                    total_products: products.iter().filter(|p| p.is_owned_by(&actor.id)).count(),
                    total_orders: orders.len(),
                    pending_orders: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
                })
            }
            Role::Consultant => {
                let exhibitions = self.repos.exhibitions.list().await?;
                let mine: Vec<_> = exhibitions.iter().filter(|e| e.consultant_id == actor.id).collect();
                Dashboard::Consultant(ConsultantDashboard {
                    total_exhibitions: mine.len(),
                    active_exhibitions: mine.iter().filter(|e| e.status == ExhibitionStatus::Ongoing).count(),
                    bulk_orders: orders.iter().filter(|o| o.kind == OrderKind::Bulk).count(),
                    total_value: reporting::revenue(&orders)?,
                })
            }
            Role::Admin => {
                let users = self.repos.users.list().await?;
                Dashboard::Admin(AdminDashboard {
                    total_users: users.len(),
                    blocked_users: users.iter().filter(|u| u.is_blocked).count(),
                    total_products: self.repos.products.list().await?.len(),
                    total_orders: orders.len(),
                    total_exhibitions: self.repos.exhibitions.list().await?.len(),
                    platform_revenue: reporting::revenue(&orders)?,
                })
            }
            Role::Customer => Dashboard::Customer(CustomerDashboard {
                total_orders: orders.len(),
                total_spent: reporting::revenue(&orders)?,
                cart_items: self.repos.carts.load(&actor.id).await?.item_count(),
            }),
        })
    }
}
