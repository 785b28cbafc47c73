//! Catalog filtering over a product snapshot.

use crate::domain::aggregates::Product;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Products matching `category` exactly and `query` case-insensitively against name or description.
pub fn search<'a>(products: &'a [Product], category: Option<&str>, query: Option<&str>) -> Vec<&'a Product> {
    let category = category.map(str::trim).filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
    let needle = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
    products
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| {
            needle.as_deref().map_or(true, |q| {
                p.name.to_lowercase().contains(q) || p.description.to_lowercase().contains(q)
            })
        })
        .collect()
}

/// `"all"` followed by each distinct category in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for p in products {
        if !out.iter().any(|c| *c == p.category) {
            out.push(p.category.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::{artisan, basket_draft};
    use crate::domain::aggregates::ProductDraft;
    use crate::domain::value_objects::Money;

    fn catalog() -> Vec<Product> {
        vec![
            Product::create("p1", &artisan(), basket_draft()).unwrap(),
            Product::create("p2", &artisan(), ProductDraft {
                name: "Terracotta Horse".into(), category: "pottery".into(),
                description: "Bankura clay figure".into(), price: Money::from_major(900), mrp: Money::from_major(900), ..basket_draft()
            }).unwrap(),
            Product::create("p3", &artisan(), ProductDraft {
                name: "Dokra Necklace".into(), category: "jewelry".into(),
                description: "Brass work with natural FIBERS cord".into(), ..basket_draft()
            }).unwrap(),
        ]
    }

    fn ids(found: Vec<&Product>) -> Vec<&str> { found.into_iter().map(|p| p.id.as_str()).collect() }

    #[test]
    fn test_no_filters_returns_everything() {
        let products = catalog();
        assert_eq!(search(&products, None, None).len(), 3);
        assert_eq!(search(&products, Some("all"), Some("  ")).len(), 3);
    }
    #[test]
    fn test_category_filter() {
        let products = catalog();
        assert_eq!(ids(search(&products, Some("pottery"), None)), vec!["p2"]);
        assert!(search(&products, Some("Pottery"), None).is_empty());
    }
    #[test]
    fn test_text_search_is_case_insensitive_over_name_and_description() {
        let products = catalog();
        assert_eq!(ids(search(&products, None, Some("fibers"))), vec!["p1", "p3"]);
        assert_eq!(ids(search(&products, Some("jewelry"), Some("DOKRA"))), vec!["p3"]);
    }
    #[test]
    fn test_categories_in_first_seen_order() {
        let mut products = catalog();
        products.push(Product::create("p4", &artisan(), basket_draft()).unwrap());
        assert_eq!(categories(&products), vec!["all", "handicrafts", "pottery", "jewelry"]);
    }
}
