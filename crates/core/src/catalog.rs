//! Catalog

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::products::{ProductId, ProductSnapshot};

/// An indexed set of product snapshots, in the order the backend listed them.
///
/// A catalog is always replaced wholesale; there is no per-product update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductSnapshot>", into = "Vec<ProductSnapshot>")]
pub struct Catalog {
    products: Vec<ProductSnapshot>,
    index: FxHashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from snapshots. A repeated id replaces the earlier snapshot in place.
    pub fn new(snapshots: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        let mut catalog = Self::default();

        for snapshot in snapshots {
            match catalog.index.get(&snapshot.id).copied() {
                Some(position) => {
                    if let Some(existing) = catalog.products.get_mut(position) {
                        *existing = snapshot;
                    }
                }
                None => {
                    catalog
                        .index
                        .insert(snapshot.id.clone(), catalog.products.len());
                    catalog.products.push(snapshot);
                }
            }
        }

        catalog
    }

    /// Look up a product by id.
    pub fn find(&self, id: &str) -> Option<&ProductSnapshot> {
        self.index
            .get(id)
            .and_then(|position| self.products.get(*position))
    }

    /// Products matching `predicate`, in catalog order.
    pub fn filter<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a ProductSnapshot> + 'a
    where
        P: Fn(&ProductSnapshot) -> bool + 'a,
    {
        self.products.iter().filter(move |product| predicate(product))
    }

    /// Products in the given category (case-insensitive).
    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a ProductSnapshot> + 'a {
        self.filter(move |product| product.category.eq_ignore_ascii_case(category))
    }

    /// Products whose name, brand or category contains `text` (case-insensitive).
    pub fn search(&self, text: &str) -> Vec<&ProductSnapshot> {
        let needle = text.trim().to_lowercase();

        if needle.is_empty() {
            return self.products.iter().collect();
        }

        self.products
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.category.to_lowercase().contains(&needle)
                    || product
                        .brand
                        .as_deref()
                        .is_some_and(|brand| brand.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Products with a running promotion.
    pub fn promotions(&self) -> impl Iterator<Item = &ProductSnapshot> {
        self.filter(ProductSnapshot::is_on_promotion)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }

        categories
    }

    /// All products in catalog order.
    pub fn products(&self) -> &[ProductSnapshot] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl From<Vec<ProductSnapshot>> for Catalog {
    fn from(products: Vec<ProductSnapshot>) -> Self {
        Self::new(products)
    }
}

impl From<Catalog> for Vec<ProductSnapshot> {
    fn from(catalog: Catalog) -> Self {
        catalog.products
    }
}
