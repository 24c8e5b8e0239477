//! In-process product store.

use crate::error::{CoreError, Result};
use crate::product::Product;
use crate::store::{OrderBatch, ProductQuery, ProductStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Keeps every category in memory. Commits are applied to a copy and swapped
/// in, so a failed batch leaves the category untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: RwLock<HashMap<String, Vec<Product>>>,
    fail_commits: AtomicBool,
    commits: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of products, grouped by their category.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.insert(product);
        }
        store
    }

    /// Add or replace a product.
    pub fn insert(&self, product: Product) {
        let mut categories = self
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let products = categories.entry(product.category_id.clone()).or_default();
        products.retain(|p| p.id != product.id);
        products.push(product);
    }

    /// Make every following commit fail with a storage error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of non-empty batches committed so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Snapshot of a category in insertion order.
    #[must_use]
    pub fn snapshot(&self, category_id: &str) -> Vec<Product> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(category_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl ProductStore for MemoryStore {
    fn find(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        Ok(query.select(self.snapshot(&query.category_id)))
    }

    fn commit(&self, batch: &OrderBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut categories = self
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut staged = categories
            .get(&batch.category_id)
            .cloned()
            .unwrap_or_default();
        batch.apply_to(&mut staged)?;

        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(CoreError::storage("injected commit failure"));
        }

        categories.insert(batch.category_id.clone(), staged);
        self.commits.fetch_add(1, Ordering::SeqCst);

        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Position;
    use crate::store::BatchKind;

    #[test]
    fn test_failed_commit_leaves_category_untouched() {
        let store = MemoryStore::with_products([
            Product::new("a", "g", "A").with_order(1),
            Product::new("b", "g", "B").with_order(1),
        ]);
        store.fail_commits(true);

        let mut batch = OrderBatch::new("g", BatchKind::Dedupe);
        batch.set("b", Position::At(2));

        assert!(matches!(store.commit(&batch), Err(CoreError::Storage(_))));
        assert!(store.snapshot("g").iter().all(|p| p.order == Position::At(1)));
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_categories_are_isolated() {
        let store = MemoryStore::with_products([
            Product::new("a", "chairs", "A").with_order(1),
            Product::new("a", "tables", "A"),
        ]);

        let mut batch = OrderBatch::new("tables", BatchKind::Organize);
        batch.set("a", Position::At(1));
        store.commit(&batch).unwrap();

        assert_eq!(store.snapshot("tables")[0].order, Position::At(1));
        assert_eq!(store.snapshot("chairs")[0].order, Position::At(1));
        assert_eq!(store.find(&ProductQuery::all("sofas")).unwrap().len(), 0);
    }
}
