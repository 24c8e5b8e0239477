//! Storage seam for the ordering subsystem.
//!
//! A store answers one kind of read (products of a category, sorted) and
//! one kind of write (an `OrderBatch`, applied all-or-nothing).

use crate::error::Result;
use crate::product::{NullsPlacement, Position, Product};
use serde::{Deserialize, Serialize};

/// Products of one category, sorted by (order, created_at, id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: String,
    /// Only return products with an assigned position.
    pub ordered_only: bool,
    pub nulls: NullsPlacement,
}

impl ProductQuery {
    /// Every product in the category, unset positions last.
    #[must_use]
    pub fn all(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            ordered_only: false,
            nulls: NullsPlacement::Last,
        }
    }

    /// Only products with an assigned position.
    #[must_use]
    pub fn ordered(category_id: impl Into<String>) -> Self {
        Self {
            ordered_only: true,
            ..Self::all(category_id)
        }
    }

    /// Apply the query's filter and sort to a category's products.
    #[must_use]
    pub fn select(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut selected: Vec<Product> = products
            .into_iter()
            .filter(|p| !self.ordered_only || p.is_ordered())
            .collect();
        crate::product::sort_products(&mut selected, self.nulls);
        selected
    }
}

/// What produced a batch. Recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Organize,
    Dedupe,
    Reposition,
    Clear,
}

/// Set one product's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub product_id: String,
    pub order: Position,
}

impl OrderUpdate {
    #[must_use]
    pub fn new(product_id: impl Into<String>, order: Position) -> Self {
        Self {
            product_id: product_id.into(),
            order,
        }
    }
}

/// A unit of work: every update applies, or none do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBatch {
    pub category_id: String,
    pub kind: BatchKind,
    pub updates: Vec<OrderUpdate>,
}

impl OrderBatch {
    #[must_use]
    pub fn new(category_id: impl Into<String>, kind: BatchKind) -> Self {
        Self {
            category_id: category_id.into(),
            kind,
            updates: Vec::new(),
        }
    }

    /// Schedule a position change.
    pub fn set(&mut self, product_id: impl Into<String>, order: Position) {
        self.updates.push(OrderUpdate::new(product_id, order));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Apply the batch to an in-memory copy of the category.
    ///
    /// Either every update lands in `products` or the slice is left untouched.
    ///
    /// # Errors
    /// Returns `CoreError::ItemNotFound` if an update names a product that is
    /// not in `products`.
    pub fn apply_to(&self, products: &mut [Product]) -> Result<()> {
        let mut indices = Vec::with_capacity(self.updates.len());
        for update in &self.updates {
            let index = products
                .iter()
                .position(|p| p.id == update.product_id)
                .ok_or_else(|| crate::CoreError::ItemNotFound {
                    category_id: self.category_id.clone(),
                    product_id: update.product_id.clone(),
                })?;
            indices.push(index);
        }

        for (update, index) in self.updates.iter().zip(indices) {
            let product = &mut products[index];
            product.order = update.order;
            product.touch();
        }

        Ok(())
    }
}

/// Persistence for products and their positions.
pub trait ProductStore: Send + Sync {
    /// Fetch the products of a category, filtered and sorted per the query.
    ///
    /// # Errors
    /// Returns `CoreError::Storage` if the backend cannot be read.
    fn find(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    /// Apply a batch atomically and return the number of products written.
    ///
    /// An empty batch writes nothing and returns 0.
    ///
    /// # Errors
    /// Returns `CoreError::ItemNotFound` if any update names an unknown
    /// product, or `CoreError::Storage` if the write fails. In both cases no
    /// update from the batch is visible afterwards.
    fn commit(&self, batch: &OrderBatch) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut products = vec![
            Product::new("a", "g", "A").with_order(1),
            Product::new("b", "g", "B").with_order(2),
        ];

        let mut batch = OrderBatch::new("g", BatchKind::Dedupe);
        batch.set("a", Position::At(2));
        batch.set("missing", Position::At(1));

        let result = batch.apply_to(&mut products);
        assert!(matches!(result, Err(CoreError::ItemNotFound { .. })));
        assert_eq!(products[0].order, Position::At(1));
    }

    #[test]
    fn test_query_filters_unordered() {
        let products = vec![
            Product::new("a", "g", "A"),
            Product::new("b", "g", "B").with_order(2),
            Product::new("c", "g", "C").with_order(1),
        ];

        let selected = ProductQuery::ordered("g").select(products);
        let ids: Vec<_> = selected.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
