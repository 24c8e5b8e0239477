//! Read-plan-commit wiring for the three ordering operations.

use crate::error::{CoreError, Result};
use crate::lock::GroupLocks;
use crate::ordering::{
    plan_clear, plan_dedupe, plan_organize, plan_reposition, DedupeReport, OrderTarget,
    OrganizeReport, RepositionReport,
};
use crate::product::Product;
use crate::store::{ProductQuery, ProductStore};
use tracing::{debug, info};

/// Runs ordering operations against a store.
///
/// With locking enabled (the default) the read and the commit of one
/// operation happen under that category's lock. Without it, two operations on
/// the same category can read the same state and both commit, leaving
/// duplicates for `fix_duplicates` to repair.
#[derive(Debug)]
pub struct OrderingService<S> {
    store: S,
    locks: Option<GroupLocks>,
}

impl<S: ProductStore> OrderingService<S> {
    /// Create a service that serializes writes per category.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Some(GroupLocks::new()),
        }
    }

    /// Create a service that does not serialize writes.
    #[must_use]
    pub const fn unserialized(store: S) -> Self {
        Self { store, locks: None }
    }

    /// Create a service, choosing whether writes are serialized.
    #[must_use]
    pub fn with_serialization(store: S, serialize_group_writes: bool) -> Self {
        if serialize_group_writes {
            Self::new(store)
        } else {
            Self::unserialized(store)
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Products of a category in display order.
    ///
    /// # Errors
    /// Returns a validation error for a blank id, or a storage error.
    pub fn products(&self, category_id: &str) -> Result<Vec<Product>> {
        validate_id("groupId", category_id)?;
        self.store.find(&ProductQuery::all(category_id))
    }

    /// Append every unset product after the highest assigned position.
    ///
    /// # Errors
    /// Returns a validation error for a blank id, or the store's error if
    /// the read or the commit fails.
    pub fn auto_organize(&self, category_id: &str) -> Result<OrganizeReport> {
        validate_id("groupId", category_id)?;

        self.serialized(category_id, || {
            let sorted = self.store.find(&ProductQuery::all(category_id))?;
            let (batch, report) = plan_organize(category_id, &sorted)?;

            if batch.is_empty() {
                debug!(category = %category_id, "No unordered products to organize");
                return Ok(report);
            }

            self.store.commit(&batch)?;

            info!(
                category = %category_id,
                organized = report.organized,
                start = ?report.start_order,
                end = ?report.end_order,
                "Organized products"
            );
            Ok(report)
        })
    }

    /// Resequence the whole category to 1..N.
    ///
    /// # Errors
    /// Returns a validation error for a blank id, or the store's error if
    /// the read or the commit fails.
    pub fn fix_duplicates(&self, category_id: &str) -> Result<DedupeReport> {
        validate_id("groupId", category_id)?;

        self.serialized(category_id, || {
            let sorted = self.store.find(&ProductQuery::all(category_id))?;
            let (batch, report) = plan_dedupe(category_id, &sorted);

            self.store.commit(&batch)?;

            info!(
                category = %category_id,
                updated = report.updated,
                total = report.total_items,
                "Fixed duplicate positions"
            );
            Ok(report)
        })
    }

    /// Move a product to a slot, or clear its position.
    ///
    /// # Errors
    /// Returns a validation error for blank ids, `ItemNotFound` if the
    /// product is not in the category, or the store's error if the commit
    /// fails.
    pub fn reorder(
        &self,
        product_id: &str,
        category_id: &str,
        target: OrderTarget,
    ) -> Result<RepositionReport> {
        validate_id("itemId", product_id)?;
        validate_id("groupId", category_id)?;

        self.serialized(category_id, || {
            let batch = match target {
                OrderTarget::Clear => plan_clear(category_id, product_id),
                OrderTarget::Position(position) => {
                    let ordered = self.store.find(&ProductQuery::ordered(category_id))?;
                    plan_reposition(category_id, product_id, position, &ordered)
                }
            };

            let updated = self.store.commit(&batch)?;

            info!(
                category = %category_id,
                product = %product_id,
                target = %target,
                updated,
                "Reordered product"
            );
            Ok(RepositionReport { updated })
        })
    }

    fn serialized<T>(&self, category_id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        match &self.locks {
            Some(locks) => locks.with_lock(category_id, f),
            None => f(),
        }
    }
}

/// Check a request id before any read happens.
///
/// Only presence is checked. Which characters an id may hold is up to the
/// store.
///
/// # Errors
/// Returns `CoreError::Validation` if the id is empty or whitespace.
pub fn validate_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}
