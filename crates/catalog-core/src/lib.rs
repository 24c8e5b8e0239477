//! catalog-core: Product model and display-order reconciliation.
//!
//! This crate provides:
//! - `Product` and `Position`: a product's nullable place within its category
//! - Ordering planners: auto-organize, fix-duplicates and reorder
//! - `ProductStore`: the read/atomic-commit seam backends implement
//! - `OrderingService`: read-plan-commit wiring with per-category locking
//! - `OrderEvent`: audit trail entries for committed batches

pub mod error;
pub mod event;
pub mod lock;
pub mod memory;
pub mod ordering;
pub mod product;
pub mod service;
pub mod store;

pub use error::{CoreError, Result};
pub use event::{EventPayload, EventType, OrderEvent, PositionChange};
pub use lock::GroupLocks;
pub use memory::MemoryStore;
pub use ordering::{
    plan_clear, plan_dedupe, plan_organize, plan_reposition, DedupeReport, OrderTarget,
    OrganizeReport, RepositionReport,
};
pub use product::{compare_products, sort_products, NullsPlacement, Position, Product};
pub use service::{validate_id, OrderingService};
pub use store::{BatchKind, OrderBatch, OrderUpdate, ProductQuery, ProductStore};
