//! Display-order planners.
//!
//! Each planner takes a sorted snapshot of one category and returns the
//! `OrderBatch` that moves it to the desired state. Planners never touch the
//! store; `OrderingService` does the read and the commit.
//!
//! - organize: append unset products after the highest position, leave the rest alone
//! - dedupe: resequence the whole category to 1..N
//! - reposition: splice one product to a target slot, resequence the ordered run

use crate::error::{CoreError, Result};
use crate::product::{Position, Product};
use crate::store::{BatchKind, OrderBatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Requested destination for a reposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTarget {
    /// 1-based slot. Out-of-range values are clamped.
    Position(i64),
    /// Remove the product's position.
    Clear,
}

impl OrderTarget {
    /// Parse a `newOrder` request field.
    ///
    /// `None` means the field was absent, which is different from an explicit
    /// JSON `null` (clear).
    ///
    /// # Errors
    /// Returns `CoreError::Validation` unless the value is an integer or null.
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        match value {
            None => Err(CoreError::Validation("newOrder is required".to_string())),
            Some(Value::Null) => Ok(Self::Clear),
            Some(Value::Number(n)) => n.as_i64().map(Self::Position).ok_or_else(|| {
                CoreError::Validation(format!("newOrder must be an integer, got {n}"))
            }),
            Some(other) => Err(CoreError::Validation(format!(
                "newOrder must be an integer or null, got {other}"
            ))),
        }
    }
}

impl FromStr for OrderTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("clear") || s.eq_ignore_ascii_case("null") {
            return Ok(Self::Clear);
        }
        s.parse::<i64>().map(Self::Position).map_err(|_| {
            CoreError::Validation(format!("expected a position or 'clear', got '{s}'"))
        })
    }
}

impl fmt::Display for OrderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(n) => write!(f, "{n}"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// Outcome of an auto-organize run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeReport {
    pub organized: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_order: Option<i64>,
}

/// Outcome of a fix-duplicates run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeReport {
    pub updated: usize,
    pub total_items: usize,
}

/// Outcome of a reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositionReport {
    pub updated: usize,
}

/// Give every unset product a position after the current maximum.
///
/// `sorted` must be in (order asc nulls last, created_at asc) order. Products
/// that already have a position are never scheduled.
///
/// # Errors
/// Returns `CoreError::Validation` if the new positions would not fit in an
/// `i64`; `fix_duplicates` compacts the category back to 1..N.
pub fn plan_organize(
    category_id: &str,
    sorted: &[Product],
) -> Result<(OrderBatch, OrganizeReport)> {
    let mut batch = OrderBatch::new(category_id, BatchKind::Organize);

    let (ordered, unordered): (Vec<&Product>, Vec<&Product>) =
        sorted.iter().partition(|p| p.is_ordered());

    if unordered.is_empty() {
        return Ok((batch, OrganizeReport::default()));
    }

    let max_order = ordered
        .iter()
        .filter_map(|p| p.order.value())
        .max()
        .unwrap_or(0);

    let end_order = i64::try_from(unordered.len())
        .ok()
        .and_then(|count| max_order.checked_add(count))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "no room after position {max_order} for {} product(s); fix duplicates first",
                unordered.len()
            ))
        })?;
    let start_order = max_order + 1;

    for (product, order) in unordered.iter().zip(start_order..=end_order) {
        batch.set(product.id.as_str(), Position::At(order));
    }

    let report = OrganizeReport {
        organized: batch.len(),
        start_order: Some(start_order),
        end_order: Some(end_order),
    };

    Ok((batch, report))
}

/// Resequence a whole category to 1..N, keeping the sorted order.
///
/// Only products whose position differs from their slot are scheduled, so a
/// category that is already contiguous yields an empty batch.
#[must_use]
pub fn plan_dedupe(category_id: &str, sorted: &[Product]) -> (OrderBatch, DedupeReport) {
    let mut batch = OrderBatch::new(category_id, BatchKind::Dedupe);

    for (product, expected) in sorted.iter().zip(1_i64..) {
        if product.order != Position::At(expected) {
            batch.set(product.id.as_str(), Position::At(expected));
        }
    }

    let report = DedupeReport {
        updated: batch.len(),
        total_items: sorted.len(),
    };

    (batch, report)
}

/// Move `product_id` to the 1-based `position` among the ordered products.
///
/// `ordered` holds the category's positioned products sorted ascending; the
/// moved product may or may not be among them. The slot is clamped to
/// `[1, len + 1]` after removing the product. The moved product is always
/// written; the others only when their position changes.
#[must_use]
pub fn plan_reposition(
    category_id: &str,
    product_id: &str,
    position: i64,
    ordered: &[Product],
) -> OrderBatch {
    let mut batch = OrderBatch::new(category_id, BatchKind::Reposition);

    let mut slots: Vec<(&str, Position)> = ordered
        .iter()
        .filter(|p| p.id != product_id)
        .map(|p| (p.id.as_str(), p.order))
        .collect();

    let index = usize::try_from(position.saturating_sub(1))
        .unwrap_or(0)
        .min(slots.len());
    slots.insert(index, (product_id, Position::Unset));

    for ((id, current), order) in slots.into_iter().zip(1_i64..) {
        if id == product_id || current != Position::At(order) {
            batch.set(id, Position::At(order));
        }
    }

    batch
}

/// Clear one product's position without touching the others.
#[must_use]
pub fn plan_clear(category_id: &str, product_id: &str) -> OrderBatch {
    let mut batch = OrderBatch::new(category_id, BatchKind::Clear);
    batch.set(product_id, Position::Unset);
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{sort_products, NullsPlacement};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn product(id: &str, order: Option<i64>, created: i64) -> Product {
        let p = Product::new(id, "g", id.to_uppercase()).with_created_at(at(created));
        match order {
            Some(n) => p.with_order(n),
            None => p,
        }
    }

    fn sorted(mut products: Vec<Product>) -> Vec<Product> {
        sort_products(&mut products, NullsPlacement::Last);
        products
    }

    fn assignments(batch: &OrderBatch) -> Vec<(&str, Option<i64>)> {
        batch
            .updates
            .iter()
            .map(|u| (u.product_id.as_str(), u.order.value()))
            .collect()
    }

    #[test]
    fn test_order_target_from_json() {
        assert_eq!(
            OrderTarget::from_json(Some(&json!(3))).unwrap(),
            OrderTarget::Position(3)
        );
        assert_eq!(
            OrderTarget::from_json(Some(&Value::Null)).unwrap(),
            OrderTarget::Clear
        );
        assert!(OrderTarget::from_json(None).unwrap_err().is_validation());
        assert!(OrderTarget::from_json(Some(&json!("2"))).unwrap_err().is_validation());
        assert!(OrderTarget::from_json(Some(&json!(1.5))).unwrap_err().is_validation());
    }

    #[test]
    fn test_order_target_from_str() {
        assert_eq!("4".parse::<OrderTarget>().unwrap(), OrderTarget::Position(4));
        assert_eq!("clear".parse::<OrderTarget>().unwrap(), OrderTarget::Clear);
        assert_eq!("NULL".parse::<OrderTarget>().unwrap(), OrderTarget::Clear);
        assert!("first".parse::<OrderTarget>().is_err());
    }

    #[test]
    fn test_organize_appends_after_max() {
        let products = sorted(vec![
            product("a", Some(1), 0),
            product("b", Some(4), 1),
            product("late", None, 9),
            product("early", None, 2),
        ]);

        let (batch, report) = plan_organize("g", &products).unwrap();

        assert_eq!(assignments(&batch), vec![("early", Some(5)), ("late", Some(6))]);
        assert_eq!(
            report,
            OrganizeReport {
                organized: 2,
                start_order: Some(5),
                end_order: Some(6),
            }
        );
    }

    #[test]
    fn test_organize_empty_category_starts_at_one() {
        let products = sorted(vec![product("a", None, 0), product("b", None, 1)]);

        let (batch, report) = plan_organize("g", &products).unwrap();

        assert_eq!(assignments(&batch), vec![("a", Some(1)), ("b", Some(2))]);
        assert_eq!(report.start_order, Some(1));
        assert_eq!(report.end_order, Some(2));
    }

    #[test]
    fn test_organize_noop_when_all_ordered() {
        let products = sorted(vec![product("a", Some(2), 0), product("b", Some(2), 1)]);

        let (batch, report) = plan_organize("g", &products).unwrap();

        assert!(batch.is_empty());
        assert_eq!(report, OrganizeReport::default());
    }

    #[test]
    fn test_organize_rejects_positions_past_i64_max() {
        let products = sorted(vec![
            product("top", Some(i64::MAX), 0),
            product("new", None, 1),
        ]);

        let err = plan_organize("g", &products).unwrap_err();
        assert!(err.is_validation());

        let products = sorted(vec![
            product("near", Some(i64::MAX - 1), 0),
            product("fits", None, 1),
        ]);
        let (batch, report) = plan_organize("g", &products).unwrap();
        assert_eq!(assignments(&batch), vec![("fits", Some(i64::MAX))]);
        assert_eq!(report.end_order, Some(i64::MAX));
    }

    #[test]
    fn test_organize_leaves_duplicates_alone() {
        let products = sorted(vec![
            product("a", Some(3), 0),
            product("b", Some(3), 1),
            product("c", None, 2),
        ]);

        let (batch, _) = plan_organize("g", &products).unwrap();

        assert_eq!(assignments(&batch), vec![("c", Some(4))]);
    }

    #[test]
    fn test_dedupe_worked_example() {
        let products = sorted(vec![
            product("a", Some(2), 1),
            product("b", Some(2), 2),
            product("c", None, 0),
            product("d", Some(5), 3),
        ]);

        let (batch, report) = plan_dedupe("g", &products);

        assert_eq!(
            assignments(&batch),
            vec![("a", Some(1)), ("b", Some(2)), ("d", Some(3)), ("c", Some(4))]
        );
        assert_eq!(report, DedupeReport { updated: 4, total_items: 4 });
    }

    #[test]
    fn test_dedupe_skips_products_already_in_place() {
        let products = sorted(vec![
            product("a", Some(1), 0),
            product("b", Some(2), 1),
            product("c", Some(7), 2),
        ]);

        let (batch, report) = plan_dedupe("g", &products);

        assert_eq!(assignments(&batch), vec![("c", Some(3))]);
        assert_eq!(report.updated, 1);
        assert_eq!(report.total_items, 3);
    }

    #[test]
    fn test_dedupe_handles_zero_and_negative() {
        let products = sorted(vec![
            product("a", Some(0), 0),
            product("b", Some(-2), 1),
            product("c", Some(1), 2),
        ]);

        let (batch, _) = plan_dedupe("g", &products);

        assert_eq!(
            assignments(&batch),
            vec![("b", Some(1)), ("a", Some(2)), ("c", Some(3))]
        );
    }

    #[test]
    fn test_reposition_worked_example() {
        let ordered = sorted(vec![
            product("x", Some(1), 0),
            product("y", Some(2), 1),
            product("z", Some(3), 2),
        ]);

        let batch = plan_reposition("g", "z", 1, &ordered);

        assert_eq!(batch.kind, BatchKind::Reposition);
        assert_eq!(
            assignments(&batch),
            vec![("z", Some(1)), ("x", Some(2)), ("y", Some(3))]
        );
    }

    #[test]
    fn test_reposition_clamps_past_end() {
        let ordered = sorted(vec![product("x", Some(1), 0), product("y", Some(2), 1)]);

        let batch = plan_reposition("g", "x", 99, &ordered);

        assert_eq!(assignments(&batch), vec![("y", Some(1)), ("x", Some(2))]);
    }

    #[test]
    fn test_reposition_clamps_below_one() {
        let ordered = sorted(vec![product("x", Some(1), 0), product("y", Some(2), 1)]);

        let batch = plan_reposition("g", "y", -3, &ordered);

        assert_eq!(assignments(&batch), vec![("y", Some(1)), ("x", Some(2))]);
    }

    #[test]
    fn test_reposition_inserts_unordered_product() {
        let ordered = sorted(vec![
            product("x", Some(1), 0),
            product("y", Some(2), 1),
            product("z", Some(3), 2),
        ]);

        let batch = plan_reposition("g", "new", 2, &ordered);

        assert_eq!(
            assignments(&batch),
            vec![("new", Some(2)), ("y", Some(3)), ("z", Some(4))]
        );
    }

    #[test]
    fn test_reposition_in_place_writes_only_moved_product() {
        let ordered = sorted(vec![product("x", Some(1), 0), product("y", Some(2), 1)]);

        let batch = plan_reposition("g", "y", 2, &ordered);

        assert_eq!(assignments(&batch), vec![("y", Some(2))]);
    }

    #[test]
    fn test_reposition_repairs_gaps() {
        let ordered = sorted(vec![
            product("x", Some(2), 0),
            product("y", Some(5), 1),
            product("z", Some(9), 2),
        ]);

        let batch = plan_reposition("g", "z", 2, &ordered);

        assert_eq!(
            assignments(&batch),
            vec![("x", Some(1)), ("z", Some(2)), ("y", Some(3))]
        );
    }

    #[test]
    fn test_clear_touches_one_product() {
        let batch = plan_clear("g", "x");

        assert_eq!(batch.kind, BatchKind::Clear);
        assert_eq!(assignments(&batch), vec![("x", None)]);
    }
}
