//! Product model and display-order sort key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Display position of a product within its category.
///
/// Serialized as a nullable integer. Variant order matters: the derived
/// `Ord` puts every `At` before `Unset`, which is "order ascending, nulls last".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum Position {
    /// Explicit 1-based position.
    At(i64),
    /// No position assigned yet.
    #[default]
    Unset,
}

impl Position {
    /// Returns the numeric position, if one is assigned.
    #[must_use]
    pub const fn value(self) -> Option<i64> {
        match self {
            Self::At(n) => Some(n),
            Self::Unset => None,
        }
    }

    #[must_use]
    pub const fn is_set(self) -> bool {
        matches!(self, Self::At(_))
    }
}

impl From<Option<i64>> for Position {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Unset, Self::At)
    }
}

impl From<Position> for Option<i64> {
    fn from(position: Position) -> Self {
        position.value()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(n) => write!(f, "{n}"),
            Self::Unset => write!(f, "-"),
        }
    }
}

/// Where unset positions sort relative to assigned ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullsPlacement {
    First,
    #[default]
    Last,
}

/// A catalog product subject to ordering within its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Identifier, unique within the category (e.g., "oak-dining-table").
    pub id: String,

    /// Category that scopes the ordering.
    pub category_id: String,

    /// Human-readable name.
    pub name: String,

    /// Display position within the category.
    #[serde(default)]
    pub order: Position,

    /// Creation timestamp (ISO 8601 UTC). Tie-break for the sort key.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp (ISO 8601 UTC).
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product with no position assigned.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            category_id: category_id.into(),
            name: name.into(),
            order: Position::Unset,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set an explicit position.
    #[must_use]
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Position::At(order);
        self
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.order.is_set()
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Compare two products by (order, created_at, id).
#[must_use]
pub fn compare_products(a: &Product, b: &Product, nulls: NullsPlacement) -> Ordering {
    let by_order = match (nulls, a.order, b.order) {
        (NullsPlacement::First, Position::Unset, Position::At(_)) => Ordering::Less,
        (NullsPlacement::First, Position::At(_), Position::Unset) => Ordering::Greater,
        _ => a.order.cmp(&b.order),
    };

    by_order
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort products into display order.
pub fn sort_products(products: &mut [Product], nulls: NullsPlacement) {
    products.sort_by(|a, b| compare_products(a, b, nulls));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_new_product_is_unordered() {
        let product = Product::new("oak-table", "tables", "Oak Table");

        assert_eq!(product.order, Position::Unset);
        assert!(!product.is_ordered());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_position_orders_unset_last() {
        assert!(Position::At(100) < Position::Unset);
        assert!(Position::At(-1) < Position::At(0));
        assert_eq!(Position::default(), Position::Unset);
    }

    #[test]
    fn test_position_serializes_as_nullable_int() {
        let product = Product::new("a", "c", "A").with_order(3);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["order"], serde_json::json!(3));

        let product = Product::new("b", "c", "B");
        let json = serde_json::to_value(&product).unwrap();
        assert!(json["order"].is_null());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back.order, Position::Unset);
    }

    #[test]
    fn test_missing_order_deserializes_as_unset() {
        let json = serde_json::json!({
            "id": "a",
            "category_id": "c",
            "name": "A",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.order, Position::Unset);
    }

    #[test]
    fn test_sort_nulls_last_then_created() {
        let mut products = vec![
            Product::new("c", "g", "C").with_created_at(at(0)),
            Product::new("b", "g", "B").with_order(2).with_created_at(at(2)),
            Product::new("a", "g", "A").with_order(2).with_created_at(at(1)),
            Product::new("d", "g", "D").with_order(5).with_created_at(at(3)),
        ];

        sort_products(&mut products, NullsPlacement::Last);
        assert_eq!(ids(&products), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_sort_nulls_first() {
        let mut products = vec![
            Product::new("a", "g", "A").with_order(1).with_created_at(at(0)),
            Product::new("y", "g", "Y").with_created_at(at(5)),
            Product::new("x", "g", "X").with_created_at(at(4)),
        ];

        sort_products(&mut products, NullsPlacement::First);
        assert_eq!(ids(&products), vec!["x", "y", "a"]);
    }

    #[test]
    fn test_sort_breaks_full_ties_by_id() {
        let mut products = vec![
            Product::new("b", "g", "B").with_order(1).with_created_at(at(0)),
            Product::new("a", "g", "A").with_order(1).with_created_at(at(0)),
        ];

        sort_products(&mut products, NullsPlacement::Last);
        assert_eq!(ids(&products), vec!["a", "b"]);
    }
}
