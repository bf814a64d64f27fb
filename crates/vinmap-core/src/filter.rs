//! Catalog filter predicate (price range, stock).

use serde::{Deserialize, Serialize};

use crate::models::Wine;

/// Active filter values.
///
/// Price bounds only constrain wines that have a price; unpriced wines
/// always pass them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineFilter {
    #[serde(default)]
    pub price_min: Option<u32>,
    #[serde(default)]
    pub price_max: Option<u32>,
    #[serde(default)]
    pub in_stock_only: bool,
}

impl WineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_min(mut self, min: u32) -> Self {
        self.price_min = Some(min);
        self
    }

    pub fn price_max(mut self, max: u32) -> Self {
        self.price_max = Some(max);
        self
    }

    pub fn in_stock_only(mut self, only: bool) -> Self {
        self.in_stock_only = only;
        self
    }

    /// Overlay the values set in `other` onto this filter.
    pub fn merge(&mut self, other: &WineFilter) {
        if other.price_min.is_some() {
            self.price_min = other.price_min;
        }
        if other.price_max.is_some() {
            self.price_max = other.price_max;
        }
        if other.in_stock_only {
            self.in_stock_only = true;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, wine: &Wine) -> bool {
        if let (Some(min), Some(price)) = (self.price_min, wine.price) {
            if price < min {
                return false;
            }
        }
        if let (Some(max), Some(price)) = (self.price_max, wine.price) {
            if price > max {
                return false;
            }
        }
        !(self.in_stock_only && !wine.in_stock)
    }

    pub fn apply<'a>(&self, wines: &'a [Wine]) -> Vec<&'a Wine> {
        wines.iter().filter(|w| self.matches(w)).collect()
    }

    /// Number of filter values currently set.
    pub fn active_count(&self) -> usize {
        [
            self.price_min.is_some(),
            self.price_max.is_some(),
            self.in_stock_only,
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }
}
