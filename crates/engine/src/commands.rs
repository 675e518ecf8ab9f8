//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Required fields are still
//! `Option`s: the engine reports missing values with a single message instead
//! of failing at deserialization.

use chrono::{DateTime, Utc};

/// Create a transaction.
#[derive(Clone, Debug, Default)]
pub struct NewTransaction {
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Defaults to now.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(amount_minor: i64, category: impl Into<String>) -> Self {
        Self {
            amount_minor: Some(amount_minor),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partial update of a transaction. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct TransactionChanges {
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TransactionChanges {
    pub(crate) fn is_empty(&self) -> bool {
        self.amount_minor.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.created_at.is_none()
    }
}

/// Create a feed post. Every field is optional.
#[derive(Clone, Debug, Default)]
pub struct NewPost {
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
}

impl NewPost {
    #[must_use]
    pub fn amount(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a post. `None` leaves the field unchanged; a blank text
/// value or `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct PostChanges {
    pub amount_minor: Option<Option<i64>>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub place_id: Option<String>,
}
