//! Monthly spend-vs-budget views.
//!
//! Nothing here is stored: both views are recomputed from `budgets` and
//! `transactions` on every call. The database queries live in
//! `ops::aggregation`; this module holds the result types and the arithmetic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::BudgetPeriod;

/// Budget row of the current month summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub category: String,
    pub period: BudgetPeriod,
    pub budget_amount_minor: i64,
    pub total_spent_minor: i64,
    pub remaining_amount_minor: i64,
}

impl BudgetSummary {
    pub(crate) fn new(
        category: String,
        period: BudgetPeriod,
        budget_amount_minor: i64,
        total_spent_minor: i64,
    ) -> Self {
        Self {
            category,
            period,
            budget_amount_minor,
            total_spent_minor,
            remaining_amount_minor: budget_amount_minor - total_spent_minor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    /// Every registered user.
    Global,
    /// The requester's accepted friends.
    Friends,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i32,
    pub username: String,
    pub profile_picture: Option<String>,
    pub total_budget_minor: i64,
    pub total_spending_minor: i64,
    /// `None` when the user has no monthly budget.
    pub savings_percentage: Option<f64>,
}

impl LeaderboardEntry {
    pub(crate) fn new(
        id: i32,
        username: String,
        profile_picture: Option<String>,
        total_budget_minor: i64,
        total_spending_minor: i64,
    ) -> Self {
        Self {
            id,
            username,
            profile_picture,
            total_budget_minor,
            total_spending_minor,
            savings_percentage: savings_ratio(total_budget_minor, total_spending_minor),
        }
    }
}

/// Share of the budget left unspent; undefined without a positive budget.
pub(crate) fn savings_ratio(total_budget_minor: i64, total_spending_minor: i64) -> Option<f64> {
    if total_budget_minor <= 0 {
        return None;
    }
    Some((total_budget_minor - total_spending_minor) as f64 / total_budget_minor as f64)
}

/// Best savers first, users without a budget last, ties by username.
pub(crate) fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        let by_savings = match (a.savings_percentage, b.savings_percentage) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_savings.then_with(|| a.username.cmp(&b.username))
    });
}
