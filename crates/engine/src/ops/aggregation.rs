use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};

use crate::{
    BudgetPeriod, BudgetSummary, LeaderboardEntry, LeaderboardScope, ResultEngine,
    aggregation::rank,
    budgets, transactions, users,
    util::month_bounds,
};

use super::Engine;

impl Engine {
    /// Budget rows of `user_id` with what was spent in their category during
    /// the calendar month containing `now`. Spend without a budget is left out.
    pub async fn budget_summary(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<BudgetSummary>> {
        let budget_rows = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Category)
            .order_by_asc(budgets::Column::Period)
            .all(&self.database)
            .await?;
        if budget_rows.is_empty() {
            return Ok(Vec::new());
        }

        let (start, end) = month_bounds(now);
        let spent: HashMap<String, i64> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Category)
            .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CreatedAt.gte(start))
            .filter(transactions::Column::CreatedAt.lt(end))
            .group_by(transactions::Column::Category)
            .into_tuple::<(String, Option<i64>)>()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(category, total)| (category, total.unwrap_or(0)))
            .collect();

        budget_rows
            .into_iter()
            .map(|row| {
                let period = BudgetPeriod::try_from(row.period.as_str())?;
                let total = spent.get(&row.category).copied().unwrap_or(0);
                Ok(BudgetSummary::new(row.category, period, row.limit_minor, total))
            })
            .collect()
    }

    /// Savings ranking for the month containing `now`.
    ///
    /// Only monthly budgets count towards a user's total budget. The friends
    /// board lists the requester's accepted friends, not the requester.
    pub async fn leaderboard(
        &self,
        scope: LeaderboardScope,
        requester_id: i32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<LeaderboardEntry>> {
        let candidates = match scope {
            LeaderboardScope::Global => users::Entity::find().all(&self.database).await?,
            LeaderboardScope::Friends => {
                let ids = self.friend_ids(requester_id).await?;
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                users::Entity::find()
                    .filter(users::Column::Id.is_in(ids))
                    .all(&self.database)
                    .await?
            }
        };
        let ids: Vec<i32> = candidates.iter().map(|user| user.id).collect();

        let budget_totals: HashMap<i32, i64> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::UserId)
            .column_as(Expr::col(budgets::Column::LimitMinor).sum(), "total")
            .filter(budgets::Column::UserId.is_in(ids.clone()))
            .filter(budgets::Column::Period.eq(BudgetPeriod::Monthly.as_str()))
            .group_by(budgets::Column::UserId)
            .into_tuple::<(i32, Option<i64>)>()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0)))
            .collect();

        let (start, end) = month_bounds(now);
        let spending_totals: HashMap<i32, i64> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::UserId)
            .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
            .filter(transactions::Column::UserId.is_in(ids))
            .filter(transactions::Column::CreatedAt.gte(start))
            .filter(transactions::Column::CreatedAt.lt(end))
            .group_by(transactions::Column::UserId)
            .into_tuple::<(i32, Option<i64>)>()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(id, total)| (id, total.unwrap_or(0)))
            .collect();

        let mut entries: Vec<LeaderboardEntry> = candidates
            .into_iter()
            .map(|user| {
                LeaderboardEntry::new(
                    user.id,
                    user.username,
                    user.profile_picture,
                    budget_totals.get(&user.id).copied().unwrap_or(0),
                    spending_totals.get(&user.id).copied().unwrap_or(0),
                )
            })
            .collect();
        rank(&mut entries);
        Ok(entries)
    }
}
