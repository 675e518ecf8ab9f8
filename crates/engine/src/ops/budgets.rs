use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*, sea_query::OnConflict};

use crate::{
    Budget, BudgetPeriod, EngineError, ResultEngine, budgets,
    util::{ensure_positive_amount, normalize_optional_text},
};

use super::{Engine, ensure_owner};

impl Engine {
    /// Creates or replaces the limit of `(category, period)` for `user_id`.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE` keeps one row per key even
    /// under concurrent writers. The period defaults to monthly.
    pub async fn upsert_budget(
        &self,
        user_id: i32,
        category: Option<&str>,
        amount_minor: Option<i64>,
        period: Option<BudgetPeriod>,
    ) -> ResultEngine<Budget> {
        let (Some(category), Some(amount_minor)) = (normalize_optional_text(category), amount_minor)
        else {
            return Err(EngineError::InvalidInput(
                "Category and amount are required.".to_string(),
            ));
        };
        ensure_positive_amount(amount_minor)?;
        let period = period.unwrap_or_default();

        let model = budgets::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            category: ActiveValue::Set(category.clone()),
            limit_minor: ActiveValue::Set(amount_minor),
            period: ActiveValue::Set(period.as_str().to_string()),
        };
        budgets::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    budgets::Column::UserId,
                    budgets::Column::Category,
                    budgets::Column::Period,
                ])
                .update_column(budgets::Column::LimitMinor)
                .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;

        let stored = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .filter(budgets::Column::Period.eq(period.as_str()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Budget not found".to_string()))?;
        Budget::try_from(stored)
    }

    pub async fn list_budgets(&self, user_id: i32) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Category)
            .order_by_asc(budgets::Column::Period)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    pub async fn delete_budget(&self, user_id: i32, budget_id: i32) -> ResultEngine<()> {
        let model = budgets::Entity::find_by_id(budget_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Budget not found".to_string()))?;
        ensure_owner(model.user_id, user_id, "budgets")?;

        budgets::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
