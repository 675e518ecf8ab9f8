use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, NewTransaction, ResultEngine, Transaction, TransactionChanges, transactions,
    util::{ensure_positive_amount, normalize_optional_text},
};

use super::{Engine, ensure_owner};

fn required_fields_missing() -> EngineError {
    EngineError::InvalidInput("Amount and category are required.".to_string())
}

impl Engine {
    /// Records a spending entry for `user_id`.
    pub async fn create_transaction(
        &self,
        user_id: i32,
        cmd: NewTransaction,
    ) -> ResultEngine<Transaction> {
        let amount_minor = cmd.amount_minor.ok_or_else(required_fields_missing)?;
        let category = normalize_optional_text(cmd.category.as_deref())
            .ok_or_else(required_fields_missing)?;
        ensure_positive_amount(amount_minor)?;

        let model = transactions::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            amount_minor: ActiveValue::Set(amount_minor),
            category: ActiveValue::Set(category),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            created_at: ActiveValue::Set(cmd.created_at.unwrap_or_else(Utc::now)),
        };
        let model = model.insert(&self.database).await?;
        Ok(Transaction::from(model))
    }

    /// The caller's transactions, newest first.
    pub async fn list_transactions(&self, user_id: i32) -> ResultEngine<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    pub async fn update_transaction(
        &self,
        user_id: i32,
        transaction_id: i32,
        changes: TransactionChanges,
    ) -> ResultEngine<Transaction> {
        if changes.is_empty() {
            return Err(EngineError::InvalidInput(
                "Nothing to update.".to_string(),
            ));
        }
        let model = self.require_owned_transaction(user_id, transaction_id).await?;
        let mut model: transactions::ActiveModel = model.into();

        if let Some(amount_minor) = changes.amount_minor {
            ensure_positive_amount(amount_minor)?;
            model.amount_minor = ActiveValue::Set(amount_minor);
        }
        if let Some(category) = changes.category {
            let category = normalize_optional_text(Some(&category))
                .ok_or_else(required_fields_missing)?;
            model.category = ActiveValue::Set(category);
        }
        if let Some(description) = changes.description {
            model.description = ActiveValue::Set(normalize_optional_text(Some(&description)));
        }
        if let Some(created_at) = changes.created_at {
            model.created_at = ActiveValue::Set(created_at);
        }

        let model = model.update(&self.database).await?;
        Ok(Transaction::from(model))
    }

    pub async fn delete_transaction(&self, user_id: i32, transaction_id: i32) -> ResultEngine<()> {
        let model = self.require_owned_transaction(user_id, transaction_id).await?;
        transactions::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn require_owned_transaction(
        &self,
        user_id: i32,
        transaction_id: i32,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Transaction not found".to_string()))?;
        ensure_owner(model.user_id, user_id, "transactions")?;
        Ok(model)
    }
}
