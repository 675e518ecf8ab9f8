use sea_orm::{ConnectionTrait, prelude::*};

use crate::{EngineError, ResultEngine};

pub(crate) use super::Engine;

mod aggregation;
mod budgets;
mod friends;
mod posts;
mod transactions;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

impl Engine {
    /// Loads a user row or fails with `KeyNotFound`.
    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
    ) -> ResultEngine<crate::users::Model> {
        crate::users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User not found".to_string()))
    }
}

/// Fails with `Forbidden` unless `owner_id` is the caller.
pub(super) fn ensure_owner(owner_id: i32, user_id: i32, what: &str) -> ResultEngine<()> {
    if owner_id != user_id {
        return Err(EngineError::Forbidden(format!(
            "You can only change your own {what}."
        )));
    }
    Ok(())
}
