use chrono::Utc;
use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User, budgets, friendships, password, posts, transactions, users,
    util::{is_unique_violation, normalize_optional_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a new user.
    ///
    /// Username and email are unique; the storage layer decides, and both
    /// collisions are reported as "User already exists".
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ResultEngine<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidInput(
                "Please fill all fields".to_string(),
            ));
        }

        let password_hash = password::hash_password(password).await?;
        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(username.to_string()),
            email: ActiveValue::Set(email.to_string()),
            password_hash: ActiveValue::Set(password_hash),
            profile_picture: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match model.insert(&self.database).await {
            Ok(model) => Ok(User::from(model)),
            Err(err) if is_unique_violation(&err) => {
                Err(EngineError::ExistingKey("User already exists".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Checks an email/password pair. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<User> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.database)
            .await?
        else {
            return Err(EngineError::InvalidCredentials);
        };

        if !password::verify_password(password, &model.password_hash).await? {
            return Err(EngineError::InvalidCredentials);
        }

        Ok(User::from(model))
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        self.require_user(&self.database, user_id)
            .await
            .map(User::from)
    }

    /// Deletes a user and everything they own, in one DB transaction.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            async {
                self.require_user(&db_tx, user_id).await?;

                posts::Entity::delete_many()
                    .filter(posts::Column::UserId.eq(user_id))
                    .exec(&db_tx)
                    .await?;
                transactions::Entity::delete_many()
                    .filter(transactions::Column::UserId.eq(user_id))
                    .exec(&db_tx)
                    .await?;
                budgets::Entity::delete_many()
                    .filter(budgets::Column::UserId.eq(user_id))
                    .exec(&db_tx)
                    .await?;
                friendships::Entity::delete_many()
                    .filter(
                        Condition::any()
                            .add(friendships::Column::UserId.eq(user_id))
                            .add(friendships::Column::FriendId.eq(user_id)),
                    )
                    .exec(&db_tx)
                    .await?;
                users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

                Ok::<(), EngineError>(())
            }
            .await
        })
    }

    /// Stores the path of an already uploaded picture. `None` or a blank
    /// path resets it.
    pub async fn set_profile_picture(
        &self,
        user_id: i32,
        profile_picture: Option<&str>,
    ) -> ResultEngine<User> {
        let model = self.require_user(&self.database, user_id).await?;
        let mut model: users::ActiveModel = model.into();
        model.profile_picture = ActiveValue::Set(normalize_optional_text(profile_picture));
        let model = model.update(&self.database).await?;
        Ok(User::from(model))
    }
}
