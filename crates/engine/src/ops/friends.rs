use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::{
    EngineError, Friend, FriendshipStatus, PendingRequest, ResultEngine, UserMatch, friendships,
    users,
    util::{LIKE_ESCAPE, escape_like, is_unique_violation, normalize_optional_text, ordered_pair},
};

use super::Engine;

const SEARCH_LIMIT: u64 = 10;

/// Matches the friendship row of an unordered user pair.
fn pair_condition(a: i32, b: i32) -> Condition {
    let (low, high) = ordered_pair(a, b);
    Condition::all()
        .add(friendships::Column::PairLow.eq(low))
        .add(friendships::Column::PairHigh.eq(high))
}

fn involves(user_id: i32) -> Condition {
    Condition::any()
        .add(friendships::Column::UserId.eq(user_id))
        .add(friendships::Column::FriendId.eq(user_id))
}

impl Engine {
    /// Sends a friend request from `sender_id` to `recipient_id`.
    ///
    /// There is no look-before-insert: the unique index on the ordered pair
    /// rejects a second row in either direction, pending or accepted.
    pub async fn send_friend_request(
        &self,
        sender_id: i32,
        recipient_id: i32,
    ) -> ResultEngine<()> {
        if sender_id == recipient_id {
            return Err(EngineError::InvalidInput(
                "You can't friend yourself!".to_string(),
            ));
        }
        self.require_user(&self.database, recipient_id).await?;

        let (pair_low, pair_high) = ordered_pair(sender_id, recipient_id);
        let model = friendships::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(sender_id),
            friend_id: ActiveValue::Set(recipient_id),
            pair_low: ActiveValue::Set(pair_low),
            pair_high: ActiveValue::Set(pair_high),
            status: ActiveValue::Set(FriendshipStatus::Pending.as_str().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };

        match model.insert(&self.database).await {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(EngineError::ExistingKey(
                "Friend request already exists or is pending.".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Accepts the pending request between the two users, whichever of them sent it.
    pub async fn accept_friend_request(
        &self,
        recipient_id: i32,
        sender_id: i32,
    ) -> ResultEngine<()> {
        let result = friendships::Entity::update_many()
            .col_expr(
                friendships::Column::Status,
                Expr::value(FriendshipStatus::Accepted.as_str()),
            )
            .filter(pair_condition(recipient_id, sender_id))
            .filter(friendships::Column::Status.eq(FriendshipStatus::Pending.as_str()))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::RelationshipNotFound(
                "Request not found.".to_string(),
            ));
        }
        Ok(())
    }

    /// Deletes the pending request between the two users.
    pub async fn reject_friend_request(
        &self,
        recipient_id: i32,
        sender_id: i32,
    ) -> ResultEngine<()> {
        self.delete_friendship(recipient_id, sender_id, FriendshipStatus::Pending, "Request not found.")
            .await
    }

    /// Ends an accepted friendship.
    pub async fn remove_friend(&self, user_id: i32, friend_id: i32) -> ResultEngine<()> {
        self.delete_friendship(user_id, friend_id, FriendshipStatus::Accepted, "Friend not found.")
            .await
    }

    async fn delete_friendship(
        &self,
        a: i32,
        b: i32,
        status: FriendshipStatus,
        not_found: &str,
    ) -> ResultEngine<()> {
        let result = friendships::Entity::delete_many()
            .filter(pair_condition(a, b))
            .filter(friendships::Column::Status.eq(status.as_str()))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::RelationshipNotFound(not_found.to_string()));
        }
        Ok(())
    }

    /// Users sharing an accepted friendship with `user_id`, by username.
    pub async fn list_friends(&self, user_id: i32) -> ResultEngine<Vec<Friend>> {
        let friend_ids = self.friend_ids(user_id).await?;
        if friend_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(friend_ids))
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|user| Friend {
                id: user.id,
                username: user.username,
                profile_picture: user.profile_picture,
            })
            .collect())
    }

    /// Ids on the other side of every accepted friendship of `user_id`.
    pub(super) async fn friend_ids(&self, user_id: i32) -> ResultEngine<Vec<i32>> {
        let rows = friendships::Entity::find()
            .filter(involves(user_id))
            .filter(friendships::Column::Status.eq(FriendshipStatus::Accepted.as_str()))
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                if row.user_id == user_id {
                    row.friend_id
                } else {
                    row.user_id
                }
            })
            .collect())
    }

    /// Requests waiting for `user_id` to answer, newest first.
    pub async fn list_pending_requests(&self, user_id: i32) -> ResultEngine<Vec<PendingRequest>> {
        let rows = friendships::Entity::find()
            .filter(friendships::Column::FriendId.eq(user_id))
            .filter(friendships::Column::Status.eq(FriendshipStatus::Pending.as_str()))
            .order_by_desc(friendships::Column::CreatedAt)
            .order_by_desc(friendships::Column::Id)
            .all(&self.database)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sender_ids: Vec<i32> = rows.iter().map(|row| row.user_id).collect();
        let usernames: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(sender_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let username = usernames.get(&row.user_id)?.clone();
                Some(PendingRequest {
                    id: row.id,
                    sender_id: row.user_id,
                    username,
                    created_at: row.created_at,
                })
            })
            .collect())
    }

    /// Case-insensitive username search, excluding the caller. Existing
    /// friends are part of the results.
    pub async fn search_users(&self, user_id: i32, query: Option<&str>) -> ResultEngine<Vec<UserMatch>> {
        let query = normalize_optional_text(query)
            .ok_or_else(|| EngineError::InvalidInput("Query is required".to_string()))?;
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let rows = users::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::Username)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
            .filter(users::Column::Id.ne(user_id))
            .order_by_asc(users::Column::Username)
            .limit(SEARCH_LIMIT)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|user| UserMatch {
                id: user.id,
                username: user.username,
            })
            .collect())
    }
}
