//! Friend requests and accepted friendships.
//!
//! A row is created by the requester (`user_id`) for the recipient
//! (`friend_id`) in the `pending` state and flips to `accepted` once answered.
//! `pair_low`/`pair_high` hold the ordered user pair; the unique index on them
//! keeps a single row per unordered pair whatever the direction.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "friendships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub friend_id: i32,
    pub pair_low: i32,
    pub pair_high: i32,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

/// A user on the other side of an accepted friendship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i32,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// A request waiting for the current user's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Friendship row id.
    pub id: i32,
    pub sender_id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A username search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMatch {
    pub id: i32,
    pub username: String,
}
