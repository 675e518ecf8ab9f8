//! Social feed posts.
//!
//! A post is a shared spending event, independent from the private
//! transaction ledger: every field besides the author is optional.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A post together with its author's public profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub profile_picture: Option<String>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn from_model(model: Model, author: &super::users::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: author.username.clone(),
            profile_picture: author.profile_picture.clone(),
            amount_minor: model.amount_minor,
            category: model.category,
            description: model.description,
            image_url: model.image_url,
            location_name: model.location_name,
            location_address: model.location_address,
            latitude: model.latitude,
            longitude: model.longitude,
            place_id: model.place_id,
            created_at: model.created_at,
        }
    }
}
