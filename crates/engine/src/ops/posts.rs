use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{
    EngineError, NewPost, Post, PostChanges, ResultEngine, posts, users,
    util::normalize_optional_text,
};

use super::{Engine, ensure_owner};

fn text(value: Option<String>) -> Option<String> {
    normalize_optional_text(value.as_deref())
}

impl Engine {
    /// Shares a post on the global feed.
    pub async fn create_post(&self, user_id: i32, cmd: NewPost) -> ResultEngine<Post> {
        let author = self.require_user(&self.database, user_id).await?;

        let model = posts::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            amount_minor: ActiveValue::Set(cmd.amount_minor),
            category: ActiveValue::Set(text(cmd.category)),
            description: ActiveValue::Set(text(cmd.description)),
            image_url: ActiveValue::Set(text(cmd.image_url)),
            location_name: ActiveValue::Set(text(cmd.location_name)),
            location_address: ActiveValue::Set(text(cmd.location_address)),
            latitude: ActiveValue::Set(cmd.latitude),
            longitude: ActiveValue::Set(cmd.longitude),
            place_id: ActiveValue::Set(text(cmd.place_id)),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let model = model.insert(&self.database).await?;
        Ok(Post::from_model(model, &author))
    }

    /// The global feed, newest first.
    pub async fn list_posts(&self) -> ResultEngine<Vec<Post>> {
        let rows = posts::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(post, author)| author.map(|author| Post::from_model(post, &author)))
            .collect())
    }

    pub async fn update_post(
        &self,
        user_id: i32,
        post_id: i32,
        changes: PostChanges,
    ) -> ResultEngine<Post> {
        let (model, author) = self.require_own_post(user_id, post_id).await?;
        let mut model: posts::ActiveModel = model.into();

        if let Some(amount_minor) = changes.amount_minor {
            model.amount_minor = ActiveValue::Set(amount_minor);
        }
        if changes.category.is_some() {
            model.category = ActiveValue::Set(text(changes.category));
        }
        if changes.description.is_some() {
            model.description = ActiveValue::Set(text(changes.description));
        }
        if changes.image_url.is_some() {
            model.image_url = ActiveValue::Set(text(changes.image_url));
        }
        if changes.location_name.is_some() {
            model.location_name = ActiveValue::Set(text(changes.location_name));
        }
        if changes.location_address.is_some() {
            model.location_address = ActiveValue::Set(text(changes.location_address));
        }
        if let Some(latitude) = changes.latitude {
            model.latitude = ActiveValue::Set(latitude);
        }
        if let Some(longitude) = changes.longitude {
            model.longitude = ActiveValue::Set(longitude);
        }
        if changes.place_id.is_some() {
            model.place_id = ActiveValue::Set(text(changes.place_id));
        }

        let model = model.update(&self.database).await?;
        Ok(Post::from_model(model, &author))
    }

    pub async fn delete_post(&self, user_id: i32, post_id: i32) -> ResultEngine<()> {
        let (model, _) = self.require_own_post(user_id, post_id).await?;
        posts::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn require_own_post(
        &self,
        user_id: i32,
        post_id: i32,
    ) -> ResultEngine<(posts::Model, users::Model)> {
        let (model, author) = posts::Entity::find_by_id(post_id)
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Post not found".to_string()))?;
        ensure_owner(model.user_id, user_id, "posts")?;
        let author =
            author.ok_or_else(|| EngineError::KeyNotFound("User not found".to_string()))?;
        Ok((model, author))
    }
}
