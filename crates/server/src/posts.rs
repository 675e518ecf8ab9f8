//! Social feed endpoints, including the live event stream.

use std::convert::Infallible;

use api_types::{
    MessageResponse,
    post::{PostNew, PostUpdate, PostView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::extract::WithRejection;
use engine::{NewPost, Post, PostChanges, User};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::{ServerError, server::ServerState};

fn view(post: Post) -> PostView {
    PostView {
        id: post.id,
        user_id: post.user_id,
        username: post.username,
        profile_picture: post.profile_picture,
        amount_minor: post.amount_minor,
        category: post.category,
        description: post.description,
        image_url: post.image_url,
        location_name: post.location_name,
        location_address: post.location_address,
        latitude: post.latitude,
        longitude: post.longitude,
        place_id: post.place_id,
        created_at: post.created_at.fixed_offset(),
    }
}

pub async fn list(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PostView>>, ServerError> {
    let posts = state.engine.list_posts().await?;

    Ok(Json(posts.into_iter().map(view).collect()))
}

/// Stores the post and pushes it to every open feed stream.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PostNew>, ServerError>,
) -> Result<(StatusCode, Json<PostView>), ServerError> {
    let cmd = NewPost {
        amount_minor: payload.amount_minor,
        category: payload.category,
        description: payload.description,
        image_url: payload.image_url,
        location_name: payload.location_name,
        location_address: payload.location_address,
        latitude: payload.latitude,
        longitude: payload.longitude,
        place_id: payload.place_id,
    };
    let post = view(state.engine.create_post(user.id, cmd).await?);

    let delivered = state.feed.publish(post.clone());
    tracing::debug!(post_id = post.id, delivered, "post published");

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PostUpdate>, ServerError>,
) -> Result<Json<PostView>, ServerError> {
    let changes = PostChanges {
        amount_minor: payload.amount_minor,
        category: payload.category,
        description: payload.description,
        image_url: payload.image_url,
        location_name: payload.location_name,
        location_address: payload.location_address,
        latitude: payload.latitude,
        longitude: payload.longitude,
        place_id: payload.place_id,
    };
    let post = state.engine.update_post(user.id, id, changes).await?;

    Ok(Json(view(post)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_post(user.id, id).await?;

    Ok(Json(MessageResponse::new("Post deleted")))
}

/// Server-sent events: one `data:` frame with the JSON post per new post.
pub async fn stream(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = user.id, "feed subscriber connected");

    let events = BroadcastStream::new(state.feed.subscribe()).filter_map(|item| match item {
        Ok(post) => match Event::default().json_data(&post) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::error!("failed to encode feed event: {err}");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("feed subscriber lagged, {skipped} posts skipped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
