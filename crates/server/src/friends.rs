use api_types::{
    MessageResponse,
    friends::{
        FriendRemove, FriendRequestAnswer, FriendRequestNew, FriendView, PendingRequestView,
        UserSearch, UserSearchResult,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use engine::User;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<FriendView>>, ServerError> {
    let friends = state.engine.list_friends(user.id).await?;

    Ok(Json(
        friends
            .into_iter()
            .map(|friend| FriendView {
                id: friend.id,
                username: friend.username,
                profile_picture: friend.profile_picture,
            })
            .collect(),
    ))
}

pub async fn pending(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingRequestView>>, ServerError> {
    let requests = state.engine.list_pending_requests(user.id).await?;

    Ok(Json(
        requests
            .into_iter()
            .map(|request| PendingRequestView {
                id: request.id,
                sender_id: request.sender_id,
                username: request.username,
            })
            .collect(),
    ))
}

pub async fn request(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<FriendRequestNew>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .send_friend_request(user.id, payload.recipient_id)
        .await?;

    Ok(Json(MessageResponse::new("Friend request sent!")))
}

pub async fn accept(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<FriendRequestAnswer>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .accept_friend_request(user.id, payload.sender_id)
        .await?;

    Ok(Json(MessageResponse::new("Friend request accepted!")))
}

pub async fn reject(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<FriendRequestAnswer>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .reject_friend_request(user.id, payload.sender_id)
        .await?;

    Ok(Json(MessageResponse::new("Friend request declined.")))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<FriendRemove>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.remove_friend(user.id, payload.friend_id).await?;

    Ok(Json(MessageResponse::new("Friend removed successfully.")))
}

pub async fn search(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(params), _): WithRejection<Query<UserSearch>, ServerError>,
) -> Result<Json<Vec<UserSearchResult>>, ServerError> {
    let users = state
        .engine
        .search_users(user.id, params.query.as_deref())
        .await?;

    Ok(Json(
        users
            .into_iter()
            .map(|user| UserSearchResult {
                id: user.id,
                username: user.username,
            })
            .collect(),
    ))
}
