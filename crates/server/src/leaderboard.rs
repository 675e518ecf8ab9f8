//! Monthly savings rankings.

use api_types::leaderboard::LeaderboardEntry;
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::{LeaderboardScope, User};

use crate::{ServerError, server::ServerState};

async fn board(
    state: &ServerState,
    scope: LeaderboardScope,
    user: &User,
) -> Result<Json<Vec<LeaderboardEntry>>, ServerError> {
    let entries = state.engine.leaderboard(scope, user.id, Utc::now()).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| LeaderboardEntry {
                id: entry.id,
                username: entry.username,
                profile_picture: entry.profile_picture,
                total_budget_minor: entry.total_budget_minor,
                total_spending_minor: entry.total_spending_minor,
                savings_percentage: entry.savings_percentage,
            })
            .collect(),
    ))
}

pub async fn global(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ServerError> {
    board(&state, LeaderboardScope::Global, &user).await
}

pub async fn friends(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ServerError> {
    board(&state, LeaderboardScope::Friends, &user).await
}
