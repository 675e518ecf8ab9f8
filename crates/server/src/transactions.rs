//! Transactions API endpoints

use api_types::{
    MessageResponse,
    transaction::{TransactionNew, TransactionUpdate, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{NewTransaction, Transaction, TransactionChanges, User};

use crate::{ServerError, server::ServerState};

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        amount_minor: tx.amount_minor,
        category: tx.category,
        description: tx.description,
        created_at: tx.created_at.fixed_offset(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state.engine.list_transactions(user.id).await?;

    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionNew>, ServerError>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let cmd = NewTransaction {
        amount_minor: payload.amount_minor,
        category: payload.category,
        description: payload.description,
        created_at: payload.created_at.map(|dt| dt.with_timezone(&Utc)),
    };
    let tx = state.engine.create_transaction(user.id, cmd).await?;

    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionUpdate>, ServerError>,
) -> Result<Json<TransactionView>, ServerError> {
    let changes = TransactionChanges {
        amount_minor: payload.amount_minor,
        category: payload.category,
        description: payload.description,
        created_at: payload.created_at.map(|dt| dt.with_timezone(&Utc)),
    };
    let tx = state.engine.update_transaction(user.id, id, changes).await?;

    Ok(Json(view(tx)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_transaction(user.id, id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}
