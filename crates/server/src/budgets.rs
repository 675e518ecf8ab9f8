use api_types::{
    MessageResponse,
    budget::{BudgetPeriod, BudgetSummaryRow, BudgetUpsert, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{Budget, User};

use crate::{ServerError, server::ServerState};

fn map_period(period: engine::BudgetPeriod) -> BudgetPeriod {
    match period {
        engine::BudgetPeriod::Weekly => BudgetPeriod::Weekly,
        engine::BudgetPeriod::Monthly => BudgetPeriod::Monthly,
        engine::BudgetPeriod::Yearly => BudgetPeriod::Yearly,
    }
}

fn engine_period(period: BudgetPeriod) -> engine::BudgetPeriod {
    match period {
        BudgetPeriod::Weekly => engine::BudgetPeriod::Weekly,
        BudgetPeriod::Monthly => engine::BudgetPeriod::Monthly,
        BudgetPeriod::Yearly => engine::BudgetPeriod::Yearly,
    }
}

fn view(budget: Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category,
        amount_minor: budget.limit_minor,
        period: map_period(budget.period),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.list_budgets(user.id).await?;

    Ok(Json(budgets.into_iter().map(view).collect()))
}

/// Creates the budget, or replaces the limit of an existing one with the same
/// category and period.
pub async fn upsert(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<BudgetUpsert>, ServerError>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state
        .engine
        .upsert_budget(
            user.id,
            payload.category.as_deref(),
            payload.amount_minor,
            payload.period.map(engine_period),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_budget(user.id, id).await?;

    Ok(Json(MessageResponse::new("Budget deleted")))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetSummaryRow>>, ServerError> {
    let rows = state.engine.budget_summary(user.id, Utc::now()).await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| BudgetSummaryRow {
                category: row.category,
                period: map_period(row.period),
                budget_amount_minor: row.budget_amount_minor,
                total_spent_minor: row.total_spent_minor,
                remaining_amount_minor: row.remaining_amount_minor,
            })
            .collect(),
    ))
}
