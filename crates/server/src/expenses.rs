//! Expense API endpoints

use api_types::expense::{
    ExpenseListQuery, ExpenseNew, ExpenseUpdate, ExpenseView, ExpensesResponse, ShareInput,
    SplitView,
};
use api_types::SplitMode as ApiSplitMode;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

fn map_split_mode(mode: ApiSplitMode) -> engine::SplitMode {
    match mode {
        ApiSplitMode::Equal => engine::SplitMode::Equal,
        ApiSplitMode::Custom => engine::SplitMode::Custom,
        ApiSplitMode::Percentage => engine::SplitMode::Percentage,
    }
}

fn map_shares(shares: Option<Vec<ShareInput>>) -> Vec<engine::ShareValue> {
    shares
        .unwrap_or_default()
        .into_iter()
        .map(|share| engine::ShareValue {
            participant_id: share.participant_id,
            value: share.value,
        })
        .collect()
}

pub(crate) fn expense_view(expense: &engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id.clone(),
        description: expense.description.clone(),
        category: expense.category.clone(),
        amount: expense.amount.to_major(),
        date: expense.date,
        payer_id: expense.payer_id,
        split_mode: match expense.split_mode {
            engine::SplitMode::Equal => ApiSplitMode::Equal,
            engine::SplitMode::Custom => ApiSplitMode::Custom,
            engine::SplitMode::Percentage => ApiSplitMode::Percentage,
        },
        splits: expense
            .splits
            .iter()
            .map(|s| SplitView {
                participant_id: s.participant_id,
                amount: s.amount.to_major(),
            })
            .collect(),
    }
}

/// Records an expense in a group.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .add_expense(
            &payload.group_id,
            &user.username,
            engine::NewExpense {
                description: payload.description,
                category: payload.category,
                amount: payload.amount,
                date: payload.date.with_timezone(&Utc),
                payer_id: payload.payer_id,
                split_mode: map_split_mode(payload.split_mode),
                shares: map_shares(payload.splits),
            },
        )
        .await?;

    Ok(Json(expense_view(&expense)))
}

/// Lists a group's expenses, newest first, honoring the query filters.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(
            &query.group_id,
            &user.username,
            engine::ExpenseListFilter {
                description: query.q,
                participant_id: query.participant_id,
                min_amount: query.min,
                max_amount: query.max,
                start: query.start.map(|dt| dt.with_timezone(&Utc)),
                end: query.end.map(|dt| dt.with_timezone(&Utc)),
            },
        )
        .await?;

    Ok(Json(ExpensesResponse {
        expenses: expenses.iter().map(expense_view).collect(),
    }))
}

/// Replaces an expense's fields and splits.
pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            &id,
            &user.username,
            engine::NewExpense {
                description: payload.description,
                category: payload.category,
                amount: payload.amount,
                date: payload.date.with_timezone(&Utc),
                payer_id: payload.payer_id,
                split_mode: map_split_mode(payload.split_mode),
                shares: map_shares(payload.splits),
            },
        )
        .await?;

    Ok(Json(expense_view(&expense)))
}

/// Deletes an expense.
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
