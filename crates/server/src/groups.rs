//! Group API endpoints

use api_types::group::{
    GroupCreated, GroupDetailResponse, GroupNew, GroupRename, GroupView, GroupsResponse,
};
use api_types::summary::{BalanceView, SettlementView, SummaryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, expenses, participants, server::ServerState, user};

fn group_view(group: engine::Group, is_virtual: bool) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        owner_id: group.owner_id,
        created_at: group.created_at,
        is_virtual,
    }
}

fn summary_view(summary: &engine::GroupSummary) -> SummaryView {
    SummaryView {
        total_spent: summary.total_spent.to_major(),
        balances: summary
            .balances
            .iter()
            .map(|b| BalanceView {
                participant_id: b.participant_id,
                net: b.net.to_major(),
            })
            .collect(),
        settlements: summary
            .settlements
            .iter()
            .map(|s| SettlementView {
                from: s.from,
                to: s.to,
                amount: s.amount.to_major(),
            })
            .collect(),
    }
}

/// Handle requests for creating a new group.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<Json<GroupCreated>, ServerError> {
    let extras = payload
        .participants
        .unwrap_or_default()
        .into_iter()
        .map(|p| engine::NewParticipant {
            name: p.name,
            email: p.email,
            color: p.color,
            avatar: p.avatar,
        })
        .collect();

    let id = state
        .engine
        .new_group(&payload.name, &user.username, extras)
        .await?;

    Ok(Json(GroupCreated { id }))
}

/// Lists the user's groups, with the virtual "All Groups" scope appended.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let mut groups: Vec<GroupView> = state
        .engine
        .groups_for_user(&user.username)
        .await?
        .into_iter()
        .map(|group| group_view(group, false))
        .collect();

    groups.push(GroupView {
        id: engine::ALL_GROUPS_ID.to_string(),
        name: "All Groups".to_string(),
        owner_id: user.username,
        created_at: Utc::now(),
        is_virtual: true,
    });

    Ok(Json(GroupsResponse { groups }))
}

/// Full group read: roster, expense history, and the derived summary.
pub async fn detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<GroupDetailResponse>, ServerError> {
    let summary = state.engine.group_summary(&id, &user.username).await?;

    let is_virtual = id == engine::ALL_GROUPS_ID;
    Ok(Json(GroupDetailResponse {
        participants: summary
            .participants
            .iter()
            .map(participants::participant_view)
            .collect(),
        expenses: summary.expenses.iter().map(expenses::expense_view).collect(),
        summary: summary_view(&summary),
        group: group_view(summary.group, is_virtual),
    }))
}

/// Renames a group (owner only).
pub async fn rename(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<GroupRename>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .rename_group(&id, &payload.name, &user.username)
        .await?;
    Ok(Json(group_view(group, false)))
}

/// Deletes a group and everything in it (owner only).
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
