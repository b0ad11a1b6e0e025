//! Invite API endpoints

use api_types::invite::{InviteAccept, InviteAccepted};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

/// Accepts an invite token for the logged-in account.
pub async fn accept(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<InviteAccept>,
) -> Result<Json<InviteAccepted>, ServerError> {
    let group_id = state
        .engine
        .accept_invite(&payload.token, &user.username)
        .await?;
    Ok(Json(InviteAccepted { group_id }))
}
