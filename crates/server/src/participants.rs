//! Participant API endpoints

use api_types::participant::{
    ParticipantCreated, ParticipantNew, ParticipantUpdate, ParticipantView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, user};

pub(crate) fn participant_view(participant: &engine::Participant) -> ParticipantView {
    ParticipantView {
        id: participant.id,
        name: participant.name.clone(),
        email: participant.email.clone(),
        status: match participant.status {
            engine::ParticipantStatus::Pending => api_types::ParticipantStatus::Pending,
            engine::ParticipantStatus::Active => api_types::ParticipantStatus::Active,
        },
        color: participant.color.clone(),
        avatar: participant.avatar.clone(),
        user_id: participant.user_id.clone(),
    }
}

/// Adds a participant to a group; unknown emails get a pending invite whose
/// token is returned for delivery.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ParticipantNew>,
) -> Result<Json<ParticipantCreated>, ServerError> {
    let (participant, invite_token) = state
        .engine
        .add_participant(
            &payload.group_id,
            &user.username,
            engine::NewParticipant {
                name: payload.name,
                email: payload.email,
                color: payload.color,
                avatar: payload.avatar,
            },
        )
        .await?;

    Ok(Json(ParticipantCreated {
        participant: participant_view(&participant),
        invite_token,
    }))
}

/// Updates a participant's display fields (owner only).
pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ParticipantUpdate>,
) -> Result<Json<ParticipantView>, ServerError> {
    let participant = state
        .engine
        .update_participant(
            &id,
            &user.username,
            &payload.name,
            payload.color,
            payload.avatar,
        )
        .await?;
    Ok(Json(participant_view(&participant)))
}

/// Removes a participant; refused while they have an unsettled balance.
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_participant(&id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
