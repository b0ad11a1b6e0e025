//! Invite links.
//!
//! Inviting an email address that has no account yet creates a pending
//! participant plus an invite row carrying an opaque token. Accepting the
//! token (or registering an account with the invited email) links the
//! participant to the account and activates it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InviteStatus {
    Pending,
    Accepted,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

impl TryFrom<&str> for InviteStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            other => Err(EngineError::InvalidId(format!(
                "invalid invite status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invite {
    pub id: Uuid,
    pub group_id: String,
    pub participant_id: Uuid,
    pub email: String,
    pub status: InviteStatus,
    pub token: String,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(
        group_id: String,
        participant_id: Uuid,
        email: String,
        invited_by: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            participant_id,
            email: email.trim().to_lowercase(),
            status: InviteStatus::Pending,
            token: new_token(),
            invited_by: invited_by.to_string(),
            created_at,
        }
    }
}

/// Opaque invite token: 48 hex characters, unguessable enough for a link
/// that already requires a logged-in account with the matching email.
fn new_token() -> String {
    let mut token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    token.truncate(48);
    token
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub participant_id: String,
    pub email: String,
    pub status: String,
    #[sea_orm(unique)]
    pub token: String,
    pub invited_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Groups,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id"
    )]
    Participants,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invite> for ActiveModel {
    fn from(invite: &Invite) -> Self {
        Self {
            id: ActiveValue::Set(invite.id.to_string()),
            group_id: ActiveValue::Set(invite.group_id.clone()),
            participant_id: ActiveValue::Set(invite.participant_id.to_string()),
            email: ActiveValue::Set(invite.email.clone()),
            status: ActiveValue::Set(invite.status.as_str().to_string()),
            token: ActiveValue::Set(invite.token.clone()),
            invited_by: ActiveValue::Set(invite.invited_by.clone()),
            created_at: ActiveValue::Set(invite.created_at),
        }
    }
}

impl TryFrom<Model> for Invite {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "invite")?,
            group_id: model.group_id,
            participant_id: parse_uuid(&model.participant_id, "participant")?,
            email: model.email,
            status: InviteStatus::try_from(model.status.as_str())?,
            token: model.token,
            invited_by: model.invited_by,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_48_hex_chars_and_unique() {
        let a = new_token();
        let b = new_token();
        assert_eq!(a.len(), 48);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
