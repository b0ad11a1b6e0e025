//! Group participants.
//!
//! A participant is a named party inside one group. The same person joining
//! two groups gets two participant rows, optionally linked to the same user
//! account. A participant stays `pending` until an account claims it (at
//! creation time when the email already belongs to a user, or later through
//! an invite).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Pending,
    Active,
}

impl ParticipantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl TryFrom<&str> for ParticipantStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            other => Err(EngineError::InvalidId(format!(
                "invalid participant status: {other}"
            ))),
        }
    }
}

pub const DEFAULT_COLOR: &str = "#4b5563";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
    pub group_id: String,
    pub name: String,
    pub email: String,
    pub status: ParticipantStatus,
    pub color: String,
    pub avatar: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a participant record. The email is normalized to lowercase;
    /// a linked `user_id` makes the participant active immediately.
    pub fn new(
        group_id: String,
        name: String,
        email: String,
        color: Option<String>,
        avatar: Option<String>,
        user_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let status = if user_id.is_some() {
            ParticipantStatus::Active
        } else {
            ParticipantStatus::Pending
        };
        Self {
            id: Uuid::new_v4(),
            group_id,
            name,
            email: email.trim().to_lowercase(),
            status,
            color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            avatar: avatar.unwrap_or_default(),
            user_id,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub color: String,
    pub avatar: String,
    pub user_id: Option<String>,
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
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Participant> for ActiveModel {
    fn from(participant: &Participant) -> Self {
        Self {
            id: ActiveValue::Set(participant.id.to_string()),
            group_id: ActiveValue::Set(participant.group_id.clone()),
            name: ActiveValue::Set(participant.name.clone()),
            email: ActiveValue::Set(participant.email.clone()),
            status: ActiveValue::Set(participant.status.as_str().to_string()),
            color: ActiveValue::Set(participant.color.clone()),
            avatar: ActiveValue::Set(participant.avatar.clone()),
            user_id: ActiveValue::Set(participant.user_id.clone()),
            created_at: ActiveValue::Set(participant.created_at),
        }
    }
}

impl TryFrom<Model> for Participant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "participant")?,
            group_id: model.group_id,
            name: model.name,
            email: model.email,
            status: ParticipantStatus::try_from(model.status.as_str())?,
            color: model.color,
            avatar: model.avatar,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_participant_starts_active() {
        let p = Participant::new(
            "g".to_string(),
            "Alice".to_string(),
            "Alice@Example.com".to_string(),
            None,
            None,
            Some("alice".to_string()),
            Utc::now(),
        );
        assert_eq!(p.status, ParticipantStatus::Active);
        assert_eq!(p.email, "alice@example.com");
        assert_eq!(p.color, DEFAULT_COLOR);
    }

    #[test]
    fn unlinked_participant_starts_pending() {
        let p = Participant::new(
            "g".to_string(),
            "Bob".to_string(),
            "bob@example.com".to_string(),
            Some("#0ea5e9".to_string()),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(p.status, ParticipantStatus::Pending);
        assert_eq!(p.color, "#0ea5e9");
    }

    #[test]
    fn status_round_trips_storage_strings() {
        for status in [ParticipantStatus::Pending, ParticipantStatus::Active] {
            assert_eq!(
                ParticipantStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
        assert!(ParticipantStatus::try_from("gone").is_err());
    }
}
