//! Group access checks.
//!
//! A user can read a group when they own it or when one of its participants
//! links to their account. Group metadata and participant edits are
//! owner-only. These helpers run inside the caller's transaction.

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{EngineError, Participant, ResultEngine, groups, participants};

use super::Engine;

pub(super) struct GroupAccess {
    pub(super) group: groups::Model,
    pub(super) owner: bool,
}

impl Engine {
    /// Loads a group and verifies the user can read it.
    pub(super) async fn require_group(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
        username: &str,
    ) -> ResultEngine<GroupAccess> {
        let group = groups::Entity::find_by_id(group_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;

        if group.owner_id == username {
            return Ok(GroupAccess { group, owner: true });
        }

        let linked = participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id.to_string()))
            .filter(participants::Column::UserId.eq(username.to_string()))
            .one(db_tx)
            .await?
            .is_some();
        if !linked {
            return Err(EngineError::Forbidden("not a group member".to_string()));
        }

        Ok(GroupAccess {
            group,
            owner: false,
        })
    }

    /// Loads a group and verifies the user owns it.
    pub(super) async fn require_group_owner(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
        username: &str,
    ) -> ResultEngine<groups::Model> {
        let access = self.require_group(db_tx, group_id, username).await?;
        if !access.owner {
            return Err(EngineError::Forbidden("owner required".to_string()));
        }
        Ok(access.group)
    }

    /// Every group the user owns or participates in, newest first.
    pub(super) async fn accessible_groups(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Vec<groups::Model>> {
        let mut result: Vec<groups::Model> = groups::Entity::find()
            .filter(groups::Column::OwnerId.eq(username.to_string()))
            .all(db_tx)
            .await?;

        let linked_ids: Vec<String> = participants::Entity::find()
            .filter(participants::Column::UserId.eq(username.to_string()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|p| p.group_id)
            .collect();

        let shared = groups::Entity::find()
            .filter(groups::Column::Id.is_in(linked_ids))
            .all(db_tx)
            .await?;
        for group in shared {
            if !result.iter().any(|g| g.id == group.id) {
                result.push(group);
            }
        }

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    /// The group roster in insertion order. Equal splits and remainder-cent
    /// distribution depend on this ordering being stable.
    pub(super) async fn group_roster(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
    ) -> ResultEngine<Vec<Participant>> {
        participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id.to_string()))
            .order_by_asc(participants::Column::CreatedAt)
            .order_by_asc(participants::Column::Id)
            .all(db_tx)
            .await?
            .into_iter()
            .map(Participant::try_from)
            .collect()
    }
}
