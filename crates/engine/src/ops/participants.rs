use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, Participant, ResultEngine, expenses, invites, participants, settle, split};

use super::{Engine, normalize_required_name, with_tx};

/// Extra participants allowed besides the primary one.
pub(super) const MAX_EXTRA_PARTICIPANTS: usize = 3;

const MAX_PARTICIPANTS: usize = MAX_EXTRA_PARTICIPANTS + 1;

/// Payload for adding a participant to a group.
#[derive(Clone, Debug)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    pub color: Option<String>,
    pub avatar: Option<String>,
}

impl Engine {
    /// Adds a participant to a group. When no account matches the email, a
    /// pending invite is created and its token returned for delivery.
    pub async fn add_participant(
        &self,
        group_id: &str,
        username: &str,
        new: NewParticipant,
    ) -> ResultEngine<(Participant, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id, username).await?;

            let count = participants::Entity::find()
                .filter(participants::Column::GroupId.eq(group_id.to_string()))
                .count(&db_tx)
                .await?;
            if count as usize >= MAX_PARTICIPANTS {
                return Err(EngineError::GroupFull(format!(
                    "max {MAX_EXTRA_PARTICIPANTS} participants + primary user"
                )));
            }

            self.insert_participant(&db_tx, group_id, username, new)
                .await
        })
    }

    /// Updates a participant's display fields (owner only). `color` and
    /// `avatar` keep their current value when not supplied.
    pub async fn update_participant(
        &self,
        participant_id: &str,
        username: &str,
        name: &str,
        color: Option<String>,
        avatar: Option<String>,
    ) -> ResultEngine<Participant> {
        let name = normalize_required_name(name, "participant")?;
        with_tx!(self, |db_tx| {
            let model = participants::Entity::find_by_id(participant_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))?;
            self.require_group_owner(&db_tx, &model.group_id, username)
                .await?;

            let mut updated = participants::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            if let Some(color) = color.filter(|c| !c.trim().is_empty()) {
                updated.color = ActiveValue::Set(color);
            }
            if let Some(avatar) = avatar.filter(|a| !a.trim().is_empty()) {
                updated.avatar = ActiveValue::Set(avatar);
            }

            Participant::try_from(updated.update(&db_tx).await?)
        })
    }

    /// Removes a participant from their group.
    ///
    /// Refused while the participant's net balance is off zero by more than
    /// the one-cent rounding slack. Every expense the participant paid or
    /// shares in is deleted with its splits, along with the participant's
    /// invites. If the removed participant was linked to the group owner's
    /// account, ownership passes to the caller.
    pub async fn remove_participant(
        &self,
        participant_id: &str,
        username: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = participants::Entity::find_by_id(participant_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("participant not exists".to_string()))?;
            let access = self.require_group(&db_tx, &model.group_id, username).await?;
            let participant = Participant::try_from(model)?;

            let roster = self.group_roster(&db_tx, &participant.group_id).await?;
            let group_expenses = self
                .expenses_in_groups(&db_tx, &[participant.group_id.clone()])
                .await?;
            let participant_ids: Vec<_> = roster.iter().map(|p| p.id).collect();
            let sheet = settle::compute_balances(&group_expenses, &participant_ids);
            let net = sheet
                .balances
                .iter()
                .find(|b| b.participant_id == participant.id)
                .map(|b| b.net.cents())
                .unwrap_or(0);
            if net.abs() > 1 {
                return Err(EngineError::UnsettledBalance(format!(
                    "participant balance is {}",
                    crate::MoneyCents::new(net)
                )));
            }

            // Expenses the participant paid or shares in go away entirely.
            let affected: Vec<String> = group_expenses
                .iter()
                .filter(|expense| {
                    expense.payer_id == participant.id
                        || expense
                            .splits
                            .iter()
                            .any(|s| s.participant_id == participant.id)
                })
                .map(|expense| expense.id.to_string())
                .collect();

            split::Entity::delete_many()
                .filter(split::Column::ExpenseId.is_in(affected.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.is_in(affected))
                .exec(&db_tx)
                .await?;
            invites::Entity::delete_many()
                .filter(invites::Column::ParticipantId.eq(participant.id.to_string()))
                .exec(&db_tx)
                .await?;

            if participant.user_id.as_deref() == Some(access.group.owner_id.as_str()) {
                let handoff = crate::groups::ActiveModel {
                    id: ActiveValue::Set(access.group.id.clone()),
                    owner_id: ActiveValue::Set(username.to_string()),
                    ..Default::default()
                };
                handoff.update(&db_tx).await?;
            }

            participants::Entity::delete_by_id(participant.id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }
}
