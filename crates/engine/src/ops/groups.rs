use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, Statement, TransactionTrait, prelude::*,
};

use crate::{
    BalanceEntry, EngineError, Expense, Group, Invite, MoneyCents, Participant, ResultEngine,
    SettlementEntry, groups, invites, participants, settle, users, util::derive_name,
};

use super::{Engine, NewParticipant, normalize_required_name, with_tx};

/// Primary participants (the group creator) get a darker default color than
/// invited ones, matching the client palette.
const OWNER_COLOR: &str = "#111827";

/// A group plus everything a group read returns: roster, expense history,
/// and the derived balance sheet.
#[derive(Clone, Debug)]
pub struct GroupSummary {
    pub group: Group,
    pub participants: Vec<Participant>,
    pub expenses: Vec<Expense>,
    pub total_spent: MoneyCents,
    pub balances: Vec<BalanceEntry>,
    pub settlements: Vec<SettlementEntry>,
}

/// Identifier of the virtual union scope covering every accessible group.
pub const ALL_GROUPS_ID: &str = "all";

impl Engine {
    /// Creates a group owned by `username`, with a primary participant for
    /// the owner and up to three invited ones. Returns the new group id.
    pub async fn new_group(
        &self,
        name: &str,
        username: &str,
        extra_participants: Vec<NewParticipant>,
    ) -> ResultEngine<String> {
        let name = normalize_required_name(name, "group")?;
        if extra_participants.len() > super::participants::MAX_EXTRA_PARTICIPANTS {
            return Err(EngineError::GroupFull(format!(
                "max {} participants allowed",
                super::participants::MAX_EXTRA_PARTICIPANTS
            )));
        }

        with_tx!(self, |db_tx| {
            let owner = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let group = Group::new(name, username, Utc::now());
            let group_id = group.id.clone();
            groups::ActiveModel::from(&group).insert(&db_tx).await?;

            let primary = Participant::new(
                group_id.clone(),
                derive_name(&owner.email, owner.display_name.as_deref()),
                owner.email.clone(),
                Some(OWNER_COLOR.to_string()),
                None,
                Some(username.to_string()),
                Utc::now(),
            );
            participants::ActiveModel::from(&primary)
                .insert(&db_tx)
                .await?;

            for extra in extra_participants {
                self.insert_participant(&db_tx, &group_id, username, extra)
                    .await?;
            }

            Ok(group_id)
        })
    }

    /// Renames a group (owner only).
    pub async fn rename_group(
        &self,
        group_id: &str,
        name: &str,
        username: &str,
    ) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group")?;
        with_tx!(self, |db_tx| {
            let group = self.require_group_owner(&db_tx, group_id, username).await?;
            let renamed = groups::ActiveModel {
                id: ActiveValue::Set(group.id.clone()),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            Ok(Group::from(renamed.update(&db_tx).await?))
        })
    }

    /// Deletes a group and everything it owns (owner only).
    pub async fn delete_group(&self, group_id: &str, username: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let group = self.require_group_owner(&db_tx, group_id, username).await?;

            // Cascade explicitly in one transaction; split rows hang off
            // expenses, so they go first via a subquery.
            let backend = self.database.get_database_backend();
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM splits WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
                    vec![group.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE group_id = ?;",
                    vec![group.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM invites WHERE group_id = ?;",
                    vec![group.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM participants WHERE group_id = ?;",
                    vec![group.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM groups WHERE id = ?;",
                    vec![group.id.clone().into()],
                ))
                .await?;

            Ok(())
        })
    }

    /// Lists every group the user owns or participates in, newest first.
    pub async fn groups_for_user(&self, username: &str) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let models = self.accessible_groups(&db_tx, username).await?;
            Ok(models.into_iter().map(Group::from).collect())
        })
    }

    /// Full group read: roster in insertion order, expenses newest first,
    /// and the balance sheet recomputed from scratch.
    ///
    /// `group_id == "all"` resolves the virtual union of every accessible
    /// group instead of a stored one.
    pub async fn group_summary(&self, group_id: &str, username: &str) -> ResultEngine<GroupSummary> {
        if group_id == ALL_GROUPS_ID {
            return self.all_groups_summary(username).await;
        }

        with_tx!(self, |db_tx| {
            let access = self.require_group(&db_tx, group_id, username).await?;
            let roster = self.group_roster(&db_tx, group_id).await?;
            let expenses = self
                .expenses_in_groups(&db_tx, &[group_id.to_string()])
                .await?;

            Ok(summarize(Group::from(access.group), roster, expenses))
        })
    }

    async fn all_groups_summary(&self, username: &str) -> ResultEngine<GroupSummary> {
        with_tx!(self, |db_tx| {
            let group_models = self.accessible_groups(&db_tx, username).await?;

            let mut roster: Vec<Participant> = Vec::new();
            let mut group_ids = Vec::with_capacity(group_models.len());
            for group in &group_models {
                group_ids.push(group.id.clone());
                for participant in self.group_roster(&db_tx, &group.id).await? {
                    if !roster.iter().any(|p| p.id == participant.id) {
                        roster.push(participant);
                    }
                }
            }

            let expenses = self.expenses_in_groups(&db_tx, &group_ids).await?;

            let virtual_group = Group {
                id: ALL_GROUPS_ID.to_string(),
                name: "All Groups".to_string(),
                owner_id: username.to_string(),
                created_at: Utc::now(),
            };
            Ok(summarize(virtual_group, roster, expenses))
        })
    }

    pub(super) async fn insert_participant(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
        invited_by: &str,
        new: NewParticipant,
    ) -> ResultEngine<(Participant, Option<String>)> {
        let email = super::normalize_email(&new.email)?;
        let name = normalize_required_name(&new.name, "participant")?;

        let duplicate = participants::Entity::find()
            .filter(participants::Column::GroupId.eq(group_id.to_string()))
            .filter(participants::Column::Email.eq(email.clone()))
            .one(db_tx)
            .await?
            .is_some();
        if duplicate {
            return Err(EngineError::ExistingKey(email));
        }

        let account = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(db_tx)
            .await?;

        let participant = Participant::new(
            group_id.to_string(),
            name,
            email.clone(),
            new.color,
            new.avatar,
            account.as_ref().map(|user| user.username.clone()),
            Utc::now(),
        );
        participants::ActiveModel::from(&participant)
            .insert(db_tx)
            .await?;

        let mut token = None;
        if account.is_none() {
            let invite = Invite::new(
                group_id.to_string(),
                participant.id,
                email,
                invited_by,
                Utc::now(),
            );
            token = Some(invite.token.clone());
            invites::ActiveModel::from(&invite).insert(db_tx).await?;
        }

        Ok((participant, token))
    }
}

fn summarize(group: Group, roster: Vec<Participant>, expenses: Vec<Expense>) -> GroupSummary {
    let participant_ids: Vec<_> = roster.iter().map(|p| p.id).collect();
    let sheet = settle::compute_balances(&expenses, &participant_ids);
    let total_spent = MoneyCents::new(expenses.iter().map(|e| e.amount.cents()).sum());

    GroupSummary {
        group,
        participants: roster,
        expenses,
        total_spent,
        balances: sheet.balances,
        settlements: sheet.settlements,
    }
}
