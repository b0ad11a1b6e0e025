use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, invites, participants, users};

use super::{Engine, normalize_email, normalize_required_name, with_tx};

impl Engine {
    /// Creates an account and claims any pending invites addressed to its
    /// email, linking and activating the matching participants.
    pub async fn new_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<()> {
        let username = normalize_required_name(username, "user")?;
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(EngineError::InvalidId(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            if users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(email));
            }

            let user = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
                email: ActiveValue::Set(email.clone()),
                display_name: ActiveValue::Set(
                    display_name.map(str::trim).filter(|s| !s.is_empty()).map(String::from),
                ),
            };
            user.insert(&db_tx).await?;

            self.claim_pending_invites(&db_tx, &username, &email, display_name)
                .await?;

            Ok(())
        })
    }

    /// Links every pending invite for `email` to the account: the invited
    /// participant gets the account id, turns active, and takes the account
    /// display name when one is set.
    pub(super) async fn claim_pending_invites(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<()> {
        let pending = invites::Entity::find()
            .filter(invites::Column::Email.eq(email.to_string()))
            .filter(invites::Column::Status.eq(invites::InviteStatus::Pending.as_str()))
            .all(db_tx)
            .await?;

        for invite in pending {
            self.link_participant(db_tx, &invite.participant_id, username, display_name)
                .await?;

            let accepted = invites::ActiveModel {
                id: ActiveValue::Set(invite.id),
                status: ActiveValue::Set(invites::InviteStatus::Accepted.as_str().to_string()),
                ..Default::default()
            };
            accepted.update(db_tx).await?;
        }

        Ok(())
    }

    /// Attaches an account to a participant row and activates it.
    pub(super) async fn link_participant(
        &self,
        db_tx: &DatabaseTransaction,
        participant_id: &str,
        username: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<()> {
        let mut linked = participants::ActiveModel {
            id: ActiveValue::Set(participant_id.to_string()),
            user_id: ActiveValue::Set(Some(username.to_string())),
            status: ActiveValue::Set(
                participants::ParticipantStatus::Active.as_str().to_string(),
            ),
            ..Default::default()
        };
        if let Some(name) = display_name.map(str::trim).filter(|s| !s.is_empty()) {
            linked.name = ActiveValue::Set(name.to_string());
        }
        linked.update(db_tx).await?;
        Ok(())
    }
}
