use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, invites, users};

use super::{Engine, with_tx};

impl Engine {
    /// Accepts an invite token on behalf of a logged-in account.
    ///
    /// Idempotent for already-accepted invites. The invite's email must
    /// match the account's email; on success the invited participant is
    /// linked and activated. Returns the group id the invite belongs to.
    pub async fn accept_invite(&self, token: &str, username: &str) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            let invite = invites::Entity::find()
                .filter(invites::Column::Token.eq(token.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("invite not exists".to_string()))?;

            if invite.status == invites::InviteStatus::Accepted.as_str() {
                return Ok(invite.group_id);
            }

            let user = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            if invite.email != user.email {
                return Err(EngineError::Forbidden(
                    "invite email does not match".to_string(),
                ));
            }

            self.link_participant(
                &db_tx,
                &invite.participant_id,
                username,
                user.display_name.as_deref(),
            )
            .await?;

            let accepted = invites::ActiveModel {
                id: ActiveValue::Set(invite.id.clone()),
                status: ActiveValue::Set(invites::InviteStatus::Accepted.as_str().to_string()),
                ..Default::default()
            };
            accepted.update(&db_tx).await?;

            Ok(invite.group_id)
        })
    }
}
