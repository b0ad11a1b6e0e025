use sea_orm_migration::prelude::*;

use crate::{m20260806_000002_groups::Groups, m20260806_000003_participants::Participants};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Invites {
    Table,
    Id,
    GroupId,
    ParticipantId,
    Email,
    Status,
    Token,
    InvitedBy,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invites::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invites::GroupId).string().not_null())
                    .col(ColumnDef::new(Invites::ParticipantId).string().not_null())
                    .col(ColumnDef::new(Invites::Email).string().not_null())
                    .col(ColumnDef::new(Invites::Status).string().not_null())
                    .col(ColumnDef::new(Invites::Token).string().not_null())
                    .col(ColumnDef::new(Invites::InvitedBy).string().not_null())
                    .col(ColumnDef::new(Invites::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invites-group_id")
                            .from(Invites::Table, Invites::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invites-participant_id")
                            .from(Invites::Table, Invites::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invites-token")
                    .table(Invites::Table)
                    .col(Invites::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invites-email-status")
                    .table(Invites::Table)
                    .col(Invites::Email)
                    .col(Invites::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invites::Table).to_owned())
            .await?;
        Ok(())
    }
}
