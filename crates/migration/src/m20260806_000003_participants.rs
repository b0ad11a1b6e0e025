use sea_orm_migration::prelude::*;

use crate::{m20260806_000001_users::Users, m20260806_000002_groups::Groups};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Participants {
    Table,
    Id,
    GroupId,
    Name,
    Email,
    Status,
    Color,
    Avatar,
    UserId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participants::GroupId).string().not_null())
                    .col(ColumnDef::new(Participants::Name).string().not_null())
                    .col(ColumnDef::new(Participants::Email).string().not_null())
                    .col(ColumnDef::new(Participants::Status).string().not_null())
                    .col(ColumnDef::new(Participants::Color).string().not_null())
                    .col(ColumnDef::new(Participants::Avatar).string().not_null())
                    .col(ColumnDef::new(Participants::UserId).string())
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-participants-group_id")
                            .from(Participants::Table, Participants::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-participants-user_id")
                            .from(Participants::Table, Participants::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-participants-group_id-created_at")
                    .table(Participants::Table)
                    .col(Participants::GroupId)
                    .col(Participants::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // One participant row per email per group.
        manager
            .create_index(
                Index::create()
                    .name("idx-participants-group_id-email")
                    .table(Participants::Table)
                    .col(Participants::GroupId)
                    .col(Participants::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await?;
        Ok(())
    }
}
