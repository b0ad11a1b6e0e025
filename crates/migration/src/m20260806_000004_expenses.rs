use sea_orm_migration::prelude::*;

use crate::{m20260806_000002_groups::Groups, m20260806_000003_participants::Participants};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Expenses {
    Table,
    Id,
    GroupId,
    Description,
    Category,
    AmountCents,
    Date,
    PayerId,
    SplitMode,
}

#[derive(Iden)]
enum Splits {
    Table,
    ExpenseId,
    ParticipantId,
    AmountCents,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::GroupId).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Date).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::PayerId).string().not_null())
                    .col(ColumnDef::new(Expenses::SplitMode).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-group_id")
                            .from(Expenses::Table, Expenses::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-payer_id")
                            .from(Expenses::Table, Expenses::PayerId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-group_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::GroupId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Splits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Splits::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Splits::ParticipantId).string().not_null())
                    .col(
                        ColumnDef::new(Splits::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Splits::ExpenseId)
                            .col(Splits::ParticipantId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-expense_id")
                            .from(Splits::Table, Splits::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-participant_id")
                            .from(Splits::Table, Splits::ParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-splits-participant_id")
                    .table(Splits::Table)
                    .col(Splits::ParticipantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Splits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        Ok(())
    }
}
