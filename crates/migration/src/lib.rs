pub use sea_orm_migration::prelude::*;

mod m20260806_000001_users;
mod m20260806_000002_groups;
mod m20260806_000003_participants;
mod m20260806_000004_expenses;
mod m20260806_000005_invites;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260806_000001_users::Migration),
            Box::new(m20260806_000002_groups::Migration),
            Box::new(m20260806_000003_participants::Migration),
            Box::new(m20260806_000004_expenses::Migration),
            Box::new(m20260806_000005_invites::Migration),
        ]
    }
}
