//! Per-user idempotency keys for expense submission.
//!
//! NULL keys never collide in a SQL unique index, so keyless expenses can
//! coexist while keyed ones stay unique per owner.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Expenses {
    Table,
    UserId,
    IdempotencyKey,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .add_column(ColumnDef::new(Expenses::IdempotencyKey).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-expenses-user_id-idempotency_key")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-expenses-user_id-idempotency_key")
                    .table(Expenses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .drop_column(Expenses::IdempotencyKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
