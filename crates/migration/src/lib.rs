pub use sea_orm_migration::prelude::*;

mod m20260101_000001_users;
mod m20260101_000002_expenses;
mod m20260102_000001_idempotency_key;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_users::Migration),
            Box::new(m20260101_000002_expenses::Migration),
            Box::new(m20260102_000001_idempotency_key::Migration),
        ]
    }
}
