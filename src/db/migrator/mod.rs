use sea_orm_migration::prelude::*;

mod m20241126_initial;
mod m20241127_unique_constraints;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241126_initial::Migration),
            Box::new(m20241127_unique_constraints::Migration),
        ]
    }
}
