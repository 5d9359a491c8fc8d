//! Database migrations.
//!
//! Schema migrations for the emoji tables.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_emoji_category_table;
mod m20260101_000002_create_emoji_table;
mod m20260101_000003_create_emoji_junction_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_emoji_category_table::Migration),
            Box::new(m20260101_000002_create_emoji_table::Migration),
            Box::new(m20260101_000003_create_emoji_junction_tables::Migration),
        ]
    }
}
