//! Database configuration module for the rental ledger.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! parents first so foreign keys resolve.

use crate::entities::{
    Lease, MaintenanceRequest, Notification, Payment, PaymentAudit, Property, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every table the core needs, skipping the ones that already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Property),
        schema.create_table_from_entity(Lease),
        schema.create_table_from_entity(Payment),
        schema.create_table_from_entity(PaymentAudit),
        schema.create_table_from_entity(MaintenanceRequest),
        schema.create_table_from_entity(Notification),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    info!(tables = statements.len(), "Database schema ready");
    Ok(())
}
