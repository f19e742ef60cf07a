//! Shared test utilities for the rental ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        access::Caller,
        lease::{self, NewLease},
        payment::{self, PaymentFields},
        property::{self, PropertyFields},
        user::{self, NewUser},
    },
    entities::{self, user::Role},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Makes every `event` (`INSERT`, `UPDATE` or `DELETE`) on `table` fail, so a
/// mutation can be broken partway through.
pub async fn fail_statements_on(db: &DatabaseConnection, event: &str, table: &str) -> Result<()> {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER fail_{}_{table} BEFORE {event} ON {table} \
         BEGIN SELECT RAISE(ABORT, 'store unavailable'); END;",
        event.to_lowercase()
    ))
    .await?;
    Ok(())
}

/// Shorthand for a calendar date in tests.
///
/// # Panics
/// Panics if the date does not exist.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Username of the admin that registers every other test user.
pub const TEST_REGISTRAR: &str = "registrar";

/// Returns the registrar admin, bootstrapping it into an empty store.
pub async fn test_registrar(db: &DatabaseConnection) -> Result<Caller> {
    let existing = entities::User::find()
        .filter(entities::user::Column::Username.eq(TEST_REGISTRAR))
        .one(db)
        .await?;
    let registrar = match existing {
        Some(registrar) => registrar,
        None => {
            user::bootstrap_admin(
                db,
                NewUser {
                    username: TEST_REGISTRAR.to_string(),
                    full_name: "Test registrar".to_string(),
                    email: format!("{TEST_REGISTRAR}@example.com"),
                    role: Role::Admin,
                },
            )
            .await?
        }
    };
    Ok(Caller::new(registrar.id, registrar.role))
}

/// Registers a user with `role` and returns it with a matching [`Caller`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<(entities::user::Model, Caller)> {
    let registrar = test_registrar(db).await?;
    let user = user::create_user(
        db,
        &registrar,
        NewUser {
            username: username.to_string(),
            full_name: format!("{username} test"),
            email: format!("{username}@example.com"),
            role,
        },
    )
    .await?;
    let caller = Caller::new(user.id, role);
    Ok((user, caller))
}

/// Registers a landlord and returns it with its [`Caller`].
pub async fn create_test_landlord(
    db: &DatabaseConnection,
    username: &str,
) -> Result<(entities::user::Model, Caller)> {
    create_test_user(db, username, Role::Landlord).await
}

/// Registers a tenant.
pub async fn create_test_tenant(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    Ok(create_test_user(db, username, Role::Tenant).await?.0)
}

/// Property fields with sensible defaults.
///
/// # Defaults
/// * `address`: "1 Main St", Springfield IL 62701
/// * `monthly_rent`: 1000
/// * `image_path`: None
#[must_use]
pub fn test_property_fields(name: &str) -> PropertyFields {
    PropertyFields {
        name: name.to_string(),
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        monthly_rent: Decimal::from(1000),
        image_path: None,
    }
}

/// Creates a property from [`test_property_fields`].
pub async fn create_test_property(
    db: &DatabaseConnection,
    caller: &Caller,
    name: &str,
) -> Result<entities::property::Model> {
    property::create_property(db, caller, test_property_fields(name)).await
}

/// Lease terms with sensible defaults.
///
/// # Defaults
/// * 2024-01-01 to 2025-01-01
/// * `monthly_rent` and `security_deposit`: 1000
/// * `payment_due_day`: 1
#[must_use]
pub fn test_new_lease(property_id: i64, tenant_id: i64) -> NewLease {
    NewLease {
        property_id,
        tenant_id,
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        monthly_rent: Decimal::from(1000),
        security_deposit: Decimal::from(1000),
        payment_due_day: 1,
    }
}

/// Creates an active lease from [`test_new_lease`].
pub async fn create_test_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i64,
    tenant_id: i64,
) -> Result<entities::lease::Model> {
    lease::create_lease(db, caller, test_new_lease(property_id, tenant_id)).await
}

/// Payment fields with sensible defaults.
///
/// # Defaults
/// * `payment_date`: 2024-02-01
/// * `payment_method`: "check", `payment_type`: "rent"
/// * `notes`: "February rent"
#[must_use]
pub fn test_payment_fields(amount: Decimal) -> PaymentFields {
    PaymentFields {
        amount,
        payment_date: Some(date(2024, 2, 1)),
        payment_method: "check".to_string(),
        payment_type: "rent".to_string(),
        notes: Some("February rent".to_string()),
    }
}

/// Records a payment from [`test_payment_fields`].
pub async fn create_test_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
    amount: Decimal,
) -> Result<entities::payment::Model> {
    payment::record_payment(db, caller, lease_id, test_payment_fields(amount)).await
}

/// A landlord with one property leased to one tenant.
pub struct LeaseFixture {
    /// In-memory store
    pub db: DatabaseConnection,
    /// Owner of the property
    pub landlord: Caller,
    /// Tenant on the lease
    pub tenant: entities::user::Model,
    /// Leased property, currently occupied
    pub property: entities::property::Model,
    /// Active lease
    pub lease: entities::lease::Model,
}

/// Sets up a complete test environment with an active lease.
pub async fn setup_with_lease() -> Result<LeaseFixture> {
    let db = setup_test_db().await?;
    let (_, landlord) = create_test_landlord(&db, "landlord").await?;
    let tenant = create_test_tenant(&db, "tenant").await?;
    let property = create_test_property(&db, &landlord, "Maple Court").await?;
    let lease = create_test_lease(&db, &landlord, property.id, tenant.id).await?;
    // Reload so the fixture carries the resolved occupancy status
    let property = property::get_property(&db, &landlord, property.id).await?;
    Ok(LeaseFixture {
        db,
        landlord,
        tenant,
        property,
        lease,
    })
}

/// [`LeaseFixture`] plus one active payment of 1000.
pub struct PaymentFixture {
    /// In-memory store
    pub db: DatabaseConnection,
    /// Owner of the property
    pub landlord: Caller,
    /// Tenant on the lease
    pub tenant: entities::user::Model,
    /// Leased property, currently occupied
    pub property: entities::property::Model,
    /// Active lease
    pub lease: entities::lease::Model,
    /// Active payment of 1000
    pub payment: entities::payment::Model,
}

/// Sets up a complete test environment with an active lease and payment.
pub async fn setup_with_payment() -> Result<PaymentFixture> {
    let LeaseFixture {
        db,
        landlord,
        tenant,
        property,
        lease,
    } = setup_with_lease().await?;
    let payment = create_test_payment(&db, &landlord, lease.id, Decimal::from(1000)).await?;
    Ok(PaymentFixture {
        db,
        landlord,
        tenant,
        property,
        lease,
        payment,
    })
}
