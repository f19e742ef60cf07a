//! Lease lifecycle - Create, edit and delete leases.
//!
//! Every mutation re-resolves the occupancy of the lease's property on the same
//! transaction. At most one active lease may exist per (property, tenant) pair.

use crate::{
    core::{
        access::{Caller, owned_lease, owned_property},
        occupancy::{OccupancyTrigger, resolve_occupancy},
        user::find_tenant,
        validation::Violations,
    },
    entities::{
        Lease, Payment,
        lease::{self, LeaseStatus},
        payment,
        property::PropertyStatus,
    },
    errors::{Error, Result, TxnContext},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_lease`]. New leases always start active.
#[derive(Debug, Clone)]
pub struct NewLease {
    /// Property owned by the caller
    pub property_id: i64,
    /// User with the tenant role
    pub tenant_id: i64,
    /// First day of the lease
    pub start_date: NaiveDate,
    /// Must be after `start_date`
    pub end_date: NaiveDate,
    /// Greater than zero, in whole cents
    pub monthly_rent: Decimal,
    /// Zero or more, in whole cents
    pub security_deposit: Decimal,
    /// Day of the month rent is due, 1 to 31
    pub payment_due_day: i32,
}

/// Input for [`edit_lease`]. The property and tenant of a lease are fixed.
#[derive(Debug, Clone)]
pub struct LeaseChanges {
    /// First day of the lease
    pub start_date: NaiveDate,
    /// Must be after `start_date`
    pub end_date: NaiveDate,
    /// Greater than zero, in whole cents
    pub monthly_rent: Decimal,
    /// Zero or more, in whole cents
    pub security_deposit: Decimal,
    /// Day of the month rent is due, 1 to 31
    pub payment_due_day: i32,
    /// Moving to or from active re-resolves the property's occupancy
    pub status: LeaseStatus,
}

/// What [`delete_lease`] removed and where it left the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseDeletion {
    /// The deleted lease
    pub lease_id: i64,
    /// Property the lease belonged to
    pub property_id: i64,
    /// Payments deleted along with the lease
    pub payments_removed: u64,
    /// Occupancy after the lease was released
    pub property_status: PropertyStatus,
}

fn validate_terms(
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_rent: Decimal,
    security_deposit: Decimal,
    payment_due_day: i32,
) -> Result<()> {
    let mut violations = Violations::new();
    violations.check(
        monthly_rent > Decimal::ZERO,
        "monthly_rent",
        "must be greater than zero",
    );
    violations.check(
        security_deposit >= Decimal::ZERO,
        "security_deposit",
        "must not be negative",
    );
    violations.require_cents("monthly_rent", monthly_rent);
    violations.require_cents("security_deposit", security_deposit);
    violations.check(
        (1..=31).contains(&payment_due_day),
        "payment_due_day",
        "must be between 1 and 31",
    );
    violations.check(
        end_date > start_date,
        "end_date",
        "must be after the start date",
    );
    violations.finish()
}

/// Whether another active lease binds `tenant_id` to `property_id`.
async fn active_lease_exists<C: ConnectionTrait>(
    conn: &C,
    property_id: i64,
    tenant_id: i64,
    excluding: Option<i64>,
) -> Result<bool> {
    let mut query = Lease::find()
        .filter(lease::Column::PropertyId.eq(property_id))
        .filter(lease::Column::TenantId.eq(tenant_id))
        .filter(lease::Column::Status.eq(LeaseStatus::Active));
    if let Some(lease_id) = excluding {
        query = query.filter(lease::Column::Id.ne(lease_id));
    }
    Ok(query.count(conn).await? > 0)
}

/// Creates an active lease and marks its property occupied.
///
/// # Errors
/// - [`Error::ValidationFailed`] listing every violated term
/// - [`Error::NotFound`] if the property is not the caller's or the tenant does not exist
/// - [`Error::ConflictRejected`] if the tenant already holds an active lease on the property
#[instrument(skip(db))]
pub async fn create_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    new_lease: NewLease,
) -> Result<lease::Model> {
    caller.require_writer()?;
    validate_terms(
        new_lease.start_date,
        new_lease.end_date,
        new_lease.monthly_rent,
        new_lease.security_deposit,
        new_lease.payment_due_day,
    )?;

    let txn = db.begin().await?;
    owned_property(&txn, caller, new_lease.property_id).await?;
    find_tenant(&txn, new_lease.tenant_id).await?;

    if active_lease_exists(&txn, new_lease.property_id, new_lease.tenant_id, None).await? {
        return Err(Error::conflict(
            "tenant already has an active lease for this property",
        ));
    }

    let lease = lease::ActiveModel {
        property_id: Set(new_lease.property_id),
        tenant_id: Set(new_lease.tenant_id),
        start_date: Set(new_lease.start_date),
        end_date: Set(new_lease.end_date),
        monthly_rent: Set(new_lease.monthly_rent),
        security_deposit: Set(new_lease.security_deposit),
        payment_due_day: Set(new_lease.payment_due_day),
        status: Set(LeaseStatus::Active),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .in_txn("Creating lease")?;

    resolve_occupancy(&txn, lease.property_id, OccupancyTrigger::LeaseActivated).await?;
    txn.commit().await.in_txn("Creating lease")?;

    info!(
        lease_id = lease.id,
        property_id = lease.property_id,
        tenant_id = lease.tenant_id,
        "Created lease"
    );
    Ok(lease)
}

/// Updates a lease's terms and status, then re-resolves its property.
///
/// Any status may be set; moving to active is rejected if it would create a
/// second active lease for the same tenant and property.
#[instrument(skip(db))]
pub async fn edit_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
    changes: LeaseChanges,
) -> Result<lease::Model> {
    caller.require_writer()?;
    validate_terms(
        changes.start_date,
        changes.end_date,
        changes.monthly_rent,
        changes.security_deposit,
        changes.payment_due_day,
    )?;

    let txn = db.begin().await?;
    let lease = owned_lease(&txn, caller, lease_id).await?;

    if changes.status == LeaseStatus::Active
        && active_lease_exists(&txn, lease.property_id, lease.tenant_id, Some(lease_id)).await?
    {
        return Err(Error::conflict(
            "tenant already has an active lease for this property",
        ));
    }

    let mut active: lease::ActiveModel = lease.into();
    active.start_date = Set(changes.start_date);
    active.end_date = Set(changes.end_date);
    active.monthly_rent = Set(changes.monthly_rent);
    active.security_deposit = Set(changes.security_deposit);
    active.payment_due_day = Set(changes.payment_due_day);
    active.status = Set(changes.status);
    let updated = active.update(&txn).await.in_txn("Editing lease")?;

    resolve_occupancy(
        &txn,
        updated.property_id,
        OccupancyTrigger::for_lease_status(updated.status),
    )
    .await?;
    txn.commit().await.in_txn("Editing lease")?;

    info!(lease_id, status = ?updated.status, "Edited lease");
    Ok(updated)
}

/// Deletes a lease together with all of its payments, then re-resolves the property.
///
/// Audit rows of the removed payments are kept.
#[instrument(skip(db))]
pub async fn delete_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
) -> Result<LeaseDeletion> {
    caller.require_writer()?;

    let txn = db.begin().await?;
    let lease = owned_lease(&txn, caller, lease_id).await?;
    let property_id = lease.property_id;

    let payments = Payment::delete_many()
        .filter(payment::Column::LeaseId.eq(lease_id))
        .exec(&txn)
        .await
        .in_txn("Deleting lease")?;
    lease.delete(&txn).await.in_txn("Deleting lease")?;

    let property_status =
        resolve_occupancy(&txn, property_id, OccupancyTrigger::LeaseReleased).await?;
    txn.commit().await.in_txn("Deleting lease")?;

    info!(
        lease_id,
        property_id,
        payments_removed = payments.rows_affected,
        "Deleted lease"
    );
    Ok(LeaseDeletion {
        lease_id,
        property_id,
        payments_removed: payments.rows_affected,
        property_status,
    })
}

/// Retrieves a lease whose property is owned by the caller.
pub async fn get_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
) -> Result<lease::Model> {
    owned_lease(db, caller, lease_id).await
}

/// Lists the leases of a property owned by the caller, newest start date first.
pub async fn list_leases_for_property(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i64,
) -> Result<Vec<lease::Model>> {
    owned_property(db, caller, property_id).await?;

    Lease::find()
        .filter(lease::Column::PropertyId.eq(property_id))
        .order_by_desc(lease::Column::StartDate)
        .order_by_desc(lease::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
