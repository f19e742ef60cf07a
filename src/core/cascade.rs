//! Cascading deletion of properties and tenants.
//!
//! Each deletion runs as one transaction: either every dependent row is removed
//! or nothing is. The only work outside the transaction is removing a property's
//! image file after commit, which is best-effort.

use crate::{
    core::{
        access::{Caller, owned_property},
        occupancy::{OccupancyTrigger, count_active_leases, resolve_occupancy},
        user::find_tenant,
    },
    entities::{
        Lease, MaintenanceRequest, Notification, Payment, Property, User,
        lease::{self, LeaseStatus},
        maintenance_request, notification, payment, property,
    },
    errors::{Error, Result, TxnContext},
};
use sea_orm::{JoinType, PaginatorTrait, QuerySelect, RelationTrait, TransactionTrait, prelude::*};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// What [`delete_property`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeletion {
    /// The deleted property
    pub property_id: i64,
    /// Leases deleted with it
    pub leases_removed: u64,
    /// Payments deleted through those leases
    pub payments_removed: u64,
    /// Maintenance requests deleted with it
    pub maintenance_removed: u64,
    /// Whether an image file was found and removed after commit
    pub image_removed: bool,
}

/// What [`delete_tenant`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantDeletion {
    /// The deleted tenant
    pub tenant_id: i64,
    /// Leases the tenant held
    pub leases_removed: u64,
    /// Payments made on those leases
    pub payments_removed: u64,
    /// Maintenance requests the tenant raised
    pub maintenance_removed: u64,
    /// Notifications addressed to the tenant
    pub notifications_removed: u64,
    /// Properties whose occupancy was re-resolved because an active lease went away
    pub reresolved_properties: Vec<i64>,
}

/// Deletes a property with its maintenance requests, leases and their payments.
///
/// Refused while the property has an active lease. The image file, if any, is
/// removed from `upload_dir` after the transaction commits.
///
/// # Errors
/// - [`Error::NotFound`] if the property is not the caller's
/// - [`Error::ConflictRejected`] if an active lease exists
/// - [`Error::TransactionFailed`] if any delete fails; nothing is removed then
#[instrument(skip(db))]
pub async fn delete_property(
    db: &DatabaseConnection,
    caller: &Caller,
    upload_dir: &Path,
    property_id: i64,
) -> Result<PropertyDeletion> {
    caller.require_writer()?;

    let txn = db.begin().await?;
    let property = owned_property(&txn, caller, property_id).await?;

    let active_leases = count_active_leases(&txn, property_id).await?;
    if active_leases > 0 {
        return Err(Error::conflict(format!(
            "property {property_id} has {active_leases} active lease(s); terminate them before deleting"
        )));
    }

    let summary = "Deleting property";
    let lease_ids: Vec<i64> = Lease::find()
        .select_only()
        .column(lease::Column::Id)
        .filter(lease::Column::PropertyId.eq(property_id))
        .into_tuple()
        .all(&txn)
        .await
        .in_txn(summary)?;

    let maintenance = MaintenanceRequest::delete_many()
        .filter(maintenance_request::Column::PropertyId.eq(property_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    let payments = Payment::delete_many()
        .filter(payment::Column::LeaseId.is_in(lease_ids))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    let leases = Lease::delete_many()
        .filter(lease::Column::PropertyId.eq(property_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    Property::delete_many()
        .filter(property::Column::Id.eq(property_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;

    txn.commit().await.in_txn(summary)?;

    let image_removed = match property.image_path.as_deref() {
        Some(image) => remove_property_image(upload_dir, image).await,
        None => false,
    };

    info!(
        property_id,
        leases = leases.rows_affected,
        payments = payments.rows_affected,
        maintenance = maintenance.rows_affected,
        "Deleted property"
    );
    Ok(PropertyDeletion {
        property_id,
        leases_removed: leases.rows_affected,
        payments_removed: payments.rows_affected,
        maintenance_removed: maintenance.rows_affected,
        image_removed,
    })
}

/// Resolves a stored image name inside `upload_dir`, ignoring any directory parts.
fn image_location(upload_dir: &Path, image: &str) -> Option<PathBuf> {
    Path::new(image)
        .file_name()
        .map(|name| upload_dir.join(name))
}

/// Removes a property image, logging instead of failing when it cannot be removed.
async fn remove_property_image(upload_dir: &Path, image: &str) -> bool {
    let Some(path) = image_location(upload_dir, image) else {
        warn!(image, "Ignoring unusable property image path");
        return false;
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not remove property image");
            false
        }
    }
}

/// Deletes a tenant with their payments, maintenance requests, leases and
/// notifications, then re-resolves every property that lost an active lease.
///
/// The caller must own a property the tenant leases (admins may delete any tenant).
///
/// # Errors
/// - [`Error::NotFound`] if the tenant does not exist or has no lease with the caller
/// - [`Error::TransactionFailed`] if any delete fails; nothing is removed then
#[instrument(skip(db))]
pub async fn delete_tenant(
    db: &DatabaseConnection,
    caller: &Caller,
    tenant_id: i64,
) -> Result<TenantDeletion> {
    caller.require_writer()?;

    let txn = db.begin().await?;
    let tenant = find_tenant(&txn, tenant_id).await?;

    if let Some(landlord_id) = caller.landlord_scope() {
        let shared_leases = Lease::find()
            .join(JoinType::InnerJoin, lease::Relation::Property.def())
            .filter(lease::Column::TenantId.eq(tenant_id))
            .filter(property::Column::LandlordId.eq(landlord_id))
            .count(&txn)
            .await?;
        if shared_leases == 0 {
            return Err(Error::not_found("Tenant", tenant_id));
        }
    }

    let summary = "Deleting tenant";
    let leases = Lease::find()
        .filter(lease::Column::TenantId.eq(tenant_id))
        .all(&txn)
        .await
        .in_txn(summary)?;
    let lease_ids: Vec<i64> = leases.iter().map(|l| l.id).collect();
    let released: BTreeSet<i64> = leases
        .iter()
        .filter(|l| l.status == LeaseStatus::Active)
        .map(|l| l.property_id)
        .collect();

    let payments = Payment::delete_many()
        .filter(payment::Column::LeaseId.is_in(lease_ids))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    let maintenance = MaintenanceRequest::delete_many()
        .filter(maintenance_request::Column::TenantId.eq(tenant_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    let removed_leases = Lease::delete_many()
        .filter(lease::Column::TenantId.eq(tenant_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    let notifications = Notification::delete_many()
        .filter(notification::Column::UserId.eq(tenant_id))
        .exec(&txn)
        .await
        .in_txn(summary)?;
    User::delete_by_id(tenant.id)
        .exec(&txn)
        .await
        .in_txn(summary)?;

    for property_id in &released {
        resolve_occupancy(&txn, *property_id, OccupancyTrigger::LeaseReleased).await?;
    }

    txn.commit().await.in_txn(summary)?;

    info!(
        tenant_id,
        leases = removed_leases.rows_affected,
        payments = payments.rows_affected,
        "Deleted tenant"
    );
    Ok(TenantDeletion {
        tenant_id,
        leases_removed: removed_leases.rows_affected,
        payments_removed: payments.rows_affected,
        maintenance_removed: maintenance.rows_affected,
        notifications_removed: notifications.rows_affected,
        reresolved_properties: released.into_iter().collect(),
    })
}
