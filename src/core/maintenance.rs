//! Maintenance requests.
//!
//! Raising or editing a request with high or emergency priority puts the property
//! into maintenance status on the same transaction.

use crate::{
    core::{
        access::{Caller, owned_maintenance_request, owned_property},
        occupancy::{OccupancyTrigger, resolve_occupancy},
        user::find_tenant,
        validation::Violations,
    },
    entities::{
        MaintenanceRequest,
        maintenance_request::{self, Priority, RequestStatus},
    },
    errors::{Result, TxnContext},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Input for [`create_maintenance_request`].
#[derive(Debug, Clone)]
pub struct NewMaintenanceRequest {
    /// Property owned by the caller
    pub property_id: i64,
    /// Reporting tenant, if the request came from one
    pub tenant_id: Option<i64>,
    /// Short summary, required
    pub title: String,
    /// Details of the problem
    pub description: String,
    /// High and emergency put the property into maintenance
    pub priority: Priority,
}

/// Input for [`edit_maintenance_request`].
#[derive(Debug, Clone)]
pub struct MaintenanceChanges {
    /// Short summary, required
    pub title: String,
    /// Details of the problem
    pub description: String,
    /// High and emergency put the property into maintenance
    pub priority: Priority,
    /// New progress state
    pub status: RequestStatus,
}

/// Opens a pending maintenance request on a property owned by the caller.
pub async fn create_maintenance_request(
    db: &DatabaseConnection,
    caller: &Caller,
    new_request: NewMaintenanceRequest,
) -> Result<maintenance_request::Model> {
    caller.require_writer()?;
    let mut violations = Violations::new();
    violations.require_text("title", &new_request.title);
    violations.finish()?;

    let txn = db.begin().await?;
    owned_property(&txn, caller, new_request.property_id).await?;
    if let Some(tenant_id) = new_request.tenant_id {
        find_tenant(&txn, tenant_id).await?;
    }

    let request = maintenance_request::ActiveModel {
        property_id: Set(new_request.property_id),
        tenant_id: Set(new_request.tenant_id),
        title: Set(new_request.title.trim().to_string()),
        description: Set(new_request.description.trim().to_string()),
        priority: Set(new_request.priority),
        status: Set(RequestStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .in_txn("Creating maintenance request")?;

    if request.priority.is_urgent() {
        resolve_occupancy(&txn, request.property_id, OccupancyTrigger::UrgentMaintenance).await?;
    }
    txn.commit().await.in_txn("Creating maintenance request")?;

    info!(
        request_id = request.id,
        property_id = request.property_id,
        priority = ?request.priority,
        "Opened maintenance request"
    );
    Ok(request)
}

/// Updates a maintenance request; urgent priorities re-resolve the property.
///
/// The trigger depends on priority only, so completing or cancelling a high or
/// emergency request still puts the property back into maintenance. Only a later
/// lease event moves it out again.
pub async fn edit_maintenance_request(
    db: &DatabaseConnection,
    caller: &Caller,
    request_id: i64,
    changes: MaintenanceChanges,
) -> Result<maintenance_request::Model> {
    caller.require_writer()?;
    let mut violations = Violations::new();
    violations.require_text("title", &changes.title);
    violations.finish()?;

    let txn = db.begin().await?;
    let request = owned_maintenance_request(&txn, caller, request_id).await?;

    let mut active: maintenance_request::ActiveModel = request.into();
    active.title = Set(changes.title.trim().to_string());
    active.description = Set(changes.description.trim().to_string());
    active.priority = Set(changes.priority);
    active.status = Set(changes.status);
    let updated = active
        .update(&txn)
        .await
        .in_txn("Editing maintenance request")?;

    if updated.priority.is_urgent() {
        resolve_occupancy(&txn, updated.property_id, OccupancyTrigger::UrgentMaintenance).await?;
    }
    txn.commit().await.in_txn("Editing maintenance request")?;
    Ok(updated)
}

/// Deletes a maintenance request. The property status is left unchanged.
pub async fn delete_maintenance_request(
    db: &DatabaseConnection,
    caller: &Caller,
    request_id: i64,
) -> Result<()> {
    caller.require_writer()?;

    let txn = db.begin().await?;
    let request = owned_maintenance_request(&txn, caller, request_id).await?;
    request
        .delete(&txn)
        .await
        .in_txn("Deleting maintenance request")?;
    txn.commit().await.in_txn("Deleting maintenance request")?;
    Ok(())
}

/// Lists the maintenance requests of a property owned by the caller, newest first.
pub async fn list_maintenance_requests(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i64,
) -> Result<Vec<maintenance_request::Model>> {
    owned_property(db, caller, property_id).await?;

    MaintenanceRequest::find()
        .filter(maintenance_request::Column::PropertyId.eq(property_id))
        .order_by_desc(maintenance_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
