//! Property occupancy resolver.
//!
//! A property's status is never edited directly. Every lease or maintenance
//! mutation that can affect it hands an [`OccupancyTrigger`] to
//! [`resolve_occupancy`] on the same transaction, which derives the new status
//! with [`derive_status`] and persists it.
//!
//! Triggers are applied in event order: the most recent event decides. A lease
//! becoming active marks the property occupied even if an urgent maintenance
//! request put it into maintenance earlier, and vice versa.

use crate::{
    entities::{
        Lease, Property,
        lease::{self, LeaseStatus},
        property::{self, PropertyStatus},
    },
    errors::{Error, Result, TxnContext},
};
use sea_orm::{PaginatorTrait, Select, Set, prelude::*};
use tracing::debug;

/// The event that caused a status re-derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyTrigger {
    /// A lease was created active or moved to active
    LeaseActivated,
    /// A lease left the active state or was deleted
    LeaseReleased,
    /// A high or emergency maintenance request was raised or edited
    UrgentMaintenance,
}

impl OccupancyTrigger {
    /// Trigger for a lease that now has `status`.
    #[must_use]
    pub const fn for_lease_status(status: LeaseStatus) -> Self {
        match status {
            LeaseStatus::Active => Self::LeaseActivated,
            LeaseStatus::Expired | LeaseStatus::Terminated => Self::LeaseReleased,
        }
    }
}

/// Derives the status a property must have after `trigger`.
///
/// `remaining_active_leases` is only consulted for [`OccupancyTrigger::LeaseReleased`].
#[must_use]
pub const fn derive_status(
    trigger: OccupancyTrigger,
    current: PropertyStatus,
    remaining_active_leases: u64,
) -> PropertyStatus {
    match trigger {
        OccupancyTrigger::LeaseActivated => PropertyStatus::Occupied,
        OccupancyTrigger::UrgentMaintenance => PropertyStatus::Maintenance,
        OccupancyTrigger::LeaseReleased if remaining_active_leases == 0 => PropertyStatus::Vacant,
        // Another active lease still holds the property; occupied or a later
        // maintenance status stays as it is.
        OccupancyTrigger::LeaseReleased => current,
    }
}

fn active_leases(property_id: i64) -> Select<Lease> {
    Lease::find()
        .filter(lease::Column::PropertyId.eq(property_id))
        .filter(lease::Column::Status.eq(LeaseStatus::Active))
}

/// Number of leases with status `active` on `property_id`.
pub async fn count_active_leases<C: ConnectionTrait>(conn: &C, property_id: i64) -> Result<u64> {
    active_leases(property_id)
        .count(conn)
        .await
        .map_err(Into::into)
}

/// Re-derives and persists the status of `property_id` after `trigger`.
///
/// Always writes exactly one status, even when it is unchanged.
pub async fn resolve_occupancy<C: ConnectionTrait>(
    conn: &C,
    property_id: i64,
    trigger: OccupancyTrigger,
) -> Result<PropertyStatus> {
    let property = Property::find_by_id(property_id)
        .one(conn)
        .await
        .in_txn("Resolving property occupancy")?
        .ok_or_else(|| Error::not_found("Property", property_id))?;

    let remaining = match trigger {
        OccupancyTrigger::LeaseReleased => active_leases(property_id)
            .count(conn)
            .await
            .in_txn("Resolving property occupancy")?,
        OccupancyTrigger::LeaseActivated | OccupancyTrigger::UrgentMaintenance => 0,
    };

    let previous = property.status;
    let next = derive_status(trigger, previous, remaining);

    let mut active: property::ActiveModel = property.into();
    active.status = Set(next);
    active
        .update(conn)
        .await
        .in_txn("Resolving property occupancy")?;

    debug!(property_id, ?trigger, ?previous, ?next, "Resolved property occupancy");
    Ok(next)
}
