//! Caller identity and ownership checks.
//!
//! Every ownership check is a single query evaluated on the connection (usually an
//! open transaction) that performs the mutation. A row that exists but belongs to
//! another landlord is reported exactly like a missing row.

use crate::{
    entities::{
        Lease, MaintenanceRequest, Payment, Property, lease, maintenance_request, payment,
        property, user::Role,
    },
    errors::{Error, Result},
};
use sea_orm::{JoinType, QuerySelect, RelationTrait, Select, prelude::*};

/// The identity supplied by the external auth gate for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// User id of the caller
    pub user_id: i64,
    /// Role the auth gate vouches for
    pub role: Role,
}

impl Caller {
    /// Identity for `user_id` acting as `role`.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Admins pass every ownership check.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Rejects callers that may not write (anyone but landlords and admins).
    pub fn require_writer(&self) -> Result<()> {
        match self.role {
            Role::Landlord | Role::Admin => Ok(()),
            Role::Tenant => Err(Error::PermissionDenied { role: self.role }),
        }
    }

    /// Landlord id every owned row must match, or `None` for admins.
    pub(crate) const fn landlord_scope(&self) -> Option<i64> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

/// Adds the `properties.landlord_id = caller` condition unless the caller is an admin.
/// The query must already join (or select from) the properties table.
fn scoped<E: EntityTrait>(query: Select<E>, caller: &Caller) -> Select<E> {
    match caller.landlord_scope() {
        Some(landlord_id) => query.filter(property::Column::LandlordId.eq(landlord_id)),
        None => query,
    }
}

/// Loads a property owned by `caller`.
pub async fn owned_property<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    property_id: i64,
) -> Result<property::Model> {
    scoped(Property::find_by_id(property_id), caller)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Property", property_id))
}

/// Loads a lease whose property is owned by `caller`.
pub async fn owned_lease<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    lease_id: i64,
) -> Result<lease::Model> {
    let query = Lease::find_by_id(lease_id).join(JoinType::InnerJoin, lease::Relation::Property.def());

    scoped(query, caller)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Lease", lease_id))
}

/// Loads a payment through payment -> lease -> property -> landlord.
pub async fn owned_payment<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    payment_id: i64,
) -> Result<payment::Model> {
    let query = Payment::find_by_id(payment_id)
        .join(JoinType::InnerJoin, payment::Relation::Lease.def())
        .join(JoinType::InnerJoin, lease::Relation::Property.def());

    scoped(query, caller)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Payment", payment_id))
}

/// Loads a maintenance request whose property is owned by `caller`.
pub async fn owned_maintenance_request<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    request_id: i64,
) -> Result<maintenance_request::Model> {
    let query = MaintenanceRequest::find_by_id(request_id).join(
        JoinType::InnerJoin,
        maintenance_request::Relation::Property.def(),
    );

    scoped(query, caller)
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("MaintenanceRequest", request_id))
}
