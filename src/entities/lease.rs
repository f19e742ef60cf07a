//! Lease entity - Binds a tenant to a property for a date range.
//!
//! At most one `active` lease may exist per (property, tenant) pair; the lease
//! manager enforces this before every insert or status change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a lease. Only `Active` leases drive occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LeaseStatus {
    /// Binds the tenant to the property now
    #[sea_orm(string_value = "active")]
    Active,
    /// Ran past its end date
    #[sea_orm(string_value = "expired")]
    Expired,
    /// Ended early
    #[sea_orm(string_value = "terminated")]
    Terminated,
}

/// Lease database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leases")]
pub struct Model {
    /// Unique identifier for the lease
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Leased property
    pub property_id: i64,
    /// The user (role tenant) renting the property
    pub tenant_id: i64,
    /// First day of the lease
    pub start_date: Date,
    /// Always strictly after `start_date`
    pub end_date: Date,
    /// Agreed monthly rent
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_rent: Decimal,
    /// Deposit held for the term
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub security_deposit: Decimal,
    /// Day of month rent is due, 1 through 31
    pub payment_due_day: i32,
    /// Active, expired or terminated
    pub status: LeaseStatus,
    /// When the lease was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Lease and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each lease belongs to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id"
    )]
    Property,
    /// Each lease belongs to one tenant
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TenantId",
        to = "super::user::Column::Id"
    )]
    Tenant,
    /// One lease has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
