//! User entity - landlords, tenants and administrators share one table.
//!
//! A "tenant" in the rest of the crate is simply a user whose role is [`Role::Tenant`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role supplied by the external auth gate and stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    /// Owns properties and manages their leases
    #[sea_orm(string_value = "landlord")]
    Landlord,
    /// Rents a property under a lease
    #[sea_orm(string_value = "tenant")]
    Tenant,
    /// Operates on every landlord's records
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across all roles
    #[sea_orm(unique)]
    pub username: String,
    /// Display name
    pub full_name: String,
    /// Contact address
    pub email: String,
    /// What the user may do
    pub role: Role,
    /// When the user was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A landlord owns many properties
    #[sea_orm(has_many = "super::property::Entity")]
    Properties,
    /// A tenant holds many leases
    #[sea_orm(has_many = "super::lease::Entity")]
    Leases,
    /// One user has many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leases.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
