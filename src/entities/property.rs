//! Property entity - A rentable unit owned by exactly one landlord.
//!
//! `status` is derived by the occupancy resolver and is never accepted as user input.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Occupancy status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PropertyStatus {
    /// No active lease
    #[sea_orm(string_value = "vacant")]
    Vacant,
    /// At least one active lease
    #[sea_orm(string_value = "occupied")]
    Occupied,
    /// Under urgent maintenance
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

/// Property database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Unique identifier for the property
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning landlord (a user with the landlord role)
    pub landlord_id: i64,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Advertised monthly rent
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_rent: Decimal,
    /// Derived occupancy status
    pub status: PropertyStatus,
    /// File name of the uploaded image, relative to the upload directory
    pub image_path: Option<String>,
    /// When the property was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each property belongs to one landlord
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LandlordId",
        to = "super::user::Column::Id"
    )]
    Landlord,
    /// One property has many leases
    #[sea_orm(has_many = "super::lease::Entity")]
    Leases,
    /// One property has many maintenance requests
    #[sea_orm(has_many = "super::maintenance_request::Entity")]
    MaintenanceRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Landlord.def()
    }
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leases.def()
    }
}

impl Related<super::maintenance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
