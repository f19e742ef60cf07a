//! Maintenance request entity - Repairs raised against a property.
//!
//! High and emergency priorities put the property into maintenance status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How urgent a maintenance request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Priority {
    /// Can wait
    #[sea_orm(string_value = "low")]
    Low,
    /// Should be scheduled
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Urgent; takes the property into maintenance
    #[sea_orm(string_value = "high")]
    High,
    /// Urgent; takes the property into maintenance
    #[sea_orm(string_value = "emergency")]
    Emergency,
}

impl Priority {
    /// Whether this priority takes the property out of service.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::High | Self::Emergency)
    }
}

/// Progress of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RequestStatus {
    /// Not started
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Work under way
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Work finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Withdrawn
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Maintenance request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property that needs work
    pub property_id: i64,
    /// Tenant who reported the problem, if any
    pub tenant_id: Option<i64>,
    /// Short summary
    pub title: String,
    /// Details of the problem
    pub description: String,
    /// Urgency
    pub priority: Priority,
    /// Progress
    pub status: RequestStatus,
    /// When the request was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between MaintenanceRequest and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request belongs to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id"
    )]
    Property,
    /// Optional reporting tenant
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TenantId",
        to = "super::user::Column::Id"
    )]
    Tenant,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
