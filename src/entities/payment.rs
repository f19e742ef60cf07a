//! Payment entity - Money received against a lease.
//!
//! `voided_at`, `voided_by` and `void_reason` are populated if and only if
//! `status` is [`PaymentStatus::Voided`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Validity state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentStatus {
    /// Counts toward the lease
    #[sea_orm(string_value = "active")]
    Active,
    /// Soft-deleted; can be restored
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lease the payment was made against
    pub lease_id: i64,
    /// Always greater than zero
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// Date the money was received
    pub payment_date: Date,
    /// How the money arrived (e.g. `"cash"`, `"check"`, `"bank_transfer"`)
    pub payment_method: String,
    /// What the money is for (e.g. `"rent"`, `"deposit"`, `"late_fee"`)
    pub payment_type: String,
    /// Free text
    pub notes: Option<String>,
    /// Active or voided
    pub status: PaymentStatus,
    /// When the payment was last voided
    pub voided_at: Option<DateTimeUtc>,
    /// User id of whoever voided the payment
    pub voided_by: Option<i64>,
    /// Reason given for the last void
    pub void_reason: Option<String>,
    /// When the payment was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one lease
    #[sea_orm(
        belongs_to = "super::lease::Entity",
        from = "Column::LeaseId",
        to = "super::lease::Column::Id"
    )]
    Lease,
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lease.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
