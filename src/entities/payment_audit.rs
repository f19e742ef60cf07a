//! Payment audit entity - Append-only log of payment void/restore transitions.
//!
//! `payment_id` is stored as a plain value with no foreign key, so rows survive
//! the hard delete of their payment during a lease cascade. Rows are never
//! updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which transition a row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AuditAction {
    /// Payment was voided
    #[sea_orm(string_value = "void")]
    Void,
    /// Payment was restored
    #[sea_orm(string_value = "restore")]
    Restore,
}

/// Payment audit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_audits")]
pub struct Model {
    /// Unique identifier; also the append order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Payment the action was applied to (no foreign key, rows outlive payments)
    #[sea_orm(indexed)]
    pub payment_id: i64,
    /// What happened to the payment
    pub action: AuditAction,
    /// User id of the caller that performed the transition
    pub actor_id: i64,
    /// Void reason; `None` for restores
    pub reason: Option<String>,
    /// UTC instant of the transition
    pub created_at: DateTimeUtc,
}

/// Audit rows have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
