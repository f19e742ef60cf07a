//! Payment audit log writer.
//!
//! Rows are only ever inserted; this module deliberately exposes no update or
//! delete path. Writes happen on the caller's open transaction so the audit row
//! commits or rolls back together with the payment transition it records.

use crate::{
    entities::{
        PaymentAudit,
        payment_audit::{self, AuditAction},
    },
    errors::{Result, TxnContext},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::debug;

/// Appends one audit row for a payment transition performed by `actor_id` at `at`.
pub async fn append_payment_audit<C: ConnectionTrait>(
    conn: &C,
    payment_id: i64,
    action: AuditAction,
    actor_id: i64,
    reason: Option<String>,
    at: DateTime<Utc>,
) -> Result<payment_audit::Model> {
    let row = payment_audit::ActiveModel {
        payment_id: Set(payment_id),
        action: Set(action),
        actor_id: Set(actor_id),
        reason: Set(reason),
        created_at: Set(at),
        ..Default::default()
    }
    .insert(conn)
    .await
    .in_txn("Writing payment audit record")?;

    debug!(payment_id, ?action, actor_id, "Appended payment audit row");
    Ok(row)
}

/// Returns every audit row recorded for `payment_id`, oldest first.
///
/// Works whether or not the payment itself still exists.
pub async fn audit_trail<C: ConnectionTrait>(
    conn: &C,
    payment_id: i64,
) -> Result<Vec<payment_audit::Model>> {
    PaymentAudit::find()
        .filter(payment_audit::Column::PaymentId.eq(payment_id))
        .order_by_asc(payment_audit::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}
