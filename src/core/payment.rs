//! Payment lifecycle - Record, edit, void and restore payments.
//!
//! Payments move between `active` and `voided` only through [`void_payment`] and
//! [`restore_payment`]. Each transition appends a row to the payment audit log on
//! the same transaction as the status change. Payments are never deleted here;
//! they disappear only with their lease.

use crate::{
    core::{
        access::{Caller, owned_lease, owned_payment},
        audit,
        validation::{Violations, optional_text},
    },
    entities::{
        Payment,
        payment::{self, PaymentStatus},
        payment_audit::{self, AuditAction},
    },
    errors::{Error, Result, TxnContext},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// User-editable payment fields, shared by [`record_payment`] and [`edit_payment`].
#[derive(Debug, Clone)]
pub struct PaymentFields {
    /// Must be greater than zero, in whole cents
    pub amount: Decimal,
    /// Required; `None` means the field was left blank
    pub payment_date: Option<NaiveDate>,
    /// How the money arrived, e.g. "check"
    pub payment_method: String,
    /// What the money is for, e.g. "rent"
    pub payment_type: String,
    /// Free text; blank is stored as `None`
    pub notes: Option<String>,
}

/// Result of a void or restore: the updated payment and the audit row it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransition {
    /// Payment after the transition
    pub payment: payment::Model,
    /// Audit row appended for it
    pub audit: payment_audit::Model,
}

fn validate(fields: &PaymentFields) -> Result<NaiveDate> {
    let mut violations = Violations::new();
    violations.check(
        fields.amount > Decimal::ZERO,
        "amount",
        "must be greater than zero",
    );
    violations.require_cents("amount", fields.amount);

    let Some(payment_date) = fields.payment_date else {
        violations.check(false, "payment_date", "is required");
        return Err(Error::ValidationFailed {
            errors: violations.into_errors(),
        });
    };
    violations.finish()?;
    Ok(payment_date)
}

/// Records a new active payment against a lease owned by the caller.
///
/// No occupancy or audit side effects.
///
/// # Errors
/// - [`Error::PermissionDenied`] if the caller may not write
/// - [`Error::ValidationFailed`] if the amount is not positive or the date is missing
/// - [`Error::NotFound`] if the lease does not exist or is not the caller's
#[instrument(skip(db, fields))]
pub async fn record_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
    fields: PaymentFields,
) -> Result<payment::Model> {
    caller.require_writer()?;
    let payment_date = validate(&fields)?;

    let txn = db.begin().await?;
    owned_lease(&txn, caller, lease_id).await?;

    let payment = payment::ActiveModel {
        lease_id: Set(lease_id),
        amount: Set(fields.amount),
        payment_date: Set(payment_date),
        payment_method: Set(fields.payment_method.trim().to_string()),
        payment_type: Set(fields.payment_type.trim().to_string()),
        notes: Set(optional_text(fields.notes)),
        status: Set(PaymentStatus::Active),
        voided_at: Set(None),
        voided_by: Set(None),
        void_reason: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .in_txn("Recording payment")?;

    txn.commit().await.in_txn("Recording payment")?;

    info!(payment_id = payment.id, lease_id, amount = %payment.amount, "Recorded payment");
    Ok(payment)
}

/// Overwrites the amount, date, method, type and notes of a payment.
/// Status and void metadata are left as they are.
#[instrument(skip(db, fields))]
pub async fn edit_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    payment_id: i64,
    fields: PaymentFields,
) -> Result<payment::Model> {
    caller.require_writer()?;
    let payment_date = validate(&fields)?;

    let txn = db.begin().await?;
    let payment = owned_payment(&txn, caller, payment_id).await?;

    let mut active: payment::ActiveModel = payment.into();
    active.amount = Set(fields.amount);
    active.payment_date = Set(payment_date);
    active.payment_method = Set(fields.payment_method.trim().to_string());
    active.payment_type = Set(fields.payment_type.trim().to_string());
    active.notes = Set(optional_text(fields.notes));
    let updated = active.update(&txn).await.in_txn("Editing payment")?;

    txn.commit().await.in_txn("Editing payment")?;
    Ok(updated)
}

/// Voids an active payment, recording who did it, when, and why.
///
/// A payment that is already voided is rejected rather than voided twice, so
/// every audit row corresponds to a real state change.
///
/// # Errors
/// - [`Error::ValidationFailed`] if `reason` is blank
/// - [`Error::NotFound`] if the payment does not exist or is not the caller's
/// - [`Error::ConflictRejected`] if the payment is already voided
/// - [`Error::TransactionFailed`] if the audit write or status update fails
#[instrument(skip(db))]
pub async fn void_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    payment_id: i64,
    reason: &str,
) -> Result<PaymentTransition> {
    caller.require_writer()?;
    let reason = reason.trim();
    let mut violations = Violations::new();
    violations.require_text("reason", reason);
    violations.finish()?;

    let txn = db.begin().await?;
    let payment = owned_payment(&txn, caller, payment_id).await?;
    if payment.status == PaymentStatus::Voided {
        return Err(Error::conflict(format!(
            "payment {payment_id} is already voided"
        )));
    }

    let now = Utc::now();
    let audit = audit::append_payment_audit(
        &txn,
        payment_id,
        AuditAction::Void,
        caller.user_id,
        Some(reason.to_string()),
        now,
    )
    .await?;

    let mut active: payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Voided);
    active.voided_at = Set(Some(now));
    active.voided_by = Set(Some(caller.user_id));
    active.void_reason = Set(Some(reason.to_string()));
    let payment = active.update(&txn).await.in_txn("Voiding payment")?;

    txn.commit().await.in_txn("Voiding payment")?;

    info!(payment_id, actor_id = caller.user_id, "Voided payment");
    Ok(PaymentTransition { payment, audit })
}

/// Restores a voided payment to active and clears its void metadata.
///
/// # Errors
/// - [`Error::NotFound`] if the payment does not exist or is not the caller's
/// - [`Error::ConflictRejected`] if the payment is not voided
/// - [`Error::TransactionFailed`] if the audit write or status update fails
#[instrument(skip(db))]
pub async fn restore_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    payment_id: i64,
) -> Result<PaymentTransition> {
    caller.require_writer()?;

    let txn = db.begin().await?;
    let payment = owned_payment(&txn, caller, payment_id).await?;
    if payment.status != PaymentStatus::Voided {
        return Err(Error::conflict(format!(
            "payment {payment_id} is not voided"
        )));
    }

    let now = Utc::now();
    let audit = audit::append_payment_audit(
        &txn,
        payment_id,
        AuditAction::Restore,
        caller.user_id,
        None,
        now,
    )
    .await?;

    let mut active: payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Active);
    active.voided_at = Set(None);
    active.voided_by = Set(None);
    active.void_reason = Set(None);
    let payment = active.update(&txn).await.in_txn("Restoring payment")?;

    txn.commit().await.in_txn("Restoring payment")?;

    info!(payment_id, actor_id = caller.user_id, "Restored payment");
    Ok(PaymentTransition { payment, audit })
}

/// Retrieves a payment owned by the caller.
pub async fn get_payment(
    db: &DatabaseConnection,
    caller: &Caller,
    payment_id: i64,
) -> Result<payment::Model> {
    owned_payment(db, caller, payment_id).await
}

/// Lists every payment (active and voided) of a lease, ordered by payment date.
pub async fn list_payments_for_lease(
    db: &DatabaseConnection,
    caller: &Caller,
    lease_id: i64,
) -> Result<Vec<payment::Model>> {
    owned_lease(db, caller, lease_id).await?;

    Payment::find()
        .filter(payment::Column::LeaseId.eq(lease_id))
        .order_by_asc(payment::Column::PaymentDate)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the audit trail of a payment, oldest first.
///
/// Landlords see the trail of payments they own. Admins can read the trail of any
/// payment id, including payments removed by a lease cascade.
pub async fn get_audit_trail(
    db: &DatabaseConnection,
    caller: &Caller,
    payment_id: i64,
) -> Result<Vec<payment_audit::Model>> {
    if !caller.is_admin() {
        owned_payment(db, caller, payment_id).await?;
    }
    audit::audit_trail(db, payment_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::{entities::user::Role, test_utils::*};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_payment_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let caller = Caller::new(1, Role::Landlord);

        let mut fields = test_payment_fields(Decimal::ZERO);
        fields.payment_date = None;

        let Err(Error::ValidationFailed { errors }) =
            record_payment(&db, &caller, 1, fields).await
        else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["amount", "payment_date"]);

        let result = record_payment(&db, &caller, 1, test_payment_fields(Decimal::from(-5))).await;
        assert!(matches!(result.unwrap_err(), Error::ValidationFailed { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_integration() -> Result<()> {
        let fixture = setup_with_lease().await?;

        let payment = create_test_payment(
            &fixture.db,
            &fixture.landlord,
            fixture.lease.id,
            Decimal::new(125_050, 2),
        )
        .await?;

        assert_eq!(payment.lease_id, fixture.lease.id);
        assert_eq!(payment.amount, Decimal::new(125_050, 2));
        assert_eq!(payment.status, PaymentStatus::Active);
        assert_eq!(payment.voided_at, None);
        assert_eq!(payment.notes.as_deref(), Some("February rent"));

        // No audit side effect
        let trail = audit::audit_trail(&fixture.db, payment.id).await?;
        assert!(trail.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_foreign_lease() -> Result<()> {
        let fixture = setup_with_lease().await?;
        let (_, stranger) = create_test_landlord(&fixture.db, "stranger").await?;

        let result =
            create_test_payment(&fixture.db, &stranger, fixture.lease.id, Decimal::from(10)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Lease", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_payment_keeps_status() -> Result<()> {
        let fixture = setup_with_payment().await?;
        void_payment(&fixture.db, &fixture.landlord, fixture.payment.id, "duplicate").await?;

        let fields = PaymentFields {
            amount: Decimal::from(900),
            payment_date: Some(date(2024, 2, 3)),
            payment_method: "cash".to_string(),
            payment_type: "rent".to_string(),
            notes: Some("   ".to_string()),
        };
        let edited = edit_payment(&fixture.db, &fixture.landlord, fixture.payment.id, fields).await?;

        assert_eq!(edited.amount, Decimal::from(900));
        assert_eq!(edited.payment_date, date(2024, 2, 3));
        assert_eq!(edited.payment_method, "cash");
        assert_eq!(edited.notes, None);
        assert_eq!(edited.status, PaymentStatus::Voided);
        assert_eq!(edited.void_reason.as_deref(), Some("duplicate"));
        Ok(())
    }

    #[tokio::test]
    async fn test_void_then_restore_round_trip() -> Result<()> {
        let fixture = setup_with_payment().await?;
        let original = fixture.payment.clone();

        let voided =
            void_payment(&fixture.db, &fixture.landlord, original.id, "NSF check").await?;
        assert_eq!(voided.payment.status, PaymentStatus::Voided);
        assert_eq!(voided.payment.void_reason.as_deref(), Some("NSF check"));
        assert_eq!(voided.payment.voided_by, Some(fixture.landlord.user_id));
        assert!(voided.payment.voided_at.is_some());
        assert_eq!(voided.audit.action, AuditAction::Void);
        assert_eq!(voided.audit.reason.as_deref(), Some("NSF check"));
        assert_eq!(voided.audit.actor_id, fixture.landlord.user_id);

        let restored = restore_payment(&fixture.db, &fixture.landlord, original.id).await?;
        assert_eq!(restored.audit.action, AuditAction::Restore);
        assert_eq!(restored.payment.status, PaymentStatus::Active);
        assert_eq!(restored.payment.voided_at, None);
        assert_eq!(restored.payment.voided_by, None);
        assert_eq!(restored.payment.void_reason, None);

        let reloaded = get_payment(&fixture.db, &fixture.landlord, original.id).await?;
        assert_eq!(reloaded.amount, Decimal::from(1000));
        assert_eq!(reloaded.amount, original.amount);
        assert_eq!(reloaded.payment_date, original.payment_date);
        assert_eq!(reloaded.payment_method, original.payment_method);
        assert_eq!(reloaded.payment_type, original.payment_type);
        assert_eq!(reloaded.notes, original.notes);

        let trail = get_audit_trail(&fixture.db, &fixture.landlord, original.id).await?;
        let actions: Vec<_> = trail.iter().map(|row| row.action).collect();
        assert_eq!(actions, vec![AuditAction::Void, AuditAction::Restore]);
        assert_eq!(trail[0], voided.audit);
        assert_eq!(trail[1], restored.audit);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_active_payment_rejected() -> Result<()> {
        let fixture = setup_with_payment().await?;

        let result = restore_payment(&fixture.db, &fixture.landlord, fixture.payment.id).await;
        assert!(matches!(result.unwrap_err(), Error::ConflictRejected { .. }));

        let trail = audit::audit_trail(&fixture.db, fixture.payment.id).await?;
        assert!(trail.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_void_twice_rejected() -> Result<()> {
        let fixture = setup_with_payment().await?;
        void_payment(&fixture.db, &fixture.landlord, fixture.payment.id, "NSF check").await?;

        let result =
            void_payment(&fixture.db, &fixture.landlord, fixture.payment.id, "again").await;
        assert!(matches!(result.unwrap_err(), Error::ConflictRejected { .. }));

        let trail = audit::audit_trail(&fixture.db, fixture.payment.id).await?;
        assert_eq!(trail.len(), 1);
        let payment = get_payment(&fixture.db, &fixture.landlord, fixture.payment.id).await?;
        assert_eq!(payment.void_reason.as_deref(), Some("NSF check"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_void_drops_audit_row() -> Result<()> {
        let fixture = setup_with_payment().await?;
        // The audit row is written before the payment update that fails here
        fail_statements_on(&fixture.db, "UPDATE", "payments").await?;

        let result =
            void_payment(&fixture.db, &fixture.landlord, fixture.payment.id, "NSF check").await;
        assert!(matches!(result.unwrap_err(), Error::TransactionFailed { .. }));

        assert!(audit::audit_trail(&fixture.db, fixture.payment.id).await?.is_empty());
        let payment = get_payment(&fixture.db, &fixture.landlord, fixture.payment.id).await?;
        assert_eq!(payment.status, PaymentStatus::Active);
        assert_eq!(payment.void_reason, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_amount_limited_to_cents() -> Result<()> {
        let fixture = setup_with_payment().await?;

        for amount in [Decimal::new(1_000_005, 3), Decimal::new(333_333_333, 9)] {
            let result = record_payment(
                &fixture.db,
                &fixture.landlord,
                fixture.lease.id,
                test_payment_fields(amount),
            )
            .await;
            let Err(Error::ValidationFailed { errors }) = result else {
                panic!("expected validation failure for {amount}");
            };
            assert_eq!(errors[0].field, "amount");
        }

        // Trailing zeros are not extra precision
        let payment = create_test_payment(
            &fixture.db,
            &fixture.landlord,
            fixture.lease.id,
            Decimal::new(1_250_500, 3),
        )
        .await?;
        assert_eq!(payment.amount, Decimal::new(125_050, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_void_requires_reason() -> Result<()> {
        let fixture = setup_with_payment().await?;

        let result = void_payment(&fixture.db, &fixture.landlord, fixture.payment.id, "  ").await;
        let Err(Error::ValidationFailed { errors }) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(errors[0].field, "reason");

        let payment = get_payment(&fixture.db, &fixture.landlord, fixture.payment.id).await?;
        assert_eq!(payment.status, PaymentStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn test_void_foreign_payment_not_found() -> Result<()> {
        let fixture = setup_with_payment().await?;
        let (_, stranger) = create_test_landlord(&fixture.db, "stranger").await?;

        let result = void_payment(&fixture.db, &stranger, fixture.payment.id, "fraud").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Payment", .. }
        ));

        let result = get_audit_trail(&fixture.db, &stranger, fixture.payment.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_tenant_cannot_void() -> Result<()> {
        let fixture = setup_with_payment().await?;
        let tenant = Caller::new(fixture.tenant.id, Role::Tenant);

        let result = void_payment(&fixture.db, &tenant, fixture.payment.id, "mine").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::PermissionDenied { role: Role::Tenant }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_payments_for_lease() -> Result<()> {
        let fixture = setup_with_payment().await?;

        let mut fields = test_payment_fields(Decimal::from(50));
        fields.payment_date = Some(date(2024, 1, 15));
        fields.payment_type = "late_fee".to_string();
        let late_fee =
            record_payment(&fixture.db, &fixture.landlord, fixture.lease.id, fields).await?;

        let payments =
            list_payments_for_lease(&fixture.db, &fixture.landlord, fixture.lease.id).await?;
        assert_eq!(payments, vec![late_fee, fixture.payment]);
        Ok(())
    }
}
