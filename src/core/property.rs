//! Property registry - Create, edit and look up properties.
//!
//! Properties start out vacant. No function here accepts a status; occupancy is
//! owned by [`crate::core::occupancy`].

use crate::{
    core::{
        access::{Caller, owned_property},
        validation::{Violations, optional_text},
    },
    entities::{
        Property,
        property::{self, PropertyStatus},
    },
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// User-editable property fields.
#[derive(Debug, Clone)]
pub struct PropertyFields {
    /// Display name, required
    pub name: String,
    /// Street address, required
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Asking rent, greater than zero and in whole cents
    pub monthly_rent: Decimal,
    /// Stored image file name inside the upload directory
    pub image_path: Option<String>,
}

fn validate(fields: &PropertyFields) -> Result<()> {
    let mut violations = Violations::new();
    violations.require_text("name", &fields.name);
    violations.require_text("address", &fields.address);
    violations.check(
        fields.monthly_rent > Decimal::ZERO,
        "monthly_rent",
        "must be greater than zero",
    );
    violations.require_cents("monthly_rent", fields.monthly_rent);
    violations.finish()
}

/// Creates a vacant property owned by the caller.
///
/// # Errors
/// Returns an error if the caller may not write, a field rule is violated, or the
/// insert fails.
pub async fn create_property(
    db: &DatabaseConnection,
    caller: &Caller,
    fields: PropertyFields,
) -> Result<property::Model> {
    caller.require_writer()?;
    validate(&fields)?;

    let property = property::ActiveModel {
        landlord_id: Set(caller.user_id),
        name: Set(fields.name.trim().to_string()),
        address: Set(fields.address.trim().to_string()),
        city: Set(fields.city.trim().to_string()),
        state: Set(fields.state.trim().to_string()),
        zip_code: Set(fields.zip_code.trim().to_string()),
        monthly_rent: Set(fields.monthly_rent),
        status: Set(PropertyStatus::Vacant),
        image_path: Set(optional_text(fields.image_path)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(property_id = property.id, landlord_id = caller.user_id, "Created property");
    Ok(property)
}

/// Overwrites the editable fields of a property owned by the caller.
/// The occupancy status is left untouched.
pub async fn edit_property(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i64,
    fields: PropertyFields,
) -> Result<property::Model> {
    caller.require_writer()?;
    validate(&fields)?;

    let txn = db.begin().await?;
    let property = owned_property(&txn, caller, property_id).await?;

    let mut active: property::ActiveModel = property.into();
    active.name = Set(fields.name.trim().to_string());
    active.address = Set(fields.address.trim().to_string());
    active.city = Set(fields.city.trim().to_string());
    active.state = Set(fields.state.trim().to_string());
    active.zip_code = Set(fields.zip_code.trim().to_string());
    active.monthly_rent = Set(fields.monthly_rent);
    active.image_path = Set(optional_text(fields.image_path));
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Retrieves a property owned by the caller.
pub async fn get_property(
    db: &DatabaseConnection,
    caller: &Caller,
    property_id: i64,
) -> Result<property::Model> {
    owned_property(db, caller, property_id).await
}

/// Lists the caller's properties (every property for admins), ordered by name.
pub async fn list_properties(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<property::Model>> {
    let mut query = Property::find().order_by_asc(property::Column::Name);
    if let Some(landlord_id) = caller.landlord_scope() {
        query = query.filter(property::Column::LandlordId.eq(landlord_id));
    }
    query.all(db).await.map_err(Into::into)
}
