//! User registry - landlords, tenants and admins.
//!
//! Credentials live with the external auth gate; this module only keeps the rows
//! that leases, properties and notifications reference.

use crate::{
    core::{access::Caller, validation::Violations},
    entities::{
        User,
        user::{self, Role},
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_user`] and [`bootstrap_admin`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name, trimmed before storing
    pub username: String,
    /// Display name
    pub full_name: String,
    /// Contact address; must contain `@`
    pub email: String,
    /// Role the new user acts with
    pub role: Role,
}

/// Registers a user after validating the username and email.
///
/// Admins may register any role. Landlords may only register tenants.
///
/// # Errors
/// - [`Error::PermissionDenied`] if `caller` may not register a user with this role
/// - [`Error::ValidationFailed`] for a blank username/full name or an email without `@`
/// - [`Error::ConflictRejected`] if the username is taken
#[instrument(skip(db, new_user), fields(role = ?new_user.role))]
pub async fn create_user(
    db: &DatabaseConnection,
    caller: &Caller,
    new_user: NewUser,
) -> Result<user::Model> {
    caller.require_writer()?;
    if !caller.is_admin() && new_user.role != Role::Tenant {
        return Err(Error::PermissionDenied { role: caller.role });
    }

    insert_user(db, new_user).await
}

/// Registers the first admin of an empty store.
///
/// # Errors
/// - [`Error::ValidationFailed`] as for [`create_user`]
/// - [`Error::ConflictRejected`] once any user exists
pub async fn bootstrap_admin(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let txn = db.begin().await?;

    if User::find().count(&txn).await? > 0 {
        return Err(Error::conflict("an admin can only be bootstrapped into an empty store"));
    }
    let admin = insert_user(
        &txn,
        NewUser {
            role: Role::Admin,
            ..new_user
        },
    )
    .await?;

    txn.commit().await?;
    Ok(admin)
}

async fn insert_user<C: ConnectionTrait>(conn: &C, new_user: NewUser) -> Result<user::Model> {
    let username = new_user.username.trim().to_string();
    let email = new_user.email.trim().to_string();

    let mut violations = Violations::new();
    violations.require_text("username", &username);
    violations.require_text("full_name", &new_user.full_name);
    violations.check(email.contains('@'), "email", "must be a valid email address");
    violations.finish()?;

    let taken = User::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(Error::conflict(format!("username '{username}' is already taken")));
    }

    let user = user::ActiveModel {
        username: Set(username),
        full_name: Set(new_user.full_name.trim().to_string()),
        email: Set(email),
        role: Set(new_user.role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!(user_id = user.id, role = ?user.role, "Registered user");
    Ok(user)
}

/// Finds a user by id.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Loads `tenant_id` if it is a user with the tenant role.
pub(crate) async fn find_tenant<C: ConnectionTrait>(
    conn: &C,
    tenant_id: i64,
) -> Result<user::Model> {
    User::find_by_id(tenant_id)
        .filter(user::Column::Role.eq(Role::Tenant))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Tenant", tenant_id))
}
