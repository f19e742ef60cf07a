//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Lease entity
pub mod lease;
/// Maintenance request entity
pub mod maintenance_request;
/// Notification entity
pub mod notification;
/// Payment entity
pub mod payment;
/// Payment audit entity
pub mod payment_audit;
/// Property entity
pub mod property;
/// User entity
pub mod user;

// Re-export specific types to avoid conflicts
pub use lease::{Column as LeaseColumn, Entity as Lease, Model as LeaseModel};
pub use maintenance_request::{
    Column as MaintenanceRequestColumn, Entity as MaintenanceRequest,
    Model as MaintenanceRequestModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use payment_audit::{
    Column as PaymentAuditColumn, Entity as PaymentAudit, Model as PaymentAuditModel,
};
pub use property::{Column as PropertyColumn, Entity as Property, Model as PropertyModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
