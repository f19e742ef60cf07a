//! Core business logic - framework-agnostic lifecycle managers.
//!
//! Every public write operation takes the caller's identity, checks the role,
//! validates its input and performs its mutation plus side effects (occupancy,
//! audit) inside a single database transaction.

/// Caller identity, write-role check and ownership predicates
pub mod access;
/// Append-only payment audit log
pub mod audit;
/// Property and tenant deletion cascades
pub mod cascade;
/// Lease create/edit/delete
pub mod lease;
/// Maintenance requests
pub mod maintenance;
/// Derived property occupancy status
pub mod occupancy;
/// Payment record/edit/void/restore
pub mod payment;
/// Property create/edit/lookup
pub mod property;
/// User registry
pub mod user;
/// Field-rule collection
pub mod validation;
