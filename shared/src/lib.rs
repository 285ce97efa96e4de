//! Shared types and domain logic for the Inventory Management System
//!
//! This crate contains the pure, storage-agnostic parts of the system:
//! entity status enums and their derivation rules, identifier generation
//! (slugs and sequential codes), and input validation helpers. The backend
//! crate layers persistence, caching, and HTTP on top.

pub mod ident;
pub mod models;
pub mod types;
pub mod validation;

pub use ident::*;
pub use models::*;
pub use types::*;
pub use validation::*;
